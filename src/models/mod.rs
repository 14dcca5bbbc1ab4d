pub mod cache;
pub mod document;
pub mod price;
pub mod product;

pub use cache::{CacheEntry, TtlCache};
pub use document::{Metadata, RawCity, RawDocument, RawProduct};
pub use price::{CityLocation, PriceRecord};
pub use product::Product;
