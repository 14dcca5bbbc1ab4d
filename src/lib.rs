pub mod api;
pub mod config;
pub mod error;
pub mod map;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used items
pub use api::{DataLoader, HttpDataLoader};
pub use config::Config;
pub use error::{Error, Result};
pub use map::{color_for, MapRenderer, MapView, PriceBand};
pub use models::{PriceRecord, Product};
pub use services::{ErrorPolicy, PriceService, SelectionController, SelectionOutcome};
