pub mod color;
pub mod renderer;

pub use color::{color_for, PriceBand};
pub use renderer::{Bounds, MapRenderer, MapView, Marker, Popup};
