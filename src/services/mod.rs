pub mod price_service;
pub mod selection;

pub use price_service::{ErrorPolicy, PriceService};
pub use selection::{SelectionController, SelectionOutcome, SelectionState};
