#[cfg(test)]
pub mod fake;
pub mod sipsa;

#[cfg(test)]
pub use fake::FakeLoader;
pub use sipsa::{DataLoader, HttpDataLoader};
