use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

use crate::api::DataLoader;
use crate::error::Result;
use crate::map::{MapRenderer, MapView};
use crate::models::{PriceRecord, Product};
use crate::services::price_service::PriceService;

const MAX_SEARCH_RESULTS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub selected_product: Option<Product>,
    pub price_records: Vec<PriceRecord>,
    /// A price query for `selected_product` has not resolved yet.
    pub loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Applied,
    /// Unknown or empty id; selection reset.
    Cleared,
    /// A newer selection superseded this one before its prices arrived.
    Stale,
}

/// Holds the current product selection and its price records.
///
/// Every selection takes a ticket from a monotonic counter; a price query
/// may only write state while its ticket is still the latest.
pub struct SelectionController<L> {
    service: Arc<PriceService<L>>,
    renderer: MapRenderer,
    products: Mutex<Vec<Product>>,
    state: Mutex<SelectionState>,
    latest_request: AtomicU64,
}

impl<L: DataLoader> SelectionController<L> {
    pub fn new(service: Arc<PriceService<L>>) -> Self {
        Self::with_products(service, Vec::new())
    }

    pub fn with_products(service: Arc<PriceService<L>>, products: Vec<Product>) -> Self {
        Self {
            service,
            renderer: MapRenderer::new(),
            products: Mutex::new(products),
            state: Mutex::new(SelectionState::default()),
            latest_request: AtomicU64::new(0),
        }
    }

    pub async fn load_products(&self) -> Result<Vec<Product>> {
        let products = self.service.list_products().await?;
        *lock(&self.products) = products.clone();
        Ok(products)
    }

    pub fn products(&self) -> Vec<Product> {
        lock(&self.products).clone()
    }

    /// Case-insensitive name match, capped at ten results.
    pub fn search(&self, text: &str) -> Vec<Product> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        lock(&self.products)
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .take(MAX_SEARCH_RESULTS)
            .cloned()
            .collect()
    }

    pub async fn select_product(&self, product_id: &str) -> SelectionOutcome {
        let request = self.next_request();

        if product_id.trim().is_empty() {
            debug!("Empty product id, clearing selection (request {})", request);
            *lock(&self.state) = SelectionState::default();
            return SelectionOutcome::Cleared;
        }

        let product = lock(&self.products)
            .iter()
            .find(|p| p.id == product_id)
            .cloned();
        let Some(product) = product else {
            debug!("Product {:?} not in catalog, clearing selection", product_id);
            *lock(&self.state) = SelectionState::default();
            return SelectionOutcome::Cleared;
        };

        *lock(&self.state) = SelectionState {
            selected_product: Some(product.clone()),
            price_records: Vec::new(),
            loading: true,
        };

        info!("Loading prices for product {} ({})", product.id, product.name);
        let records = match self.service.list_prices_for_product(&product.id).await {
            Ok(records) => records,
            Err(e) => {
                error!("Error loading prices for {}: {}", product.id, e);
                Vec::new()
            }
        };

        let mut state = lock(&self.state);
        if self.latest_request.load(Ordering::SeqCst) != request {
            debug!(
                "Discarding stale prices for {} (request {})",
                product.id, request
            );
            return SelectionOutcome::Stale;
        }
        info!("Found prices in {} cities", records.len());
        state.price_records = records;
        state.loading = false;
        SelectionOutcome::Applied
    }

    pub fn clear_selection(&self) {
        self.next_request();
        *lock(&self.state) = SelectionState::default();
    }

    pub fn state(&self) -> SelectionState {
        lock(&self.state).clone()
    }

    pub fn map_view(&self) -> MapView {
        let state = lock(&self.state);
        self.renderer
            .render(state.selected_product.as_ref(), &state.price_records)
    }

    fn next_request(&self) -> u64 {
        self.latest_request.fetch_add(1, Ordering::SeqCst) + 1
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
