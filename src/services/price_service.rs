use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::api::DataLoader;
use crate::error::{Error, Result};
use crate::models::{CityLocation, Metadata, PriceRecord, Product, RawDocument, TtlCache};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

const DOCUMENT_KEY: &str = "document";
const PRODUCTS_KEY: &str = "products";
const ALL_PRICES_KEY: &str = "all_prices";

type DocumentCell = Arc<OnceCell<Arc<RawDocument>>>;

/// What price queries do when the document cannot be loaded.
///
/// Product listing ignores this and always returns the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Log the failure and answer with no records.
    #[default]
    DegradeToEmpty,
    Propagate,
}

/// Read-only queries over the SIPSA document, backed by a TTL cache.
pub struct PriceService<L> {
    loader: L,
    on_error: ErrorPolicy,
    document: Mutex<TtlCache<DocumentCell>>,
    products: Mutex<TtlCache<Vec<Product>>>,
    prices: Mutex<TtlCache<Vec<PriceRecord>>>,
}

impl<L: DataLoader> PriceService<L> {
    pub fn new(loader: L) -> Self {
        Self::with_ttl(loader, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(loader: L, ttl: Duration) -> Self {
        Self {
            loader,
            on_error: ErrorPolicy::default(),
            document: Mutex::new(TtlCache::new(ttl)),
            products: Mutex::new(TtlCache::new(ttl)),
            prices: Mutex::new(TtlCache::new(ttl)),
        }
    }

    pub fn with_error_policy(mut self, on_error: ErrorPolicy) -> Self {
        self.on_error = on_error;
        self
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.on_error
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Concurrent misses share one in-flight fetch: the cell is stored in
    /// the same critical section as the cache check.
    async fn load_document(&self) -> Result<Arc<RawDocument>> {
        let cell = {
            let mut cache = lock(&self.document);
            match cache.get(DOCUMENT_KEY) {
                Some(cell) => {
                    debug!("Cache hit for {}", DOCUMENT_KEY);
                    cell
                }
                None => {
                    debug!("Cache miss for {}", DOCUMENT_KEY);
                    let cell = Arc::new(OnceCell::new());
                    cache.set(DOCUMENT_KEY, Arc::clone(&cell));
                    cell
                }
            }
        };

        let document = cell
            .get_or_try_init(|| async { self.loader.fetch_document().await.map(Arc::new) })
            .await?;
        Ok(Arc::clone(document))
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let cached = lock(&self.products).get(PRODUCTS_KEY);
        if let Some(products) = cached {
            debug!("Cache hit for {}", PRODUCTS_KEY);
            return Ok(products);
        }

        let document = self.load_document().await?;
        let products = document.productos.clone();

        info!("Loaded {} products", products.len());
        if let Some(meta) = &document.metadatos {
            info!(
                "{} records available in a {} day window",
                meta.registros_en_ventana
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
                meta.window_days()
            );
        }

        lock(&self.products).set(PRODUCTS_KEY, products.clone());
        Ok(products)
    }

    /// At most one record per city: the first entry whose code equals
    /// `product_id` as a string.
    pub async fn list_prices_for_product(&self, product_id: &str) -> Result<Vec<PriceRecord>> {
        let key = format!("prices_{}", product_id);
        let cached = lock(&self.prices).get(&key);
        if let Some(records) = cached {
            debug!("Cache hit for {}", key);
            return Ok(records);
        }

        let document = match self.load_document().await {
            Ok(document) => document,
            Err(e) => return self.degrade(&key, e),
        };

        let records: Vec<PriceRecord> = document
            .ciudades
            .iter()
            .filter_map(|city| {
                city.find_product(product_id)
                    .map(|product| PriceRecord::from_raw(city, product))
            })
            .collect();

        info!(
            "Prices for product {}: {} cities",
            product_id,
            records.len()
        );
        lock(&self.prices).set(key, records.clone());
        Ok(records)
    }

    pub async fn list_all_prices(&self) -> Result<Vec<PriceRecord>> {
        let cached = lock(&self.prices).get(ALL_PRICES_KEY);
        if let Some(records) = cached {
            debug!("Cache hit for {}", ALL_PRICES_KEY);
            return Ok(records);
        }

        let document = match self.load_document().await {
            Ok(document) => document,
            Err(e) => return self.degrade(ALL_PRICES_KEY, e),
        };

        let records: Vec<PriceRecord> = document
            .ciudades
            .iter()
            .flat_map(|city| {
                city.productos
                    .iter()
                    .map(move |product| PriceRecord::from_raw(city, product))
            })
            .collect();

        info!("Total prices in document: {}", records.len());
        lock(&self.prices).set(ALL_PRICES_KEY, records.clone());
        Ok(records)
    }

    /// Every city in the document with its coordinates.
    pub async fn list_cities(&self) -> Result<Vec<CityLocation>> {
        match self.load_document().await {
            Ok(document) => Ok(document.ciudades.iter().map(CityLocation::from).collect()),
            Err(e) => self.degrade("cities", e),
        }
    }

    pub async fn metadata(&self) -> Result<Option<Metadata>> {
        Ok(self.load_document().await?.metadatos.clone())
    }

    fn degrade<T>(&self, query: &str, e: Error) -> Result<Vec<T>> {
        match self.on_error {
            ErrorPolicy::DegradeToEmpty => {
                error!("Failed to answer {}: {}", query, e);
                Ok(Vec::new())
            }
            ErrorPolicy::Propagate => Err(e),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
