use async_trait::async_trait;
use serde_json::{json, Value};
use sipsa_map::models::RawDocument;
use sipsa_map::{
    color_for, Config, DataLoader, HttpDataLoader, MapView, PriceBand, PriceService, Result,
    SelectionController, SelectionOutcome,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct CountingLoader {
    document: Value,
    fetches: Arc<AtomicUsize>,
}

impl CountingLoader {
    fn new(document: Value) -> (Self, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        (
            Self {
                document,
                fetches: Arc::clone(&fetches),
            },
            fetches,
        )
    }
}

#[async_trait]
impl DataLoader for CountingLoader {
    async fn fetch_document(&self) -> Result<RawDocument> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::from_value(self.document.clone())?)
    }
}

fn papa_document() -> Value {
    json!({
        "productos": [{ "id": "1", "name": "Papa" }],
        "ciudades": [{
            "ciudad": "BOGOTÁ", "lat": 4.6, "lng": -74.1,
            "productos": [{ "codigo": 1, "nombre": "Papa", "precio": "1200", "unidad": "kg" }]
        }]
    })
}

#[tokio::test]
async fn papa_in_bogota() {
    let (loader, _) = CountingLoader::new(papa_document());
    let service = PriceService::new(loader);

    let records = service.list_prices_for_product("1").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].price, 1200.0);
    assert_eq!(records[0].city, "BOGOTÁ");
    assert_eq!(records[0].product_id, "1");
}

#[tokio::test]
async fn absent_product_is_empty_not_error() {
    let (loader, _) = CountingLoader::new(papa_document());
    let service = PriceService::new(loader);
    assert!(service.list_prices_for_product("42").await.unwrap().is_empty());
}

#[tokio::test]
async fn city_without_coordinates_counts_but_is_not_drawn() {
    let (loader, _) = CountingLoader::new(json!({
        "productos": [{ "id": "1", "name": "Papa" }],
        "ciudades": [
            {
                "ciudad": "BOGOTÁ", "lat": 4.6, "lng": -74.1,
                "productos": [{ "codigo": 1, "nombre": "Papa", "precio": "1200" }]
            },
            {
                "ciudad": "LETICIA",
                "productos": [{ "codigo": 1, "nombre": "Papa", "precio": "3100" }]
            }
        ]
    }));
    let service = Arc::new(PriceService::new(loader));

    let all = service.list_all_prices().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|r| r.city == "LETICIA"));

    let controller = SelectionController::new(Arc::clone(&service));
    controller.load_products().await.unwrap();
    assert_eq!(controller.select_product("1").await, SelectionOutcome::Applied);

    let view = controller.map_view();
    assert_eq!(view.markers().len(), 1);
    assert_eq!(view.markers()[0].popup.city, "BOGOTÁ");
}

#[tokio::test]
async fn identical_queries_fetch_once() {
    let (loader, fetches) = CountingLoader::new(papa_document());
    let service = PriceService::new(loader);

    let first = service.list_prices_for_product("1").await.unwrap();
    let second = service.list_prices_for_product("1").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn three_ui_states() {
    let (loader, _) = CountingLoader::new(json!({
        "productos": [{ "id": "1", "name": "Papa" }, { "id": "5", "name": "Yuca" }],
        "ciudades": [{
            "ciudad": "BOGOTÁ", "lat": 4.6, "lng": -74.1,
            "productos": [{ "codigo": 1, "nombre": "Papa", "precio": "1200" }]
        }]
    }));
    let controller = SelectionController::new(Arc::new(PriceService::new(loader)));
    controller.load_products().await.unwrap();

    assert!(matches!(controller.map_view(), MapView::NoSelection { .. }));

    controller.select_product("5").await;
    assert!(matches!(controller.map_view(), MapView::NoData { .. }));

    controller.select_product("1").await;
    assert!(matches!(controller.map_view(), MapView::Markers { .. }));
}

#[test]
fn color_scale_properties() {
    assert_eq!(color_for(500.0, 500.0, 2500.0), PriceBand::Low);
    assert_eq!(color_for(2500.0, 500.0, 2500.0), PriceBand::High);
    assert_eq!(color_for(700.0, 700.0, 700.0), PriceBand::Mid);
}

#[tokio::test]
async fn http_loader_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/data/dane_sipsa_data.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(papa_document().to_string())
        .expect(1)
        .create_async()
        .await;

    let config = Config {
        base_url: server.url(),
        retry_delay: Duration::from_millis(1),
        ..Config::default()
    };
    let service = PriceService::new(HttpDataLoader::new(&config).unwrap());

    let products = service.list_products().await.unwrap();
    assert_eq!(products[0].name, "Papa");
    let records = service.list_prices_for_product("1").await.unwrap();
    assert_eq!(records[0].price, 1200.0);

    mock.assert_async().await;
}

#[tokio::test]
async fn http_failure_is_fatal_for_products_only() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/data/dane_sipsa_data.json")
        .with_status(500)
        .create_async()
        .await;

    let config = Config {
        base_url: server.url(),
        max_retry_attempts: 2,
        retry_delay: Duration::from_millis(1),
        ..Config::default()
    };
    let service = PriceService::new(HttpDataLoader::new(&config).unwrap());

    assert!(service.list_products().await.is_err());
    assert!(service.list_prices_for_product("1").await.unwrap().is_empty());
    assert!(service.list_all_prices().await.unwrap().is_empty());
}
