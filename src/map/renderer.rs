//! Binds price records to map markers.
//!
//! The actual map widget is external; this module only produces the marker
//! descriptors, the viewport to fit, and a GeoJSON rendition of both.

use serde::Serialize;
use serde_json::{json, Value};

use super::color::{color_for, PriceBand};
use crate::models::{PriceRecord, Product};
use crate::utils::display::format_price;

pub const COLOMBIA_CENTER: (f64, f64) = (4.7110, -74.0721);
pub const DEFAULT_ZOOM: u8 = 6;
pub const FIT_PADDING_PX: u32 = 20;
pub const MARKER_RADIUS: u32 = 8;
pub const MARKER_STROKE: &str = "#ffffff";
pub const MARKER_FILL_OPACITY: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub product: String,
    pub city: String,
    pub market: String,
    pub price: String,
    pub date: String,
}

impl Popup {
    fn from_record(record: &PriceRecord) -> Self {
        Self {
            product: record.product_name.clone(),
            city: record.city.clone(),
            market: record.market.clone(),
            price: format!("${} / {}", format_price(record.price), record.unit),
            date: record.date.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    pub band: PriceBand,
    pub color: &'static str,
    pub price: f64,
    pub popup: Popup,
}

/// Lat/lng bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    fn around(lat: f64, lng: f64) -> Self {
        Self {
            south: lat,
            west: lng,
            north: lat,
            east: lng,
        }
    }

    fn extend(&mut self, lat: f64, lng: f64) {
        self.south = self.south.min(lat);
        self.north = self.north.max(lat);
        self.west = self.west.min(lng);
        self.east = self.east.max(lng);
    }
}

/// What the map should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MapView {
    /// No product chosen yet; default viewport.
    NoSelection { center: (f64, f64), zoom: u8 },
    /// A product is chosen but nothing can be placed on the map.
    NoData {
        product: Product,
        center: (f64, f64),
        zoom: u8,
    },
    Markers {
        product: Product,
        markers: Vec<Marker>,
        /// Viewport to fit, with `FIT_PADDING_PX` around it.
        bounds: Bounds,
        min_price: f64,
        max_price: f64,
    },
}

impl MapView {
    pub fn markers(&self) -> &[Marker] {
        match self {
            MapView::Markers { markers, .. } => markers,
            _ => &[],
        }
    }

    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .markers()
            .iter()
            .map(|m| {
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [m.longitude, m.latitude]
                    },
                    "properties": {
                        "band": m.band,
                        "fillColor": m.color,
                        "color": MARKER_STROKE,
                        "radius": MARKER_RADIUS,
                        "fillOpacity": MARKER_FILL_OPACITY,
                        "price": m.price,
                        "popup": m.popup
                    }
                })
            })
            .collect();

        let mut collection = json!({
            "type": "FeatureCollection",
            "features": features
        });
        if let MapView::Markers { bounds, .. } = self {
            collection["bbox"] = json!([bounds.west, bounds.south, bounds.east, bounds.north]);
        }
        collection
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapRenderer;

impl MapRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Recomputes price range and bounds from scratch on every call.
    /// Records without both coordinates are skipped.
    pub fn render(&self, selected: Option<&Product>, records: &[PriceRecord]) -> MapView {
        let Some(product) = selected else {
            return MapView::NoSelection {
                center: COLOMBIA_CENTER,
                zoom: DEFAULT_ZOOM,
            };
        };

        let placed: Vec<(&PriceRecord, (f64, f64))> = records
            .iter()
            .filter_map(|r| r.position().map(|pos| (r, pos)))
            .collect();

        let Some(&(_, (first_lat, first_lng))) = placed.first() else {
            return MapView::NoData {
                product: product.clone(),
                center: COLOMBIA_CENTER,
                zoom: DEFAULT_ZOOM,
            };
        };

        let (min_price, max_price) = placed.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), (r, _)| (lo.min(r.price), hi.max(r.price)),
        );

        let mut bounds = Bounds::around(first_lat, first_lng);
        let markers = placed
            .iter()
            .map(|&(record, (lat, lng))| {
                bounds.extend(lat, lng);
                let band = color_for(record.price, min_price, max_price);
                Marker {
                    latitude: lat,
                    longitude: lng,
                    band,
                    color: band.hex(),
                    price: record.price,
                    popup: Popup::from_record(record),
                }
            })
            .collect();

        MapView::Markers {
            product: product.clone(),
            markers,
            bounds,
            min_price,
            max_price,
        }
    }
}
