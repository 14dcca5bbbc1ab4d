use serde::{Deserialize, Serialize};

use super::document::{RawCity, RawProduct};

pub const WHOLESALE_MARKET: &str = "Mayorista";

/// One observed wholesale price for one product in one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub product_id: String,
    pub product_name: String,
    /// Always empty: the source document carries no department data.
    pub department: String,
    pub city: String,
    pub market: String,
    pub price: f64,
    pub unit: String,
    pub date: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl PriceRecord {
    pub fn from_raw(city: &RawCity, product: &RawProduct) -> Self {
        Self {
            product_id: product.code(),
            product_name: product.name(),
            department: String::new(),
            city: city.ciudad.clone(),
            market: WHOLESALE_MARKET.to_string(),
            price: product.price(),
            unit: product.unit(),
            date: product.date(),
            latitude: city.lat,
            longitude: city.lng,
        }
    }

    /// Both coordinates, when the record can be placed on a map.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some((lat, lng)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityLocation {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<&RawCity> for CityLocation {
    fn from(city: &RawCity) -> Self {
        Self {
            name: city.ciudad.clone(),
            latitude: city.lat,
            longitude: city.lng,
        }
    }
}
