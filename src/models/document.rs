//! Shape of the static SIPSA data file.
//!
//! Decoding is lenient: missing or null collections become empty, product
//! codes may be numbers or strings, and prices may be numeric strings.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::product::Product;

const DEFAULT_UNIT: &str = "kg";
pub const DEFAULT_WINDOW_DAYS: u64 = 90;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDocument {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub productos: Vec<Product>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ciudades: Vec<RawCity>,
    #[serde(default)]
    pub metadatos: Option<Metadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCity {
    #[serde(default)]
    pub ciudad: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub productos: Vec<RawProduct>,
}

impl RawCity {
    /// First entry whose code matches; later duplicates are ignored.
    pub fn find_product(&self, code: &str) -> Option<&RawProduct> {
        self.productos.iter().find(|p| p.code() == code)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    #[serde(default)]
    pub codigo: Value,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub precio: Value,
    #[serde(default)]
    pub unidad: Option<String>,
    #[serde(default)]
    pub fecha_captura: Option<String>,
}

impl RawProduct {
    pub fn code(&self) -> String {
        value_to_string(&self.codigo)
    }

    pub fn name(&self) -> String {
        self.nombre.clone().unwrap_or_default()
    }

    /// Numeric price; anything missing or unparsable is 0.
    pub fn price(&self) -> f64 {
        let price = match &self.precio {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => parse_leading_float(s),
            _ => 0.0,
        };
        if price.is_finite() {
            price
        } else {
            0.0
        }
    }

    pub fn unit(&self) -> String {
        match &self.unidad {
            Some(unit) if !unit.is_empty() => unit.clone(),
            _ => DEFAULT_UNIT.to_string(),
        }
    }

    pub fn date(&self) -> String {
        self.fecha_captura.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub registros_en_ventana: Option<u64>,
    #[serde(default)]
    pub ventana_dias: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    pub fn window_days(&self) -> u64 {
        self.ventana_dias.unwrap_or(DEFAULT_WINDOW_DAYS)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `"1"` and `1` alike.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_string(&Value::deserialize(deserializer)?))
}

/// Largest magnitude an `f64` holds without losing integer precision.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            // `1.0` reads as `"1"`, matching integer-encoded codes.
            Some(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_INT => (f as i64).to_string(),
            _ => n.to_string(),
        },
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parses the longest numeric prefix, so `"1200 COP"` reads as 1200.
fn parse_leading_float(s: &str) -> f64 {
    let s = s.trim();
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_exp = false;
    for (i, c) in s.char_indices() {
        let ok = match c {
            '0'..='9' => true,
            '+' | '-' => i == 0 || s[..i].ends_with(['e', 'E']),
            '.' if !seen_dot && !seen_exp => {
                seen_dot = true;
                true
            }
            'e' | 'E' if !seen_exp && i > 0 => {
                seen_exp = true;
                true
            }
            _ => false,
        };
        if !ok {
            break;
        }
        end = i + c.len_utf8();
    }
    let mut candidate = &s[..end];
    while !candidate.is_empty() {
        if let Ok(v) = candidate.parse::<f64>() {
            return v;
        }
        candidate = &candidate[..candidate.len() - 1];
    }
    0.0
}
