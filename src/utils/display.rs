use colored::Colorize;
use prettytable::{format, Cell, Row, Table};

use crate::map::{MapView, PriceBand};
use crate::models::{CityLocation, Product};

/// Price with `,` thousands separators and up to three decimals, so
/// `1200.0` renders as `1,200` and `1350.5` as `1,350.5`.
pub fn format_price(amount: f64) -> String {
    if !amount.is_finite() {
        return "0".to_string();
    }

    let rounded = (amount.abs() * 1000.0).round() / 1000.0;
    let fixed = format!("{:.3}", rounded);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && rounded != 0.0 { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

pub struct DisplayFormatter;

impl Default for DisplayFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_header(&self, text: &str) -> String {
        format!("\n=== {} ===", text.bright_white().bold())
    }

    pub fn format_table(&self, headers: &[&str], rows: &[Vec<String>]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);

        table.add_row(Row::new(
            headers.iter().map(|h| Cell::new(h).style_spec("b")).collect(),
        ));

        for row in rows {
            table.add_row(Row::new(row.iter().map(|cell| Cell::new(cell)).collect()));
        }

        table.to_string()
    }

    pub fn format_band(&self, band: PriceBand) -> String {
        match band {
            PriceBand::Low => band.label().green().to_string(),
            PriceBand::Mid => band.label().yellow().to_string(),
            PriceBand::High => band.label().red().to_string(),
        }
    }

    pub fn format_products(&self, products: &[Product]) -> String {
        let rows: Vec<Vec<String>> = products
            .iter()
            .map(|p| vec![p.id.clone(), p.name.clone(), p.category.clone(), p.unit.clone()])
            .collect();
        self.format_table(&["Code", "Product", "Category", "Unit"], &rows)
    }

    pub fn format_cities(&self, cities: &[CityLocation]) -> String {
        let coord = |c: Option<f64>| c.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".into());
        let rows: Vec<Vec<String>> = cities
            .iter()
            .map(|c| vec![c.name.clone(), coord(c.latitude), coord(c.longitude)])
            .collect();
        self.format_table(&["City", "Lat", "Lng"], &rows)
    }

    pub fn format_map_view(&self, view: &MapView) -> String {
        match view {
            MapView::NoSelection { .. } => "Select a product to see its prices on the map".to_string(),
            MapView::NoData { product, .. } => {
                format!("No price data found for {}", product.name)
            }
            MapView::Markers {
                product,
                markers,
                bounds,
                min_price,
                max_price,
            } => {
                let mut output = Vec::new();
                output.push(self.format_header(&format!("{} ({})", product.name, product.id)));
                output.push(format!(
                    "Range: ${} - ${}",
                    format_price(*min_price),
                    format_price(*max_price)
                ));
                output.push(format!(
                    "Viewport: [{:.4}, {:.4}] - [{:.4}, {:.4}]",
                    bounds.south, bounds.west, bounds.north, bounds.east
                ));

                let rows: Vec<Vec<String>> = markers
                    .iter()
                    .map(|m| {
                        vec![
                            m.popup.city.clone(),
                            m.popup.market.clone(),
                            m.popup.price.clone(),
                            self.format_band(m.band),
                            m.popup.date.clone(),
                        ]
                    })
                    .collect();
                output.push(self.format_table(&["City", "Market", "Price", "Level", "Date"], &rows));
                output.join("\n")
            }
        }
    }
}
