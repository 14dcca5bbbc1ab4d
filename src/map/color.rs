use serde::Serialize;

const LOW_CUTOFF: f64 = 0.33;
const MID_CUTOFF: f64 = 0.66;

/// Discretized price level used to color a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBand {
    Low,
    Mid,
    High,
}

impl PriceBand {
    pub fn hex(&self) -> &'static str {
        match self {
            PriceBand::Low => "#22c55e",
            PriceBand::Mid => "#eab308",
            PriceBand::High => "#ef4444",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriceBand::Low => "low",
            PriceBand::Mid => "medium",
            PriceBand::High => "high",
        }
    }
}

/// Band for `price` within `[min_price, max_price]`.
///
/// A degenerate range (`min_price == max_price`) or any non-finite input
/// falls in the mid band.
pub fn color_for(price: f64, min_price: f64, max_price: f64) -> PriceBand {
    let span = max_price - min_price;
    if !span.is_finite() || span <= 0.0 || !price.is_finite() {
        return PriceBand::Mid;
    }

    let ratio = (price - min_price) / span;
    if ratio < LOW_CUTOFF {
        PriceBand::Low
    } else if ratio < MID_CUTOFF {
        PriceBand::Mid
    } else {
        PriceBand::High
    }
}
