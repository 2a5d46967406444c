//! Kelly criterion stake sizing.
//!
//! Full Kelly on the best available price, clamped at zero (no short
//! positions), scaled by a fractional multiplier and hard-capped as a
//! fraction of bankroll.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::pricing::american_to_decimal;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Kelly sizing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KellyConfig {
    /// Fractional Kelly multiplier (0.25 = quarter-Kelly). Lower = more conservative.
    pub multiplier: f64,
    /// Maximum stake as a fraction of bankroll, regardless of edge.
    pub cap: f64,
}

impl Default for KellyConfig {
    fn default() -> Self {
        Self {
            multiplier: 0.25, // Quarter-Kelly
            cap: 0.02,        // Max 2% of bankroll per pick
        }
    }
}

// ---------------------------------------------------------------------------
// Kelly calculator
// ---------------------------------------------------------------------------

/// Kelly fraction for win probability `p` at American `price`.
///
/// Kelly formula: f* = (p(b+1) - 1) / b
/// where:
///   b = net decimal odds (decimal - 1)
///   p = model win probability
///
/// Returns a value in `[0, cap]`; `b <= 0` returns exactly `0.0`.
pub fn kelly_fraction(p: f64, price: i32, k: f64, cap: f64) -> f64 {
    let b = american_to_decimal(price) - 1.0;
    if b <= 0.0 {
        return 0.0;
    }
    let f_star = ((p * (b + 1.0) - 1.0) / b).max(0.0);
    (f_star * k).min(cap)
}

pub struct KellyCalculator {
    config: KellyConfig,
}

impl KellyCalculator {
    pub fn new(config: KellyConfig) -> Self {
        Self { config }
    }

    /// Access the Kelly configuration.
    pub fn config(&self) -> &KellyConfig {
        &self.config
    }

    /// Recommended bankroll fraction for a pick.
    pub fn fraction(&self, p: f64, price: i32) -> f64 {
        let fraction = kelly_fraction(p, price, self.config.multiplier, self.config.cap);
        trace!(
            p,
            price,
            fraction = format!("{:.2}%", fraction * 100.0),
            "Kelly sized"
        );
        fraction
    }
}

impl Default for KellyCalculator {
    fn default() -> Self {
        Self::new(KellyConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
