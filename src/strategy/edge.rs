//! Edge and expected value.
//!
//! Compares a model probability to the price a bettor can actually get and
//! derives edge, EV and the Kelly stake for that price.

use serde::{Deserialize, Serialize};

use super::kelly::KellyCalculator;
use crate::pricing::{ev_from_prob_and_odds, implied_prob};

/// Signed edge: model probability minus the price's implied probability.
/// Positive means the model rates the outcome above the market.
pub fn edge(p_model: f64, price: i32) -> f64 {
    p_model - implied_prob(price)
}

/// Expected profit per unit staked.
pub fn ev_per_unit(p_model: f64, price: i32) -> f64 {
    ev_from_prob_and_odds(p_model, price)
}

/// Everything derived from one (probability, price) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceAssessment {
    pub p_model: f64,
    pub implied_prob: f64,
    pub edge: f64,
    pub ev_per_unit: f64,
    pub ev_per_100: f64,
    pub kelly_fraction: f64,
}

/// Edge/EV/Kelly calculator.
pub struct EdgeCalculator {
    kelly: KellyCalculator,
}

impl EdgeCalculator {
    pub fn new(kelly: KellyCalculator) -> Self {
        Self { kelly }
    }

    pub fn kelly(&self) -> &KellyCalculator {
        &self.kelly
    }

    /// Assess a price; `None` when there is no model probability.
    pub fn assess(&self, p_model: Option<f64>, price: i32) -> Option<PriceAssessment> {
        let p = p_model?;
        let ev = ev_per_unit(p, price);
        Some(PriceAssessment {
            p_model: p,
            implied_prob: implied_prob(price),
            edge: edge(p, price),
            ev_per_unit: ev,
            ev_per_100: ev * 100.0,
            kelly_fraction: self.kelly.fraction(p, price),
        })
    }
}

impl Default for EdgeCalculator {
    fn default() -> Self {
        Self::new(KellyCalculator::default())
    }
}
