//! Model probability estimation.
//!
//! Converts market prices and the strength prior into a probability for
//! each side of a market:
//!
//! - Moneyline: vig-free market probability blended with a logistic prior
//!   on the strength delta.
//! - Spread: final margin modeled as Normal(0, sigma) per sport.
//! - Total: an even 50/50 split whenever a line exists. This is a
//!   placeholder, not a scoring model.
//!
//! Missing inputs yield `None` for both sides; nothing is guessed.

use std::f64::consts::SQRT_2;
use tracing::trace;

use crate::config::{EngineConfig, SportCalibration};
use crate::data::{matchup_delta, StrengthSource};
use crate::pricing::{implied_prob, remove_vig_two_way};
use crate::types::{Event, MarketType, ProbabilityEstimate, Selection, Side};

// ---------------------------------------------------------------------------
// Math helpers
// ---------------------------------------------------------------------------

/// Standard logistic function.
pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Error function, Abramowitz & Stegun 7.1.26 (|error| < 1.5e-7).
///
/// Odd-symmetric with `erf(0) == 0` exactly.
pub fn erf(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    const P: f64 = 0.327_591_1;
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;

    let sign = x.signum();
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal CDF.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / SQRT_2))
}

// ---------------------------------------------------------------------------
// Estimator
// ---------------------------------------------------------------------------

/// Intermediate values of the moneyline blend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoneylineBreakdown {
    /// Vig-free market probability for the home side.
    pub p_home_fair: f64,
    /// Logistic strength prior for the home side.
    pub prior_home: f64,
    /// Market weight used for this sport.
    pub market_weight: f64,
    /// Blended home probability.
    pub p_home: f64,
}

/// Stateless per-call probability estimator.
pub struct ProbabilityEstimator<S> {
    config: EngineConfig,
    strength: S,
}

impl<S: StrengthSource> ProbabilityEstimator<S> {
    pub fn new(config: &EngineConfig, strength: S) -> Self {
        Self {
            config: config.clone(),
            strength,
        }
    }

    pub fn strength_source(&self) -> &S {
        &self.strength
    }

    /// Calibration constants for a sport (case-insensitive).
    pub fn calibration_for(&self, sport: &str) -> SportCalibration {
        self.config.calibration_for(sport)
    }

    /// Moneyline blend details; `None` unless both prices are present.
    pub fn moneyline_breakdown(
        &self,
        sport: &str,
        home_id: &str,
        away_id: &str,
        home_ml: Option<i32>,
        away_ml: Option<i32>,
    ) -> Option<MoneylineBreakdown> {
        let (home_ml, away_ml) = (home_ml?, away_ml?);
        let cal = self.calibration_for(sport);

        let (p_home_fair, _) = remove_vig_two_way(implied_prob(home_ml), implied_prob(away_ml));
        let delta = matchup_delta(&self.strength, sport, home_id, away_id);
        let prior_home = logistic(cal.strength_slope * (delta - 0.0));
        let w = cal.market_weight;
        let p_home = w * p_home_fair + (1.0 - w) * prior_home;

        trace!(
            sport,
            home_id,
            away_id,
            p_home_fair,
            prior_home,
            delta,
            p_home,
            "Moneyline blend"
        );

        Some(MoneylineBreakdown {
            p_home_fair,
            prior_home,
            market_weight: w,
            p_home,
        })
    }

    /// Home/away win probabilities from both moneyline prices.
    pub fn moneyline(
        &self,
        sport: &str,
        home_id: &str,
        away_id: &str,
        home_ml: Option<i32>,
        away_ml: Option<i32>,
    ) -> ProbabilityEstimate {
        match self.moneyline_breakdown(sport, home_id, away_id, home_ml, away_ml) {
            Some(b) => ProbabilityEstimate::two_way(MarketType::Moneyline, b.p_home),
            None => ProbabilityEstimate::unavailable(MarketType::Moneyline),
        }
    }

    /// Home/away cover probabilities for the posted home line.
    ///
    /// `P(home covers) = P(margin > -line) = 1 - Φ(-line / sigma)`.
    pub fn spread_cover(&self, sport: &str, home_line: Option<f64>) -> ProbabilityEstimate {
        let Some(line) = home_line else {
            return ProbabilityEstimate::unavailable(MarketType::Spread);
        };
        let sigma = self.calibration_for(sport).spread_sigma;
        let z = (0.0 - line) / sigma;
        let p_home = 1.0 - normal_cdf(z);
        ProbabilityEstimate::two_way(MarketType::Spread, p_home)
    }

    /// Over/under probabilities: 50/50 whenever a line exists.
    pub fn total_over_under(&self, total_line: Option<f64>) -> ProbabilityEstimate {
        match total_line {
            Some(_) => ProbabilityEstimate::two_way(MarketType::Total, 0.5),
            None => ProbabilityEstimate::unavailable(MarketType::Total),
        }
    }

    /// Model probability for one selection on an event.
    ///
    /// Moneyline needs both prices in `moneyline`. Spread lines belong to
    /// the selected side, so an away selection at `L` is priced from the
    /// home line `-L`.
    pub fn for_selection(
        &self,
        event: &Event,
        market: MarketType,
        selection: &Selection,
        moneyline: (Option<i32>, Option<i32>),
    ) -> Option<f64> {
        let estimate = match market {
            MarketType::Moneyline => self.moneyline(
                event.sport(),
                event.home_id(),
                event.away_id(),
                moneyline.0,
                moneyline.1,
            ),
            MarketType::Spread => {
                let home_line = match selection.side {
                    Side::Away => selection.line.map(|l| -l),
                    _ => selection.line,
                };
                self.spread_cover(event.sport(), home_line)
            }
            MarketType::Total => self.total_over_under(selection.line),
        };
        estimate.for_side(selection.side)
    }
}
