//! Competitor strength data.
//!
//! Defines the `StrengthSource` trait the probability estimator reads its
//! prior from, and the static table implementation that ships with the
//! engine.

pub mod strength;

use std::sync::Arc;

/// Abstraction over competitor strength ratings.
///
/// Implementations return a value in [0, 1] and must never fail: an unknown
/// sport or competitor rates a neutral 0.5.
#[cfg_attr(test, mockall::automock)]
pub trait StrengthSource: Send + Sync {
    fn strength(&self, sport: &str, competitor: &str) -> f64;
}

impl<T: StrengthSource + ?Sized> StrengthSource for Arc<T> {
    fn strength(&self, sport: &str, competitor: &str) -> f64 {
        (**self).strength(sport, competitor)
    }
}

/// Signed home-minus-away strength difference, in [-1, 1].
pub fn matchup_delta<S: StrengthSource + ?Sized>(
    source: &S,
    sport: &str,
    home: &str,
    away: &str,
) -> f64 {
    source.strength(sport, home) - source.strength(sport, away)
}
