//! Price conversion.
//!
//! Pure functions converting between American odds, decimal odds and
//! implied probability, plus vig removal for two-outcome markets.
//! Callers never pass a price of 0; `OutcomeQuote` makes it unrepresentable.

/// Decimal (multiplicative) odds for an American price.
pub fn american_to_decimal(odds: i32) -> f64 {
    let o = f64::from(odds);
    if odds >= 0 {
        1.0 + o / 100.0
    } else {
        1.0 + 100.0 / o.abs()
    }
}

/// Probability implied by an American price, vig included.
pub fn implied_prob(odds: i32) -> f64 {
    let o = f64::from(odds);
    if odds >= 0 {
        100.0 / (o + 100.0)
    } else {
        o.abs() / (o.abs() + 100.0)
    }
}

/// Normalize a two-way pair of implied probabilities so they sum to 1.
///
/// A non-positive sum means the inputs are missing or degenerate; the
/// result is then an even `(0.5, 0.5)` split.
pub fn remove_vig_two_way(p1: f64, p2: f64) -> (f64, f64) {
    let sum = p1 + p2;
    if sum <= 0.0 {
        return (0.5, 0.5);
    }
    (p1 / sum, p2 / sum)
}

/// Bookmaker margin of a two-way market: implied probabilities minus one.
pub fn overround(p1: f64, p2: f64) -> f64 {
    p1 + p2 - 1.0
}

/// Expected profit per unit staked at `odds` when the win probability is `p`.
pub fn ev_from_prob_and_odds(p: f64, odds: i32) -> f64 {
    ev_from_prob_and_decimal(p, american_to_decimal(odds))
}

/// Same as [`ev_from_prob_and_odds`] for a decimal price.
pub fn ev_from_prob_and_decimal(p: f64, decimal: f64) -> f64 {
    p * (decimal - 1.0) - (1.0 - p)
}

/// Fair American price for a probability (no vig), rounded to the nearest
/// whole point. `None` outside the open interval (0, 1).
pub fn prob_to_american(p: f64) -> Option<i32> {
    if !(p > 0.0 && p < 1.0) {
        return None;
    }
    let odds = if p >= 0.5 {
        -(p / (1.0 - p)) * 100.0
    } else {
        ((1.0 - p) / p) * 100.0
    };
    Some(odds.round() as i32)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
