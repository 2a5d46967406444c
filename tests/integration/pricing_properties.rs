//! Numeric properties of the odds and sizing helpers.

use edgebook::pricing::{
    american_to_decimal, ev_from_prob_and_decimal, ev_from_prob_and_odds, implied_prob,
    prob_to_american, remove_vig_two_way,
};
use edgebook::strategy::kelly::kelly_fraction;

const PRICES: [i32; 12] = [-10_000, -400, -150, -110, -105, -101, 100, 101, 130, 150, 400, 10_000];

#[test]
fn test_reference_values() {
    assert!((implied_prob(150) - 0.4).abs() < 1e-12);
    assert!((implied_prob(-150) - 0.6).abs() < 1e-12);
    assert_eq!(american_to_decimal(100), 2.0);
    assert_eq!(american_to_decimal(-100), 2.0);
}

#[test]
fn test_implied_prob_open_interval() {
    for price in PRICES {
        let p = implied_prob(price);
        assert!(p > 0.0 && p < 1.0, "price={price} p={p}");
    }
}

#[test]
fn test_vig_removal_fallback_and_symmetry() {
    assert_eq!(remove_vig_two_way(0.0, 0.0), (0.5, 0.5));
    for p in [0.01, 0.3, 0.52, 0.9] {
        assert_eq!(remove_vig_two_way(p, p), (0.5, 0.5));
    }
    let (h, a) = remove_vig_two_way(implied_prob(-150), implied_prob(130));
    assert!((h + a - 1.0).abs() < 1e-12);
}

#[test]
fn test_ev_monotonic_in_probability_and_payout() {
    let decimals = [1.01, 1.5, 1.91, 2.0, 3.5, 11.0];
    for &d in &decimals {
        for i in 1..99 {
            let p = f64::from(i) / 100.0;
            let q = f64::from(i + 1) / 100.0;
            assert!(ev_from_prob_and_decimal(q, d) > ev_from_prob_and_decimal(p, d));
        }
    }
    for pair in decimals.windows(2) {
        assert!(ev_from_prob_and_decimal(0.4, pair[1]) > ev_from_prob_and_decimal(0.4, pair[0]));
    }
}

#[test]
fn test_fair_price_has_zero_ev() {
    for p in [0.2, 0.4, 0.5, 0.6, 0.8] {
        let price = prob_to_american(p).unwrap();
        assert!(ev_from_prob_and_odds(p, price).abs() < 0.01, "p={p} price={price}");
    }
}

#[test]
fn test_kelly_bounded_by_cap() {
    for price in PRICES {
        for i in 0..=100 {
            let p = f64::from(i) / 100.0;
            let f = kelly_fraction(p, price, 0.25, 0.02);
            assert!((0.0..=0.02).contains(&f), "p={p} price={price} f={f}");
        }
    }
}
