//! Ranking and single-pick evaluation over a realistic multi-book event.

use chrono::Duration;
use std::collections::BTreeMap;

use edgebook::data::strength::StrengthTable;
use edgebook::strategy::{rank_candidates, RankingPolicy};
use edgebook::types::{BookmakerSnapshot, OutcomeQuote, SkipReason};
use edgebook::{
    CandidatePick, EngineConfig, Event, MarketType, PickRanker, RankingResult, Selection, Side,
};

use crate::common::{make_nfl_event, t0};

fn find(result: &RankingResult, market: MarketType, side: Side) -> CandidatePick {
    result
        .ranked
        .iter()
        .find(|c| c.market_type == market && c.selection.side == side)
        .cloned()
        .unwrap()
}

fn make_candidate(edge: f64, ev: f64, book: &str) -> CandidatePick {
    CandidatePick {
        market_type: MarketType::Spread,
        selection: Selection::new(Side::Home, Some(-1.5)),
        price: -110,
        p_model: 0.5,
        implied_prob: 0.5238,
        edge,
        ev_per_unit: ev,
        ev_per_100: ev * 100.0,
        kelly_fraction: 0.0,
        source_book: book.to_string(),
    }
}

#[test]
fn test_nfl_event_end_to_end() {
    let event = make_nfl_event();
    let result = PickRanker::default().suggest_picks(&event);

    assert_eq!(result.ranked.len(), 6);
    assert!(result.skipped.is_empty());
    assert_eq!(result.top.len(), 2);

    // Only the away spread has a positive edge; it leads.
    let first = &result.top[0];
    assert_eq!(first.market_type, MarketType::Spread);
    assert_eq!(first.selection, Selection::new(Side::Away, Some(3.0)));
    assert_eq!(first.price, -105);
    assert_eq!(first.source_book, "BookB");
    assert!(first.edge > 0.0);
    assert_eq!(first.kelly_fraction, 0.02);

    // Next best edge is the home moneyline at BookC's -145.
    let second = &result.top[1];
    assert_eq!(second.market_type, MarketType::Moneyline);
    assert_eq!(second.selection.side, Side::Home);
    assert_eq!(second.price, -145);
    assert_eq!(second.source_book, "BookC");

    for pair in result.ranked.windows(2) {
        assert!(pair[0].ev_per_unit >= pair[1].ev_per_unit);
    }
    for c in &result.ranked {
        assert!((c.edge - (c.p_model - c.implied_prob)).abs() < 1e-12);
        assert!((0.0..=0.02).contains(&c.kelly_fraction));
    }
}

#[test]
fn test_moneyline_uses_latest_book_pair() {
    // BookB (latest) quotes Chiefs -155 / Bills +135 once un-swapped.
    let event = make_nfl_event();
    let result = PickRanker::default().suggest_picks(&event);
    let home = find(&result, MarketType::Moneyline, Side::Home);
    let away = find(&result, MarketType::Moneyline, Side::Away);
    assert!((home.p_model - 0.586_146).abs() < 1e-5);
    assert!((home.p_model + away.p_model - 1.0).abs() < 1e-12);
}

#[test]
fn test_swapped_snapshot_contributes_to_correct_side() {
    let event = make_nfl_event();
    let result = PickRanker::default().suggest_picks(&event);

    // BookB's "home +135" is the Bills' price.
    let away_ml = find(&result, MarketType::Moneyline, Side::Away);
    assert_eq!(away_ml.price, 135);
    assert_eq!(away_ml.source_book, "BookB");

    // BookB's "away -3.0 at -115" is the Chiefs' spread; BookA's -110 beats it.
    let home_spread = find(&result, MarketType::Spread, Side::Home);
    assert_eq!(home_spread.selection.line, Some(-3.0));
    assert_eq!(home_spread.price, -110);
    assert_eq!(home_spread.source_book, "BookA");
}

#[test]
fn test_totals_priced_at_even_split() {
    let result = PickRanker::default().suggest_picks(&make_nfl_event());
    let over = find(&result, MarketType::Total, Side::Over);
    let under = find(&result, MarketType::Total, Side::Under);
    assert_eq!(over.p_model, 0.5);
    assert_eq!(under.p_model, 0.5);
    assert_eq!(over.source_book, "BookC");
    assert_eq!(under.source_book, "BookA");
    assert_eq!(over.selection.line, Some(47.5));
}

#[test]
fn test_stale_snapshots_ignored_only_with_now() {
    let config = EngineConfig::from_toml_str("[selection]\nmax_quote_age_secs = 3600").unwrap();
    let ranker = PickRanker::from_config(&config);
    let event = make_nfl_event();

    // BookC was observed two hours before t0.
    let latest = ranker.suggest_picks(&event);
    assert_eq!(find(&latest, MarketType::Moneyline, Side::Home).source_book, "BookC");

    let fresh = ranker.suggest_picks_at(&event, t0());
    let home = find(&fresh, MarketType::Moneyline, Side::Home);
    assert_eq!(home.source_book, "BookA");
    assert_eq!(home.price, -150);
    assert!(fresh.ranked.iter().all(|c| c.source_book != "BookC"));

    // Far enough ahead, every book is stale and nothing gets priced.
    let later = ranker.suggest_picks_at(&event, t0() + Duration::hours(3));
    assert!(later.is_empty());
    assert!(later
        .skipped
        .iter()
        .all(|s| s.reason == SkipReason::NoPrice));
}

#[test]
fn test_missing_inputs_skip_with_reasons() {
    let mut markets = BTreeMap::new();
    markets.insert(
        MarketType::Spread,
        vec![OutcomeQuote::new(Side::Home, Some(-2.5), -110).unwrap()],
    );
    let snapshot = BookmakerSnapshot::new("BookA", t0(), markets).unwrap();
    let event = Event::new("Boston Celtics", "Miami Heat", "nba", t0(), vec![snapshot]).unwrap();

    let result = PickRanker::default().suggest_picks(&event);
    assert_eq!(result.ranked.len(), 1);
    assert_eq!(result.top.len(), 1);

    let reasons: Vec<_> = result
        .skipped
        .iter()
        .map(|s| (s.market_type, s.selection.side, s.reason))
        .collect();
    assert_eq!(
        reasons,
        vec![
            (MarketType::Moneyline, Side::Home, SkipReason::NoPrice),
            (MarketType::Moneyline, Side::Away, SkipReason::NoPrice),
            (MarketType::Spread, Side::Away, SkipReason::NoPrice),
            (MarketType::Total, Side::Over, SkipReason::NoLinePosted),
            (MarketType::Total, Side::Under, SkipReason::NoLinePosted),
        ]
    );
}

#[test]
fn test_no_snapshots_is_empty_not_error() {
    let event = Event::new("A", "B", "golf", t0(), vec![]).unwrap();
    let result = PickRanker::default().suggest_picks(&event);
    assert!(result.top.is_empty());
    assert!(result.ranked.is_empty());
    assert_eq!(result.skipped.len(), 6);
}

#[test]
fn test_policy_switches_to_ev_without_positive_edge() {
    let (top, _, policy) = rank_candidates(
        vec![make_candidate(0.05, 0.01, "plus"), make_candidate(-0.02, 0.03, "minus")],
        2,
    );
    assert_eq!(policy, RankingPolicy::ByEdge);
    assert_eq!(top[0].source_book, "plus");

    // Highest edge (-0.01) carries the lower EV.
    let (top, _, policy) = rank_candidates(
        vec![make_candidate(-0.01, -0.04, "best_edge"), make_candidate(-0.03, -0.01, "best_ev")],
        2,
    );
    assert_eq!(policy, RankingPolicy::ByExpectedValue);
    assert_eq!(top[0].source_book, "best_ev");
}

#[test]
fn test_ranking_result_serializes() {
    let result = PickRanker::default().suggest_picks(&make_nfl_event());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["top"][0]["market_type"], "spread");
    assert_eq!(json["top"][0]["selection"]["side"], "away");
    assert_eq!(json["top"][0]["selection"]["line"], 3.0);
    assert_eq!(json["top"][0]["source_book"], "BookB");
    assert!(json["skipped"].as_array().unwrap().is_empty());

    let back: RankingResult = serde_json::from_value(json).unwrap();
    assert_eq!(back, result);
}

#[test]
fn test_evaluate_pick_moneyline() {
    let event = make_nfl_event();
    let eval = PickRanker::default().evaluate_pick(
        MarketType::Moneyline,
        &event,
        &Selection::side_only(Side::Home),
        -145,
    );
    let p = eval.p_model.unwrap();
    assert!((p - 0.586_146).abs() < 1e-5);
    assert!((eval.implied_prob - 145.0 / 245.0).abs() < 1e-12);
    assert!(eval.edge.unwrap() < 0.0);
    assert_eq!(eval.kelly, Some(0.0));
    assert!(eval.reason.contains("moneyline home at -145"));
    assert!(eval.reason.contains("fair price"));
}

#[test]
fn test_evaluate_pick_off_market_line() {
    // Lines no book carries are still priced from the model.
    let event = make_nfl_event();
    let eval = PickRanker::default().evaluate_pick(
        MarketType::Spread,
        &event,
        &Selection::new(Side::Away, Some(6.5)),
        -110,
    );
    assert!(eval.p_model.unwrap() > 0.65);
    assert!(eval.edge.unwrap() > 0.0);
    assert!(eval.kelly.unwrap() > 0.0);
}

#[test]
fn test_evaluate_pick_missing_prices() {
    let event = Event::new("A", "B", "nhl", t0(), vec![]).unwrap();
    let eval = PickRanker::default().evaluate_pick(
        MarketType::Moneyline,
        &event,
        &Selection::side_only(Side::Away),
        150,
    );
    assert_eq!(eval.p_model, None);
    assert_eq!(eval.ev, None);
    assert_eq!(eval.ev_per_100, None);
    assert!((eval.implied_prob - 0.4).abs() < 1e-12);
    assert!(eval.reason.contains("insufficient data"));
}

#[test]
fn test_malformed_events_rejected() {
    let same = r#"{"home_id":"Bills","away_id":" bills ","sport":"nfl",
        "scheduled_at":"2026-10-25T20:25:00Z"}"#;
    assert!(serde_json::from_str::<Event>(same).is_err());

    let zero_price = r#"{"home_id":"A","away_id":"B","sport":"nfl",
        "scheduled_at":"2026-10-25T20:25:00Z",
        "bookmaker_snapshots":[{"book_id":"X","observed_at":"2026-10-25T12:00:00Z",
            "markets":{"moneyline":[{"side":"home","price":0}]}}]}"#;
    assert!(serde_json::from_str::<Event>(zero_price).is_err());
}

#[test]
fn test_engine_is_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PickRanker<StrengthTable>>();
    assert_send_sync::<EngineConfig>();
    assert_send_sync::<Event>();
    assert_send_sync::<RankingResult>();

    let ranker = std::sync::Arc::new(PickRanker::default());
    let event = std::sync::Arc::new(make_nfl_event());
    let expected = ranker.suggest_picks(&event);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ranker = ranker.clone();
            let event = event.clone();
            std::thread::spawn(move || ranker.suggest_picks(&event))
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}
