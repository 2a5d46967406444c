//! Pick strategy: edge and EV assessment, Kelly sizing, ranking.

pub mod edge;
pub mod kelly;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::data::strength::StrengthTable;
use crate::data::StrengthSource;
use crate::engine::{BestPrice, BestPriceSelector, ProbabilityEstimator};
use crate::pricing::{implied_prob, prob_to_american};
use crate::types::{
    CandidatePick, Event, MarketType, PickEvaluation, RankingResult, Selection, Side,
    SkipReason, SkippedCandidate,
};
use edge::EdgeCalculator;
use kelly::KellyCalculator;

// ---------------------------------------------------------------------------
// Ranking policy
// ---------------------------------------------------------------------------

/// Ranking configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingConfig {
    /// Size of the `top` list.
    pub top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { top_n: 2 }
    }
}

/// Ordering used for the `top` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingPolicy {
    /// At least one candidate had positive edge: edge desc, then EV desc.
    ByEdge,
    /// No positive edge anywhere: EV desc.
    ByExpectedValue,
}

impl fmt::Display for RankingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankingPolicy::ByEdge => write!(f, "edge"),
            RankingPolicy::ByExpectedValue => write!(f, "ev"),
        }
    }
}

/// Order priced candidates.
///
/// Returns `(top, ranked, policy)`: `ranked` is every candidate by EV per
/// unit descending; `top` is the first `top_n` under the policy. Sorts are
/// stable, so exact ties keep candidate order.
pub fn rank_candidates(
    candidates: Vec<CandidatePick>,
    top_n: usize,
) -> (Vec<CandidatePick>, Vec<CandidatePick>, RankingPolicy) {
    let mut ranked = candidates;
    ranked.sort_by(|a, b| b.ev_per_unit.total_cmp(&a.ev_per_unit));

    let policy = if ranked.iter().any(|c| c.edge > 0.0) {
        RankingPolicy::ByEdge
    } else {
        RankingPolicy::ByExpectedValue
    };

    let top = match policy {
        RankingPolicy::ByEdge => {
            // `ranked` is a stable sort of the input, so full ties keep input order.
            let mut by_edge = ranked.clone();
            by_edge.sort_by(|a, b| {
                b.edge
                    .total_cmp(&a.edge)
                    .then_with(|| b.ev_per_unit.total_cmp(&a.ev_per_unit))
            });
            by_edge.truncate(top_n);
            by_edge
        }
        RankingPolicy::ByExpectedValue => ranked.iter().take(top_n).cloned().collect(),
    };

    (top, ranked, policy)
}

// ---------------------------------------------------------------------------
// Ranker
// ---------------------------------------------------------------------------

/// Composes probability estimation, best-price selection and edge/Kelly
/// assessment into ranked picks for one event at a time.
///
/// Holds configuration only; every call is independent.
pub struct PickRanker<S = StrengthTable> {
    estimator: ProbabilityEstimator<S>,
    selector: BestPriceSelector,
    calculator: EdgeCalculator,
    ranking: RankingConfig,
}

impl PickRanker<StrengthTable> {
    /// Ranker using the built-in strength table plus config overrides.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_strength(config, StrengthTable::from_config(config))
    }
}

impl Default for PickRanker<StrengthTable> {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl<S: StrengthSource> PickRanker<S> {
    pub fn new(
        estimator: ProbabilityEstimator<S>,
        selector: BestPriceSelector,
        calculator: EdgeCalculator,
        ranking: RankingConfig,
    ) -> Self {
        Self {
            estimator,
            selector,
            calculator,
            ranking,
        }
    }

    /// Ranker with a custom strength source.
    pub fn with_strength(config: &EngineConfig, strength: S) -> Self {
        Self::new(
            ProbabilityEstimator::new(config, strength),
            BestPriceSelector::new(config.selection.clone()),
            EdgeCalculator::new(KellyCalculator::new(config.kelly)),
            config.ranking,
        )
    }

    pub fn estimator(&self) -> &ProbabilityEstimator<S> {
        &self.estimator
    }

    pub fn selector(&self) -> &BestPriceSelector {
        &self.selector
    }

    /// Rank every supported pick on an event.
    pub fn suggest_picks(&self, event: &Event) -> RankingResult {
        self.rank_event(event, None)
    }

    /// Like [`Self::suggest_picks`], ignoring snapshots older than the
    /// configured maximum quote age relative to `now`.
    pub fn suggest_picks_at(&self, event: &Event, now: DateTime<Utc>) -> RankingResult {
        self.rank_event(event, Some(now))
    }

    /// The event restricted to the configured bookmaker allowlist.
    fn allowed<'a>(&self, event: &'a Event) -> Cow<'a, Event> {
        let selection = self.selector.config();
        if selection.books.is_none() {
            return Cow::Borrowed(event);
        }
        Cow::Owned(event.filter_snapshots(|s| selection.allows_book(s.book_id())))
    }

    fn rank_event(&self, event: &Event, now: Option<DateTime<Utc>>) -> RankingResult {
        let allowed = self.allowed(event);
        let event: &Event = &allowed;
        let mut candidates: Vec<CandidatePick> = Vec::new();
        let mut skipped: Vec<SkippedCandidate> = Vec::new();
        let moneyline = posted_moneyline(event);

        for &market in MarketType::ALL {
            let selections: Vec<Selection> = if market.uses_line() {
                let Some(line) = event.posted_line(market) else {
                    for side in market.sides() {
                        let selection = Selection::side_only(side);
                        skip(&mut skipped, market, selection, SkipReason::NoLinePosted);
                    }
                    continue;
                };
                market
                    .sides()
                    .into_iter()
                    .map(|side| Selection::new(side, Some(side_line(market, side, line))))
                    .collect()
            } else {
                market.sides().into_iter().map(Selection::side_only).collect()
            };

            for selection in selections {
                let Some(best) = self.selector.for_selection(event, market, &selection, now) else {
                    skip(&mut skipped, market, selection, SkipReason::NoPrice);
                    continue;
                };
                let p_model = self
                    .estimator
                    .for_selection(event, market, &selection, moneyline);
                match self.calculator.assess(p_model, best.price) {
                    Some(a) => candidates.push(make_candidate(market, selection, &best, a)),
                    None => skip(&mut skipped, market, selection, SkipReason::NoProbability),
                }
            }
        }

        let priced = candidates.len();
        let (top, ranked, policy) = rank_candidates(candidates, self.ranking.top_n);

        info!(
            event = %event,
            priced,
            skipped = skipped.len(),
            policy = %policy,
            best = top.first().map(|c| c.to_string()).unwrap_or_default(),
            "Ranking complete"
        );

        RankingResult {
            top,
            ranked,
            skipped,
        }
    }

    /// Evaluate one wager at a given price.
    ///
    /// Moneyline probabilities use the latest pair of moneyline prices on
    /// the event; spreads use the selection's own line; totals use the
    /// even-split placeholder. Missing inputs leave the model-dependent
    /// fields `None` and say why in `reason`.
    pub fn evaluate_pick(
        &self,
        market: MarketType,
        event: &Event,
        selection: &Selection,
        price: i32,
    ) -> PickEvaluation {
        let allowed = self.allowed(event);
        let event: &Event = &allowed;
        let moneyline = posted_moneyline(event);
        let p_model = if market.accepts(selection.side) {
            self.estimator
                .for_selection(event, market, selection, moneyline)
        } else {
            None
        };
        let assessment = self.calculator.assess(p_model, price);
        let headline = format!("{market} {selection} at {price:+}");

        let reason = match &assessment {
            Some(a) => {
                let fair = prob_to_american(a.p_model)
                    .map(|o| format!("{o:+}"))
                    .unwrap_or_else(|| "n/a".to_string());
                let probs = format!(
                    "model {:.1}% vs market {:.1}%",
                    a.p_model * 100.0,
                    a.implied_prob * 100.0,
                );
                let sizing = format!(
                    "edge {:+.1} pts, EV {:+.2} per 100, stake {:.2}% of bankroll",
                    a.edge * 100.0,
                    a.ev_per_100,
                    a.kelly_fraction * 100.0,
                );
                let basis = self.model_basis(event, market, moneyline);
                format!("{headline}: {probs} ({sizing}); fair price {fair}; {basis}")
            }
            None => format!(
                "{headline}: insufficient data ({})",
                missing_input(market, selection, moneyline)
            ),
        };

        debug!(
            event = %event,
            %market,
            %selection,
            price,
            p_model = ?p_model,
            "Pick evaluated"
        );

        PickEvaluation {
            p_model,
            implied_prob: implied_prob(price),
            edge: assessment.map(|a| a.edge),
            ev: assessment.map(|a| a.ev_per_unit),
            ev_per_100: assessment.map(|a| a.ev_per_100),
            kelly: assessment.map(|a| a.kelly_fraction),
            reason,
        }
    }

    /// One-line description of where the model probability came from.
    fn model_basis(
        &self,
        event: &Event,
        market: MarketType,
        moneyline: (Option<i32>, Option<i32>),
    ) -> String {
        match market {
            MarketType::Moneyline => self
                .estimator
                .moneyline_breakdown(
                    event.sport(),
                    event.home_id(),
                    event.away_id(),
                    moneyline.0,
                    moneyline.1,
                )
                .map(|b| {
                    format!(
                        "home: vig-free market {:.1}%, strength prior {:.1}%, market weight {:.2}",
                        b.p_home_fair * 100.0,
                        b.prior_home * 100.0,
                        b.market_weight,
                    )
                })
                .unwrap_or_default(),
            MarketType::Spread => format!(
                "margin modeled as Normal(0, {})",
                self.estimator.calibration_for(event.sport()).spread_sigma
            ),
            MarketType::Total => "totals use an even 50/50 split".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Latest moneyline pair on the event: prices from the most recently
/// observed snapshot quoting both sides.
fn posted_moneyline(event: &Event) -> (Option<i32>, Option<i32>) {
    let mut latest: Option<(DateTime<Utc>, i32, i32)> = None;
    for snapshot in event.snapshots() {
        let mut home = None;
        let mut away = None;
        for quote in event.quotes(snapshot, MarketType::Moneyline) {
            match quote.side() {
                Side::Home => home = home.or(Some(quote.price())),
                Side::Away => away = away.or(Some(quote.price())),
                _ => {}
            }
        }
        let (Some(h), Some(a)) = (home, away) else { continue };
        match latest {
            Some((seen, _, _)) if snapshot.observed_at() <= seen => {}
            _ => latest = Some((snapshot.observed_at(), h, a)),
        }
    }
    match latest {
        Some((_, h, a)) => (Some(h), Some(a)),
        None => (None, None),
    }
}

/// A side's own line given the market's posted line: the away spread is
/// the negated home spread; both total sides share the line.
fn side_line(market: MarketType, side: Side, posted: f64) -> f64 {
    match (market, side) {
        (MarketType::Spread, Side::Away) => -posted,
        _ => posted,
    }
}

fn missing_input(
    market: MarketType,
    selection: &Selection,
    moneyline: (Option<i32>, Option<i32>),
) -> String {
    if !market.accepts(selection.side) {
        return format!("{} is not a {market} outcome", selection.side);
    }
    match market {
        MarketType::Moneyline => match moneyline {
            (None, None) => "no moneyline prices posted".to_string(),
            (None, _) => "home moneyline price missing".to_string(),
            _ => "away moneyline price missing".to_string(),
        },
        MarketType::Spread | MarketType::Total => format!("no {market} line on the selection"),
    }
}

fn skip(
    skipped: &mut Vec<SkippedCandidate>,
    market_type: MarketType,
    selection: Selection,
    reason: SkipReason,
) {
    debug!(%market_type, %selection, %reason, "Candidate skipped");
    skipped.push(SkippedCandidate {
        market_type,
        selection,
        reason,
    });
}

fn make_candidate(
    market_type: MarketType,
    selection: Selection,
    best: &BestPrice,
    a: edge::PriceAssessment,
) -> CandidatePick {
    CandidatePick {
        market_type,
        selection,
        price: best.price,
        p_model: a.p_model,
        implied_prob: a.implied_prob,
        edge: a.edge,
        ev_per_unit: a.ev_per_unit,
        ev_per_100: a.ev_per_100,
        kelly_fraction: a.kelly_fraction,
        source_book: best.book_id.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
