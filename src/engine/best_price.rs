//! Best available price across bookmakers.
//!
//! Scans every snapshot of an event for a side (and, for spreads and totals,
//! an exact line) and keeps the quote with the highest decimal payout.
//! American odds are never compared directly: their ordering flips sign at
//! even money.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::types::{lines_match, Event, MarketType, Selection, Side, LINE_EPSILON};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Line matching, quote freshness and bookmaker filter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    /// Two lines are the same when they differ by less than this.
    ///
    /// Only line shopping uses it. Snapshot construction rejects duplicate
    /// quotes with the fixed [`LINE_EPSILON`], so with a wider tolerance two
    /// quotes a snapshot accepted as distinct lines may both match here.
    pub line_epsilon: f64,
    /// Ignore snapshots older than this many seconds, when the caller
    /// supplies a reference time.
    pub max_quote_age_secs: Option<i64>,
    /// Only consider these bookmakers (case-insensitive). `None` uses all.
    pub books: Option<Vec<String>>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            line_epsilon: LINE_EPSILON,
            max_quote_age_secs: None,
            books: None,
        }
    }
}

impl SelectionConfig {
    /// Whether a bookmaker passes the allowlist.
    pub fn allows_book(&self, book_id: &str) -> bool {
        match &self.books {
            Some(books) => books.iter().any(|b| b.trim().eq_ignore_ascii_case(book_id.trim())),
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

/// The winning quote for one outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPrice {
    pub price: i32,
    pub decimal_odds: f64,
    pub book_id: String,
    pub observed_at: DateTime<Utc>,
}

pub struct BestPriceSelector {
    config: SelectionConfig,
}

impl BestPriceSelector {
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Highest-payout quote for `side` at `line` across the event's books.
    ///
    /// Moneyline ignores `line`. Spread and total need a target line and
    /// only accept quotes at that exact line; there is no interpolation.
    /// Equal payouts keep the first book seen. Books outside the configured
    /// allowlist are ignored. `now` enables the staleness filter; without it
    /// every snapshot is considered.
    pub fn best_price(
        &self,
        event: &Event,
        market: MarketType,
        side: Side,
        line: Option<f64>,
        now: Option<DateTime<Utc>>,
    ) -> Option<BestPrice> {
        if market.uses_line() && line.is_none() {
            trace!(%market, %side, "No target line, nothing to match");
            return None;
        }

        let mut best: Option<BestPrice> = None;

        for snapshot in event.snapshots() {
            if !self.config.allows_book(snapshot.book_id()) {
                continue;
            }
            if !self.is_fresh(snapshot.observed_at(), now) {
                debug!(
                    book_id = snapshot.book_id(),
                    observed_at = %snapshot.observed_at(),
                    "Skipping stale snapshot"
                );
                continue;
            }

            for quote in event.quotes(snapshot, market) {
                if quote.side() != side || !self.line_matches(market, line, quote.line()) {
                    continue;
                }
                let decimal_odds = quote.decimal_odds();
                let better = best
                    .as_ref()
                    .map_or(true, |b| decimal_odds > b.decimal_odds);
                if better {
                    best = Some(BestPrice {
                        price: quote.price(),
                        decimal_odds,
                        book_id: snapshot.book_id().to_string(),
                        observed_at: snapshot.observed_at(),
                    });
                }
            }
        }

        if let Some(b) = &best {
            trace!(%market, %side, price = b.price, book_id = %b.book_id, "Best price");
        }
        best
    }

    /// [`Self::best_price`] for a selection.
    pub fn for_selection(
        &self,
        event: &Event,
        market: MarketType,
        selection: &Selection,
        now: Option<DateTime<Utc>>,
    ) -> Option<BestPrice> {
        self.best_price(event, market, selection.side, selection.line, now)
    }

    fn line_matches(&self, market: MarketType, target: Option<f64>, quoted: Option<f64>) -> bool {
        if !market.uses_line() {
            return true;
        }
        match (target, quoted) {
            (Some(t), Some(q)) => lines_match(t, q, self.config.line_epsilon),
            _ => false,
        }
    }

    /// An age too large for `Duration` never expires.
    fn is_fresh(&self, observed_at: DateTime<Utc>, now: Option<DateTime<Utc>>) -> bool {
        let (Some(now), Some(max_age)) = (now, self.config.max_quote_age_secs) else {
            return true;
        };
        match Duration::try_seconds(max_age) {
            Some(max_age) => now - observed_at <= max_age,
            None => true,
        }
    }
}

impl Default for BestPriceSelector {
    fn default() -> Self {
        Self::new(SelectionConfig::default())
    }
}
