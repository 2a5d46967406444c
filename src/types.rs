//! Shared types for the EDGEBOOK engine.
//!
//! These types form the data model used across all modules. Records are
//! validated once at construction (including when deserialized), so the
//! pricing and ranking code can rely on their invariants without
//! re-checking at every call site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::pricing;

/// Default tolerance when comparing provider lines.
pub const LINE_EPSILON: f64 = 1e-6;

/// Whether two posted lines are the same line, absorbing float noise.
pub fn lines_match(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Normalize a competitor name for comparison and table lookup:
/// lowercase, trimmed, inner whitespace collapsed.
pub fn normalize_competitor(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Kind of two-outcome market a bookmaker quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Moneyline,
    Spread,
    Total,
}

impl MarketType {
    /// All supported markets, in candidate order.
    pub const ALL: &'static [MarketType] =
        &[MarketType::Moneyline, MarketType::Spread, MarketType::Total];

    /// The two legal sides of this market. The first is the reference side
    /// whose line is treated as the market's posted line.
    pub fn sides(&self) -> [Side; 2] {
        match self {
            MarketType::Moneyline | MarketType::Spread => [Side::Home, Side::Away],
            MarketType::Total => [Side::Over, Side::Under],
        }
    }

    pub fn accepts(&self, side: Side) -> bool {
        self.sides().contains(&side)
    }

    /// Whether quotes in this market are tied to a line.
    pub fn uses_line(&self) -> bool {
        !matches!(self, MarketType::Moneyline)
    }

    pub fn reference_side(&self) -> Side {
        self.sides()[0]
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketType::Moneyline => write!(f, "moneyline"),
            MarketType::Spread => write!(f, "spread"),
            MarketType::Total => write!(f, "total"),
        }
    }
}

/// Parse a market name (case-insensitive, common provider aliases accepted).
impl std::str::FromStr for MarketType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "moneyline" | "ml" | "h2h" => Ok(MarketType::Moneyline),
            "spread" | "spreads" | "ats" => Ok(MarketType::Spread),
            "total" | "totals" | "ou" | "over_under" => Ok(MarketType::Total),
            other => Err(EngineError::UnknownMarket(other.to_string())),
        }
    }
}

/// Outcome side within a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
    Over,
    Under,
}

impl Side {
    /// The other outcome of the same market.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
            Side::Over => Side::Under,
            Side::Under => Side::Over,
        }
    }

    /// The side as seen from a provider that listed the competitors in
    /// reverse order. Totals are unaffected.
    pub fn swapped(&self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
            Side::Over => Side::Over,
            Side::Under => Side::Under,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Home => write!(f, "home"),
            Side::Away => write!(f, "away"),
            Side::Over => write!(f, "over"),
            Side::Under => write!(f, "under"),
        }
    }
}

/// How a snapshot's competitors line up with its event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    AsListed,
    Swapped,
}

// ---------------------------------------------------------------------------
// Quotes and snapshots
// ---------------------------------------------------------------------------

/// A single bookmaker price for one side of a market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOutcomeQuote")]
pub struct OutcomeQuote {
    side: Side,
    line: Option<f64>,
    /// American odds, never zero.
    price: i32,
}

#[derive(Deserialize)]
struct RawOutcomeQuote {
    side: Side,
    #[serde(default)]
    line: Option<f64>,
    price: i32,
}

impl TryFrom<RawOutcomeQuote> for OutcomeQuote {
    type Error = EngineError;

    fn try_from(raw: RawOutcomeQuote) -> Result<Self, Self::Error> {
        OutcomeQuote::new(raw.side, raw.line, raw.price)
    }
}

impl OutcomeQuote {
    pub fn new(side: Side, line: Option<f64>, price: i32) -> Result<Self, EngineError> {
        if price == 0 {
            return Err(EngineError::ZeroPrice { side });
        }
        if matches!(line, Some(l) if !l.is_finite()) {
            return Err(EngineError::NonFiniteLine { side });
        }
        Ok(Self { side, line, price })
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn line(&self) -> Option<f64> {
        self.line
    }

    pub fn price(&self) -> i32 {
        self.price
    }

    pub fn decimal_odds(&self) -> f64 {
        pricing::american_to_decimal(self.price)
    }

    pub fn implied_prob(&self) -> f64 {
        pricing::implied_prob(self.price)
    }

    fn swapped(&self) -> Self {
        Self {
            side: self.side.swapped(),
            ..*self
        }
    }
}

impl fmt::Display for OutcomeQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} {} @ {:+}", self.side, line, self.price),
            None => write!(f, "{} @ {:+}", self.side, self.price),
        }
    }
}

/// Competitor order as a provider listed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedCompetitors {
    pub home: String,
    pub away: String,
}

/// Everything one bookmaker quoted for an event in one fetch cycle.
/// Immutable once captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawBookmakerSnapshot")]
pub struct BookmakerSnapshot {
    book_id: String,
    observed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    listed_as: Option<ListedCompetitors>,
    markets: BTreeMap<MarketType, Vec<OutcomeQuote>>,
}

#[derive(Deserialize)]
struct RawBookmakerSnapshot {
    book_id: String,
    observed_at: DateTime<Utc>,
    #[serde(default)]
    listed_as: Option<ListedCompetitors>,
    #[serde(default)]
    markets: BTreeMap<MarketType, Vec<OutcomeQuote>>,
}

impl TryFrom<RawBookmakerSnapshot> for BookmakerSnapshot {
    type Error = EngineError;

    fn try_from(raw: RawBookmakerSnapshot) -> Result<Self, Self::Error> {
        let snapshot = BookmakerSnapshot::new(raw.book_id, raw.observed_at, raw.markets)?;
        Ok(match raw.listed_as {
            Some(l) => snapshot.listed_as(l.home, l.away),
            None => snapshot,
        })
    }
}

impl BookmakerSnapshot {
    /// Build a snapshot, rejecting quotes on the wrong market, spread or
    /// total quotes without a line, and more than one quote per side per
    /// line. Lines count as the same within [`LINE_EPSILON`], independent
    /// of any configured matching tolerance.
    pub fn new(
        book_id: impl Into<String>,
        observed_at: DateTime<Utc>,
        markets: BTreeMap<MarketType, Vec<OutcomeQuote>>,
    ) -> Result<Self, EngineError> {
        let book_id = book_id.into();
        for (market, quotes) in &markets {
            validate_market(&book_id, *market, quotes)?;
        }
        Ok(Self {
            book_id,
            observed_at,
            listed_as: None,
            markets,
        })
    }

    /// Record the competitor order the provider used.
    pub fn listed_as(mut self, home: impl Into<String>, away: impl Into<String>) -> Self {
        self.listed_as = Some(ListedCompetitors {
            home: home.into(),
            away: away.into(),
        });
        self
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    pub fn listing(&self) -> Option<&ListedCompetitors> {
        self.listed_as.as_ref()
    }

    /// Quotes for a market exactly as the provider listed them.
    pub fn quotes(&self, market: MarketType) -> &[OutcomeQuote] {
        self.markets.get(&market).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn validate_market(
    book_id: &str,
    market: MarketType,
    quotes: &[OutcomeQuote],
) -> Result<(), EngineError> {
    for (i, quote) in quotes.iter().enumerate() {
        if !market.accepts(quote.side) {
            return Err(EngineError::SideNotInMarket {
                book_id: book_id.to_string(),
                market,
                side: quote.side,
            });
        }
        if market.uses_line() && quote.line.is_none() {
            return Err(EngineError::MissingLine {
                book_id: book_id.to_string(),
                market,
                side: quote.side,
            });
        }
        let duplicate = quotes[..i]
            .iter()
            .any(|earlier| earlier.side == quote.side && same_line(market, earlier, quote));
        if duplicate {
            return Err(EngineError::DuplicateQuote {
                book_id: book_id.to_string(),
                market,
                side: quote.side,
            });
        }
    }
    Ok(())
}

fn same_line(market: MarketType, a: &OutcomeQuote, b: &OutcomeQuote) -> bool {
    if !market.uses_line() {
        return true;
    }
    match (a.line, b.line) {
        (None, None) => true,
        (Some(x), Some(y)) => lines_match(x, y, LINE_EPSILON),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A scheduled matchup with every bookmaker snapshot captured for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawEvent")]
pub struct Event {
    home_id: String,
    away_id: String,
    sport: String,
    scheduled_at: DateTime<Utc>,
    bookmaker_snapshots: Vec<BookmakerSnapshot>,
}

#[derive(Deserialize)]
struct RawEvent {
    home_id: String,
    away_id: String,
    sport: String,
    scheduled_at: DateTime<Utc>,
    #[serde(default)]
    bookmaker_snapshots: Vec<BookmakerSnapshot>,
}

impl TryFrom<RawEvent> for Event {
    type Error = EngineError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        Event::new(
            raw.home_id,
            raw.away_id,
            &raw.sport,
            raw.scheduled_at,
            raw.bookmaker_snapshots,
        )
    }
}

impl Event {
    pub fn new(
        home_id: impl Into<String>,
        away_id: impl Into<String>,
        sport: &str,
        scheduled_at: DateTime<Utc>,
        bookmaker_snapshots: Vec<BookmakerSnapshot>,
    ) -> Result<Self, EngineError> {
        let home_id = home_id.into();
        let away_id = away_id.into();
        if normalize_competitor(&home_id) == normalize_competitor(&away_id) {
            return Err(EngineError::SameCompetitor(home_id));
        }
        Ok(Self {
            home_id,
            away_id,
            sport: sport.trim().to_lowercase(),
            scheduled_at,
            bookmaker_snapshots,
        })
    }

    pub fn home_id(&self) -> &str {
        &self.home_id
    }

    pub fn away_id(&self) -> &str {
        &self.away_id
    }

    /// Lowercase sport code.
    pub fn sport(&self) -> &str {
        &self.sport
    }

    pub fn scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }

    pub fn snapshots(&self) -> &[BookmakerSnapshot] {
        &self.bookmaker_snapshots
    }

    /// Whether a snapshot lists the competitors in this event's order.
    /// Snapshots without a listing are taken as already canonical.
    pub fn orientation(&self, snapshot: &BookmakerSnapshot) -> Orientation {
        match snapshot.listing() {
            Some(l)
                if normalize_competitor(&l.home) == normalize_competitor(&self.away_id)
                    && normalize_competitor(&l.away) == normalize_competitor(&self.home_id) =>
            {
                Orientation::Swapped
            }
            _ => Orientation::AsListed,
        }
    }

    /// A snapshot's quotes for a market, with sides mapped onto this
    /// event's home/away.
    pub fn quotes<'a>(
        &self,
        snapshot: &'a BookmakerSnapshot,
        market: MarketType,
    ) -> impl Iterator<Item = OutcomeQuote> + 'a {
        let swapped = self.orientation(snapshot) == Orientation::Swapped;
        snapshot
            .quotes(market)
            .iter()
            .map(move |q| if swapped { q.swapped() } else { *q })
    }

    /// A copy keeping only the snapshots `keep` accepts.
    pub fn filter_snapshots(&self, mut keep: impl FnMut(&BookmakerSnapshot) -> bool) -> Event {
        Event {
            home_id: self.home_id.clone(),
            away_id: self.away_id.clone(),
            sport: self.sport.clone(),
            scheduled_at: self.scheduled_at,
            bookmaker_snapshots: self
                .bookmaker_snapshots
                .iter()
                .filter(|s| keep(s))
                .cloned()
                .collect(),
        }
    }

    /// The market's posted line: the home spread or the total, taken from
    /// the most recently observed snapshot that carries one. Within a
    /// snapshot the first listed line is the main line.
    pub fn posted_line(&self, market: MarketType) -> Option<f64> {
        if !market.uses_line() {
            return None;
        }
        let reference = market.reference_side();
        let mut latest: Option<(DateTime<Utc>, f64)> = None;

        for snapshot in &self.bookmaker_snapshots {
            let line = self
                .quotes(snapshot, market)
                .filter(|q| q.side() == reference)
                .find_map(|q| q.line());
            let Some(line) = line else { continue };
            match latest {
                Some((seen, _)) if snapshot.observed_at() <= seen => {}
                _ => latest = Some((snapshot.observed_at(), line)),
            }
        }

        latest.map(|(_, line)| line)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} @ {} ({}, {} books)",
            self.sport,
            self.away_id,
            self.home_id,
            self.scheduled_at.format("%Y-%m-%d %H:%M UTC"),
            self.bookmaker_snapshots.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// Selections and estimates
// ---------------------------------------------------------------------------

/// The outcome a wager is on. `line` is the selected side's own line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub side: Side,
    #[serde(default)]
    pub line: Option<f64>,
}

impl Selection {
    pub fn new(side: Side, line: Option<f64>) -> Self {
        Self { side, line }
    }

    pub fn side_only(side: Side) -> Self {
        Self { side, line: None }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.side, self.line) {
            (Side::Home | Side::Away, Some(line)) => write!(f, "{} {:+}", self.side, line),
            (_, Some(line)) => write!(f, "{} {}", self.side, line),
            (_, None) => write!(f, "{}", self.side),
        }
    }
}

/// Model probabilities for both sides of one market, in `MarketType::sides`
/// order. Either both are present and sum to 1, or both are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityEstimate {
    pub market: MarketType,
    pub first: Option<f64>,
    pub second: Option<f64>,
}

impl ProbabilityEstimate {
    pub fn unavailable(market: MarketType) -> Self {
        Self {
            market,
            first: None,
            second: None,
        }
    }

    pub(crate) fn two_way(market: MarketType, first: f64) -> Self {
        Self {
            market,
            first: Some(first),
            second: Some(1.0 - first),
        }
    }

    pub fn for_side(&self, side: Side) -> Option<f64> {
        let [first, second] = self.market.sides();
        if side == first {
            self.first
        } else if side == second {
            self.second
        } else {
            None
        }
    }

    pub fn is_available(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }
}

// ---------------------------------------------------------------------------
// Picks and ranking output
// ---------------------------------------------------------------------------

/// A fully priced wager candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePick {
    pub market_type: MarketType,
    pub selection: Selection,
    /// Best available American price across books.
    pub price: i32,
    pub p_model: f64,
    pub implied_prob: f64,
    /// `p_model - implied_prob`
    pub edge: f64,
    /// Expected profit per unit staked.
    pub ev_per_unit: f64,
    pub ev_per_100: f64,
    /// Recommended bankroll fraction after fractional Kelly and cap.
    pub kelly_fraction: f64,
    pub source_book: String,
}

impl fmt::Display for CandidatePick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} @ {:+} ({}) p={:.1}% edge={:+.1}% EV/100={:+.2} kelly={:.2}%",
            self.market_type,
            self.selection,
            self.price,
            self.source_book,
            self.p_model * 100.0,
            self.edge * 100.0,
            self.ev_per_100,
            self.kelly_fraction * 100.0,
        )
    }
}

/// Why a candidate never made it into the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No bookmaker posted a line for a spread/total market.
    NoLinePosted,
    /// No bookmaker quoted the selection at the required line.
    NoPrice,
    /// The estimator had insufficient inputs.
    NoProbability,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoLinePosted => write!(f, "no line posted"),
            SkipReason::NoPrice => write!(f, "no price quoted"),
            SkipReason::NoProbability => write!(f, "insufficient data for a model probability"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub market_type: MarketType,
    pub selection: Selection,
    pub reason: SkipReason,
}

/// Output of a ranking pass over one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    /// Best picks under the ranking policy (at most `top_n`).
    pub top: Vec<CandidatePick>,
    /// Every priced candidate, by EV per unit descending.
    pub ranked: Vec<CandidatePick>,
    /// Candidates excluded for missing inputs.
    pub skipped: Vec<SkippedCandidate>,
}

impl RankingResult {
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Single-pick evaluation for a UI/API layer. Fields that need a model
/// probability are `None` when it could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickEvaluation {
    pub p_model: Option<f64>,
    pub implied_prob: f64,
    pub edge: Option<f64>,
    /// Expected profit per unit staked.
    pub ev: Option<f64>,
    pub ev_per_100: Option<f64>,
    pub kelly: Option<f64>,
    /// Human-readable summary; not used for logic.
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for EDGEBOOK.
///
/// Only construction and configuration can fail; pricing never does.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("American price of 0 is not a valid quote ({side})")]
    ZeroPrice { side: Side },

    #[error("Line must be finite ({side})")]
    NonFiniteLine { side: Side },

    #[error("Side {side} does not belong to the {market} market (book {book_id})")]
    SideNotInMarket {
        book_id: String,
        market: MarketType,
        side: Side,
    },

    #[error("{market} quote for {side} has no line (book {book_id})")]
    MissingLine {
        book_id: String,
        market: MarketType,
        side: Side,
    },

    #[error("Duplicate {side} quote on one {market} line (book {book_id})")]
    DuplicateQuote {
        book_id: String,
        market: MarketType,
        side: Side,
    },

    #[error("Home and away are the same competitor: {0}")]
    SameCompetitor(String),

    #[error("Unknown market type: {0}")]
    UnknownMarket(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
