//! Static competitor strength table.
//!
//! A simple prior: a hand-maintained rating in [0, 1] per
//! competitor, keyed by sport. Anything not in the table rates 0.5 so the
//! prior carries no information rather than failing.
//!
//! Built-in ratings cover NFL, NBA and MLB; configuration can add sports or
//! override individual entries.

use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::trace;

use super::StrengthSource;
use crate::config::EngineConfig;
use crate::types::normalize_competitor;

/// Rating used for unknown sports and competitors.
pub const NEUTRAL_STRENGTH: f64 = 0.5;

const NFL: &[(&str, f64)] = &[
    ("kansas city chiefs", 0.8), ("buffalo bills", 0.7), ("dallas cowboys", 0.6),
    ("philadelphia eagles", 0.6), ("miami dolphins", 0.5), ("tampa bay buccaneers", 0.5),
    ("green bay packers", 0.6), ("san francisco 49ers", 0.7), ("baltimore ravens", 0.6),
    ("cincinnati bengals", 0.5), ("los angeles rams", 0.5), ("denver broncos", 0.4),
    ("las vegas raiders", 0.3), ("new york jets", 0.2), ("new york giants", 0.2),
    ("chicago bears", 0.3), ("detroit lions", 0.4), ("minnesota vikings", 0.4),
    ("atlanta falcons", 0.3), ("carolina panthers", 0.2), ("new orleans saints", 0.4),
    ("houston texans", 0.3), ("indianapolis colts", 0.4), ("jacksonville jaguars", 0.3),
    ("tennessee titans", 0.4), ("arizona cardinals", 0.2), ("seattle seahawks", 0.4),
    ("los angeles chargers", 0.4), ("washington commanders", 0.2), ("pittsburgh steelers", 0.5),
    ("cleveland browns", 0.3), ("new england patriots", 0.3),
];

const NBA: &[(&str, f64)] = &[
    ("los angeles lakers", 0.7), ("boston celtics", 0.8), ("golden state warriors", 0.6),
    ("phoenix suns", 0.5), ("denver nuggets", 0.7), ("miami heat", 0.5),
    ("milwaukee bucks", 0.6), ("philadelphia 76ers", 0.5), ("brooklyn nets", 0.4),
    ("new york knicks", 0.4), ("chicago bulls", 0.3), ("cleveland cavaliers", 0.4),
    ("detroit pistons", 0.2), ("indiana pacers", 0.3), ("atlanta hawks", 0.3),
    ("charlotte hornets", 0.2), ("orlando magic", 0.3), ("washington wizards", 0.2),
    ("dallas mavericks", 0.5), ("houston rockets", 0.2), ("memphis grizzlies", 0.4),
    ("new orleans pelicans", 0.3), ("san antonio spurs", 0.2), ("oklahoma city thunder", 0.3),
    ("portland trail blazers", 0.3), ("utah jazz", 0.3), ("minnesota timberwolves", 0.3),
    ("sacramento kings", 0.3), ("los angeles clippers", 0.5),
];

const MLB: &[(&str, f64)] = &[
    ("new york yankees", 0.7), ("boston red sox", 0.5), ("tampa bay rays", 0.6),
    ("toronto blue jays", 0.4), ("baltimore orioles", 0.3), ("houston astros", 0.6),
    ("seattle mariners", 0.4), ("los angeles angels", 0.3), ("oakland athletics", 0.2),
    ("texas rangers", 0.4), ("atlanta braves", 0.6), ("philadelphia phillies", 0.5),
    ("new york mets", 0.4), ("miami marlins", 0.3), ("washington nationals", 0.2),
    ("chicago cubs", 0.4), ("milwaukee brewers", 0.5), ("st. louis cardinals", 0.5),
    ("pittsburgh pirates", 0.3), ("cincinnati reds", 0.3), ("los angeles dodgers", 0.7),
    ("san diego padres", 0.4), ("san francisco giants", 0.3), ("colorado rockies", 0.2),
    ("arizona diamondbacks", 0.3), ("cleveland guardians", 0.4), ("minnesota twins", 0.4),
    ("detroit tigers", 0.2), ("kansas city royals", 0.2), ("chicago white sox", 0.2),
];

/// Per-sport strength ratings.
#[derive(Debug, Clone, PartialEq)]
pub struct StrengthTable {
    /// sport -> normalized competitor name -> rating
    tables: HashMap<String, HashMap<String, f64>>,
}

impl Default for StrengthTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StrengthTable {
    /// A table with no ratings; every lookup is neutral.
    pub fn empty() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// The ratings that ship with the engine.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (sport, entries) in [("nfl", NFL), ("nba", NBA), ("mlb", MLB)] {
            for &(name, rating) in entries {
                table.insert(sport, name, rating);
            }
        }
        table
    }

    /// Built-in ratings with the config's `strength` overrides applied.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::builtin().with_overrides(&config.strength)
    }

    pub fn with_overrides(mut self, overrides: &HashMap<String, HashMap<String, f64>>) -> Self {
        for (sport, entries) in overrides {
            for (name, rating) in entries {
                self.insert(sport, name, *rating);
            }
        }
        self
    }

    /// Add or replace a rating. Values are clamped into [0, 1].
    pub fn insert(&mut self, sport: &str, competitor: &str, rating: f64) {
        let rating = if rating.is_nan() {
            NEUTRAL_STRENGTH
        } else {
            rating.clamp(0.0, 1.0)
        };
        self.tables
            .entry(sport.trim().to_lowercase())
            .or_default()
            .insert(normalize_competitor(competitor), rating);
    }

    /// Rating for a competitor; 0.5 when the sport or name is unknown.
    pub fn get_strength(&self, sport: &str, competitor: &str) -> f64 {
        let found = self
            .tables
            .get(&sport.trim().to_lowercase())
            .and_then(|t| t.get(&normalize_competitor(competitor)))
            .copied();
        if found.is_none() {
            trace!(sport, competitor, "Unrated competitor, using neutral strength");
        }
        found.unwrap_or(NEUTRAL_STRENGTH)
    }

    /// `strength(home) - strength(away)`, in [-1, 1].
    pub fn strength_delta(&self, sport: &str, home: &str, away: &str) -> f64 {
        self.get_strength(sport, home) - self.get_strength(sport, away)
    }

    /// Number of rated competitors across all sports.
    pub fn len(&self) -> usize {
        self.tables.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StrengthSource for StrengthTable {
    fn strength(&self, sport: &str, competitor: &str) -> f64 {
        self.get_strength(sport, competitor)
    }
}

fn builtin_table() -> &'static StrengthTable {
    static TABLE: OnceLock<StrengthTable> = OnceLock::new();
    TABLE.get_or_init(StrengthTable::builtin)
}

/// Rating from the built-in table.
pub fn get_strength(sport: &str, competitor: &str) -> f64 {
    builtin_table().get_strength(sport, competitor)
}

/// Home-minus-away rating difference from the built-in table.
pub fn strength_delta(sport: &str, home: &str, away: &str) -> f64 {
    builtin_table().strength_delta(sport, home, away)
}
