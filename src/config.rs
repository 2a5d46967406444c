//! Engine configuration.
//!
//! Per-sport calibration tables, Kelly sizing, ranking and line-matching
//! settings. Every value ships with a built-in default; a TOML file only
//! needs to name what it overrides. Sport keys are case-insensitive.

use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use tracing::debug;

use crate::engine::best_price::SelectionConfig;
use crate::strategy::kelly::KellyConfig;
use crate::strategy::RankingConfig;
use crate::types::EngineError;

// ---------------------------------------------------------------------------
// Sport calibration
// ---------------------------------------------------------------------------

/// Tunable constants for one sport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SportCalibration {
    /// Standard deviation of the final home-minus-away margin.
    pub spread_sigma: f64,
    /// Logistic slope mapping strength delta to a prior win probability.
    pub strength_slope: f64,
    /// Weight on the vig-free market probability vs the strength prior.
    pub market_weight: f64,
}

impl SportCalibration {
    pub const fn new(spread_sigma: f64, strength_slope: f64, market_weight: f64) -> Self {
        Self {
            spread_sigma,
            strength_slope,
            market_weight,
        }
    }
}

impl Default for SportCalibration {
    fn default() -> Self {
        Self::new(12.0, 2.0, 0.9)
    }
}

/// Built-in calibration as (sport, sigma, slope, weight).
const BUILTIN_CALIBRATION: &[(&str, f64, f64, f64)] = &[
    ("nfl", 13.0, 3.0, 0.85),
    ("nba", 12.0, 2.5, 0.88),
    ("mlb", 3.0, 1.5, 0.90), // runs
    ("nhl", 1.8, 1.5, 0.90),
    ("cfb", 16.0, 3.0, 0.80),
    ("soccer", 1.5, 1.2, 0.92),
    ("golf", 5.0, 0.5, 0.95),
];

/// Partial calibration as written in a config file.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CalibrationOverride {
    spread_sigma: Option<f64>,
    strength_slope: Option<f64>,
    market_weight: Option<f64>,
}

impl CalibrationOverride {
    fn apply(&self, base: SportCalibration) -> SportCalibration {
        SportCalibration {
            spread_sigma: self.spread_sigma.unwrap_or(base.spread_sigma),
            strength_slope: self.strength_slope.unwrap_or(base.strength_slope),
            market_weight: self.market_weight.unwrap_or(base.market_weight),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level configuration
// ---------------------------------------------------------------------------

/// Everything the engine reads at construction time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineConfig {
    /// Used for any sport missing from `sports`.
    pub default_calibration: SportCalibration,
    /// Keyed by lowercase sport code.
    pub sports: HashMap<String, SportCalibration>,
    pub kelly: KellyConfig,
    pub ranking: RankingConfig,
    pub selection: SelectionConfig,
    /// Strength entries layered over the built-in table, keyed by sport then
    /// competitor name.
    pub strength: HashMap<String, HashMap<String, f64>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let sports = BUILTIN_CALIBRATION
            .iter()
            .map(|&(sport, sigma, slope, weight)| {
                (sport.to_string(), SportCalibration::new(sigma, slope, weight))
            })
            .collect();
        Self {
            default_calibration: SportCalibration::default(),
            sports,
            kelly: KellyConfig::default(),
            ranking: RankingConfig::default(),
            selection: SelectionConfig::default(),
            strength: HashMap::new(),
        }
    }
}

/// On-disk shape: every section optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    default_calibration: CalibrationOverride,
    sports: HashMap<String, CalibrationOverride>,
    kelly: Option<KellyConfig>,
    ranking: Option<RankingConfig>,
    selection: Option<SelectionConfig>,
    strength: HashMap<String, HashMap<String, f64>>,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to load config file: {path}"))
    }

    /// Parse TOML, layer it over the defaults, and validate the result.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).context("Failed to parse config TOML")?;
        let config = Self::default().merged(file);
        config.validate()?;
        debug!(
            sports = config.sports.len(),
            kelly_multiplier = config.kelly.multiplier,
            kelly_cap = config.kelly.cap,
            top_n = config.ranking.top_n,
            "Engine config loaded"
        );
        Ok(config)
    }

    fn merged(mut self, file: ConfigFile) -> Self {
        self.default_calibration = file.default_calibration.apply(self.default_calibration);
        for (sport, over) in file.sports {
            let key = sport.trim().to_lowercase();
            let base = self
                .sports
                .get(&key)
                .copied()
                .unwrap_or(self.default_calibration);
            self.sports.insert(key, over.apply(base));
        }
        if let Some(kelly) = file.kelly {
            self.kelly = kelly;
        }
        if let Some(ranking) = file.ranking {
            self.ranking = ranking;
        }
        if let Some(selection) = file.selection {
            self.selection = selection;
        }
        for (sport, entries) in file.strength {
            self.strength
                .entry(sport.trim().to_lowercase())
                .or_default()
                .extend(entries);
        }
        self
    }

    /// Calibration for a sport, falling back to `default_calibration`.
    pub fn calibration_for(&self, sport: &str) -> SportCalibration {
        self.sports
            .get(&sport.trim().to_lowercase())
            .copied()
            .unwrap_or(self.default_calibration)
    }

    /// Check every tunable is inside its meaningful range.
    pub fn validate(&self) -> Result<(), EngineError> {
        let tables = std::iter::once(("default", &self.default_calibration))
            .chain(self.sports.iter().map(|(k, v)| (k.as_str(), v)));
        for (sport, cal) in tables {
            if !(cal.spread_sigma.is_finite() && cal.spread_sigma > 0.0) {
                return Err(EngineError::Config(format!(
                    "{sport}: spread_sigma must be positive, got {}",
                    cal.spread_sigma
                )));
            }
            if !cal.strength_slope.is_finite() {
                return Err(EngineError::Config(format!(
                    "{sport}: strength_slope must be finite"
                )));
            }
            if !(0.0..=1.0).contains(&cal.market_weight) {
                return Err(EngineError::Config(format!(
                    "{sport}: market_weight must be in [0, 1], got {}",
                    cal.market_weight
                )));
            }
        }

        if !(self.kelly.multiplier.is_finite() && self.kelly.multiplier >= 0.0) {
            return Err(EngineError::Config(format!(
                "kelly.multiplier must be non-negative, got {}",
                self.kelly.multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.kelly.cap) {
            return Err(EngineError::Config(format!(
                "kelly.cap must be in [0, 1], got {}",
                self.kelly.cap
            )));
        }
        if self.ranking.top_n == 0 {
            return Err(EngineError::Config("ranking.top_n must be at least 1".into()));
        }
        if !(self.selection.line_epsilon.is_finite() && self.selection.line_epsilon > 0.0) {
            return Err(EngineError::Config(format!(
                "selection.line_epsilon must be positive, got {}",
                self.selection.line_epsilon
            )));
        }
        if let Some(age) = self.selection.max_quote_age_secs {
            if age < 0 {
                return Err(EngineError::Config(
                    "selection.max_quote_age_secs must not be negative".into(),
                ));
            }
            if Duration::try_seconds(age).is_none() {
                return Err(EngineError::Config(format!(
                    "selection.max_quote_age_secs is out of range, got {age}"
                )));
            }
        }
        if matches!(&self.selection.books, Some(books) if books.is_empty()) {
            return Err(EngineError::Config(
                "selection.books must name at least one bookmaker".into(),
            ));
        }
        for (sport, entries) in &self.strength {
            if let Some((name, value)) = entries.iter().find(|(_, v)| !(0.0..=1.0).contains(*v)) {
                return Err(EngineError::Config(format!(
                    "strength.{sport}.{name} must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}
