//! EDGEBOOK: sports betting pricing and pick-ranking engine.
//!
//! Pure, synchronous library: odds conversion and vig removal, model
//! probabilities, best-price line shopping, edge/EV/Kelly assessment and
//! ranking. Fetching odds and persisting picks belong to the host.

pub mod config;
pub mod data;
pub mod engine;
pub mod logging;
pub mod pricing;
pub mod strategy;
pub mod types;

pub use config::EngineConfig;
pub use strategy::PickRanker;
pub use types::{
    CandidatePick, EngineError, Event, MarketType, PickEvaluation, RankingResult, Selection, Side,
};
