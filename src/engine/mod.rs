//! Pricing engine: model probabilities and best available prices.

pub mod best_price;
pub mod estimator;

pub use best_price::{BestPrice, BestPriceSelector, SelectionConfig};
pub use estimator::ProbabilityEstimator;
