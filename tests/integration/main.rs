//! End-to-end tests driving the public engine API.

mod common;
mod pricing_properties;
mod ranking;
