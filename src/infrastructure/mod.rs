//! Infrastructure layer - concrete implementations of the domain contracts

pub mod cache;
pub mod dataset;
pub mod evaluators;
pub mod logging;
pub mod metrics;
pub mod provider;
pub mod runner;
