//! # Equilens Beta Estimation
//!
//! Resolves the systematic-risk coefficient (beta) of an instrument against a market
//! index through an ordered fallback chain.
//!
//! ## Architectural Principles
//!
//! - **Pluggable Tiers:** Each way of obtaining a beta implements the `BetaTier` trait.
//!   The `BetaEstimator` walks its tiers in order and stops at the first plausible value.
//! - **Total Function:** Estimation never fails. When no tier applies, the result is the
//!   market-neutral beta of 1.0 tagged with `BetaSource::MarketNeutral`.
//! - **Immutable Reference Data:** Static betas and sector tables are loaded once,
//!   validated, and shared read-only between tiers.
//!
//! ## Public API
//!
//! - `BetaEstimator`: the fallback chain.
//! - `BetaTier`: the seam for individual tiers (`DirectEstimation`, `StaticLookup`,
//!   `SectorAverage`).
//! - `BetaResult` / `BetaSource`: the value and its provenance.
//! - `ReferenceData` / `normalize_ticker`: the static tables and their key convention.

pub mod error;
pub mod estimator;
pub mod reference;
pub mod tiers;

pub use error::RiskError;
pub use estimator::{
    BetaEstimator, BetaInputs, BetaResult, BetaSource, MARKET_NEUTRAL_BETA, TierOutcome,
    TierRejection,
};
pub use reference::{ReferenceData, normalize_ticker};
pub use tiers::{DirectEstimation, SectorAverage, StaticLookup};

/// One step of the beta fallback chain.
pub trait BetaTier: Send + Sync {
    /// The provenance recorded when this tier supplies the beta.
    fn source(&self) -> BetaSource;

    /// Attempts to produce a beta from whatever inputs are present.
    fn estimate(&self, inputs: &BetaInputs<'_>) -> TierOutcome;
}
