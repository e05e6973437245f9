//! # Equilens Risk Analytics
//!
//! This crate turns price histories into risk metrics. It is the quantitative core of
//! the system: volatility, tail risk, risk-adjusted return, drawdown path analysis and
//! cross-instrument correlation.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate with no I/O. It depends on
//!   `core-types` for its inputs and on `risk` for the beta fallback chain.
//! - **Total Functions:** No metric returns an error. Inputs that are too short or
//!   numerically degenerate yield a documented default (0.0, the VaR sentinel, or
//!   `RiskProfile::default_profile()`), so consumers never branch on missing data.
//! - **Stateless Calculation:** The `RiskMetricsEngine` holds configuration only and
//!   can be shared freely between threads.
//!
//! ## Public API
//!
//! - `RiskMetricsEngine`: all metric calculations, including `all_risk_metrics`.
//! - `RiskProfile`: the flat, serialisable per-instrument result.
//! - `DrawdownReport`, `CorrelationMatrix`: results of the path and cross-section metrics.
//! - `RiskAssessment`: a structured reading of a profile (sensitivity, volatility, flags).
//! - `stats`: the descriptive statistics the engine is built on.

// Declare the modules that constitute this crate.
pub mod assessment;
pub mod engine;
pub mod error;
pub mod report;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use assessment::{BetaSensitivity, RiskAssessment, RiskFlag, SharpeQuality, VolatilityLevel};
pub use engine::{RiskMetricsEngine, VAR_SENTINEL};
pub use error::AnalyticsError;
pub use report::{CorrelationMatrix, DrawdownReport, RiskProfile};
