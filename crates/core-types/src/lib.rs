//! # Equilens Core Types
//!
//! Layer 0 of the workspace: the plain data contracts shared by every other crate.
//!
//! ## Public API
//!
//! - `PriceSeries` / `PricePoint`: validated, time-ordered closing prices.
//! - `ReturnsSeries`, `ReturnsCalculator`, `AlignedReturnsPair`: derived return series.
//! - `Fundamentals`: the optional flat mapping of fundamental ratios.
//! - `ReturnMethod`, `VarMethod`, `Lens`, `Signal`: shared enums.
//! - `CoreError`: raised only for malformed price input.

pub mod enums;
pub mod error;
pub mod fundamentals;
pub mod returns;
pub mod series;

// Re-export the core types to provide a clean public API.
pub use enums::{Lens, ReturnMethod, Signal, VarMethod};
pub use error::CoreError;
pub use fundamentals::Fundamentals;
pub use returns::{AlignedReturnsPair, ReturnsCalculator, ReturnsSeries};
pub use series::{PricePoint, PriceSeries};
