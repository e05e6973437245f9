use serde::{Deserialize, Serialize};
use std::fmt;

/// How period-over-period returns are derived from prices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnMethod {
    /// `p_t / p_{t-1} - 1`
    #[default]
    Simple,
    /// `ln(p_t / p_{t-1})`
    Log,
}

/// The estimator used for Value-at-Risk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarMethod {
    /// Empirical quantile of the observed returns.
    #[default]
    Historical,
    /// Normal approximation: `mean + z * std`.
    Parametric,
    /// Normal approximation corrected for skewness and excess kurtosis.
    CornishFisher,
}

/// One of the five evaluation dimensions of the scoring framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lens {
    Valuation,
    Quality,
    Growth,
    FinancialHealth,
    RiskMomentum,
}

impl Lens {
    /// All lenses in their canonical order.
    pub const ALL: [Lens; 5] = [
        Lens::Valuation,
        Lens::Quality,
        Lens::Growth,
        Lens::FinancialHealth,
        Lens::RiskMomentum,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Lens::Valuation => "Valuation",
            Lens::Quality => "Quality",
            Lens::Growth => "Growth",
            Lens::FinancialHealth => "Financial Health",
            Lens::RiskMomentum => "Risk & Momentum",
        }
    }
}

impl fmt::Display for Lens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The discrete, actionable classification of a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Strong positive tier.
    Excellent,
    /// Positive tier.
    Buy,
    /// Neutral tier.
    Hold,
    /// Negative tier.
    Caution,
}

impl Signal {
    pub fn label(&self) -> &'static str {
        match self {
            Signal::Excellent => "Excellent",
            Signal::Buy => "Good/Buy",
            Signal::Hold => "Hold",
            Signal::Caution => "Caution/Sell",
        }
    }

    /// Returns true for the two tiers above neutral.
    pub fn is_positive(&self) -> bool {
        matches!(self, Signal::Excellent | Signal::Buy)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
