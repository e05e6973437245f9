use risk::BetaSource;
use serde::{Deserialize, Serialize};

/// The full set of risk metrics for one instrument at one evaluation.
///
/// This struct is the output of `RiskMetricsEngine::all_risk_metrics` and the only
/// risk input of the Risk & Momentum lens. Every field is always populated; an
/// instrument without enough history receives `RiskProfile::default_profile()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    // I. Volatility
    /// Annualised volatility over the full history.
    pub volatility: f64,
    /// Annualised volatility over the trailing short horizon.
    pub short_horizon_volatility: f64,

    // II. Tail risk (per-period returns, negative = loss)
    pub var_95: f64,
    pub var_99: f64,
    pub cvar_95: f64,

    // III. Risk-adjusted return
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,

    // IV. Drawdown
    pub max_drawdown: f64,
    /// Periods from the deepest trough to recovery (or to the end of the series).
    pub drawdown_duration: usize,
    pub average_drawdown: f64,
    pub current_drawdown: f64,

    // V. Distribution shape
    pub skewness: f64,
    pub kurtosis: f64,

    // VI. Market sensitivity and performance
    pub beta: f64,
    pub beta_source: BetaSource,
    pub total_return: f64,

    /// Number of returns the metrics were computed from; 0 for the default profile.
    pub observations: usize,
}

impl RiskProfile {
    /// The profile of a typical moderate-risk instrument, used when the price history
    /// is too short to measure anything.
    pub fn default_profile() -> Self {
        Self {
            volatility: 0.25,
            short_horizon_volatility: 0.25,
            var_95: -0.025,
            var_99: -0.037,
            cvar_95: -0.032,
            sharpe: 0.0,
            sortino: 0.0,
            calmar: 0.0,
            max_drawdown: -0.15,
            drawdown_duration: 0,
            average_drawdown: 0.0,
            current_drawdown: 0.0,
            skewness: 0.0,
            kurtosis: 0.0,
            beta: 1.0,
            beta_source: BetaSource::MarketNeutral,
            total_return: 0.0,
            observations: 0,
        }
    }

    pub fn is_default(&self) -> bool {
        self.observations == 0
    }
}

impl Default for RiskProfile {
    fn default() -> Self {
        Self::default_profile()
    }
}

/// The drawdown path of a price series and its summary figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawdownReport {
    /// `(price - running_peak) / running_peak` for every point; all values <= 0.
    pub series: Vec<f64>,
    pub max_drawdown: f64,
    pub duration: usize,
    /// Mean of the strictly negative drawdowns, 0.0 if there are none.
    pub average_drawdown: f64,
}

/// Pairwise correlation of named return series. Row/column order follows `names`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// The correlation of the two named series, if both are present.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.values[i][j])
    }
}
