use crate::error::ConfigError;
use core_types::VarMethod;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section falls back to its defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub risk: RiskParams,
    pub beta: BetaParams,
    pub scoring: ScoringParams,
    pub logging: LoggingParams,
}

impl Config {
    /// Checks every section for logical consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.risk.validate()?;
        self.beta.validate()?;
        self.scoring.weights.validate()?;
        self.scoring.thresholds.validate()?;
        Ok(())
    }
}

/// Parameters of the risk metrics engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    /// Annual risk-free rate used by Sharpe and Sortino (0.05 = 5%).
    pub risk_free_rate: f64,
    /// Return periods per year; 252 for daily data.
    pub periods_per_year: u32,
    /// Number of trailing returns used for the short-horizon volatility.
    pub short_horizon: usize,
    /// VaR estimator used for the headline VaR figures of a risk profile.
    pub var_method: VarMethod,
    /// Below this many returns VaR and CVaR report the sentinel value.
    pub min_var_observations: usize,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
            periods_per_year: 252,
            short_horizon: 60,
            var_method: VarMethod::Historical,
            min_var_observations: 10,
        }
    }
}

impl RiskParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.risk_free_rate.is_finite() {
            return Err(ConfigError::ValidationError(
                "risk.risk_free_rate must be a finite number".to_string(),
            ));
        }
        if self.periods_per_year == 0 {
            return Err(ConfigError::ValidationError(
                "risk.periods_per_year must be greater than 0".to_string(),
            ));
        }
        if self.short_horizon < 2 {
            return Err(ConfigError::ValidationError(
                "risk.short_horizon must be at least 2".to_string(),
            ));
        }
        if self.min_var_observations < 2 {
            return Err(ConfigError::ValidationError(
                "risk.min_var_observations must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters of the beta estimator and its fallback chain.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BetaParams {
    /// Minimum number of date-aligned returns for direct estimation.
    pub min_aligned_points: usize,
    /// Exclusive lower bound of a plausible beta.
    pub min_beta: f64,
    /// Exclusive upper bound of a plausible beta.
    pub max_beta: f64,
    /// Decimal places a directly estimated beta is rounded to.
    pub decimal_places: u32,
    /// The market series must hold at least this fraction of the instrument's points
    /// before direct estimation is attempted.
    pub min_market_coverage: f64,
    /// Optional TOML/JSON file with static betas and sector classifications.
    pub reference_data: Option<PathBuf>,
}

impl Default for BetaParams {
    fn default() -> Self {
        Self {
            min_aligned_points: 30,
            min_beta: -5.0,
            max_beta: 5.0,
            decimal_places: 4,
            min_market_coverage: 0.5,
            reference_data: None,
        }
    }
}

impl BetaParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_aligned_points < 2 {
            return Err(ConfigError::ValidationError(
                "beta.min_aligned_points must be at least 2".to_string(),
            ));
        }
        if !(self.min_beta.is_finite() && self.max_beta.is_finite()) || self.min_beta >= self.max_beta {
            return Err(ConfigError::ValidationError(format!(
                "beta plausible range ({}, {}) is invalid",
                self.min_beta, self.max_beta
            )));
        }
        // The market-neutral default must itself be plausible.
        if !self.is_plausible(1.0) {
            return Err(ConfigError::ValidationError(
                "beta plausible range must contain 1.0".to_string(),
            ));
        }
        if self.decimal_places > 12 {
            return Err(ConfigError::ValidationError(
                "beta.decimal_places must be at most 12".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_market_coverage) {
            return Err(ConfigError::ValidationError(
                "beta.min_market_coverage must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }

    /// True when `beta` is finite and strictly inside the plausible range.
    pub fn is_plausible(&self, beta: f64) -> bool {
        beta.is_finite() && beta > self.min_beta && beta < self.max_beta
    }
}

/// The scoring policy of the five-lens framework.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    pub weights: LensWeights,
    pub thresholds: SignalThresholds,
}

/// Weights of the five lenses. Must sum to exactly 1.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LensWeights {
    pub valuation: Decimal,
    pub quality: Decimal,
    pub growth: Decimal,
    pub financial_health: Decimal,
    pub risk_momentum: Decimal,
}

impl Default for LensWeights {
    fn default() -> Self {
        Self {
            valuation: dec!(0.20),
            quality: dec!(0.25),
            growth: dec!(0.20),
            financial_health: dec!(0.20),
            risk_momentum: dec!(0.15),
        }
    }
}

impl LensWeights {
    /// The weights in canonical lens order.
    pub fn as_array(&self) -> [Decimal; 5] {
        [
            self.valuation,
            self.quality,
            self.growth,
            self.financial_health,
            self.risk_momentum,
        ]
    }

    pub fn total(&self) -> Decimal {
        self.as_array().iter().sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.as_array().iter().any(|w| *w < Decimal::ZERO) {
            return Err(ConfigError::ValidationError(
                "scoring weights must not be negative".to_string(),
            ));
        }
        let total = self.total();
        if total != Decimal::ONE {
            return Err(ConfigError::ValidationError(format!(
                "scoring weights must sum to exactly 1, got {total}"
            )));
        }
        Ok(())
    }
}

/// Lower bounds (inclusive) of the signal tiers on the 0-100 composite scale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SignalThresholds {
    pub excellent: f64,
    pub buy: f64,
    pub hold: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            excellent: 80.0,
            buy: 70.0,
            hold: 60.0,
        }
    }
}

impl SignalThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = 0.0 <= self.hold
            && self.hold < self.buy
            && self.buy < self.excellent
            && self.excellent <= 100.0;
        if !ordered {
            return Err(ConfigError::ValidationError(format!(
                "signal thresholds must satisfy 0 <= hold < buy < excellent <= 100, got {}/{}/{}",
                self.hold, self.buy, self.excellent
            )));
        }
        Ok(())
    }
}

/// Where and how verbosely diagnostics are written.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingParams {
    /// An `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, a daily rolling log file is written into this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingParams {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn default_weights_sum_exactly_to_one() {
        assert_eq!(LensWeights::default().total(), Decimal::ONE);
    }

    #[test]
    fn rejects_weights_off_by_a_hair() {
        let weights = LensWeights {
            risk_momentum: dec!(0.1500001),
            ..LensWeights::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn rejects_negative_weight_even_when_sum_is_one() {
        let weights = LensWeights {
            valuation: dec!(-0.10),
            quality: dec!(0.55),
            ..LensWeights::default()
        };
        assert_eq!(weights.total(), Decimal::ONE);
        assert!(weights.validate().is_err());
    }

    #[rstest]
    #[case(80.0, 70.0, 60.0, true)]
    #[case(100.0, 50.0, 0.0, true)]
    #[case(70.0, 70.0, 60.0, false)]
    #[case(80.0, 60.0, 70.0, false)]
    #[case(101.0, 70.0, 60.0, false)]
    #[case(80.0, 70.0, -1.0, false)]
    fn threshold_ordering(#[case] excellent: f64, #[case] buy: f64, #[case] hold: f64, #[case] valid: bool) {
        let thresholds = SignalThresholds { excellent, buy, hold };
        assert_eq!(thresholds.validate().is_ok(), valid);
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(2.0, 1.0)]
    #[case(-1.0, 0.5)]
    fn rejects_unusable_beta_range(#[case] min_beta: f64, #[case] max_beta: f64) {
        let params = BetaParams {
            min_beta,
            max_beta,
            ..BetaParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn plausible_range_is_exclusive() {
        let params = BetaParams::default();
        assert!(params.is_plausible(4.9999));
        assert!(!params.is_plausible(5.0));
        assert!(!params.is_plausible(-5.0));
        assert!(!params.is_plausible(f64::NAN));
    }

    #[test]
    fn rejects_zero_periods() {
        let params = RiskParams {
            periods_per_year: 0,
            ..RiskParams::default()
        };
        assert!(params.validate().is_err());
    }
}
