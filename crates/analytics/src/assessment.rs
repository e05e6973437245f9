use crate::report::RiskProfile;
use risk::BetaSource;
use serde::Serialize;

/// How strongly the instrument moves with the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BetaSensitivity {
    /// Beta above 1.2.
    High,
    /// Beta above 0.8.
    Moderate,
    Defensive,
    /// The beta is the market-neutral default, not a measurement.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityLevel {
    /// Annualised volatility above 30%.
    High,
    /// Above 20%.
    Moderate,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SharpeQuality {
    Good,
    Moderate,
    Poor,
}

/// A notable observation about the risk profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    MarketDataUnavailable,
    HighVolatility,
    LowVolatility,
    SevereDrawdowns,
    ModerateDrawdowns,
    ContainedDrawdowns,
    GoodRiskAdjustedReturns,
    PoorRiskAdjustedReturns,
}

impl RiskFlag {
    /// True for flags that signal a risk rather than a reassurance.
    pub fn is_warning(self) -> bool {
        matches!(
            self,
            RiskFlag::MarketDataUnavailable
                | RiskFlag::HighVolatility
                | RiskFlag::SevereDrawdowns
                | RiskFlag::ModerateDrawdowns
                | RiskFlag::PoorRiskAdjustedReturns
        )
    }

    pub fn description(self) -> &'static str {
        match self {
            RiskFlag::MarketDataUnavailable => {
                "Market correlation data unavailable; beta may not reflect true market sensitivity"
            }
            RiskFlag::HighVolatility => "High volatility: price fluctuates significantly",
            RiskFlag::LowVolatility => "Low volatility: stable price",
            RiskFlag::SevereDrawdowns => "Severe drawdowns observed: significant downside risk",
            RiskFlag::ModerateDrawdowns => "Moderate drawdowns observed",
            RiskFlag::ContainedDrawdowns => "Drawdowns relatively contained",
            RiskFlag::GoodRiskAdjustedReturns => "Good risk-adjusted returns for the risk taken",
            RiskFlag::PoorRiskAdjustedReturns => "Returns not compensating for risk taken",
        }
    }
}

/// A structured, presentation-neutral reading of a `RiskProfile`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub beta_sensitivity: BetaSensitivity,
    pub volatility_level: VolatilityLevel,
    pub sharpe_quality: SharpeQuality,
    pub flags: Vec<RiskFlag>,
}

impl RiskAssessment {
    pub fn from_profile(profile: &RiskProfile) -> Self {
        let market_neutral = profile.beta_source == BetaSource::MarketNeutral;

        let beta_sensitivity = if market_neutral {
            BetaSensitivity::Unknown
        } else if profile.beta > 1.2 {
            BetaSensitivity::High
        } else if profile.beta > 0.8 {
            BetaSensitivity::Moderate
        } else {
            BetaSensitivity::Defensive
        };

        let volatility_level = if profile.volatility > 0.30 {
            VolatilityLevel::High
        } else if profile.volatility > 0.20 {
            VolatilityLevel::Moderate
        } else {
            VolatilityLevel::Low
        };

        let sharpe_quality = if profile.sharpe > 1.0 {
            SharpeQuality::Good
        } else if profile.sharpe > 0.0 {
            SharpeQuality::Moderate
        } else {
            SharpeQuality::Poor
        };

        let mut flags = Vec::new();
        if market_neutral {
            flags.push(RiskFlag::MarketDataUnavailable);
        }

        if profile.volatility > 0.25 {
            flags.push(RiskFlag::HighVolatility);
        } else if profile.volatility < 0.15 {
            flags.push(RiskFlag::LowVolatility);
        }

        flags.push(if profile.max_drawdown < -0.30 {
            RiskFlag::SevereDrawdowns
        } else if profile.max_drawdown < -0.15 {
            RiskFlag::ModerateDrawdowns
        } else {
            RiskFlag::ContainedDrawdowns
        });

        if profile.sharpe > 1.0 {
            flags.push(RiskFlag::GoodRiskAdjustedReturns);
        } else if profile.sharpe < 0.0 {
            flags.push(RiskFlag::PoorRiskAdjustedReturns);
        }

        Self {
            beta_sensitivity,
            volatility_level,
            sharpe_quality,
            flags,
        }
    }

    pub fn warnings(&self) -> impl Iterator<Item = RiskFlag> + '_ {
        self.flags.iter().copied().filter(|f| f.is_warning())
    }
}
