use crate::BetaTier;
use crate::estimator::{BetaInputs, BetaSource, TierOutcome};
use crate::reference::ReferenceData;
use configuration::BetaParams;
use core_types::{AlignedReturnsPair, ReturnsCalculator};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use statrs::statistics::Statistics;
use std::sync::Arc;

/// Rounds `value` to `places` decimal places with banker's rounding.
pub(crate) fn round_to(value: f64, places: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(places))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Tier 1: covariance of date-aligned simple returns over the market's variance.
#[derive(Debug, Clone)]
pub struct DirectEstimation {
    params: BetaParams,
}

impl DirectEstimation {
    pub fn new(params: BetaParams) -> Self {
        Self { params }
    }
}

impl BetaTier for DirectEstimation {
    fn source(&self) -> BetaSource {
        BetaSource::Direct
    }

    fn estimate(&self, inputs: &BetaInputs<'_>) -> TierOutcome {
        let (Some(instrument), Some(market)) = (inputs.instrument, inputs.market) else {
            return TierOutcome::Inapplicable("instrument or market series not supplied".into());
        };

        let pair = match AlignedReturnsPair::align(
            &ReturnsCalculator::simple(instrument),
            &ReturnsCalculator::simple(market),
        ) {
            Some(pair) => pair,
            None => return TierOutcome::Inapplicable("no returns to align".into()),
        };

        if !pair.is_sufficient(self.params.min_aligned_points) {
            return TierOutcome::Inapplicable(format!(
                "{} aligned returns, need at least {}",
                pair.len(),
                self.params.min_aligned_points
            ));
        }

        let covariance = pair.instrument().iter().covariance(pair.market().iter());
        let market_variance = pair.market().iter().variance();
        if !market_variance.is_finite() || market_variance <= 0.0 {
            return TierOutcome::Inapplicable("market variance is zero".into());
        }

        let raw = covariance / market_variance;
        let beta = round_to(raw, self.params.decimal_places);
        if !self.params.is_plausible(beta) {
            return TierOutcome::Inapplicable(format!(
                "estimate {raw} rounds to {beta}, outside ({}, {})",
                self.params.min_beta, self.params.max_beta
            ));
        }

        TierOutcome::Estimated(beta)
    }
}

/// Tier 2: a precomputed beta keyed by the normalized ticker.
#[derive(Debug, Clone)]
pub struct StaticLookup {
    reference: Arc<ReferenceData>,
}

impl StaticLookup {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }
}

impl BetaTier for StaticLookup {
    fn source(&self) -> BetaSource {
        BetaSource::StaticLookup
    }

    fn estimate(&self, inputs: &BetaInputs<'_>) -> TierOutcome {
        let Some(ticker) = inputs.ticker else {
            return TierOutcome::Inapplicable("no ticker supplied".into());
        };
        match self.reference.beta(ticker) {
            Some(beta) => TierOutcome::Estimated(beta),
            None => TierOutcome::Inapplicable(format!("no static beta for {ticker}")),
        }
    }
}

/// Tier 3: the average beta of the ticker's sector.
#[derive(Debug, Clone)]
pub struct SectorAverage {
    reference: Arc<ReferenceData>,
}

impl SectorAverage {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }
}

impl BetaTier for SectorAverage {
    fn source(&self) -> BetaSource {
        BetaSource::SectorAverage
    }

    fn estimate(&self, inputs: &BetaInputs<'_>) -> TierOutcome {
        let Some(ticker) = inputs.ticker else {
            return TierOutcome::Inapplicable("no ticker supplied".into());
        };
        let Some(sector) = self.reference.sector(ticker) else {
            return TierOutcome::Inapplicable(format!("{ticker} has no sector classification"));
        };
        match self.reference.sector_beta(sector) {
            Some(beta) => TierOutcome::Estimated(beta),
            None => TierOutcome::Inapplicable(format!("no beta known for sector '{sector}'")),
        }
    }
}
