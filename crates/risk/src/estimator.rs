use crate::BetaTier;
use crate::error::RiskError;
use crate::reference::ReferenceData;
use crate::tiers::{DirectEstimation, SectorAverage, StaticLookup};
use configuration::BetaParams;
use core_types::PriceSeries;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The beta reported when every tier is inapplicable.
pub const MARKET_NEUTRAL_BETA: f64 = 1.0;

/// Which tier of the fallback chain produced a beta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetaSource {
    Direct,
    StaticLookup,
    SectorAverage,
    MarketNeutral,
}

impl fmt::Display for BetaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BetaSource::Direct => "direct",
            BetaSource::StaticLookup => "static lookup",
            BetaSource::SectorAverage => "sector average",
            BetaSource::MarketNeutral => "market neutral",
        };
        f.write_str(label)
    }
}

/// What a single tier made of the inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome {
    Estimated(f64),
    /// The tier could not produce a value; the reason is kept for diagnostics.
    Inapplicable(String),
}

/// Everything a tier may look at. Any field may be absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct BetaInputs<'a> {
    pub ticker: Option<&'a str>,
    pub instrument: Option<&'a PriceSeries>,
    pub market: Option<&'a PriceSeries>,
}

impl<'a> BetaInputs<'a> {
    pub fn new(instrument: Option<&'a PriceSeries>, market: Option<&'a PriceSeries>) -> Self {
        Self {
            ticker: None,
            instrument,
            market,
        }
    }

    pub fn with_ticker(mut self, ticker: &'a str) -> Self {
        self.ticker = Some(ticker);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierRejection {
    pub tier: BetaSource,
    pub reason: String,
}

/// A resolved beta and the tier it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetaResult {
    pub value: f64,
    pub source: BetaSource,
    /// Why each earlier tier was skipped, in chain order.
    pub rejections: Vec<TierRejection>,
}

impl BetaResult {
    pub fn market_neutral() -> Self {
        Self {
            value: MARKET_NEUTRAL_BETA,
            source: BetaSource::MarketNeutral,
            rejections: Vec::new(),
        }
    }
}

/// Resolves a beta by walking an ordered chain of tiers.
///
/// The first tier yielding a finite, plausible value wins. When none does, the result
/// is the market-neutral beta of 1.0, so `estimate` never fails.
pub struct BetaEstimator {
    params: BetaParams,
    tiers: Vec<Box<dyn BetaTier>>,
}

impl fmt::Debug for BetaEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tiers: Vec<BetaSource> = self.tiers.iter().map(|t| t.source()).collect();
        f.debug_struct("BetaEstimator")
            .field("params", &self.params)
            .field("tiers", &tiers)
            .finish()
    }
}

impl BetaEstimator {
    /// The standard chain: direct estimation, static lookup, sector average.
    pub fn new(params: BetaParams, reference: Arc<ReferenceData>) -> Self {
        let tiers: Vec<Box<dyn BetaTier>> = vec![
            Box::new(DirectEstimation::new(params.clone())),
            Box::new(StaticLookup::new(reference.clone())),
            Box::new(SectorAverage::new(reference)),
        ];
        Self { params, tiers }
    }

    /// A chain of caller-supplied tiers. The market-neutral default still terminates it.
    pub fn with_tiers(params: BetaParams, tiers: Vec<Box<dyn BetaTier>>) -> Self {
        Self { params, tiers }
    }

    /// Validates the parameters and loads the reference file they name, if any.
    pub fn from_params(params: BetaParams) -> Result<Self, RiskError> {
        params.validate()?;
        let reference = match &params.reference_data {
            Some(path) => ReferenceData::load(path, &params)?,
            None => ReferenceData::empty(),
        };
        Ok(Self::new(params, Arc::new(reference)))
    }

    pub fn params(&self) -> &BetaParams {
        &self.params
    }

    pub fn estimate(&self, inputs: &BetaInputs<'_>) -> BetaResult {
        let mut rejections = Vec::new();

        for tier in &self.tiers {
            let source = tier.source();
            let reason = match tier.estimate(inputs) {
                TierOutcome::Estimated(value) if self.params.is_plausible(value) => {
                    tracing::debug!(beta = value, %source, "Beta resolved");
                    return BetaResult {
                        value,
                        source,
                        rejections,
                    };
                }
                TierOutcome::Estimated(value) => format!("implausible value {value}"),
                TierOutcome::Inapplicable(reason) => reason,
            };
            tracing::debug!(tier = %source, %reason, "Beta tier skipped");
            rejections.push(TierRejection {
                tier: source,
                reason,
            });
        }

        tracing::debug!(
            ticker = inputs.ticker.unwrap_or("<none>"),
            "No beta tier applicable, using market-neutral default"
        );
        BetaResult {
            rejections,
            ..BetaResult::market_neutral()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(BetaSource, TierOutcome);

    impl BetaTier for Fixed {
        fn source(&self) -> BetaSource {
            self.0
        }

        fn estimate(&self, _inputs: &BetaInputs<'_>) -> TierOutcome {
            self.1.clone()
        }
    }

    #[test]
    fn first_applicable_tier_wins() {
        let estimator = BetaEstimator::with_tiers(
            BetaParams::default(),
            vec![
                Box::new(Fixed(BetaSource::Direct, TierOutcome::Inapplicable("short".into()))),
                Box::new(Fixed(BetaSource::StaticLookup, TierOutcome::Estimated(0.7))),
                Box::new(Fixed(BetaSource::SectorAverage, TierOutcome::Estimated(1.3))),
            ],
        );

        let result = estimator.estimate(&BetaInputs::default());
        assert_eq!(result.value, 0.7);
        assert_eq!(result.source, BetaSource::StaticLookup);
        assert_eq!(result.rejections.len(), 1);
        assert_eq!(result.rejections[0].tier, BetaSource::Direct);
    }

    #[test]
    fn implausible_or_non_finite_values_fall_through() {
        let estimator = BetaEstimator::with_tiers(
            BetaParams::default(),
            vec![
                Box::new(Fixed(BetaSource::Direct, TierOutcome::Estimated(f64::NAN))),
                Box::new(Fixed(BetaSource::StaticLookup, TierOutcome::Estimated(9.0))),
            ],
        );

        let result = estimator.estimate(&BetaInputs::default());
        assert_eq!(result.value, MARKET_NEUTRAL_BETA);
        assert_eq!(result.source, BetaSource::MarketNeutral);
        assert_eq!(result.rejections.len(), 2);
    }

    #[test]
    fn empty_chain_is_market_neutral() {
        let estimator = BetaEstimator::with_tiers(BetaParams::default(), Vec::new());
        assert_eq!(estimator.estimate(&BetaInputs::default()), BetaResult::market_neutral());
    }

    #[test]
    fn from_params_without_reference_file() {
        let estimator = BetaEstimator::from_params(BetaParams::default()).unwrap();
        let result = estimator.estimate(&BetaInputs::default().with_ticker("INFY"));
        assert_eq!(result.source, BetaSource::MarketNeutral);
        assert_eq!(result.rejections.len(), 3);
    }

    #[test]
    fn from_params_rejects_invalid_range() {
        let params = BetaParams {
            min_beta: 2.0,
            ..BetaParams::default()
        };
        assert!(matches!(
            BetaEstimator::from_params(params),
            Err(RiskError::Config(_))
        ));
    }
}
