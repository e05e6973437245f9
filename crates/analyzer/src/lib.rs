//! # Equilens Analyzer
//!
//! Layer 2 of the workspace: turns risk profiles and fundamentals into the Five-Lens
//! assessment of an instrument and ranks instruments against each other.
//!
//! ## Public API
//!
//! - `Analyzer`: assesses one instrument (`assess`) or many in parallel (`assess_batch`).
//! - `LensScorer`: the per-lens mappings from raw metrics to 0-100 scores.
//! - `CompositeScorer` / `LensScores`: the weighted composite and its signal.
//! - `rank_by_composite`: orders assessments for sector and peer comparison.

use analytics::{RiskAssessment, RiskMetricsEngine, RiskProfile};
use configuration::Config;
use core_types::{Fundamentals, PriceSeries};
use rayon::prelude::*;
use serde::Serialize;

pub mod composite;
pub mod error;
pub mod lens;

pub use composite::{CompositeScorer, LensScores, clamp_score};
pub use error::AnalyzerError;
pub use lens::{LensScorer, NEUTRAL_SCORE, linear_score};

/// Everything known about one instrument at evaluation time.
#[derive(Debug, Clone, Default)]
pub struct Instrument {
    /// Ticker code; may be empty when the series is anonymous.
    pub ticker: String,
    pub prices: PriceSeries,
    pub fundamentals: Fundamentals,
    /// A live quote, if newer than the last close.
    pub current_price: Option<f64>,
}

/// The complete evaluation of one instrument.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub ticker: String,
    pub risk: RiskProfile,
    pub summary: RiskAssessment,
    pub scores: LensScores,
}

/// The main analysis engine.
#[derive(Debug)]
pub struct Analyzer {
    engine: RiskMetricsEngine,
    lenses: LensScorer,
    scorer: CompositeScorer,
}

impl Analyzer {
    pub fn new(engine: RiskMetricsEngine, scorer: CompositeScorer) -> Self {
        Self {
            engine,
            lenses: LensScorer::new(),
            scorer,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AnalyzerError> {
        let engine = RiskMetricsEngine::from_config(config)?;
        let scorer = CompositeScorer::new(&config.scoring)?;
        Ok(Self::new(engine, scorer))
    }

    pub fn engine(&self) -> &RiskMetricsEngine {
        &self.engine
    }

    pub fn scorer(&self) -> &CompositeScorer {
        &self.scorer
    }

    /// Computes the risk profile, the five lens scores and the composite signal.
    pub fn assess(&self, instrument: &Instrument, market: Option<&PriceSeries>) -> Assessment {
        let risk = if instrument.ticker.trim().is_empty() {
            self.engine
                .all_risk_metrics(&instrument.prices, market, instrument.current_price)
        } else {
            self.engine.all_risk_metrics_for(
                &instrument.ticker,
                &instrument.prices,
                market,
                instrument.current_price,
            )
        };

        let raw = self.lenses.score_all(&instrument.fundamentals, &risk);
        let scores = self.scorer.score(raw);
        tracing::debug!(
            ticker = %instrument.ticker,
            composite = scores.composite,
            signal = %scores.signal,
            "Instrument assessed"
        );

        Assessment {
            ticker: instrument.ticker.clone(),
            summary: RiskAssessment::from_profile(&risk),
            risk,
            scores,
        }
    }

    /// Assesses every instrument against the same market series in parallel.
    ///
    /// Instruments are independent, so results are returned in input order.
    pub fn assess_batch(
        &self,
        instruments: &[Instrument],
        market: Option<&PriceSeries>,
    ) -> Vec<Assessment> {
        tracing::info!(
            instruments = instruments.len(),
            threads = rayon::current_num_threads(),
            "Assessing batch"
        );
        instruments
            .par_iter()
            .map(|instrument| self.assess(instrument, market))
            .collect()
    }
}

/// Orders assessments by composite score, best first; ties go alphabetically by ticker.
pub fn rank_by_composite(mut assessments: Vec<Assessment>) -> Vec<Assessment> {
    assessments.sort_by(|a, b| {
        b.scores
            .composite
            .total_cmp(&a.scores.composite)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    assessments
}
