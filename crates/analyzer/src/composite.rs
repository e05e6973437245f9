use crate::error::AnalyzerError;
use configuration::{ScoringParams, SignalThresholds};
use core_types::{Lens, Signal};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::Serialize;

/// Brings a raw lens score into `[0, 100]`.
///
/// `+inf` maps to 100; `-inf` and `NaN` map to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// The five clamped lens scores, their weighted composite and its signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LensScores {
    pub valuation: f64,
    pub quality: f64,
    pub growth: f64,
    pub financial_health: f64,
    pub risk_momentum: f64,
    pub composite: f64,
    pub signal: Signal,
}

impl LensScores {
    pub fn get(&self, lens: Lens) -> f64 {
        match lens {
            Lens::Valuation => self.valuation,
            Lens::Quality => self.quality,
            Lens::Growth => self.growth,
            Lens::FinancialHealth => self.financial_health,
            Lens::RiskMomentum => self.risk_momentum,
        }
    }
}

/// Aggregates lens scores into a composite and classifies it.
///
/// The weighting and threshold policy lives here and nowhere else. Weights are exact
/// decimals that sum to 1, so the composite of clamped inputs stays within `[0, 100]`.
#[derive(Debug, Clone)]
pub struct CompositeScorer {
    weights: [Decimal; 5],
    thresholds: SignalThresholds,
}

impl CompositeScorer {
    pub fn new(params: &ScoringParams) -> Result<Self, AnalyzerError> {
        params.weights.validate()?;
        params.thresholds.validate()?;
        Ok(Self {
            weights: params.weights.as_array(),
            thresholds: params.thresholds.clone(),
        })
    }

    pub fn weight(&self, lens: Lens) -> Decimal {
        self.weights[lens as usize]
    }

    /// The weighted composite of five raw scores given in `Lens::ALL` order.
    pub fn composite(&self, scores: &[f64; 5]) -> f64 {
        let total: Decimal = scores
            .iter()
            .zip(self.weights)
            .map(|(score, weight)| {
                Decimal::from_f64(clamp_score(*score)).unwrap_or_default() * weight
            })
            .sum();
        total.to_f64().unwrap_or_default().clamp(0.0, 100.0)
    }

    /// Maps a composite to its signal tier; each tier includes its lower bound.
    pub fn classify(&self, composite: f64) -> Signal {
        let t = &self.thresholds;
        if composite >= t.excellent {
            Signal::Excellent
        } else if composite >= t.buy {
            Signal::Buy
        } else if composite >= t.hold {
            Signal::Hold
        } else {
            Signal::Caution
        }
    }

    /// Clamps, aggregates and classifies five raw lens scores.
    pub fn score(&self, raw: [f64; 5]) -> LensScores {
        let [valuation, quality, growth, financial_health, risk_momentum] = raw.map(clamp_score);
        let composite = self.composite(&raw);
        LensScores {
            valuation,
            quality,
            growth,
            financial_health,
            risk_momentum,
            composite,
            signal: self.classify(composite),
        }
    }
}
