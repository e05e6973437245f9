use analytics::RiskProfile;
use core_types::{Fundamentals, Lens};

/// Score given to a lens when none of its inputs is available.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Maps `value` linearly onto 0-100, where `worst` scores 0 and `best` scores 100.
///
/// Works in either direction (`best < worst` for "lower is better" ratios) and
/// clamps outside the interval.
pub fn linear_score(value: f64, worst: f64, best: f64) -> f64 {
    let fraction = (value - worst) / (best - worst);
    (fraction * 100.0).clamp(0.0, 100.0)
}

fn average(scores: impl IntoIterator<Item = Option<f64>>) -> f64 {
    let available: Vec<f64> = scores.into_iter().flatten().collect();
    if available.is_empty() {
        NEUTRAL_SCORE
    } else {
        available.iter().sum::<f64>() / available.len() as f64
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Scores each lens from fundamentals or the risk profile.
///
/// Every lens averages the sub-scores of whichever inputs are present, so any subset
/// of fundamentals may be missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LensScorer;

impl LensScorer {
    pub fn new() -> Self {
        Self
    }

    /// Cheaper is better: P/E, P/B, P/S, PEG and dividend yield.
    pub fn valuation(&self, f: &Fundamentals) -> f64 {
        average([
            // A non-positive P/E means losses, which is never cheap.
            finite(f.trailing_pe).map(|pe| if pe <= 0.0 { 0.0 } else { linear_score(pe, 40.0, 10.0) }),
            finite(f.price_to_book).map(|pb| if pb <= 0.0 { 0.0 } else { linear_score(pb, 8.0, 1.0) }),
            finite(f.price_to_sales).map(|ps| if ps <= 0.0 { 0.0 } else { linear_score(ps, 10.0, 1.0) }),
            finite(f.dividend_yield).map(|y| linear_score(y, 0.0, 0.05)),
            finite(f.peg_ratio).map(|peg| if peg <= 0.0 { 0.0 } else { linear_score(peg, 3.0, 0.5) }),
        ])
    }

    /// Profitability: ROE, net margin, ROA, ROIC.
    pub fn quality(&self, f: &Fundamentals) -> f64 {
        average([
            finite(f.return_on_equity).map(|v| linear_score(v, 0.0, 0.25)),
            finite(f.net_margin).map(|v| linear_score(v, 0.0, 0.20)),
            finite(f.return_on_assets).map(|v| linear_score(v, 0.0, 0.10)),
            finite(f.return_on_invested_capital).map(|v| linear_score(v, 0.0, 0.20)),
        ])
    }

    pub fn growth(&self, f: &Fundamentals) -> f64 {
        average([
            finite(f.revenue_growth).map(|v| linear_score(v, -0.05, 0.25)),
            finite(f.earnings_growth).map(|v| linear_score(v, -0.10, 0.30)),
        ])
    }

    /// Balance-sheet strength: leverage, liquidity, debt service and size.
    pub fn financial_health(&self, f: &Fundamentals) -> f64 {
        average([
            finite(f.debt_to_equity).map(|v| linear_score(v, 2.0, 0.0)),
            finite(f.current_ratio).map(|v| linear_score(v, 0.8, 2.0)),
            finite(f.interest_coverage).map(|v| linear_score(v, 1.5, 10.0)),
            finite(f.market_cap)
                .filter(|cap| *cap > 0.0)
                .map(|cap| linear_score(cap.log10(), 10.0, 13.0)),
        ])
    }

    /// Lower beta, volatility and drawdown, higher Sharpe and trailing return.
    pub fn risk_momentum(&self, risk: &RiskProfile) -> f64 {
        average([
            Some(linear_score(risk.beta, 2.0, 0.8)),
            Some(linear_score(risk.volatility, 0.50, 0.15)),
            Some(linear_score(risk.max_drawdown, -0.50, -0.05)),
            Some(linear_score(risk.sharpe, -0.5, 1.5)),
            Some(linear_score(risk.total_return, -0.20, 0.30)),
        ])
    }

    /// All five raw lens scores in `Lens::ALL` order.
    pub fn score_all(&self, fundamentals: &Fundamentals, risk: &RiskProfile) -> [f64; 5] {
        Lens::ALL.map(|lens| match lens {
            Lens::Valuation => self.valuation(fundamentals),
            Lens::Quality => self.quality(fundamentals),
            Lens::Growth => self.growth(fundamentals),
            Lens::FinancialHealth => self.financial_health(fundamentals),
            Lens::RiskMomentum => self.risk_momentum(risk),
        })
    }
}
