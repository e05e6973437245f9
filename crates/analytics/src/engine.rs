use crate::error::AnalyticsError;
use crate::report::{CorrelationMatrix, DrawdownReport, RiskProfile};
use crate::stats;
use configuration::{Config, RiskParams};
use core_types::{PriceSeries, ReturnsCalculator, VarMethod};
use risk::{BetaEstimator, BetaInputs};

/// Reported by VaR and CVaR when there are too few returns to estimate a tail.
pub const VAR_SENTINEL: f64 = -0.05;

/// A stateless calculator for deriving risk metrics from price histories.
///
/// The engine owns its parameters and the beta fallback chain but keeps no state
/// between calls, so a single instance can be shared across threads.
#[derive(Debug)]
pub struct RiskMetricsEngine {
    params: RiskParams,
    beta: BetaEstimator,
}

impl RiskMetricsEngine {
    pub fn new(params: RiskParams, beta: BetaEstimator) -> Self {
        Self { params, beta }
    }

    /// Builds an engine from the application configuration, loading reference data.
    pub fn from_config(config: &Config) -> Result<Self, AnalyticsError> {
        config.risk.validate()?;
        let beta = BetaEstimator::from_params(config.beta.clone())?;
        Ok(Self::new(config.risk.clone(), beta))
    }

    pub fn params(&self) -> &RiskParams {
        &self.params
    }

    pub fn beta_estimator(&self) -> &BetaEstimator {
        &self.beta
    }

    /// Annualised standard deviation of the simple returns of `prices`.
    pub fn volatility(&self, prices: &PriceSeries, periods: u32) -> f64 {
        let returns = ReturnsCalculator::simple(prices);
        stats::annualize(stats::sample_std(returns.values()), periods)
    }

    /// Value-at-Risk of per-period `returns` at `confidence` (e.g. 0.95).
    ///
    /// The result is a return, so a loss is negative. Below `min_var_observations`
    /// returns, or for a confidence outside `(0, 1)`, the sentinel `VAR_SENTINEL` is
    /// returned instead of an estimate.
    pub fn var(&self, returns: &[f64], confidence: f64, method: VarMethod) -> f64 {
        self.estimate_var(returns, confidence, method)
            .unwrap_or(VAR_SENTINEL)
    }

    /// Expected shortfall beyond the historical VaR at `confidence`.
    pub fn cvar(&self, returns: &[f64], confidence: f64) -> f64 {
        self.cvar_with_method(returns, confidence, VarMethod::Historical)
    }

    /// Mean of the returns at or below the VaR threshold of `method`.
    ///
    /// Falls back to the threshold itself when no return reaches it, so the result
    /// never exceeds the VaR it is paired with.
    pub fn cvar_with_method(&self, returns: &[f64], confidence: f64, method: VarMethod) -> f64 {
        let Some(threshold) = self.estimate_var(returns, confidence, method) else {
            return VAR_SENTINEL;
        };

        let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= threshold).collect();
        if tail.is_empty() {
            return threshold;
        }
        stats::mean(&tail).min(threshold)
    }

    fn estimate_var(&self, returns: &[f64], confidence: f64, method: VarMethod) -> Option<f64> {
        if returns.len() < self.params.min_var_observations {
            tracing::debug!(
                observations = returns.len(),
                required = self.params.min_var_observations,
                "Too few returns for VaR, using sentinel"
            );
            return None;
        }
        let tail = 1.0 - confidence;
        let Some(z) = stats::normal_quantile(tail) else {
            tracing::warn!(confidence, "VaR confidence outside (0, 1), using sentinel");
            return None;
        };

        let value = match method {
            VarMethod::Historical => stats::quantile(returns, tail)?,
            VarMethod::Parametric => stats::mean(returns) + z * stats::sample_std(returns),
            VarMethod::CornishFisher => {
                let s = stats::skewness(returns);
                let k = stats::excess_kurtosis(returns);
                let z_cf = z + (z * z - 1.0) * s / 6.0 + (z.powi(3) - 3.0 * z) * k / 24.0
                    - (2.0 * z.powi(3) - 5.0 * z) * s * s / 36.0;
                stats::mean(returns) + z_cf * stats::sample_std(returns)
            }
        };

        value.is_finite().then_some(value)
    }

    /// `(mean * periods - rf) / (std * sqrt(periods))`; 0.0 when volatility is zero.
    pub fn sharpe(&self, returns: &[f64], risk_free_rate: f64, periods: u32) -> f64 {
        if returns.len() < 2 {
            return 0.0;
        }
        let volatility = stats::annualize(stats::sample_std(returns), periods);
        excess_return_ratio(returns, risk_free_rate, periods, volatility)
    }

    /// Like `sharpe`, but penalising only the dispersion of negative returns.
    pub fn sortino(&self, returns: &[f64], risk_free_rate: f64, periods: u32) -> f64 {
        if returns.len() < 2 {
            return 0.0;
        }
        let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        if downside.len() < 2 {
            return 0.0;
        }
        let downside_deviation = stats::annualize(stats::sample_std(&downside), periods);
        excess_return_ratio(returns, risk_free_rate, periods, downside_deviation)
    }

    /// The drawdown path of `prices` with its maximum, duration and average.
    pub fn drawdown(&self, prices: &PriceSeries) -> DrawdownReport {
        drawdown_of_closes(&prices.closes())
    }

    /// Annualised mean return over the magnitude of the maximum drawdown.
    pub fn calmar(&self, returns: &[f64], max_drawdown: f64, periods: u32) -> f64 {
        if returns.len() < 2 || max_drawdown == 0.0 {
            return 0.0;
        }
        let ratio = stats::mean(returns) * f64::from(periods) / max_drawdown.abs();
        if ratio.is_finite() { ratio } else { 0.0 }
    }

    /// Pairwise Pearson correlation of the simple returns of each named series.
    ///
    /// Each pair is aligned by position over their common trailing window, ignoring
    /// timestamps. Series without a single return are left out; fewer than two
    /// remaining series yields an empty matrix.
    pub fn correlation_matrix(&self, series: &[(String, PriceSeries)]) -> CorrelationMatrix {
        let (names, returns): (Vec<String>, Vec<Vec<f64>>) = series
            .iter()
            .filter_map(|(name, prices)| {
                let returns = ReturnsCalculator::simple(prices).values().to_vec();
                if returns.is_empty() {
                    tracing::debug!(series = %name, "Series has no returns, left out of correlation");
                    return None;
                }
                Some((name.clone(), returns))
            })
            .unzip();
        if returns.len() < 2 {
            return CorrelationMatrix::default();
        }

        let n = returns.len();
        let mut values = vec![vec![0.0; n]; n];
        for i in 0..n {
            values[i][i] = 1.0;
            for j in (i + 1)..n {
                let overlap = returns[i].len().min(returns[j].len());
                let a = &returns[i][returns[i].len() - overlap..];
                let b = &returns[j][returns[j].len() - overlap..];
                let r = stats::pearson(a, b);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        CorrelationMatrix { names, values }
    }

    /// Computes the full risk profile of an instrument without a ticker.
    pub fn all_risk_metrics(
        &self,
        prices: &PriceSeries,
        market: Option<&PriceSeries>,
        current_price: Option<f64>,
    ) -> RiskProfile {
        self.profile(None, prices, market, current_price)
    }

    /// Computes the full risk profile; the ticker enables the reference-data beta tiers.
    pub fn all_risk_metrics_for(
        &self,
        ticker: &str,
        prices: &PriceSeries,
        market: Option<&PriceSeries>,
        current_price: Option<f64>,
    ) -> RiskProfile {
        self.profile(Some(ticker), prices, market, current_price)
    }

    fn profile(
        &self,
        ticker: Option<&str>,
        prices: &PriceSeries,
        market: Option<&PriceSeries>,
        current_price: Option<f64>,
    ) -> RiskProfile {
        if prices.len() < 2 {
            tracing::debug!(
                ticker = ticker.unwrap_or("<none>"),
                points = prices.len(),
                "Price history too short, using default risk profile"
            );
            return RiskProfile::default_profile();
        }

        let periods = self.params.periods_per_year;
        let rf = self.params.risk_free_rate;
        let method = self.params.var_method;
        let returns = ReturnsCalculator::simple(prices);
        let r = returns.values();

        let short_window = &r[r.len().saturating_sub(self.params.short_horizon)..];

        let closes = prices.closes();
        let drawdown = drawdown_of_closes(&closes);

        let beta = self.beta.estimate(&BetaInputs {
            ticker,
            instrument: Some(prices),
            market: self.usable_market(prices, market),
        });

        let current_price = current_price.filter(|p| p.is_finite() && *p > 0.0);
        let first = closes[0];
        let last = current_price.unwrap_or(closes[closes.len() - 1]);
        let current_drawdown = match current_price {
            Some(price) => {
                let peak = closes.iter().copied().fold(price, f64::max);
                (price - peak) / peak
            }
            None => drawdown.series.last().copied().unwrap_or(0.0),
        };

        RiskProfile {
            volatility: stats::annualize(stats::sample_std(r), periods),
            short_horizon_volatility: stats::annualize(stats::sample_std(short_window), periods),
            var_95: self.var(r, 0.95, method),
            var_99: self.var(r, 0.99, method),
            cvar_95: self.cvar_with_method(r, 0.95, method),
            sharpe: self.sharpe(r, rf, periods),
            sortino: self.sortino(r, rf, periods),
            calmar: self.calmar(r, drawdown.max_drawdown, periods),
            max_drawdown: drawdown.max_drawdown,
            drawdown_duration: drawdown.duration,
            average_drawdown: drawdown.average_drawdown,
            current_drawdown,
            skewness: stats::skewness(r),
            kurtosis: stats::excess_kurtosis(r),
            beta: beta.value,
            beta_source: beta.source,
            total_return: last / first - 1.0,
            observations: r.len(),
        }
    }

    /// The market series, if it covers enough of the instrument's history.
    fn usable_market<'a>(
        &self,
        prices: &PriceSeries,
        market: Option<&'a PriceSeries>,
    ) -> Option<&'a PriceSeries> {
        let market = market?;
        let required = self.beta.params().min_market_coverage * prices.len() as f64;
        if market.len() < 2 || (market.len() as f64) < required {
            tracing::debug!(
                market_points = market.len(),
                instrument_points = prices.len(),
                "Market series too short for direct beta estimation"
            );
            return None;
        }
        Some(market)
    }
}

fn excess_return_ratio(returns: &[f64], risk_free_rate: f64, periods: u32, deviation: f64) -> f64 {
    if !deviation.is_finite() || deviation == 0.0 {
        return 0.0;
    }
    let ratio = (stats::mean(returns) * f64::from(periods) - risk_free_rate) / deviation;
    if ratio.is_finite() { ratio } else { 0.0 }
}

fn drawdown_of_closes(closes: &[f64]) -> DrawdownReport {
    if closes.is_empty() {
        return DrawdownReport::default();
    }

    let mut peaks = Vec::with_capacity(closes.len());
    let mut series = Vec::with_capacity(closes.len());
    let mut peak = closes[0];
    for &price in closes {
        peak = peak.max(price);
        peaks.push(peak);
        series.push((price - peak) / peak);
    }

    // First index of the deepest drawdown.
    let (trough, max_drawdown) = series
        .iter()
        .copied()
        .enumerate()
        .fold((0, 0.0), |(ti, tv), (i, v)| if v < tv { (i, v) } else { (ti, tv) });

    // Both branches count the trough and every point up to the end of the episode.
    let duration = if max_drawdown < 0.0 {
        let prior_peak = peaks[trough];
        closes[trough + 1..]
            .iter()
            .position(|&p| p >= prior_peak)
            .map(|offset| offset + 2)
            .unwrap_or(closes.len() - trough)
    } else {
        0
    };

    let negatives: Vec<f64> = series.iter().copied().filter(|d| *d < 0.0).collect();
    let average_drawdown = stats::mean(&negatives);

    DrawdownReport {
        series,
        max_drawdown,
        duration,
        average_drawdown,
    }
}
