use analytics::{RiskMetricsEngine, RiskProfile, VAR_SENTINEL};
use approx::{assert_abs_diff_eq, assert_relative_eq};
use chrono::NaiveDate;
use configuration::{BetaParams, RiskParams};
use core_types::{PriceSeries, ReturnsCalculator, VarMethod};
use risk::{BetaEstimator, BetaSource, ReferenceData};
use rstest::{fixture, rstest};
use std::sync::Arc;

#[fixture]
fn engine() -> RiskMetricsEngine {
    let beta = BetaEstimator::new(BetaParams::default(), Arc::new(ReferenceData::empty()));
    RiskMetricsEngine::new(RiskParams::default(), beta)
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
}

fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes(start(), closes).unwrap()
}

fn closes_from_returns(returns: &[f64]) -> Vec<f64> {
    let mut closes = vec![100.0];
    for r in returns {
        let last = *closes.last().unwrap();
        closes.push(last * (1.0 + r));
    }
    closes
}

fn golden() -> PriceSeries {
    series(&[100.0, 102.0, 101.0, 105.0, 103.0])
}

fn golden_returns() -> Vec<f64> {
    ReturnsCalculator::simple(&golden()).values().to_vec()
}

#[rstest]
fn golden_volatility_and_sharpe(engine: RiskMetricsEngine) {
    assert_relative_eq!(engine.volatility(&golden(), 252), 0.42900100175910455, epsilon = 1e-12);
    assert_relative_eq!(
        engine.sharpe(&golden_returns(), 0.05, 252),
        4.399529228108411,
        epsilon = 1e-9
    );
}

#[rstest]
fn golden_sortino_and_calmar(engine: RiskMetricsEngine) {
    let returns = golden_returns();
    assert_relative_eq!(engine.sortino(&returns, 0.05, 252), 18.190034268821815, epsilon = 1e-9);
    assert_relative_eq!(
        engine.calmar(&returns, -0.01904761904761905, 252),
        101.71362842166583,
        epsilon = 1e-9
    );
}

#[rstest]
fn golden_drawdown(engine: RiskMetricsEngine) {
    let report = engine.drawdown(&golden());
    assert_relative_eq!(report.max_drawdown, -0.01904761904761905, epsilon = 1e-15);
    assert_eq!(report.duration, 1);
    assert_relative_eq!(report.average_drawdown, -0.014425770308123249, epsilon = 1e-12);
    assert_eq!(report.series.len(), 5);
}

#[rstest]
fn golden_profile(engine: RiskMetricsEngine) {
    let profile = engine.all_risk_metrics(&golden(), None, None);

    assert_eq!(profile.observations, 4);
    assert_relative_eq!(profile.volatility, 0.42900100175910455, epsilon = 1e-12);
    assert_relative_eq!(profile.short_horizon_volatility, profile.volatility);
    assert_relative_eq!(profile.sharpe, 4.399529228108411, epsilon = 1e-9);
    assert_relative_eq!(profile.total_return, 0.03, epsilon = 1e-12);
    assert_relative_eq!(profile.current_drawdown, -0.01904761904761905, epsilon = 1e-15);
    // Four returns are below the VaR minimum.
    assert_eq!(profile.var_95, VAR_SENTINEL);
    assert_eq!(profile.cvar_95, VAR_SENTINEL);
    assert_eq!(profile.beta, 1.0);
    assert_eq!(profile.beta_source, BetaSource::MarketNeutral);
}

#[rstest]
#[case(&[])]
#[case(&[250.0])]
fn too_short_history_yields_default_profile(engine: RiskMetricsEngine, #[case] closes: &[f64]) {
    let profile = engine.all_risk_metrics(&series(closes), None, Some(260.0));
    assert_eq!(profile, RiskProfile::default_profile());
    assert_eq!(profile.volatility, 0.25);
    assert_eq!(profile.beta, 1.0);
    assert!(profile.is_default());
}

#[rstest]
fn current_price_overrides_last_close(engine: RiskMetricsEngine) {
    let above_peak = engine.all_risk_metrics(&golden(), None, Some(110.0));
    assert_relative_eq!(above_peak.total_return, 0.10, epsilon = 1e-12);
    assert_eq!(above_peak.current_drawdown, 0.0);

    let below_peak = engine.all_risk_metrics(&golden(), None, Some(100.0));
    assert_relative_eq!(below_peak.current_drawdown, -5.0 / 105.0, epsilon = 1e-12);

    let ignored = engine.all_risk_metrics(&golden(), None, Some(-1.0));
    assert_relative_eq!(ignored.total_return, 0.03, epsilon = 1e-12);
}

#[rstest]
fn short_market_series_falls_back_to_neutral_beta(engine: RiskMetricsEngine) {
    let returns: Vec<f64> = (0..99).map(|i| 0.01 * ((i as f64) * 0.9).sin()).collect();
    let instrument = series(&closes_from_returns(&returns));
    let market = series(&closes_from_returns(&returns[..39]));

    let profile = engine.all_risk_metrics(&instrument, Some(&market), None);
    assert_eq!(profile.beta, 1.0);
    assert_eq!(profile.beta_source, BetaSource::MarketNeutral);
}

#[rstest]
fn identical_market_gives_direct_unit_beta(engine: RiskMetricsEngine) {
    let returns: Vec<f64> = (0..99).map(|i| 0.01 * ((i as f64) * 0.9).sin()).collect();
    let instrument = series(&closes_from_returns(&returns));

    let profile = engine.all_risk_metrics(&instrument, Some(&instrument), None);
    assert_eq!(profile.beta, 1.0);
    assert_eq!(profile.beta_source, BetaSource::Direct);
}

#[rstest]
fn ticker_enables_reference_tiers() {
    let params = BetaParams::default();
    let tables = configuration::reference_tables_from_toml("[betas]\nRELIANCE = 1.05\n").unwrap();
    let reference = ReferenceData::from_tables(tables, &params).unwrap();
    let engine = RiskMetricsEngine::new(
        RiskParams::default(),
        BetaEstimator::new(params, Arc::new(reference)),
    );

    let profile = engine.all_risk_metrics_for("RELIANCE.NS", &golden(), None, None);
    assert_eq!(profile.beta, 1.05);
    assert_eq!(profile.beta_source, BetaSource::StaticLookup);
}

fn ladder() -> Vec<f64> {
    (0..20).map(|i| (i as f64 - 10.0) / 100.0).collect()
}

#[rstest]
fn historical_var_interpolates_the_tail(engine: RiskMetricsEngine) {
    let returns = ladder();
    assert_relative_eq!(
        engine.var(&returns, 0.95, VarMethod::Historical),
        -0.0905,
        epsilon = 1e-12
    );
    assert_relative_eq!(engine.cvar(&returns, 0.95), -0.10, epsilon = 1e-12);
}

#[rstest]
fn parametric_var_uses_normal_quantile(engine: RiskMetricsEngine) {
    let returns = ladder();
    let mean = -0.005;
    let std = 0.01 * 35f64.sqrt();
    assert_relative_eq!(
        engine.var(&returns, 0.95, VarMethod::Parametric),
        mean - 1.6448536269514722 * std,
        epsilon = 1e-8
    );
}

#[rstest]
fn cornish_fisher_corrects_for_thin_tails(engine: RiskMetricsEngine) {
    // A uniform ladder is symmetric with negative excess kurtosis, so the
    // corrected quantile sits closer to the mean than the normal one.
    let returns = ladder();
    let parametric = engine.var(&returns, 0.99, VarMethod::Parametric);
    let cornish_fisher = engine.var(&returns, 0.99, VarMethod::CornishFisher);
    assert!(cornish_fisher.is_finite());
    assert!(cornish_fisher > parametric);
}

#[rstest]
#[case(0.0)]
#[case(1.0)]
#[case(1.5)]
#[case(f64::NAN)]
fn invalid_confidence_reports_sentinel(engine: RiskMetricsEngine, #[case] confidence: f64) {
    let returns = ladder();
    assert_eq!(engine.var(&returns, confidence, VarMethod::Historical), VAR_SENTINEL);
    assert_eq!(engine.cvar(&returns, confidence), VAR_SENTINEL);
}

#[rstest]
fn anti_correlated_pair(engine: RiskMetricsEngine) {
    let returns: Vec<f64> = (0..50).map(|i| 0.02 * ((i as f64) * 1.7).cos()).collect();
    let mirrored: Vec<f64> = returns.iter().map(|r| -r).collect();
    let named = vec![
        ("UP".to_string(), series(&closes_from_returns(&returns))),
        ("DOWN".to_string(), series(&closes_from_returns(&mirrored))),
    ];

    let matrix = engine.correlation_matrix(&named);
    assert_eq!(matrix.len(), 2);
    assert_eq!(matrix.get("UP", "UP"), Some(1.0));
    assert_abs_diff_eq!(matrix.get("UP", "DOWN").unwrap(), -1.0, epsilon = 1e-9);
    assert_eq!(matrix.get("UP", "DOWN"), matrix.get("DOWN", "UP"));
}

#[rstest]
fn correlation_uses_common_trailing_window(engine: RiskMetricsEngine) {
    let long: Vec<f64> = (0..40).map(|i| 0.01 * ((i as f64) * 0.5).sin()).collect();
    let named = vec![
        ("LONG".to_string(), series(&closes_from_returns(&long))),
        ("SHORT".to_string(), series(&closes_from_returns(&long[25..]))),
    ];
    let matrix = engine.correlation_matrix(&named);
    assert_relative_eq!(matrix.get("LONG", "SHORT").unwrap(), 1.0, epsilon = 1e-9);
}

#[rstest]
fn correlation_needs_two_usable_series(engine: RiskMetricsEngine) {
    let one = vec![("A".to_string(), golden())];
    assert!(engine.correlation_matrix(&one).is_empty());

    let with_stub = vec![("A".to_string(), golden()), ("B".to_string(), series(&[10.0]))];
    assert!(engine.correlation_matrix(&with_stub).is_empty());
}

#[rstest]
fn series_without_returns_are_left_out(engine: RiskMetricsEngine) {
    let a: Vec<f64> = (0..20).map(|i| 100.0 + 3.0 * ((i as f64) * 0.9).sin()).collect();
    let b: Vec<f64> = (0..20).map(|i| 50.0 + 2.0 * ((i as f64) * 0.4).cos()).collect();
    let named = vec![
        ("A".to_string(), series(&a)),
        ("STUB".to_string(), series(&[10.0])),
        ("B".to_string(), series(&b)),
    ];

    let matrix = engine.correlation_matrix(&named);

    assert_eq!(matrix.len(), 2);
    assert_eq!(matrix.names, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(matrix.get("A", "A"), Some(1.0));
    assert!(matrix.get("STUB", "A").is_none());
    let ab = matrix.get("A", "B").unwrap();
    assert_eq!(matrix.get("B", "A"), Some(ab));
    assert!((-1.0..=1.0).contains(&ab));
}
