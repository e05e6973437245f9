use crate::enums::ReturnMethod;
use crate::series::PriceSeries;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Period-over-period returns derived from a `PriceSeries`.
///
/// Each return is stamped with the timestamp of the later of its two prices, so a
/// series of N prices yields at most N - 1 returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnsSeries {
    method: ReturnMethod,
    timestamps: Vec<DateTime<FixedOffset>>,
    values: Vec<f64>,
}

impl ReturnsSeries {
    pub fn method(&self) -> ReturnMethod {
        self.method
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn timestamps(&self) -> &[DateTime<FixedOffset>] {
        &self.timestamps
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateTime<FixedOffset>, f64)> {
        self.timestamps.iter().zip(self.values.iter().copied())
    }
}

/// A stateless converter from prices to returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReturnsCalculator;

impl ReturnsCalculator {
    /// Computes returns for a validated series. Fewer than two prices yield an empty series.
    pub fn compute(prices: &PriceSeries, method: ReturnMethod) -> ReturnsSeries {
        let mut timestamps = Vec::with_capacity(prices.len().saturating_sub(1));
        let mut values = Vec::with_capacity(prices.len().saturating_sub(1));

        for w in prices.points().windows(2) {
            if let Some(r) = period_return(w[0].close, w[1].close, method) {
                timestamps.push(w[1].timestamp);
                values.push(r);
            }
        }

        ReturnsSeries {
            method,
            timestamps,
            values,
        }
    }

    pub fn simple(prices: &PriceSeries) -> ReturnsSeries {
        Self::compute(prices, ReturnMethod::Simple)
    }

    pub fn log(prices: &PriceSeries) -> ReturnsSeries {
        Self::compute(prices, ReturnMethod::Log)
    }

    /// Computes returns over bare closes, dropping any period whose result is undefined
    /// (missing or non-positive prior price).
    pub fn from_closes(closes: &[f64], method: ReturnMethod) -> Vec<f64> {
        closes
            .windows(2)
            .filter_map(|w| period_return(w[0], w[1], method))
            .collect()
    }
}

fn period_return(prev: f64, current: f64, method: ReturnMethod) -> Option<f64> {
    if !(prev.is_finite() && prev > 0.0 && current.is_finite()) {
        return None;
    }
    let r = match method {
        ReturnMethod::Simple => current / prev - 1.0,
        ReturnMethod::Log => (current / prev).ln(),
    };
    r.is_finite().then_some(r)
}

/// Two return series inner-joined on the local calendar date of each return.
///
/// Both component vectors always have the same length and share `dates`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedReturnsPair {
    dates: Vec<NaiveDate>,
    instrument: Vec<f64>,
    market: Vec<f64>,
}

impl AlignedReturnsPair {
    /// Joins the two series by calendar day after stripping UTC offsets.
    ///
    /// Returns `None` when either input is empty. When a series holds several
    /// returns on the same calendar day, the last one is kept.
    pub fn align(instrument: &ReturnsSeries, market: &ReturnsSeries) -> Option<Self> {
        if instrument.is_empty() || market.is_empty() {
            return None;
        }

        let by_day = |series: &ReturnsSeries| -> BTreeMap<NaiveDate, f64> {
            series
                .iter()
                .map(|(ts, r)| (ts.naive_local().date(), r))
                .collect()
        };
        let instrument_by_day = by_day(instrument);
        let market_by_day = by_day(market);

        let mut dates = Vec::new();
        let mut aligned_instrument = Vec::new();
        let mut aligned_market = Vec::new();
        for (date, r) in instrument_by_day {
            if let Some(&m) = market_by_day.get(&date) {
                dates.push(date);
                aligned_instrument.push(r);
                aligned_market.push(m);
            }
        }

        tracing::trace!(
            instrument_days = instrument.len(),
            market_days = market.len(),
            aligned = dates.len(),
            "Aligned returns by calendar day"
        );
        Some(Self {
            dates,
            instrument: aligned_instrument,
            market: aligned_market,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// True when the pair holds at least `min_points` aligned observations.
    pub fn is_sufficient(&self, min_points: usize) -> bool {
        self.len() >= min_points
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn instrument(&self) -> &[f64] {
        &self.instrument
    }

    pub fn market(&self) -> &[f64] {
        &self.market
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::PricePoint;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use rstest::rstest;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(day(1), closes).unwrap()
    }

    #[test]
    fn simple_returns_have_one_fewer_point() {
        let returns = ReturnsCalculator::simple(&series(&[100.0, 110.0, 99.0]));
        assert_eq!(returns.len(), 2);
        assert_relative_eq!(returns.values()[0], 0.10, epsilon = 1e-12);
        assert_relative_eq!(returns.values()[1], -0.10, epsilon = 1e-12);
        assert_eq!(returns.method(), ReturnMethod::Simple);
    }

    #[test]
    fn log_returns_sum_to_total_log_growth() {
        let prices = series(&[100.0, 105.0, 95.0, 120.0]);
        let returns = ReturnsCalculator::log(&prices);
        let total: f64 = returns.values().iter().sum();
        assert_relative_eq!(total, (120.0_f64 / 100.0).ln(), epsilon = 1e-12);
    }

    #[rstest]
    #[case::empty(&[])]
    #[case::single(&[42.0])]
    fn fewer_than_two_prices_yield_empty_series(#[case] closes: &[f64]) {
        assert!(ReturnsCalculator::simple(&series(closes)).is_empty());
        assert!(ReturnsCalculator::log(&series(closes)).is_empty());
    }

    #[test]
    fn returns_are_stamped_with_the_later_price() {
        let prices = series(&[1.0, 2.0, 3.0]);
        let returns = ReturnsCalculator::simple(&prices);
        assert_eq!(returns.timestamps()[0], prices.points()[1].timestamp);
    }

    #[test]
    fn undefined_periods_are_dropped_not_zeroed() {
        let returns = ReturnsCalculator::from_closes(&[f64::NAN, 10.0, 11.0, 0.0, 5.0], ReturnMethod::Simple);
        // NaN -> 10 and 0 -> 5 are undefined; 10 -> 11 and 11 -> 0 are kept.
        assert_eq!(returns.len(), 2);
        assert_relative_eq!(returns[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(returns[1], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn align_requires_both_inputs() {
        let full = ReturnsCalculator::simple(&series(&[1.0, 2.0, 3.0]));
        let empty = ReturnsSeries::default();
        assert!(AlignedReturnsPair::align(&full, &empty).is_none());
        assert!(AlignedReturnsPair::align(&empty, &full).is_none());
    }

    #[test]
    fn align_matches_calendar_days_across_timezones() {
        // Exchange closes at 15:30 IST, benchmark is stamped at midnight New York time.
        let ist = FixedOffset::east_opt(19_800).unwrap();
        let nyc = FixedOffset::west_opt(5 * 3600).unwrap();
        let instrument = PriceSeries::new(
            (1..=4)
                .map(|d| PricePoint::new(ist.with_ymd_and_hms(2024, 3, d, 15, 30, 0).unwrap(), 100.0 + d as f64))
                .collect(),
        )
        .unwrap();
        let market = PriceSeries::new(
            (2..=5)
                .map(|d| PricePoint::new(nyc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap(), 50.0 * d as f64))
                .collect(),
        )
        .unwrap();

        let pair = AlignedReturnsPair::align(
            &ReturnsCalculator::simple(&instrument),
            &ReturnsCalculator::simple(&market),
        )
        .unwrap();

        // Instrument returns on days 2..=4, market returns on days 3..=5.
        assert_eq!(pair.dates(), &[day(3), day(4)]);
        assert_eq!(pair.instrument().len(), pair.market().len());
        assert_relative_eq!(pair.market()[0], 150.0 / 100.0 - 1.0, epsilon = 1e-12);
        assert!(pair.is_sufficient(2));
        assert!(!pair.is_sufficient(3));
    }

    #[test]
    fn same_day_duplicates_keep_the_last_return() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let intraday = PriceSeries::new(vec![
            PricePoint::new(utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(), 100.0),
            PricePoint::new(utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap(), 110.0),
            PricePoint::new(utc.with_ymd_and_hms(2024, 3, 2, 16, 0, 0).unwrap(), 99.0),
        ])
        .unwrap();
        let daily = series(&[10.0, 20.0]);

        let pair = AlignedReturnsPair::align(
            &ReturnsCalculator::simple(&intraday),
            &ReturnsCalculator::simple(&daily),
        )
        .unwrap();
        assert_eq!(pair.len(), 1);
        assert_relative_eq!(pair.instrument()[0], 99.0 / 110.0 - 1.0, epsilon = 1e-12);
    }
}
