use crate::error::CoreError;
use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A single closing price observation.
///
/// The timestamp keeps whatever UTC offset the data source reported. The offset is
/// only stripped when two series are aligned by calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<FixedOffset>,
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<FixedOffset>, close: f64) -> Self {
        Self { timestamp, close }
    }

    /// The calendar day of this observation in the exchange's local time.
    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.naive_local().date()
    }
}

/// A validated, strictly time-ordered series of positive closing prices.
///
/// The series is owned by the caller and never mutated by the engine; every
/// computation derives new values from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series, rejecting non-monotonic timestamps and non-positive prices.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, CoreError> {
        for (index, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(CoreError::InvalidPrice {
                    index,
                    price: point.close,
                });
            }
        }

        if let Some(offending) = points
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(CoreError::NonMonotonicTimestamp {
                index: offending + 1,
            });
        }

        Ok(Self { points })
    }

    /// Builds a daily series (midnight UTC, one calendar day apart) from bare closes.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Result<Self, CoreError> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let day = start.checked_add_days(Days::new(i as u64)).ok_or_else(|| {
                    CoreError::InvalidInput(
                        "start".to_string(),
                        format!("{start} + {i} days is out of range"),
                    )
                })?;
                let timestamp = day.and_time(NaiveTime::MIN).and_utc().fixed_offset();
                Ok(PricePoint::new(timestamp, close))
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        Self::new(points)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    /// The closing prices in time order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn first_close(&self) -> Option<f64> {
        self.points.first().map(|p| p.close)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }

    /// The most recent `n` observations (the whole series if it is shorter).
    pub fn tail(&self, n: usize) -> PriceSeries {
        let start = self.points.len().saturating_sub(n);
        Self {
            points: self.points[start..].to_vec(),
        }
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = CoreError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}
