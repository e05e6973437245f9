use crate::error::RiskError;
use configuration::{BetaParams, ReferenceTables};
use std::collections::HashMap;
use std::path::Path;

/// Strips exchange decorations from a ticker code.
///
/// `"infy.ns"`, `"INFY.BO"` and `" INFY "` all normalize to `"INFY"`; an index code
/// such as `"^NSEI"` normalizes to `"NSEI"`.
pub fn normalize_ticker(code: &str) -> String {
    let trimmed = code.trim();
    let trimmed = trimmed.strip_prefix('^').unwrap_or(trimmed);
    trimmed
        .split('.')
        .next()
        .unwrap_or_default()
        .trim()
        .to_uppercase()
}

fn sector_key(sector: &str) -> String {
    sector.trim().to_lowercase()
}

/// Validated static beta and sector tables used by the fallback tiers.
///
/// Tickers are stored normalized and sector names case-insensitively, so lookups
/// do not depend on how the source file spelled them.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    betas: HashMap<String, f64>,
    sectors: HashMap<String, String>,
    /// Explicit sector betas, completed with member averages.
    sector_betas: HashMap<String, f64>,
}

impl ReferenceData {
    /// Reference data with no entries. Both fallback tiers are then inapplicable.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validates raw tables against the plausible beta range.
    pub fn from_tables(tables: ReferenceTables, params: &BetaParams) -> Result<Self, RiskError> {
        let mut betas = HashMap::with_capacity(tables.betas.len());
        for (code, beta) in tables.betas {
            let ticker = normalize_ticker(&code);
            if ticker.is_empty() {
                return Err(RiskError::InvalidReferenceData(format!(
                    "empty ticker code '{code}' in beta table"
                )));
            }
            if !params.is_plausible(beta) {
                return Err(RiskError::InvalidReferenceData(format!(
                    "static beta {beta} for {ticker} is outside ({}, {})",
                    params.min_beta, params.max_beta
                )));
            }
            if let Some(previous) = betas.insert(ticker.clone(), beta) {
                if previous != beta {
                    return Err(RiskError::InvalidReferenceData(format!(
                        "conflicting static betas {previous} and {beta} for {ticker}"
                    )));
                }
            }
        }

        let mut sectors = HashMap::with_capacity(tables.sectors.len());
        for (code, sector) in tables.sectors {
            let ticker = normalize_ticker(&code);
            if ticker.is_empty() || sector.trim().is_empty() {
                return Err(RiskError::InvalidReferenceData(format!(
                    "incomplete sector entry '{code}' = '{sector}'"
                )));
            }
            sectors.insert(ticker, sector.trim().to_string());
        }

        let mut sector_betas = HashMap::new();
        for (sector, beta) in tables.sector_betas {
            if !params.is_plausible(beta) {
                return Err(RiskError::InvalidReferenceData(format!(
                    "sector beta {beta} for '{sector}' is outside ({}, {})",
                    params.min_beta, params.max_beta
                )));
            }
            sector_betas.insert(sector_key(&sector), beta);
        }

        // Sectors without an explicit beta take the mean of their members' static betas.
        let mut members: HashMap<String, Vec<f64>> = HashMap::new();
        for (ticker, sector) in &sectors {
            if let Some(beta) = betas.get(ticker) {
                members.entry(sector_key(sector)).or_default().push(*beta);
            }
        }
        for (key, values) in members {
            sector_betas
                .entry(key)
                .or_insert_with(|| values.iter().sum::<f64>() / values.len() as f64);
        }

        tracing::debug!(
            betas = betas.len(),
            sectors = sectors.len(),
            sector_betas = sector_betas.len(),
            "Reference data loaded"
        );

        Ok(Self {
            betas,
            sectors,
            sector_betas,
        })
    }

    /// Reads and validates a reference file.
    pub fn load(path: impl AsRef<Path>, params: &BetaParams) -> Result<Self, RiskError> {
        let tables = configuration::load_reference_tables(path)?;
        Self::from_tables(tables, params)
    }

    pub fn beta(&self, ticker: &str) -> Option<f64> {
        self.betas.get(&normalize_ticker(ticker)).copied()
    }

    pub fn sector(&self, ticker: &str) -> Option<&str> {
        self.sectors.get(&normalize_ticker(ticker)).map(String::as_str)
    }

    /// The sector's beta: explicit if configured, otherwise the mean of its members.
    pub fn sector_beta(&self, sector: &str) -> Option<f64> {
        self.sector_betas.get(&sector_key(sector)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.betas.is_empty() && self.sectors.is_empty() && self.sector_betas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tables() -> ReferenceTables {
        ReferenceTables {
            betas: HashMap::from([
                ("INFY.NS".to_string(), 0.8),
                ("tcs".to_string(), 0.6),
                ("HDFCBANK".to_string(), 1.1),
            ]),
            sectors: HashMap::from([
                ("INFY".to_string(), "IT".to_string()),
                ("TCS".to_string(), "IT".to_string()),
                ("WIPRO".to_string(), "IT".to_string()),
                ("HDFCBANK".to_string(), "Banks".to_string()),
                ("ICICIBANK".to_string(), "Banks".to_string()),
            ]),
            sector_betas: HashMap::from([("banks".to_string(), 1.2)]),
        }
    }

    #[rstest]
    #[case("INFY.NS", "INFY")]
    #[case("infy.bo", "INFY")]
    #[case("  TCS ", "TCS")]
    #[case("^NSEI", "NSEI")]
    #[case("M&M.NS", "M&M")]
    #[case("", "")]
    fn normalizes_ticker_codes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_ticker(input), expected);
    }

    #[test]
    fn lookups_ignore_exchange_suffix_and_case() {
        let data = ReferenceData::from_tables(tables(), &BetaParams::default()).unwrap();
        assert_eq!(data.beta("infy.ns"), Some(0.8));
        assert_eq!(data.beta("TCS.BO"), Some(0.6));
        assert_eq!(data.sector("wipro"), Some("IT"));
        assert_eq!(data.beta("WIPRO"), None);
    }

    #[test]
    fn sector_beta_prefers_explicit_value() {
        let data = ReferenceData::from_tables(tables(), &BetaParams::default()).unwrap();
        assert_eq!(data.sector_beta("Banks"), Some(1.2));
    }

    #[test]
    fn sector_beta_falls_back_to_member_mean() {
        let data = ReferenceData::from_tables(tables(), &BetaParams::default()).unwrap();
        let it = data.sector_beta("it").unwrap();
        assert!((it - 0.7).abs() < 1e-12);
    }

    #[test]
    fn rejects_implausible_static_beta() {
        let mut raw = tables();
        raw.betas.insert("ADANIENT".to_string(), 7.5);
        let result = ReferenceData::from_tables(raw, &BetaParams::default());
        assert!(matches!(result, Err(RiskError::InvalidReferenceData(_))));
    }

    #[test]
    fn rejects_conflicting_duplicates_after_normalization() {
        let mut raw = tables();
        raw.betas.insert("INFY".to_string(), 0.9);
        assert!(ReferenceData::from_tables(raw, &BetaParams::default()).is_err());
    }

    #[test]
    fn empty_reference_data_has_no_entries() {
        let data = ReferenceData::empty();
        assert!(data.is_empty());
        assert_eq!(data.sector_beta("IT"), None);
    }
}
