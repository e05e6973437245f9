use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fundamental ratios of an instrument. Every field may be absent.
///
/// Ratios are plain fractions (a 18% ROE is `0.18`); `debt_to_equity` is a multiple.
/// Deserialisation accepts the vendor's camelCase keys as aliases; the balance-sheet
/// derivations are only applied by `from_pairs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fundamentals {
    // Valuation
    #[serde(alias = "trailingPE", alias = "pe_ratio")]
    pub trailing_pe: Option<f64>,
    #[serde(alias = "priceToBook", alias = "pb_ratio")]
    pub price_to_book: Option<f64>,
    #[serde(alias = "priceToSalesTrailing12Months", alias = "ps_ratio")]
    pub price_to_sales: Option<f64>,
    #[serde(alias = "dividendYield")]
    pub dividend_yield: Option<f64>,
    #[serde(alias = "marketCap")]
    pub market_cap: Option<f64>,
    #[serde(alias = "pegRatio")]
    pub peg_ratio: Option<f64>,

    // Quality
    #[serde(alias = "returnOnEquity", alias = "roe")]
    pub return_on_equity: Option<f64>,
    #[serde(alias = "profitMargins", alias = "npm")]
    pub net_margin: Option<f64>,
    #[serde(alias = "returnOnAssets", alias = "roa")]
    pub return_on_assets: Option<f64>,
    #[serde(alias = "returnOnCapital", alias = "roic")]
    pub return_on_invested_capital: Option<f64>,

    // Financial health
    #[serde(alias = "debtToEquity")]
    pub debt_to_equity: Option<f64>,
    #[serde(alias = "currentRatio")]
    pub current_ratio: Option<f64>,
    #[serde(alias = "interestCoverage")]
    pub interest_coverage: Option<f64>,

    // Growth
    #[serde(alias = "revenueGrowth", alias = "revenue_growth_yoy")]
    pub revenue_growth: Option<f64>,
    #[serde(alias = "earningsGrowth", alias = "earnings_growth_yoy")]
    pub earnings_growth: Option<f64>,
}

impl Fundamentals {
    /// Builds the ratios from a flat key/value mapping as delivered by a data vendor.
    ///
    /// Both snake_case names and the vendor's camelCase keys are recognised. Non-finite
    /// values count as absent. Debt/equity, current ratio and interest coverage fall back
    /// to being derived from their balance-sheet components when not reported directly.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let raw: HashMap<&str, f64> = pairs.into_iter().filter(|(_, v)| v.is_finite()).collect();
        let get = |keys: &[&str]| keys.iter().find_map(|k| raw.get(k).copied());
        // Zero is treated as "not reported" for the balance-sheet components.
        let non_zero = |keys: &[&str]| get(keys).filter(|v| *v != 0.0);

        let debt_to_equity = get(&["debt_to_equity", "debtToEquity"]).or_else(|| {
            let total_debt = non_zero(&["total_debt", "totalDebt"])?;
            if let Some(equity) = non_zero(&["total_equity", "totalEquity"]).filter(|e| *e > 0.0) {
                return Some(total_debt / equity);
            }
            let book_value = non_zero(&["book_value", "bookValue"])?;
            let shares = non_zero(&["shares_outstanding", "sharesOutstanding"]).unwrap_or(1.0);
            let book_equity = book_value * shares;
            (book_equity > 0.0).then(|| total_debt / book_equity)
        });

        let current_ratio = get(&["current_ratio", "currentRatio"]).or_else(|| {
            let assets = non_zero(&["current_assets", "currentAssets"])?;
            let liabilities = non_zero(&["current_liabilities", "currentLiabilities"])?;
            (liabilities > 0.0).then(|| assets / liabilities)
        });

        let interest_coverage = get(&["interest_coverage", "interestCoverage"]).or_else(|| {
            let earnings = non_zero(&["ebit"]).or_else(|| non_zero(&["operating_income", "operatingIncome"]))?;
            let interest = non_zero(&["interest_expense", "interestExpense"])?;
            (interest > 0.0).then(|| earnings / interest)
        });

        Self {
            trailing_pe: get(&["trailing_pe", "trailingPE", "pe_ratio"]),
            price_to_book: get(&["price_to_book", "priceToBook", "pb_ratio"]),
            price_to_sales: get(&["price_to_sales", "priceToSalesTrailing12Months", "ps_ratio"]),
            dividend_yield: get(&["dividend_yield", "dividendYield"]),
            market_cap: get(&["market_cap", "marketCap"]),
            peg_ratio: get(&["peg_ratio", "pegRatio"]),
            return_on_equity: get(&["return_on_equity", "returnOnEquity", "roe"]),
            net_margin: get(&["net_margin", "profitMargins", "npm"]),
            return_on_assets: get(&["return_on_assets", "returnOnAssets", "roa"]),
            return_on_invested_capital: get(&["return_on_invested_capital", "returnOnCapital", "roic"]),
            debt_to_equity,
            current_ratio,
            interest_coverage,
            revenue_growth: get(&["revenue_growth", "revenueGrowth", "revenue_growth_yoy"]),
            earnings_growth: get(&["earnings_growth", "earningsGrowth", "earnings_growth_yoy"]),
        }
    }

    /// Number of ratios that are present.
    pub fn available(&self) -> usize {
        [
            self.trailing_pe,
            self.price_to_book,
            self.price_to_sales,
            self.dividend_yield,
            self.market_cap,
            self.peg_ratio,
            self.return_on_equity,
            self.net_margin,
            self.return_on_assets,
            self.return_on_invested_capital,
            self.debt_to_equity,
            self.current_ratio,
            self.interest_coverage,
            self.revenue_growth,
            self.earnings_growth,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}
