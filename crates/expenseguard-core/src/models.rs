//! Domain models for ExpenseGuard

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One uploaded row: column name to scalar value, in upload column order
pub type Record = Map<String, Value>;

/// An uploaded row-set
///
/// `columns` is the schema of the upload (CSV header, or the union of JSON
/// keys in first-seen order). A column can be present in the batch while an
/// individual record holds `null` for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Batch {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Spending category, declared in match priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Groceries")]
    Groceries,
    #[serde(rename = "Gas/Automotive")]
    GasAutomotive,
    #[serde(rename = "Restaurants/Dining")]
    RestaurantsDining,
    #[serde(rename = "Utilities")]
    Utilities,
    #[serde(rename = "Subscriptions/Entertainment")]
    SubscriptionsEntertainment,
    #[serde(rename = "Shopping/General")]
    ShoppingGeneral,
    #[serde(rename = "Travel/Transport")]
    TravelTransport,
    #[serde(rename = "Health/Wellness")]
    HealthWellness,
    /// Categorization was attempted and no keyword matched
    #[serde(rename = "Miscellaneous")]
    Miscellaneous,
    /// No text description was available to categorize
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groceries => "Groceries",
            Self::GasAutomotive => "Gas/Automotive",
            Self::RestaurantsDining => "Restaurants/Dining",
            Self::Utilities => "Utilities",
            Self::SubscriptionsEntertainment => "Subscriptions/Entertainment",
            Self::ShoppingGeneral => "Shopping/General",
            Self::TravelTransport => "Travel/Transport",
            Self::HealthWellness => "Health/Wellness",
            Self::Miscellaneous => "Miscellaneous",
            Self::NotAvailable => "N/A",
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Self::Groceries,
            Self::GasAutomotive,
            Self::RestaurantsDining,
            Self::Utilities,
            Self::SubscriptionsEntertainment,
            Self::ShoppingGeneral,
            Self::TravelTransport,
            Self::HealthWellness,
            Self::Miscellaneous,
            Self::NotAvailable,
        ]
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Binary fraud model output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FraudLabel {
    Normal,
    Fraud,
}

impl FraudLabel {
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Fraud => 1,
        }
    }

    pub fn is_fraud(&self) -> bool {
        matches!(self, Self::Fraud)
    }
}

impl From<bool> for FraudLabel {
    fn from(fraud: bool) -> Self {
        if fraud {
            Self::Fraud
        } else {
            Self::Normal
        }
    }
}

/// Fraud-path row after schema validation
#[derive(Debug, Clone, PartialEq)]
pub struct FraudRow {
    /// Opaque model inputs V1..V28
    pub v: [f64; 28],
    /// Unscaled amount
    pub amount: f64,
}

/// Forecast-path row after schema validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedAmount {
    /// Seconds since the Unix epoch
    pub time: f64,
    pub amount: f64,
}

/// Summed amount for one calendar day (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyPoint {
    pub day: NaiveDate,
    pub amount: f64,
}

/// One row returned by a forecasting model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRow {
    pub day: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Forecast point as sent to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Calendar date, `YYYY-MM-DD`
    pub ds: String,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Response payload for the fraud path
#[derive(Debug, Clone, Serialize)]
pub struct FraudReport {
    pub message: String,
    pub total_transactions: usize,
    pub transactions_flagged_as_fraud: usize,
    /// Distinct categories, in order of first appearance
    pub categories_found: Vec<Category>,
    /// Every original column plus `is_fraud` and `category`
    pub all_transactions: Vec<Record>,
}

/// Response payload for the forecast path
#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub forecast: Vec<ForecastPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_to_display_name() {
        let json = serde_json::to_string(&Category::RestaurantsDining).unwrap();
        assert_eq!(json, "\"Restaurants/Dining\"");
        let json = serde_json::to_string(&Category::NotAvailable).unwrap();
        assert_eq!(json, "\"N/A\"");
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("groceries".parse::<Category>(), Ok(Category::Groceries));
        assert_eq!("N/A".parse::<Category>(), Ok(Category::NotAvailable));
        assert!("Pets".parse::<Category>().is_err());
    }

    #[test]
    fn test_fraud_label() {
        assert_eq!(FraudLabel::from(true).as_u8(), 1);
        assert!(!FraudLabel::Normal.is_fraud());
    }
}
