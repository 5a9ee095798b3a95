use api_types::transaction::ApiTransaction;
use serde::{Deserialize, Serialize};

use crate::datetime;

pub const DEFAULT_CURRENCY: &str = "UZS";

/// Known operation codes. Codes outside this set are kept verbatim on the
/// transaction and rendered as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Payment,
    Refill,
    Conversion,
    Cancel,
    P2p,
}

impl OperationType {
    pub const ALL: [OperationType; 5] = [
        Self::Payment,
        Self::Refill,
        Self::Conversion,
        Self::Cancel,
        Self::P2p,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Refill => "refill",
            Self::Conversion => "conversion",
            Self::Cancel => "cancel",
            Self::P2p => "p2p",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Payment => "Оплата",
            Self::Refill => "Пополнение",
            Self::Conversion => "Конверсия",
            Self::Cancel => "Отмена",
            Self::P2p => "P2P-перевод",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code().eq_ignore_ascii_case(code.trim()))
    }
}

/// Client-side copy of a backend transaction, already transformed for
/// display and filtering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// Normalized `YYYY-MM-DDTHH:MM:SS`, `None` when the backend value did
    /// not parse.
    pub date_time: Option<String>,
    /// Lower-cased operation code.
    pub operation_type: String,
    pub amount: f64,
    pub balance: Option<f64>,
    pub currency: String,
    pub card_number: String,
    pub operator_id: Option<i64>,
    pub operator_seller: String,
    pub application: String,
    pub category: String,
    pub data_source: String,
    pub description: String,
    pub receipt_number: String,
    pub raw_text: Option<String>,
}

/// Defaults applied while ingesting backend records.
#[derive(Clone, Debug)]
pub struct IngestDefaults {
    pub currency: String,
}

impl Default for IngestDefaults {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// A change reported by a view to the owner of the transaction list.
///
/// Removal is a message rather than a flag on the record.
#[derive(Clone, Debug, PartialEq)]
pub enum TransactionChange {
    Updated(Transaction),
    Deleted(i64),
}

impl Transaction {
    pub fn from_api(api: ApiTransaction, defaults: &IngestDefaults) -> Self {
        let operation_type = api
            .operation_type
            .as_deref()
            .map(|op| op.trim().to_lowercase())
            .filter(|op| !op.is_empty())
            .unwrap_or_else(|| OperationType::Payment.code().to_string());

        let currency = api
            .currency
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| defaults.currency.clone());

        let raw_text = api.raw_text.filter(|text| !text.trim().is_empty());
        let receipt_number = raw_text.as_deref().map(receipt_number).unwrap_or_default();

        Self {
            id: api.id,
            date_time: datetime::normalize_timestamp(api.date_time.as_deref()),
            operation_type,
            amount: api.amount.unwrap_or(0.0),
            balance: api.balance,
            currency,
            card_number: api.card_number.unwrap_or_default().trim().to_string(),
            operator_id: api.operator_id,
            operator_seller: api.operator_name.unwrap_or_default(),
            application: api.operator_description.unwrap_or_default(),
            category: api.category.unwrap_or_default(),
            data_source: api.data_source.unwrap_or_default(),
            description: api.description.unwrap_or_default(),
            receipt_number,
            raw_text,
        }
    }

    pub fn kind(&self) -> Option<OperationType> {
        OperationType::from_code(&self.operation_type)
    }

    pub fn is_p2p(&self) -> bool {
        self.kind() == Some(OperationType::P2p)
    }
}

/// First line of the raw receipt up to the first `:`.
fn receipt_number(raw_text: &str) -> String {
    let first_line = raw_text.lines().next().unwrap_or("");
    first_line
        .split(':')
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(id: i64) -> ApiTransaction {
        ApiTransaction {
            id,
            ..ApiTransaction::default()
        }
    }

    #[test]
    fn missing_descriptive_fields_become_empty() {
        let tx = Transaction::from_api(api(1), &IngestDefaults::default());
        assert_eq!(tx.operator_seller, "");
        assert_eq!(tx.application, "");
        assert_eq!(tx.category, "");
        assert_eq!(tx.data_source, "");
        assert_eq!(tx.card_number, "");
        assert_eq!(tx.receipt_number, "");
        assert_eq!(tx.currency, "UZS");
        assert_eq!(tx.operation_type, "payment");
        assert_eq!(tx.date_time, None);
    }

    #[test]
    fn operation_type_is_lower_cased() {
        let tx = Transaction::from_api(
            ApiTransaction {
                operation_type: Some("P2P".to_string()),
                ..api(2)
            },
            &IngestDefaults::default(),
        );
        assert_eq!(tx.operation_type, "p2p");
        assert!(tx.is_p2p());
    }

    #[test]
    fn receipt_number_comes_from_first_line() {
        let tx = Transaction::from_api(
            ApiTransaction {
                raw_text: Some("HUMOCARD *6714: oplata 6000000.00 UZS\nsecond: line".to_string()),
                date_time: Some("2025-04-04 18:46:00".to_string()),
                ..api(3)
            },
            &IngestDefaults::default(),
        );
        assert_eq!(tx.receipt_number, "HUMOCARD *6714");
        assert_eq!(tx.date_time.as_deref(), Some("2025-04-04T18:46:00"));
    }

    #[test]
    fn configured_currency_is_the_fallback() {
        let defaults = IngestDefaults {
            currency: "USD".to_string(),
        };
        let tx = Transaction::from_api(api(4), &defaults);
        assert_eq!(tx.currency, "USD");
    }
}
