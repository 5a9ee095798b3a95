use serde::{Deserialize, Serialize};

/// Error body returned by the backend on non-2xx responses.
///
/// Route handlers answer with `{error}`; the global error handler adds a
/// human readable `message` next to a short `error` title.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Returns the most specific message carried by the body, if any.
    pub fn into_message(self) -> Option<String> {
        self.message
            .filter(|m| !m.trim().is_empty())
            .or(self.error.filter(|e| !e.trim().is_empty()))
    }
}

pub mod transaction {
    use super::*;

    /// Transaction as serialized by the backend.
    ///
    /// Every descriptive field is optional: older backend revisions omit
    /// them and the client fills its own defaults.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct ApiTransaction {
        pub id: i64,
        #[serde(default)]
        pub user_id: Option<i64>,
        #[serde(default)]
        pub date_time: Option<String>,
        #[serde(default)]
        pub operation_type: Option<String>,
        #[serde(default)]
        pub amount: Option<f64>,
        #[serde(default)]
        pub currency: Option<String>,
        #[serde(default)]
        pub card_number: Option<String>,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub balance: Option<f64>,
        #[serde(default)]
        pub operator_id: Option<i64>,
        #[serde(default)]
        pub operator_name: Option<String>,
        #[serde(default)]
        pub operator_description: Option<String>,
        #[serde(default)]
        pub raw_text: Option<String>,
        #[serde(default)]
        pub is_deleted: Option<bool>,
        #[serde(default)]
        pub created_at: Option<String>,
        #[serde(default)]
        pub data_source: Option<String>,
        #[serde(default)]
        pub category: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        #[serde(default)]
        pub transactions: Vec<ApiTransaction>,
        #[serde(default)]
        pub total: Option<u64>,
        #[serde(default)]
        pub pages: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionResponse {
        pub transaction: ApiTransaction,
    }

    /// Body of `POST /api/transactions`.
    ///
    /// Optional keys are omitted rather than sent as `null`: the backend
    /// treats a missing key as "unspecified".
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ManualTransactionNew {
        pub telegram_id: i64,
        pub date_time: String,
        pub operation_type: String,
        pub amount: f64,
        pub currency: String,
        pub description: String,
        pub raw_text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub balance: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub card_number: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub operator_id: Option<serde_json::Value>,
    }

    /// Body of `PUT /api/transactions/{id}`. Only present keys are updated.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub telegram_id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub date_time: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub operation_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amount: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub currency: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub card_number: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub balance: Option<f64>,
    }

    /// Generic acknowledgement for trash operations.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ActionResponse {
        #[serde(default)]
        pub success: Option<bool>,
        #[serde(default)]
        pub message: Option<String>,
    }
}

pub mod ai {
    use super::*;
    use crate::transaction::ApiTransaction;

    /// Body of `POST /api/ai/parse-and-save`.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ParseAndSave {
        pub text: String,
        pub telegram_id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub username: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParseAndSaveResponse {
        pub transaction: ApiTransaction,
        /// Fields extracted by the parser, shown as a preview only.
        #[serde(default)]
        pub parsed_data: Option<serde_json::Value>,
    }
}

pub mod operator {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Operator {
        pub id: i64,
        pub name: String,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub user_id: Option<i64>,
        #[serde(default)]
        pub is_global: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OperatorsResponse {
        #[serde(default)]
        pub operators: Vec<Operator>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OperatorResponse {
        pub operator: Operator,
    }

    /// Body of `POST /api/operators` and `PUT /api/operators/{id}`.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct OperatorUpsert {
        pub name: String,
        pub description: String,
        pub telegram_id: i64,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Category {
        #[serde(default)]
        pub id: Option<i64>,
        pub name: String,
        #[serde(default)]
        pub description: Option<String>,
    }

    /// `GET /api/categories` answers either with a bare array or with
    /// `{categories: [...]}` depending on the backend revision.
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum CategoriesResponse {
        List(Vec<Category>),
        Wrapped {
            #[serde(default)]
            categories: Vec<Category>,
        },
    }

    impl CategoriesResponse {
        pub fn into_vec(self) -> Vec<Category> {
            match self {
                Self::List(list) => list,
                Self::Wrapped { categories } => categories,
            }
        }
    }
}

pub mod formatting {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Alignment {
        #[default]
        Left,
        Center,
        Right,
    }

    impl Alignment {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Left => "left",
                Self::Center => "center",
                Self::Right => "right",
            }
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct ColumnFormatting {
        #[serde(default)]
        pub alignment: Option<Alignment>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ColumnsFormattingResponse {
        #[serde(default)]
        pub columns: BTreeMap<String, ColumnFormatting>,
    }

    /// Body of `PUT /api/formatting/columns/{name}`; `alignment: null`
    /// deletes the stored record.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ColumnAlignmentUpdate {
        pub telegram_id: i64,
        pub alignment: Option<Alignment>,
    }
}
