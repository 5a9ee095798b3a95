//! Inline cell editing: which columns map to updatable backend fields.

use api_types::transaction::TransactionUpdate;
use thiserror::Error;

use super::Column;
use crate::{OperationType, Transaction, datetime, form::parse_number};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Колонка «{0}» не редактируется")]
    NotEditable(&'static str),
    #[error("{0}")]
    Invalid(String),
}

pub fn is_editable(column: Column) -> bool {
    matches!(
        column,
        Column::DateTime
            | Column::Amount
            | Column::Balance
            | Column::CardNumber
            | Column::TransactionType
            | Column::Currency
    )
}

/// Raw value the editor starts from.
pub fn edit_seed(tx: &Transaction, column: Column) -> String {
    match column {
        Column::DateTime => tx
            .date_time
            .as_deref()
            .and_then(datetime::parse_timestamp)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default(),
        Column::Amount => tx.amount.to_string(),
        Column::Balance => tx.balance.map(|b| b.to_string()).unwrap_or_default(),
        Column::CardNumber => tx.card_number.clone(),
        Column::TransactionType => tx.operation_type.clone(),
        Column::Currency => tx.currency.clone(),
        _ => String::new(),
    }
}

/// Builds the `PUT` body for one edited cell.
pub fn cell_update(
    column: Column,
    raw: &str,
    telegram_id: i64,
) -> Result<TransactionUpdate, EditError> {
    let value = raw.trim();
    let mut update = TransactionUpdate {
        telegram_id,
        ..TransactionUpdate::default()
    };

    match column {
        Column::DateTime => {
            let parsed = datetime::parse_timestamp(value)
                .ok_or_else(|| EditError::Invalid("Укажите корректные дату и время".to_string()))?;
            update.date_time = Some(parsed.format(datetime::ISO_FORMAT).to_string());
        }
        Column::Amount => {
            update.amount = Some(number(value)?);
        }
        Column::Balance => {
            update.balance = Some(number(value)?);
        }
        Column::CardNumber => {
            let digits = value.chars().count() == 4 && value.chars().all(|c| c.is_ascii_digit());
            if !value.is_empty() && !digits {
                return Err(EditError::Invalid(
                    "Введите последние четыре цифры карты".to_string(),
                ));
            }
            update.card_number = Some(value.to_string());
        }
        Column::TransactionType => {
            let kind = OperationType::from_code(value)
                .or_else(|| {
                    OperationType::ALL
                        .into_iter()
                        .find(|kind| kind.label().to_lowercase() == value.to_lowercase())
                })
                .ok_or_else(|| EditError::Invalid(format!("Неизвестный тип операции: {value}")))?;
            update.operation_type = Some(kind.code().to_string());
        }
        Column::Currency => {
            if value.chars().count() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(EditError::Invalid("Код валюты состоит из трёх букв".to_string()));
            }
            update.currency = Some(value.to_ascii_uppercase());
        }
        other => return Err(EditError::NotEditable(other.label())),
    }

    Ok(update)
}

fn number(value: &str) -> Result<f64, EditError> {
    parse_number(value).ok_or_else(|| EditError::Invalid("Введите числовое значение".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_partial_updates() {
        let update = cell_update(Column::Amount, " 1500,5 ", 7).unwrap();
        assert_eq!(update.telegram_id, 7);
        assert_eq!(update.amount, Some(1500.5));
        assert_eq!(update.currency, None);

        let json = serde_json::to_value(cell_update(Column::Currency, "usd", 7).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"telegram_id": 7, "currency": "USD"}));

        let update = cell_update(Column::DateTime, "2025-04-04 18:46", 7).unwrap();
        assert_eq!(update.date_time.as_deref(), Some("2025-04-04T18:46:00"));

        let update = cell_update(Column::TransactionType, "Пополнение", 7).unwrap();
        assert_eq!(update.operation_type.as_deref(), Some("refill"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(cell_update(Column::Amount, "abc", 1).is_err());
        assert!(cell_update(Column::CardNumber, "12345", 1).is_err());
        assert!(cell_update(Column::Currency, "US", 1).is_err());
        assert!(cell_update(Column::TransactionType, "refund", 1).is_err());
        assert_eq!(
            cell_update(Column::Category, "x", 1),
            Err(EditError::NotEditable("Категория"))
        );
        assert!(!is_editable(Column::Actions));
    }
}
