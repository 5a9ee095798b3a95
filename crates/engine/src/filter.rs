//! Client-side filtering over the in-memory transaction list.
//!
//! Filter values are kept as the raw strings typed by the user; a value that
//! does not parse (a half-typed date or amount) leaves that filter inactive
//! instead of hiding every row.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use unicode_normalization::UnicodeNormalization;

use crate::{Transaction, datetime, transaction::OperationType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterField {
    Search,
    DateFrom,
    DateTo,
    Category,
    TransactionType,
    AmountFrom,
    AmountTo,
    Operator,
    Application,
}

impl FilterField {
    pub const ALL: [FilterField; 9] = [
        Self::Search,
        Self::DateFrom,
        Self::DateTo,
        Self::Category,
        Self::TransactionType,
        Self::AmountFrom,
        Self::AmountTo,
        Self::Operator,
        Self::Application,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Search => "Поиск",
            Self::DateFrom => "Дата от",
            Self::DateTo => "Дата до",
            Self::Category => "Категория",
            Self::TransactionType => "Тип транзакции",
            Self::AmountFrom => "Сумма от",
            Self::AmountTo => "Сумма до",
            Self::Operator => "Оператор",
            Self::Application => "Приложение",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filters {
    pub search: String,
    /// `YYYY-MM-DD`, inclusive.
    pub date_from: String,
    /// `YYYY-MM-DD`, inclusive of the whole day.
    pub date_to: String,
    pub category: String,
    pub transaction_type: String,
    pub amount_from: String,
    pub amount_to: String,
    pub operator: String,
    pub application: String,
}

impl Filters {
    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::Search => &self.search,
            FilterField::DateFrom => &self.date_from,
            FilterField::DateTo => &self.date_to,
            FilterField::Category => &self.category,
            FilterField::TransactionType => &self.transaction_type,
            FilterField::AmountFrom => &self.amount_from,
            FilterField::AmountTo => &self.amount_to,
            FilterField::Operator => &self.operator,
            FilterField::Application => &self.application,
        }
    }

    pub fn get_mut(&mut self, field: FilterField) -> &mut String {
        match field {
            FilterField::Search => &mut self.search,
            FilterField::DateFrom => &mut self.date_from,
            FilterField::DateTo => &mut self.date_to,
            FilterField::Category => &mut self.category,
            FilterField::TransactionType => &mut self.transaction_type,
            FilterField::AmountFrom => &mut self.amount_from,
            FilterField::AmountTo => &mut self.amount_to,
            FilterField::Operator => &mut self.operator,
            FilterField::Application => &mut self.application,
        }
    }

    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }

    pub fn is_active(&self) -> bool {
        FilterField::ALL
            .into_iter()
            .any(|field| !self.get(field).is_empty())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|tx| self.matches(tx))
            .cloned()
            .collect()
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        let search = normalize(self.search.trim());
        if !search.is_empty() && !searchable_values(tx).any(|v| normalize(&v).contains(&search)) {
            return false;
        }

        let from = parse_day(&self.date_from).and_then(|d| d.and_hms_opt(0, 0, 0));
        let to = parse_day(&self.date_to).map(|d| d.and_time(end_of_day()));
        if from.is_some() || to.is_some() {
            let Some(when) = tx.date_time.as_deref().and_then(datetime::parse_timestamp) else {
                return false;
            };
            if from.is_some_and(|from| when < from) || to.is_some_and(|to| when > to) {
                return false;
            }
        }

        if !exact(&self.category, &tx.category)
            || !exact(&self.transaction_type, &tx.operation_type)
            || !exact(&self.operator, &tx.operator_seller)
            || !exact(&self.application, &tx.application)
        {
            return false;
        }

        if parse_amount(&self.amount_from).is_some_and(|min| tx.amount < min) {
            return false;
        }
        if parse_amount(&self.amount_to).is_some_and(|max| tx.amount > max) {
            return false;
        }

        true
    }
}

/// Distinct, sorted, non-empty values of a descriptive column, used to feed
/// the filter pickers.
pub fn unique_values(transactions: &[Transaction], field: FilterField) -> Vec<String> {
    let values: BTreeSet<String> = transactions
        .iter()
        .filter_map(|tx| match field {
            FilterField::Category => Some(tx.category.clone()),
            FilterField::Operator => Some(tx.operator_seller.clone()),
            FilterField::Application => Some(tx.application.clone()),
            FilterField::TransactionType => Some(tx.operation_type.clone()),
            _ => None,
        })
        .filter(|value| !value.is_empty())
        .collect();
    values.into_iter().collect()
}

fn searchable_values(tx: &Transaction) -> impl Iterator<Item = String> + '_ {
    let label = tx.kind().map(OperationType::label).unwrap_or_default();
    [
        tx.id.to_string(),
        tx.receipt_number.clone(),
        tx.date_time.clone().unwrap_or_default(),
        tx.operator_seller.clone(),
        tx.application.clone(),
        tx.amount.to_string(),
        tx.balance.map(|b| b.to_string()).unwrap_or_default(),
        tx.card_number.clone(),
        tx.operation_type.clone(),
        label.to_string(),
        tx.currency.clone(),
        tx.data_source.clone(),
        tx.category.clone(),
        tx.description.clone(),
    ]
    .into_iter()
}

fn normalize(value: &str) -> String {
    value.nfc().collect::<String>().to_lowercase()
}

fn exact(filter: &str, value: &str) -> bool {
    filter.is_empty() || filter == value
}

fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

fn parse_amount(value: &str) -> Option<f64> {
    value.trim().replace(',', ".").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: i64, date: &str, amount: f64, operator: &str, category: &str) -> Transaction {
        Transaction {
            id,
            date_time: Some(date.to_string()),
            operation_type: "payment".to_string(),
            amount,
            balance: None,
            currency: "UZS".to_string(),
            card_number: "6714".to_string(),
            operator_id: None,
            operator_seller: operator.to_string(),
            application: "Milliy 2.0".to_string(),
            category: category.to_string(),
            data_source: String::new(),
            description: String::new(),
            receipt_number: String::new(),
            raw_text: None,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx(1, "2025-04-04T18:46:00", 6_000_000.0, "HUMO", "Переводы"),
            tx(2, "2025-04-05T12:58:00", 400_000.0, "OQ", "Переводы"),
            tx(3, "2025-04-06T23:00:00", 11_488_000.0, "HUMO", "Пополнения"),
        ]
    }

    fn ids(list: &[Transaction]) -> Vec<i64> {
        list.iter().map(|t| t.id).collect()
    }

    #[test]
    fn empty_filters_keep_everything() {
        let filters = Filters::default();
        assert!(!filters.is_active());
        assert_eq!(ids(&filters.apply(&sample())), vec![1, 2, 3]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let mut filters = Filters::default();
        filters.set(FilterField::Search, "humo");
        assert!(filters.is_active());
        assert_eq!(ids(&filters.apply(&sample())), vec![1, 3]);

        filters.set(FilterField::Search, "ПОПОЛН");
        assert_eq!(ids(&filters.apply(&sample())), vec![3]);
    }

    #[test]
    fn date_to_includes_the_whole_day() {
        let mut filters = Filters::default();
        filters.set(FilterField::DateFrom, "2025-04-05");
        filters.set(FilterField::DateTo, "2025-04-06");
        assert_eq!(ids(&filters.apply(&sample())), vec![2, 3]);
    }

    #[test]
    fn amount_bounds_are_inclusive() {
        let mut filters = Filters::default();
        filters.set(FilterField::AmountFrom, "400000");
        filters.set(FilterField::AmountTo, "6000000");
        assert_eq!(ids(&filters.apply(&sample())), vec![1, 2]);
    }

    #[test]
    fn unparseable_bounds_are_ignored() {
        let mut filters = Filters::default();
        filters.set(FilterField::AmountFrom, "12a");
        filters.set(FilterField::DateFrom, "2025-0");
        assert_eq!(ids(&filters.apply(&sample())), vec![1, 2, 3]);
    }

    #[test]
    fn exact_matches_combine() {
        let mut filters = Filters::default();
        filters.set(FilterField::Operator, "HUMO");
        filters.set(FilterField::Category, "Переводы");
        assert_eq!(ids(&filters.apply(&sample())), vec![1]);

        filters.clear();
        assert!(!filters.is_active());
    }

    #[test]
    fn unique_values_are_sorted_and_distinct() {
        assert_eq!(
            unique_values(&sample(), FilterField::Operator),
            vec!["HUMO".to_string(), "OQ".to_string()]
        );
    }
}
