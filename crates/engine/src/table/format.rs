//! Cell projections for the transaction table.

use super::Column;
use crate::{Transaction, datetime};

const GROUP_SEPARATOR: char = '\u{a0}';
const DECIMAL_SEPARATOR: char = ',';
const MAX_FRACTION_DIGITS: u32 = 3;

/// Display text of `column` for `tx`. Pure.
pub fn format_cell(tx: &Transaction, column: Column) -> String {
    let when = tx.date_time.as_deref().unwrap_or("");
    match column {
        Column::ReceiptNumber => tx.receipt_number.clone(),
        Column::DateTime => datetime::format_date_time(when),
        Column::DayName => datetime::day_name(when).to_string(),
        Column::Date => datetime::format_date_only(when),
        Column::Time => datetime::format_time_only(when),
        Column::OperatorSeller => tx.operator_seller.clone(),
        Column::Application => tx.application.clone(),
        Column::Amount => format_number(tx.amount),
        Column::Balance => tx.balance.map(format_number).unwrap_or_default(),
        Column::CardNumber => mask_card(&tx.card_number),
        Column::P2p => if tx.is_p2p() { "Да" } else { "Нет" }.to_string(),
        Column::TransactionType => match tx.kind() {
            Some(kind) => kind.label().to_string(),
            None => tx.operation_type.clone(),
        },
        Column::Currency => tx.currency.clone(),
        Column::DataSource => tx.data_source.clone(),
        Column::Category => tx.category.clone(),
        Column::Actions => String::new(),
    }
}

/// `*` followed by the last four characters, empty for an empty card.
pub fn mask_card(card: &str) -> String {
    let card = card.trim();
    if card.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = card.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("*{tail}")
}

/// ru-RU number formatting: non-breaking space between thousands (only once
/// the integer part has five or more digits), comma decimal mark, at most
/// three fraction digits.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }

    let scale = 10u128.pow(MAX_FRACTION_DIGITS);
    let scaled = (value.abs() * scale as f64).round() as u128;
    let integer = (scaled / scale).to_string();
    let fraction = scaled % scale;

    let mut out = String::new();
    if value < 0.0 && scaled != 0 {
        out.push('-');
    }

    if integer.len() >= 5 {
        let len = integer.len();
        for (idx, ch) in integer.chars().enumerate() {
            if idx > 0 && (len - idx) % 3 == 0 {
                out.push(GROUP_SEPARATOR);
            }
            out.push(ch);
        }
    } else {
        out.push_str(&integer);
    }

    if fraction != 0 {
        let digits = format!("{fraction:0width$}", width = MAX_FRACTION_DIGITS as usize);
        out.push(DECIMAL_SEPARATOR);
        out.push_str(digits.trim_end_matches('0'));
    }

    out
}
