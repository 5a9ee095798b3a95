use std::fmt;

pub const MIN_WIDTH: u32 = 72;
pub const MAX_WIDTH: u32 = 360;

/// Columns of the transaction table, in default display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    ReceiptNumber,
    DateTime,
    DayName,
    Date,
    Time,
    OperatorSeller,
    Application,
    Amount,
    Balance,
    CardNumber,
    P2p,
    TransactionType,
    Currency,
    DataSource,
    Category,
    Actions,
}

impl Column {
    pub const ALL: [Column; 16] = [
        Self::ReceiptNumber,
        Self::DateTime,
        Self::DayName,
        Self::Date,
        Self::Time,
        Self::OperatorSeller,
        Self::Application,
        Self::Amount,
        Self::Balance,
        Self::CardNumber,
        Self::P2p,
        Self::TransactionType,
        Self::Currency,
        Self::DataSource,
        Self::Category,
        Self::Actions,
    ];

    /// Stable key used in persisted state and backend formatting records.
    pub fn key(self) -> &'static str {
        match self {
            Self::ReceiptNumber => "receipt_number",
            Self::DateTime => "date_time",
            Self::DayName => "day_name",
            Self::Date => "date",
            Self::Time => "time",
            Self::OperatorSeller => "operator_seller",
            Self::Application => "application",
            Self::Amount => "amount",
            Self::Balance => "balance",
            Self::CardNumber => "card_number",
            Self::P2p => "p2p",
            Self::TransactionType => "transaction_type",
            Self::Currency => "currency",
            Self::DataSource => "data_source",
            Self::Category => "category",
            Self::Actions => "actions",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ReceiptNumber => "Номер чека",
            Self::DateTime => "Дата и время",
            Self::DayName => "Д.н.",
            Self::Date => "Дата",
            Self::Time => "Время",
            Self::OperatorSeller => "Оператор/Продавец",
            Self::Application => "Приложение",
            Self::Amount => "Сумма",
            Self::Balance => "Остаток",
            Self::CardNumber => "ПК",
            Self::P2p => "P2P",
            Self::TransactionType => "Тип транзакции",
            Self::Currency => "Валюта",
            Self::DataSource => "Источник данных",
            Self::Category => "Категория",
            Self::Actions => "Действия",
        }
    }

    pub fn default_width(self) -> u32 {
        match self {
            Self::DateTime | Self::OperatorSeller | Self::Application => 150,
            Self::ReceiptNumber
            | Self::Amount
            | Self::Balance
            | Self::TransactionType
            | Self::DataSource
            | Self::Category => 120,
            Self::Date => 100,
            Self::Time | Self::CardNumber | Self::P2p | Self::Currency | Self::Actions => 80,
            Self::DayName => MIN_WIDTH,
        }
    }

    /// Action columns hold controls, not data, and are never auto-fitted.
    pub fn is_action(self) -> bool {
        self == Self::Actions
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub fn clamp_width(width: f64) -> u32 {
    if !width.is_finite() {
        return MIN_WIDTH;
    }
    width.round().clamp(f64::from(MIN_WIDTH), f64::from(MAX_WIDTH)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_roundtrip() {
        for column in Column::ALL {
            assert_eq!(Column::from_key(column.key()), Some(column));
        }
        assert_eq!(Column::from_key("nope"), None);
    }

    #[test]
    fn defaults_are_within_bounds() {
        for column in Column::ALL {
            let width = column.default_width();
            assert!((MIN_WIDTH..=MAX_WIDTH).contains(&width), "{column}");
        }
    }

    #[test]
    fn clamp_rounds_and_bounds() {
        assert_eq!(clamp_width(10.0), MIN_WIDTH);
        assert_eq!(clamp_width(100.4), 100);
        assert_eq!(clamp_width(100.6), 101);
        assert_eq!(clamp_width(10_000.0), MAX_WIDTH);
        assert_eq!(clamp_width(f64::NAN), MIN_WIDTH);
    }
}
