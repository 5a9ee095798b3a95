//! Content-based column sizing.

use std::collections::{BTreeMap, BTreeSet};

use super::{Column, clamp_width, format_cell};
use crate::Transaction;

/// Added to the widest measured text of a column.
pub const AUTO_FIT_PADDING: f64 = 32.0;

/// Font the table is rendered with.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub size_px: f64,
    pub bold: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "monospace".to_string(),
            size_px: 12.0,
            bold: false,
        }
    }
}

/// Measures rendered text width in pixels for a given font.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &Font) -> f64;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, text: &str, font: &Font) -> f64 {
        (**self).measure(text, font)
    }
}

/// Computes widths from header labels and formatted cells.
///
/// Returns `None` when there is nothing to measure. Action columns are
/// skipped, and so are `manual` columns unless `include_manual` is set.
pub fn compute_auto_widths(
    transactions: &[Transaction],
    order: &[Column],
    manual: &BTreeSet<Column>,
    include_manual: bool,
    measurer: &impl TextMeasurer,
    font: &Font,
) -> Option<BTreeMap<Column, u32>> {
    if transactions.is_empty() {
        return None;
    }

    let header_font = Font {
        bold: true,
        ..font.clone()
    };

    let widths = order
        .iter()
        .copied()
        .filter(|column| !column.is_action())
        .filter(|column| include_manual || !manual.contains(column))
        .map(|column| {
            let header = measurer.measure(column.label(), &header_font);
            let widest = transactions
                .iter()
                .map(|tx| measurer.measure(&format_cell(tx, column), font))
                .fold(header, f64::max);
            (column, clamp_width(widest + AUTO_FIT_PADDING))
        })
        .collect();

    Some(widths)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{IngestDefaults, table::{MAX_WIDTH, MIN_WIDTH}};
    use api_types::transaction::ApiTransaction;

    /// Seven pixels per character regardless of font.
    pub(crate) struct FixedMeasurer;

    impl TextMeasurer for FixedMeasurer {
        fn measure(&self, text: &str, _font: &Font) -> f64 {
            text.chars().count() as f64 * 7.0
        }
    }

    pub(crate) fn sample() -> Vec<Transaction> {
        let defaults = IngestDefaults::default();
        vec![
            Transaction::from_api(
                ApiTransaction {
                    id: 1,
                    date_time: Some("2025-04-04T18:46:00".to_string()),
                    amount: Some(6_000_000.0),
                    operator_name: Some("HUMO".to_string()),
                    description: Some("x".repeat(200)),
                    raw_text: Some("HUMOCARD *6714: oplata".to_string()),
                    ..ApiTransaction::default()
                },
                &defaults,
            ),
            Transaction::from_api(
                ApiTransaction {
                    id: 2,
                    category: Some("c".repeat(100)),
                    amount: Some(5.0),
                    ..ApiTransaction::default()
                },
                &defaults,
            ),
        ]
    }

    #[test]
    fn nothing_to_measure() {
        let widths = compute_auto_widths(
            &[],
            &Column::ALL,
            &BTreeSet::new(),
            false,
            &FixedMeasurer,
            &Font::default(),
        );
        assert_eq!(widths, None);
    }

    #[test]
    fn widths_are_bounded_and_deterministic() {
        let rows = sample();
        let run = || {
            compute_auto_widths(
                &rows,
                &Column::ALL,
                &BTreeSet::new(),
                false,
                &FixedMeasurer,
                &Font::default(),
            )
        };
        let widths = run().unwrap();
        assert_eq!(run().unwrap(), widths);
        assert!(!widths.contains_key(&Column::Actions));
        for width in widths.values() {
            assert!((MIN_WIDTH..=MAX_WIDTH).contains(width));
        }
        assert_eq!(widths[&Column::Category], MAX_WIDTH);
        // "Оператор/Продавец" is 17 chars: 17 * 7 + 32.
        assert_eq!(widths[&Column::OperatorSeller], 151);
        // "HUMOCARD *6714" is 14 chars, shorter than the header "Номер чека".
        assert_eq!(widths[&Column::ReceiptNumber], 14 * 7 + 32);
    }

    #[test]
    fn manual_columns_are_skipped_unless_included() {
        let rows = sample();
        let manual = BTreeSet::from([Column::Amount]);
        let font = Font::default();
        let skipped =
            compute_auto_widths(&rows, &Column::ALL, &manual, false, &FixedMeasurer, &font).unwrap();
        assert!(!skipped.contains_key(&Column::Amount));

        let included =
            compute_auto_widths(&rows, &Column::ALL, &manual, true, &FixedMeasurer, &font).unwrap();
        assert!(included.contains_key(&Column::Amount));
    }
}
