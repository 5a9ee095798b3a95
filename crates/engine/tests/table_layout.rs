use api_types::{formatting::Alignment, transaction::ApiTransaction};
use engine::{
    Column, IngestDefaults, KeyValueStorage, LayoutState, MemoryStorage, TableLayout, Transaction,
    table::{Font, LEGACY_STORAGE_KEY, MAX_WIDTH, MIN_WIDTH, TextMeasurer},
};

struct CharMeasurer;

impl TextMeasurer for CharMeasurer {
    fn measure(&self, text: &str, font: &Font) -> f64 {
        let per_char = if font.bold { 9.0 } else { 8.0 };
        text.chars().count() as f64 * per_char
    }
}

fn rows() -> Vec<Transaction> {
    let defaults = IngestDefaults::default();
    (1..=5)
        .map(|id| {
            Transaction::from_api(
                ApiTransaction {
                    id,
                    date_time: Some(format!("2025-04-0{id}T10:00:00")),
                    amount: Some(1_000_000.0 * id as f64),
                    card_number: Some("8600123412346714".to_string()),
                    operator_name: Some(format!("Operator {id}")),
                    raw_text: Some(format!("CHK{id:03}: receipt")),
                    ..ApiTransaction::default()
                },
                &defaults,
            )
        })
        .collect()
}

#[test]
fn layout_survives_reload() {
    let storage = MemoryStorage::new();
    let mut table = TableLayout::load(&storage, Some("777001"));
    table.reorder_column(Column::Amount, Column::ReceiptNumber);
    table.resize_column(Column::Category, 55);
    table.set_column_alignment(Column::Amount, Some(Alignment::Right));
    table.set_cell_color(3, Column::Amount, Some("#c8e6c9".to_string()));
    let saved = table.state().clone();

    let reloaded = TableLayout::load(&storage, Some("777001"));
    assert_eq!(reloaded.state(), &saved);
    assert_eq!(reloaded.order()[0], Column::Amount);
    assert_eq!(reloaded.alignment(Column::Amount), Alignment::Right);
    assert_eq!(reloaded.cell_color(3, Column::Amount), Some("#c8e6c9"));

    // Another user starts from defaults.
    let other = TableLayout::load(&storage, Some("42"));
    assert_eq!(other.state(), &LayoutState::default());
}

#[test]
fn legacy_settings_follow_the_first_user() {
    let storage = MemoryStorage::new();
    storage
        .set(
            LEGACY_STORAGE_KEY,
            r#"{"columnWidths":{"amount":180},"columnOrder":["currency"],"version":"1.0"}"#,
        )
        .unwrap();

    let table = TableLayout::load(&storage, Some("777001"));
    assert_eq!(table.width(Column::Amount), 180);
    assert_eq!(table.order()[0], Column::Currency);
    assert_eq!(storage.keys(), vec!["tbcparcer_table_settings:777001".to_string()]);
}

#[test]
fn auto_fit_then_reset_returns_to_defaults() {
    let storage = MemoryStorage::new();
    let mut table = TableLayout::load(&storage, Some("1"));
    let rows = rows();
    let font = Font::default();

    table.apply_auto_widths(&rows, &CharMeasurer, &font);
    for column in table.order().to_vec() {
        let width = table.width(column);
        assert!((MIN_WIDTH..=MAX_WIDTH).contains(&width), "{column}: {width}");
    }
    // "Оператор/Продавец" in bold: 17 * 9 + 32.
    assert_eq!(table.width(Column::OperatorSeller), 185);

    table.reset_to_defaults();
    assert_eq!(table.order(), &Column::ALL);
    for column in Column::ALL {
        assert_eq!(table.width(column), column.default_width());
    }
}
