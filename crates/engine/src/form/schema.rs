//! Declarative description of the manual transaction form.

/// Option of a select field known at compile time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Option resolved at runtime for a [`FieldKind::DynamicSelect`] field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    /// Secondary text; for operators this is their description.
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    TextArea,
    Number,
    Select(&'static [StaticOption]),
    DynamicSelect { source: &'static str },
    DateTime,
}

/// Format rule applied once a value is known to be non-empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Validation {
    DateTime,
    /// An empty `values` list accepts anything (used by dynamic selects).
    Enum {
        values: &'static [&'static str],
        allow_empty: bool,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
        allow_empty: bool,
        message: Option<&'static str>,
    },
    Pattern {
        regex: &'static str,
        allow_empty: bool,
        message: Option<&'static str>,
    },
    String {
        min_len: Option<usize>,
        max_len: Option<usize>,
        allow_empty: bool,
        message: Option<&'static str>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<&'static str>,
    pub placeholder: Option<&'static str>,
    pub helper_text: Option<&'static str>,
    pub validation: Option<Validation>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldGroup {
    pub id: &'static str,
    pub title: &'static str,
    pub description: Option<&'static str>,
    pub columns: u8,
    pub fields: &'static [FieldSpec],
}

/// Dynamic option source naming the operator registry.
pub const OPERATORS_SOURCE: &str = "operators";

pub const OPERATION_TYPE_OPTIONS: &[StaticOption] = &[
    StaticOption { value: "payment", label: "Оплата" },
    StaticOption { value: "refill", label: "Пополнение" },
    StaticOption { value: "conversion", label: "Конверсия" },
    StaticOption { value: "cancel", label: "Отмена" },
];

pub const CURRENCY_OPTIONS: &[StaticOption] = &[
    StaticOption { value: "UZS", label: "UZS (Сум)" },
    StaticOption { value: "USD", label: "USD (Доллар США)" },
    StaticOption { value: "EUR", label: "EUR (Евро)" },
    StaticOption { value: "RUB", label: "RUB (Российский рубль)" },
];

const OPERATION_TYPE_VALUES: &[&str] = &["payment", "refill", "conversion", "cancel"];
const CURRENCY_VALUES: &[&str] = &["UZS", "USD", "EUR", "RUB"];

const fn field(name: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        required: false,
        default: None,
        placeholder: None,
        helper_text: None,
        validation: None,
    }
}

pub static FIELD_GROUPS: &[FieldGroup] = &[
    FieldGroup {
        id: "operation",
        title: "Данные операции",
        description: Some("Основные атрибуты транзакции, которые отображаются в таблице и экспорте."),
        columns: 2,
        fields: &[
            FieldSpec {
                required: true,
                placeholder: Some("ГГГГ-ММ-ДДTЧЧ:ММ"),
                validation: Some(Validation::DateTime),
                ..field("date_time", "Дата и время операции", FieldKind::DateTime)
            },
            FieldSpec {
                required: true,
                default: Some("payment"),
                validation: Some(Validation::Enum {
                    values: OPERATION_TYPE_VALUES,
                    allow_empty: false,
                }),
                ..field(
                    "operation_type",
                    "Тип операции",
                    FieldKind::Select(OPERATION_TYPE_OPTIONS),
                )
            },
            FieldSpec {
                required: true,
                default: Some("UZS"),
                validation: Some(Validation::Enum {
                    values: CURRENCY_VALUES,
                    allow_empty: false,
                }),
                ..field("currency", "Валюта операции", FieldKind::Select(CURRENCY_OPTIONS))
            },
        ],
    },
    FieldGroup {
        id: "amounts",
        title: "Финансовые показатели",
        description: Some("Сумма транзакции и остаток на счёте после операции."),
        columns: 2,
        fields: &[
            FieldSpec {
                required: true,
                placeholder: Some("0.00"),
                validation: Some(Validation::Number {
                    min: Some(0.01),
                    max: None,
                    allow_empty: false,
                    message: Some("Укажите сумму операции больше нуля"),
                }),
                ..field("amount", "Сумма операции", FieldKind::Number)
            },
            FieldSpec {
                placeholder: Some("0.00"),
                validation: Some(Validation::Number {
                    min: Some(0.0),
                    max: None,
                    allow_empty: true,
                    message: None,
                }),
                ..field("balance", "Остаток на счёте", FieldKind::Number)
            },
        ],
    },
    FieldGroup {
        id: "card",
        title: "Информация о карте",
        description: Some("Используется для заполнения колонки «ПК»."),
        columns: 2,
        fields: &[FieldSpec {
            placeholder: Some("1234"),
            validation: Some(Validation::Pattern {
                regex: r"^[0-9]{4}$",
                allow_empty: true,
                message: Some("Введите последние четыре цифры карты"),
            }),
            ..field("card_number", "Последние 4 цифры карты", FieldKind::Text)
        }],
    },
    FieldGroup {
        id: "classification",
        title: "Классификация",
        description: Some("Помогает связать транзакцию с оператором и описанием."),
        columns: 2,
        fields: &[
            FieldSpec {
                placeholder: Some("Выберите оператора"),
                validation: Some(Validation::Enum {
                    values: &[],
                    allow_empty: true,
                }),
                ..field(
                    "operator_id",
                    "Оператор / продавец",
                    FieldKind::DynamicSelect {
                        source: OPERATORS_SOURCE,
                    },
                )
            },
            FieldSpec {
                required: true,
                placeholder: Some("Например: Перевод через HUMO"),
                validation: Some(Validation::String {
                    min_len: Some(3),
                    max_len: None,
                    allow_empty: false,
                    message: Some("Описание должно содержать минимум 3 символа"),
                }),
                ..field("description", "Описание операции", FieldKind::TextArea)
            },
        ],
    },
    FieldGroup {
        id: "meta",
        title: "Дополнительная информация",
        description: Some("Исходный текст помогает обнаруживать дубликаты и хранить контекст."),
        columns: 1,
        fields: &[FieldSpec {
            placeholder: Some("Оригинальный текст SMS или уведомления..."),
            helper_text: Some(
                "Поле необязательное, но помогает избежать дублей и сохраняет исходный текст.",
            ),
            validation: Some(Validation::String {
                min_len: None,
                max_len: Some(4000),
                allow_empty: true,
                message: None,
            }),
            ..field("raw_text", "Исходный текст чека", FieldKind::TextArea)
        }],
    },
];

/// Every field in display order.
pub fn fields() -> impl Iterator<Item = &'static FieldSpec> {
    FIELD_GROUPS.iter().flat_map(|group| group.fields.iter())
}

pub fn find_field(name: &str) -> Option<&'static FieldSpec> {
    fields().find(|field| field.name == name)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn field_names_are_unique() {
        let mut seen = BTreeSet::new();
        for field in fields() {
            assert!(seen.insert(field.name), "duplicate field {}", field.name);
        }
        assert_eq!(seen.len(), 9);
    }

    #[test]
    fn required_fields_are_the_documented_ones() {
        let required: Vec<&str> = fields().filter(|f| f.required).map(|f| f.name).collect();
        assert_eq!(
            required,
            vec!["date_time", "operation_type", "currency", "amount", "description"]
        );
    }

    #[test]
    fn select_defaults_are_valid_options() {
        for field in fields() {
            if let (FieldKind::Select(options), Some(default)) = (field.kind, field.default) {
                assert!(options.iter().any(|o| o.value == default), "{}", field.name);
            }
        }
    }
}
