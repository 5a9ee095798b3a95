use std::{
    collections::{BTreeMap, HashMap},
    sync::{LazyLock, Mutex, PoisonError},
};

use regex::Regex;

use super::schema::{FieldSpec, Validation, fields};
use crate::datetime;

/// Field name to error message; only failing fields are present.
pub type FieldErrors = BTreeMap<&'static str, String>;

pub fn required_message(label: &str) -> String {
    format!("Поле «{label}» обязательно для заполнения")
}

/// Checks one raw value against a field. Pure.
pub fn validate_field(field: &FieldSpec, raw: &str) -> Option<String> {
    let value = raw.trim();

    if value.is_empty() {
        if field.required {
            return Some(required_message(field.label));
        }
        return None;
    }

    field.validation.and_then(|rule| rule.check(value))
}

/// Validates every schema field against `state`. Missing keys count as empty.
pub fn validate_all(state: &BTreeMap<&'static str, String>) -> FieldErrors {
    fields()
        .filter_map(|field| {
            let raw = state.get(field.name).map(String::as_str).unwrap_or("");
            validate_field(field, raw).map(|error| (field.name, error))
        })
        .collect()
}

/// Parses a user-typed number, accepting `,` as decimal separator.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Schema patterns are compiled once and shared by every later check.
fn compiled(pattern: &'static str) -> Result<Regex, regex::Error> {
    static CACHE: LazyLock<Mutex<HashMap<&'static str, Regex>>> = LazyLock::new(Default::default);

    let mut cache = CACHE.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(re) = cache.get(pattern) {
        return Ok(re.clone());
    }
    let re = Regex::new(pattern)?;
    cache.insert(pattern, re.clone());
    Ok(re)
}

impl Validation {
    /// Applies the rule to an already trimmed value.
    pub fn check(&self, value: &str) -> Option<String> {
        match *self {
            Validation::DateTime => {
                if datetime::parse_timestamp(value).is_some() {
                    None
                } else {
                    Some("Укажите корректные дату и время".to_string())
                }
            }
            Validation::Enum {
                values,
                allow_empty,
            } => {
                if (value.is_empty() && allow_empty) || values.is_empty() {
                    return None;
                }
                if values.iter().any(|allowed| *allowed == value) {
                    None
                } else {
                    Some("Выберите значение из списка".to_string())
                }
            }
            Validation::Number {
                min,
                max,
                allow_empty,
                message,
            } => {
                if value.is_empty() && allow_empty {
                    return None;
                }
                let Some(number) = parse_number(value) else {
                    return Some(message.unwrap_or("Введите числовое значение").to_string());
                };
                if let Some(min) = min.filter(|min| number < *min) {
                    return Some(
                        message
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("Значение должно быть не меньше {min}")),
                    );
                }
                if let Some(max) = max.filter(|max| number > *max) {
                    return Some(
                        message
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("Значение должно быть не больше {max}")),
                    );
                }
                None
            }
            Validation::Pattern {
                regex,
                allow_empty,
                message,
            } => {
                if value.is_empty() && allow_empty {
                    return None;
                }
                match compiled(regex) {
                    Ok(re) if re.is_match(value) => None,
                    Ok(_) => Some(message.unwrap_or("Неверный формат значения").to_string()),
                    Err(err) => {
                        tracing::error!(pattern = regex, %err, "invalid validation pattern");
                        None
                    }
                }
            }
            Validation::String {
                min_len,
                max_len,
                allow_empty,
                message,
            } => {
                if value.is_empty() && allow_empty {
                    return None;
                }
                let len = value.chars().count();
                if let Some(min) = min_len.filter(|min| len < *min) {
                    return Some(
                        message
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("Минимальная длина: {min} символов")),
                    );
                }
                if let Some(max) = max_len.filter(|max| len > *max) {
                    return Some(
                        message
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("Максимальная длина: {max} символов")),
                    );
                }
                None
            }
        }
    }
}
