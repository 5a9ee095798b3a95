//! Manual transaction form: schema, validation, payload and submission.
//!
//! A submission goes `Idle -> Validating -> Submitting -> Idle`. Validation
//! failures return to `Idle` without touching the backend. The two halves of
//! a submission ([`ManualForm::begin_submit`] / [`ManualForm::finish_submit`])
//! are public so a UI loop can keep rendering while the request is in flight;
//! [`ManualForm::submit`] drives both for callers that just await.

use std::collections::BTreeMap;

use api_types::{
    ai::{ParseAndSave, ParseAndSaveResponse},
    transaction::{ApiTransaction, ManualTransactionNew},
};
use thiserror::Error;

use crate::{error::RemoteError, remote::Backend};

pub mod schema;
mod validate;

pub use schema::{FieldGroup, FieldKind, FieldSpec, SelectOption, StaticOption, Validation};
pub use validate::{FieldErrors, parse_number, required_message, validate_all, validate_field};

/// Field name to raw input.
pub type FormState = BTreeMap<&'static str, String>;

pub const SUCCESS_MESSAGE: &str = "Транзакция успешно сохранена";
pub const PARSE_SUCCESS_MESSAGE: &str = "Чек распознан и сохранён";
const VALIDATION_BANNER: &str = "Проверьте правильность заполнения формы";

/// Every field mapped to its default, or `""`.
pub fn create_empty_state() -> FormState {
    schema::fields()
        .map(|field| (field.name, field.default.unwrap_or("").to_string()))
        .collect()
}

/// Who the created transaction belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub telegram_id: i64,
    pub username: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("Проверьте правильность заполнения формы")]
    Validation(FieldErrors),
    #[error("Не указан Telegram ID пользователя, загрузка данных недоступна")]
    NotConfigured,
    #[error("Введите текст чека для распознавания")]
    EmptyText,
    #[error("Запрос уже выполняется")]
    AlreadySubmitting,
    #[error("Поле «{label}» должно быть числом")]
    InvalidNumber { label: &'static str },
    #[error("{}", .0.user_message())]
    Remote(#[from] RemoteError),
}

/// Resolves the options of a dynamic select by source key.
pub trait OptionResolver {
    fn resolve(&self, source: &str) -> Vec<SelectOption>;
}

impl<F> OptionResolver for F
where
    F: Fn(&str) -> Vec<SelectOption>,
{
    fn resolve(&self, source: &str) -> Vec<SelectOption> {
        self(source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Idle,
    Validating,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMessage {
    Success(String),
    Error(String),
}

/// Result of the free-text parse path.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub transaction: ApiTransaction,
    /// Fields the backend extracted, in key order, for display only.
    pub preview: Vec<(String, String)>,
}

/// Builds the wire payload. Optional keys are left out when empty.
pub fn build_payload(
    state: &FormState,
    identity: &Identity,
) -> Result<ManualTransactionNew, SubmitError> {
    let text = |name: &str| state.get(name).map(|v| v.trim()).unwrap_or("");
    let non_empty = |name: &str| Some(text(name)).filter(|v| !v.is_empty());
    let number = |name: &'static str| -> Result<Option<f64>, SubmitError> {
        match non_empty(name) {
            None => Ok(None),
            Some(raw) => parse_number(raw).map(Some).ok_or(SubmitError::InvalidNumber {
                label: schema::find_field(name).map(|f| f.label).unwrap_or(name),
            }),
        }
    };

    let amount = number("amount")?.ok_or(SubmitError::InvalidNumber {
        label: schema::find_field("amount").map(|f| f.label).unwrap_or("amount"),
    })?;

    Ok(ManualTransactionNew {
        telegram_id: identity.telegram_id,
        date_time: text("date_time").to_string(),
        operation_type: text("operation_type").to_string(),
        amount,
        currency: text("currency").to_string(),
        description: text("description").to_string(),
        raw_text: non_empty("raw_text").map(str::to_string),
        balance: number("balance")?,
        card_number: non_empty("card_number").map(str::to_string),
        operator_id: non_empty("operator_id").map(|raw| match raw.parse::<i64>() {
            Ok(id) => serde_json::Value::from(id),
            Err(_) => serde_json::Value::from(raw),
        }),
    })
}

/// Form instance: values, live errors, submission status and the banner
/// message shown above the form.
#[derive(Debug, Clone)]
pub struct ManualForm {
    state: FormState,
    errors: FieldErrors,
    status: FormStatus,
    message: Option<FormMessage>,
    identity: Option<Identity>,
    options: BTreeMap<&'static str, Vec<SelectOption>>,
}

impl ManualForm {
    pub fn new(identity: Option<Identity>) -> Self {
        Self {
            state: create_empty_state(),
            errors: FieldErrors::new(),
            status: FormStatus::Idle,
            message: None,
            identity,
            options: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn value(&self, name: &str) -> &str {
        self.state.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn message(&self) -> Option<&FormMessage> {
        self.message.as_ref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Options for a field: static ones, resolved dynamic ones, or none.
    pub fn options(&self, field: &FieldSpec) -> Vec<SelectOption> {
        match field.kind {
            FieldKind::Select(options) => options
                .iter()
                .map(|o| SelectOption {
                    value: o.value.to_string(),
                    label: o.label.to_string(),
                    hint: None,
                })
                .collect(),
            FieldKind::DynamicSelect { .. } => {
                self.options.get(field.name).cloned().unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }

    /// Re-resolves every dynamic select of the schema.
    pub fn refresh_options(&mut self, resolver: &impl OptionResolver) {
        for field in schema::fields() {
            if let FieldKind::DynamicSelect { source } = field.kind {
                let options = resolver.resolve(source);
                tracing::debug!(field = field.name, source, count = options.len(), "options resolved");
                self.options.insert(field.name, options);
            }
        }
    }

    /// Stores a value and re-validates that field. Picking an operator fills
    /// an empty description from the operator. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, raw: impl Into<String>) {
        let Some(field) = schema::find_field(name) else {
            tracing::warn!(name, "unknown form field");
            return;
        };
        let raw = raw.into();
        self.revalidate(field, &raw);
        self.state.insert(field.name, raw);

        if field.name == "operator_id" && self.value("description").trim().is_empty() {
            let fill = self
                .options(field)
                .into_iter()
                .find(|option| option.value == self.value("operator_id"))
                .map(|option| option.hint.filter(|h| !h.trim().is_empty()).unwrap_or(option.label));
            if let (Some(fill), Some(description)) = (fill, schema::find_field("description")) {
                self.revalidate(description, &fill);
                self.state.insert(description.name, fill);
            }
        }
    }

    /// Resets values, errors and the banner.
    pub fn clear(&mut self) {
        self.state = create_empty_state();
        self.errors.clear();
        self.message = None;
    }

    /// Validates and, when clean, marks the form as submitting and returns
    /// the payload to send.
    pub fn begin_submit(&mut self) -> Result<ManualTransactionNew, SubmitError> {
        if self.status == FormStatus::Submitting {
            return Err(SubmitError::AlreadySubmitting);
        }
        let Some(identity) = self.identity.clone() else {
            let err = SubmitError::NotConfigured;
            self.message = Some(FormMessage::Error(err.to_string()));
            return Err(err);
        };

        self.status = FormStatus::Validating;
        self.message = None;
        self.errors = validate_all(&self.state);
        if !self.errors.is_empty() {
            self.status = FormStatus::Idle;
            self.message = Some(FormMessage::Error(VALIDATION_BANNER.to_string()));
            return Err(SubmitError::Validation(self.errors.clone()));
        }

        match build_payload(&self.state, &identity) {
            Ok(payload) => {
                self.status = FormStatus::Submitting;
                Ok(payload)
            }
            Err(err) => {
                self.status = FormStatus::Idle;
                self.message = Some(FormMessage::Error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Applies the backend answer. On success the form is reset.
    pub fn finish_submit(
        &mut self,
        result: Result<ApiTransaction, RemoteError>,
    ) -> Result<ApiTransaction, SubmitError> {
        self.status = FormStatus::Idle;
        match result {
            Ok(transaction) => {
                tracing::info!(id = transaction.id, "manual transaction created");
                self.state = create_empty_state();
                self.errors.clear();
                self.message = Some(FormMessage::Success(SUCCESS_MESSAGE.to_string()));
                Ok(transaction)
            }
            Err(err) => {
                tracing::error!(%err, "manual transaction rejected");
                self.message = Some(FormMessage::Error(err.user_message()));
                Err(err.into())
            }
        }
    }

    pub async fn submit<B: Backend>(&mut self, backend: &B) -> Result<ApiTransaction, SubmitError> {
        let payload = self.begin_submit()?;
        let result = backend.create_transaction(&payload).await;
        self.finish_submit(result)
    }

    /// Validates free text for the AI path and marks the form as submitting.
    pub fn begin_parse(&mut self, text: &str) -> Result<ParseAndSave, SubmitError> {
        if self.status == FormStatus::Submitting {
            return Err(SubmitError::AlreadySubmitting);
        }
        let Some(identity) = self.identity.clone() else {
            let err = SubmitError::NotConfigured;
            self.message = Some(FormMessage::Error(err.to_string()));
            return Err(err);
        };
        let text = text.trim();
        if text.is_empty() {
            let err = SubmitError::EmptyText;
            self.message = Some(FormMessage::Error(err.to_string()));
            return Err(err);
        }

        self.status = FormStatus::Submitting;
        self.message = None;
        Ok(ParseAndSave {
            text: text.to_string(),
            telegram_id: identity.telegram_id,
            username: identity.username,
        })
    }

    pub fn finish_parse(
        &mut self,
        result: Result<ParseAndSaveResponse, RemoteError>,
    ) -> Result<ParseOutcome, SubmitError> {
        self.status = FormStatus::Idle;
        match result {
            Ok(response) => {
                tracing::info!(id = response.transaction.id, "receipt parsed and saved");
                self.message = Some(FormMessage::Success(PARSE_SUCCESS_MESSAGE.to_string()));
                Ok(ParseOutcome {
                    preview: preview(response.parsed_data.as_ref()),
                    transaction: response.transaction,
                })
            }
            Err(err) => {
                tracing::error!(%err, "receipt parsing rejected");
                self.message = Some(FormMessage::Error(err.user_message()));
                Err(err.into())
            }
        }
    }

    pub async fn parse_and_submit<B: Backend>(
        &mut self,
        backend: &B,
        text: &str,
    ) -> Result<ParseOutcome, SubmitError> {
        let request = self.begin_parse(text)?;
        let result = backend.parse_and_save(&request).await;
        self.finish_parse(result)
    }

    fn revalidate(&mut self, field: &'static FieldSpec, raw: &str) {
        match validate_field(field, raw) {
            Some(error) => {
                self.errors.insert(field.name, error);
            }
            None => {
                self.errors.remove(field.name);
            }
        }
    }
}

fn preview(parsed: Option<&serde_json::Value>) -> Vec<(String, String)> {
    let Some(serde_json::Value::Object(map)) = parsed else {
        return Vec::new();
    };
    map.iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let shown = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), shown)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            telegram_id: 777001,
            username: Some("tester".to_string()),
        }
    }

    fn filled() -> FormState {
        let mut state = create_empty_state();
        state.insert("date_time", "2025-01-01T12:30".to_string());
        state.insert("amount", "125.50".to_string());
        state.insert("description", "Оплата услуги".to_string());
        state
    }

    #[test]
    fn empty_state_uses_defaults() {
        let state = create_empty_state();
        assert_eq!(state.len(), 9);
        assert_eq!(state["operation_type"], "payment");
        assert_eq!(state["currency"], "UZS");
        assert_eq!(state["amount"], "");
    }

    #[test]
    fn payload_matches_wire_contract() {
        let payload = build_payload(&filled(), &identity()).unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "telegram_id": 777001,
                "date_time": "2025-01-01T12:30",
                "operation_type": "payment",
                "amount": 125.5,
                "currency": "UZS",
                "description": "Оплата услуги",
                "raw_text": null,
            })
        );
    }

    #[test]
    fn payload_includes_filled_optionals() {
        let mut state = filled();
        state.insert("balance", "0".to_string());
        state.insert("card_number", "6714".to_string());
        state.insert("operator_id", "12".to_string());
        state.insert("raw_text", "  HUMO: oplata  ".to_string());
        let payload = build_payload(&state, &identity()).unwrap();
        assert_eq!(payload.balance, Some(0.0));
        assert_eq!(payload.card_number.as_deref(), Some("6714"));
        assert_eq!(payload.operator_id, Some(serde_json::json!(12)));
        assert_eq!(payload.raw_text.as_deref(), Some("HUMO: oplata"));
    }

    #[test]
    fn operator_fills_empty_description_once() {
        let mut form = ManualForm::new(Some(identity()));
        form.refresh_options(&|_: &str| {
            vec![
                SelectOption {
                    value: "1".to_string(),
                    label: "HUMO".to_string(),
                    hint: Some("Перевод через HUMO".to_string()),
                },
                SelectOption {
                    value: "2".to_string(),
                    label: "Click".to_string(),
                    hint: None,
                },
            ]
        });

        form.set_field("operator_id", "1");
        assert_eq!(form.value("description"), "Перевод через HUMO");
        assert_eq!(form.error("description"), None);

        form.set_field("operator_id", "2");
        assert_eq!(form.value("description"), "Перевод через HUMO");

        form.set_field("description", "");
        form.set_field("operator_id", "2");
        assert_eq!(form.value("description"), "Click");
    }

    #[test]
    fn live_validation_tracks_field_errors() {
        let mut form = ManualForm::new(Some(identity()));
        form.set_field("card_number", "12");
        assert!(form.error("card_number").is_some());
        form.set_field("card_number", "1234");
        assert_eq!(form.error("card_number"), None);
        form.set_field("nonexistent", "x");
        assert!(!form.state().contains_key("nonexistent"));
    }

    #[test]
    fn second_submit_while_in_flight_is_refused() {
        let mut form = ManualForm::new(Some(identity()));
        for (name, value) in filled() {
            form.set_field(name, value);
        }
        assert!(form.begin_submit().is_ok());
        assert_eq!(form.status(), FormStatus::Submitting);
        assert_eq!(form.begin_submit(), Err(SubmitError::AlreadySubmitting));
        assert_eq!(form.begin_parse("text"), Err(SubmitError::AlreadySubmitting));
    }

    #[test]
    fn failed_submit_keeps_values() {
        let mut form = ManualForm::new(Some(identity()));
        for (name, value) in filled() {
            form.set_field(name, value);
        }
        form.begin_submit().unwrap();
        let err = form
            .finish_submit(Err(RemoteError::rejected(400, Some("Неверная сумма".to_string()))))
            .unwrap_err();
        assert_eq!(err.to_string(), "Неверная сумма");
        assert_eq!(form.status(), FormStatus::Idle);
        assert_eq!(form.value("amount"), "125.50");
        assert_eq!(
            form.message(),
            Some(&FormMessage::Error("Неверная сумма".to_string()))
        );
    }

    #[test]
    fn missing_identity_is_a_configuration_error() {
        let mut form = ManualForm::new(None);
        assert_eq!(form.begin_submit(), Err(SubmitError::NotConfigured));
        assert_eq!(form.begin_parse("text"), Err(SubmitError::NotConfigured));
    }

    #[test]
    fn blank_text_is_rejected_before_parsing() {
        let mut form = ManualForm::new(Some(identity()));
        assert_eq!(form.begin_parse("  \n "), Err(SubmitError::EmptyText));
        assert_eq!(form.status(), FormStatus::Idle);
    }

    #[test]
    fn preview_skips_nulls() {
        let data = serde_json::json!({"amount": 1000.0, "card_number": "6714", "balance": null});
        assert_eq!(
            preview(Some(&data)),
            vec![
                ("amount".to_string(), "1000.0".to_string()),
                ("card_number".to_string(), "6714".to_string()),
            ]
        );
    }
}
