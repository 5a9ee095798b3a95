use api_types::{ai::ParseAndSaveResponse, transaction::ApiTransaction};
use engine::{
    RemoteError,
    form::{
        FieldKind, FieldSpec, Identity, ManualForm, SubmitError,
        schema::{self, OPERATORS_SOURCE},
    },
};

use super::{App, ToastLevel};
use crate::ui::keymap::AppAction;

/// Shape the date/time field is filled with by the "now" shortcut.
const NOW_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddMode {
    /// Moving between fields; letters are shortcuts.
    #[default]
    Browse,
    /// Typing into the focused field.
    Editing,
    /// Typing free receipt text for the parser.
    Parse,
}

/// Backend answer to a request started from the add page.
#[derive(Debug)]
pub enum FormReply {
    Created(Result<ApiTransaction, RemoteError>),
    Parsed(Result<ParseAndSaveResponse, RemoteError>),
}

#[derive(Debug)]
pub struct AddState {
    pub form: ManualForm,
    pub focus: usize,
    pub mode: AddMode,
    pub parse_text: String,
    /// Fields the parser extracted from the last accepted receipt.
    pub preview: Vec<(String, String)>,
}

impl AddState {
    pub fn new(identity: Option<Identity>) -> Self {
        Self {
            form: ManualForm::new(identity),
            focus: 0,
            mode: AddMode::Browse,
            parse_text: String::new(),
            preview: Vec::new(),
        }
    }

    pub fn typing(&self) -> bool {
        self.mode != AddMode::Browse
    }

    pub fn focused_field(&self) -> Option<&'static FieldSpec> {
        schema::fields().nth(self.focus)
    }

    fn field_count() -> usize {
        schema::fields().count()
    }

    fn move_focus(&mut self, step: isize) {
        let last = Self::field_count().saturating_sub(1) as isize;
        self.focus = (self.focus as isize + step).clamp(0, last) as usize;
    }

    fn focus_field(&mut self, name: &str) {
        if let Some(idx) = schema::fields().position(|field| field.name == name) {
            self.focus = idx;
        }
    }

    /// Steps a select field through its options. Optional selects also
    /// offer the empty value.
    fn cycle_option(&mut self, field: &'static FieldSpec, step: isize) {
        let mut values: Vec<String> = self
            .form
            .options(field)
            .into_iter()
            .map(|option| option.value)
            .collect();
        if !field.required {
            values.insert(0, String::new());
        }
        if values.is_empty() {
            return;
        }
        let current = self.form.value(field.name);
        let next = match values.iter().position(|v| v == current) {
            Some(idx) => (idx as isize + step).rem_euclid(values.len() as isize) as usize,
            None => 0,
        };
        let value = values.swap_remove(next);
        self.form.set_field(field.name, value);
    }

    fn edit_focused(&mut self, change: impl FnOnce(&mut String)) {
        let Some(field) = self.focused_field() else {
            return;
        };
        let mut value = self.form.value(field.name).to_string();
        change(&mut value);
        self.form.set_field(field.name, value);
    }
}

pub fn is_choice(field: &FieldSpec) -> bool {
    matches!(
        field.kind,
        FieldKind::Select(_) | FieldKind::DynamicSelect { .. }
    )
}

impl App {
    pub(super) async fn handle_add_key(&mut self, action: AppAction) {
        match self.state.add.mode {
            AddMode::Browse => self.add_browse(action).await,
            AddMode::Editing => self.add_editing(action),
            AddMode::Parse => self.add_parse(action),
        }
    }

    async fn add_browse(&mut self, action: AppAction) {
        let add = &mut self.state.add;
        let focused = add.focused_field();
        match action {
            AppAction::Up | AppAction::PrevField => add.move_focus(-1),
            AppAction::Down | AppAction::NextField => add.move_focus(1),
            AppAction::Left | AppAction::Right => {
                if let Some(field) = focused.filter(|f| is_choice(f)) {
                    let step = if action == AppAction::Left { -1 } else { 1 };
                    add.cycle_option(field, step);
                }
            }
            AppAction::Submit | AppAction::Input('i' | 'I') => {
                if focused.is_some_and(|f| !is_choice(f)) {
                    add.mode = AddMode::Editing;
                }
            }
            AppAction::Input('n' | 'N') => {
                let now = self.now().format(NOW_FORMAT).to_string();
                self.state.add.form.set_field("date_time", now);
            }
            AppAction::Input('s' | 'S') => self.submit_form(),
            AppAction::Input('c' | 'C') => {
                add.form.clear();
                add.preview.clear();
                add.focus = 0;
            }
            AppAction::Input('p' | 'P') => add.mode = AddMode::Parse,
            AppAction::Input('r' | 'R') => self.load_operators().await,
            _ => {}
        }
    }

    fn add_editing(&mut self, action: AppAction) {
        let add = &mut self.state.add;
        match action {
            AppAction::Input(ch) => add.edit_focused(|value| value.push(ch)),
            AppAction::Backspace => add.edit_focused(|value| {
                value.pop();
            }),
            AppAction::NextField | AppAction::PrevField => {
                add.move_focus(if action == AppAction::NextField { 1 } else { -1 });
                if add.focused_field().is_some_and(is_choice) {
                    add.mode = AddMode::Browse;
                }
            }
            AppAction::Submit | AppAction::Cancel => add.mode = AddMode::Browse,
            _ => {}
        }
    }

    fn add_parse(&mut self, action: AppAction) {
        match action {
            AppAction::Input(ch) => self.state.add.parse_text.push(ch),
            AppAction::Backspace => {
                self.state.add.parse_text.pop();
            }
            AppAction::Cancel => self.state.add.mode = AddMode::Browse,
            AppAction::Submit => self.submit_parse(),
            _ => {}
        }
    }

    /// Validates and starts the create request in the background. The form
    /// stays in `Submitting` until the reply is applied.
    fn submit_form(&mut self) {
        let payload = match self.state.add.form.begin_submit() {
            Ok(payload) => payload,
            Err(SubmitError::Validation(errors)) => {
                if let Some(first) = schema::fields().find(|f| errors.contains_key(f.name)) {
                    self.state.add.focus_field(first.name);
                }
                return;
            }
            Err(err) => {
                self.toast(ToastLevel::Error, err.to_string());
                return;
            }
        };
        let client = self.client.clone();
        let replies = self.replies.clone();
        tokio::spawn(async move {
            let result = client
                .create_transaction(&payload)
                .await
                .map_err(RemoteError::from);
            let _ = replies.send(FormReply::Created(result));
        });
    }

    fn submit_parse(&mut self) {
        let request = match self.state.add.form.begin_parse(&self.state.add.parse_text) {
            Ok(request) => request,
            Err(err) => {
                self.toast(ToastLevel::Error, err.to_string());
                return;
            }
        };
        let client = self.client.clone();
        let replies = self.replies.clone();
        tokio::spawn(async move {
            let result = client
                .parse_and_save(&request)
                .await
                .map_err(RemoteError::from);
            let _ = replies.send(FormReply::Parsed(result));
        });
    }

    pub(super) fn apply_form_reply(&mut self, reply: FormReply) {
        match reply {
            FormReply::Created(result) => match self.state.add.form.finish_submit(result) {
                Ok(created) => {
                    let created = self.ingest(created);
                    self.state.list.prepend(created);
                    self.refit_columns();
                    self.state.add.focus = 0;
                    self.toast(ToastLevel::Success, engine::form::SUCCESS_MESSAGE);
                }
                Err(err) => self.toast(ToastLevel::Error, err.to_string()),
            },
            FormReply::Parsed(result) => match self.state.add.form.finish_parse(result) {
                Ok(outcome) => {
                    let created = self.ingest(outcome.transaction);
                    self.state.list.prepend(created);
                    self.refit_columns();
                    self.state.add.preview = outcome.preview;
                    self.state.add.parse_text.clear();
                    self.toast(ToastLevel::Success, engine::form::PARSE_SUCCESS_MESSAGE);
                }
                Err(err) => self.toast(ToastLevel::Error, err.to_string()),
            },
        }
    }

    /// Feeds loaded operators to the form's dynamic select.
    pub(super) fn refresh_form_options(&mut self) {
        let operators = self.state.settings.operators.clone();
        self.state
            .add
            .form
            .refresh_options(&move |source: &str| -> Vec<engine::form::SelectOption> {
                if source != OPERATORS_SOURCE {
                    return Vec::new();
                }
                operators
                    .iter()
                    .map(|op| engine::form::SelectOption {
                        value: op.id.to_string(),
                        label: op.name.clone(),
                        hint: op.description.clone(),
                    })
                    .collect()
            });
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use axum::{Json, Router, http::StatusCode, routing::post};
    use engine::form::FormStatus;
    use serde_json::{Value, json};

    use super::*;
    use crate::config::AppConfig;

    async fn spawn_receipts_backend() -> String {
        let router = Router::new()
            .route(
                "/api/transactions",
                post(|Json(body): Json<Value>| async move {
                    let mut transaction = body;
                    transaction["id"] = json!(41);
                    (StatusCode::CREATED, Json(json!({ "transaction": transaction })))
                }),
            )
            .route(
                "/api/ai/parse-and-save",
                post(|| async {
                    Json(json!({
                        "transaction": {"id": 42, "amount": 25000.0},
                        "parsed_data": {"amount": 25000}
                    }))
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn app_for(base_url: &str, dir: &Path) -> App {
        App::new(AppConfig {
            base_url: base_url.to_string(),
            telegram_id: Some(777),
            state_path: dir.join("state.json").to_string_lossy().into_owned(),
            ..AppConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn submit_returns_before_the_backend_answers() {
        let base_url = spawn_receipts_backend().await;
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_for(&base_url, dir.path());
        app.state.add.form.set_field("date_time", "2025-01-01T12:30");
        app.state.add.form.set_field("amount", "125.50");
        app.state.add.form.set_field("description", "Оплата услуги");

        app.submit_form();
        assert_eq!(app.state.add.form.status(), FormStatus::Submitting);
        assert!(app.state.list.all().is_empty());

        // A second press while the request is in flight is refused.
        app.submit_form();
        let toast = app.state.toast.as_ref().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.message, SubmitError::AlreadySubmitting.to_string());

        let reply = app.pending.recv().await.unwrap();
        app.apply_form_reply(reply);
        assert_eq!(app.state.add.form.status(), FormStatus::Idle);
        assert_eq!(app.state.list.all()[0].id, 41);
        assert_eq!(app.state.add.form.value("amount"), "");
        let toast = app.state.toast.as_ref().unwrap();
        assert_eq!(toast.level, ToastLevel::Success);
        assert_eq!(toast.message, engine::form::SUCCESS_MESSAGE);
        assert!(app.pending.try_recv().is_err());
    }

    #[tokio::test]
    async fn parse_reply_fills_preview_and_list() {
        let base_url = spawn_receipts_backend().await;
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_for(&base_url, dir.path());
        app.state.add.parse_text = "Оплата 25 000 UZS".to_string();

        app.submit_parse();
        assert_eq!(app.state.add.form.status(), FormStatus::Submitting);

        let reply = app.pending.recv().await.unwrap();
        app.apply_form_reply(reply);
        assert_eq!(app.state.list.all()[0].id, 42);
        assert!(app.state.add.parse_text.is_empty());
        assert!(!app.state.add.preview.is_empty());
        assert_eq!(
            app.state.toast.as_ref().map(|t| t.message.as_str()),
            Some(engine::form::PARSE_SUCCESS_MESSAGE)
        );
    }

    #[tokio::test]
    async fn unreachable_backend_keeps_parse_text() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_for(&format!("http://{addr}"), dir.path());
        app.state.add.parse_text = "Оплата 25 000 UZS".to_string();

        app.submit_parse();
        let reply = app.pending.recv().await.unwrap();
        app.apply_form_reply(reply);

        assert_eq!(app.state.add.form.status(), FormStatus::Idle);
        assert_eq!(app.state.add.parse_text, "Оплата 25 000 UZS");
        assert!(app.state.list.all().is_empty());
        assert_eq!(
            app.state.toast.as_ref().map(|t| t.level),
            Some(ToastLevel::Error)
        );
    }

    #[test]
    fn required_select_cycles_without_empty_value() {
        let mut add = AddState::new(None);
        let currency = schema::find_field("currency").unwrap();
        assert_eq!(add.form.value("currency"), "UZS");

        add.cycle_option(currency, 1);
        assert_ne!(add.form.value("currency"), "UZS");
        add.cycle_option(currency, -1);
        assert_eq!(add.form.value("currency"), "UZS");
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let mut add = AddState::new(None);
        add.focus_field("amount");
        add.edit_focused(|v| v.push_str("12,5"));
        assert_eq!(add.form.value("amount"), "12,5");
        assert!(add.form.error("amount").is_none());

        add.edit_focused(|v| v.clear());
        assert!(add.form.error("amount").is_some());
    }

    #[test]
    fn focus_stays_inside_the_schema() {
        let mut add = AddState::new(None);
        add.move_focus(-1);
        assert_eq!(add.focus, 0);
        add.move_focus(100);
        assert_eq!(add.focused_field().map(|f| f.name), Some("raw_text"));
    }
}
