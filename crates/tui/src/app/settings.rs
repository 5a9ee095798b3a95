use api_types::{
    category::Category,
    operator::{Operator, OperatorUpsert},
};

use super::{App, PendingAction, ToastLevel};
use crate::ui::keymap::AppAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsMode {
    #[default]
    List,
    Create,
    Edit(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatorField {
    #[default]
    Name,
    Description,
}

#[derive(Debug, Default)]
pub struct SettingsState {
    pub operators: Vec<Operator>,
    pub categories: Vec<Category>,
    pub selected: usize,
    pub mode: SettingsMode,
    pub focus: OperatorField,
    pub name: String,
    pub description: String,
    pub error: Option<String>,
}

impl SettingsState {
    fn selected_operator(&self) -> Option<&Operator> {
        self.operators.get(self.selected)
    }

    fn open_editor(&mut self, mode: SettingsMode, name: String, description: String) {
        self.mode = mode;
        self.focus = OperatorField::Name;
        self.name = name;
        self.description = description;
        self.error = None;
    }

    fn close_editor(&mut self) {
        self.open_editor(SettingsMode::List, String::new(), String::new());
    }

    fn focused_input(&mut self) -> &mut String {
        match self.focus {
            OperatorField::Name => &mut self.name,
            OperatorField::Description => &mut self.description,
        }
    }
}

impl App {
    pub(super) async fn handle_settings_key(&mut self, action: AppAction) {
        match self.state.settings.mode {
            SettingsMode::List => self.settings_list(action).await,
            SettingsMode::Create | SettingsMode::Edit(_) => self.settings_editor(action).await,
        }
    }

    async fn settings_list(&mut self, action: AppAction) {
        let settings = &mut self.state.settings;
        match action {
            AppAction::Up => settings.selected = settings.selected.saturating_sub(1),
            AppAction::Down => {
                let last = settings.operators.len().saturating_sub(1);
                settings.selected = (settings.selected + 1).min(last);
            }
            AppAction::Input('n' | 'N') => {
                settings.open_editor(SettingsMode::Create, String::new(), String::new());
            }
            AppAction::Input('e' | 'E') | AppAction::Submit => {
                if let Some(op) = settings.selected_operator().cloned() {
                    settings.open_editor(
                        SettingsMode::Edit(op.id),
                        op.name,
                        op.description.unwrap_or_default(),
                    );
                }
            }
            AppAction::Input('d') => {
                if let Some(id) = settings.selected_operator().map(|op| op.id) {
                    self.state.confirm = Some(PendingAction::DeleteOperator(id));
                }
            }
            AppAction::Input('r' | 'R') => {
                self.load_operators().await;
                self.load_categories().await;
            }
            _ => {}
        }
    }

    async fn settings_editor(&mut self, action: AppAction) {
        let settings = &mut self.state.settings;
        match action {
            AppAction::NextField | AppAction::PrevField | AppAction::Up | AppAction::Down => {
                settings.focus = match settings.focus {
                    OperatorField::Name => OperatorField::Description,
                    OperatorField::Description => OperatorField::Name,
                };
            }
            AppAction::Input(ch) => settings.focused_input().push(ch),
            AppAction::Backspace => {
                settings.focused_input().pop();
            }
            AppAction::Cancel => settings.close_editor(),
            AppAction::Submit => self.save_operator().await,
            _ => {}
        }
    }

    async fn save_operator(&mut self) {
        let Some(telegram_id) = self.telegram_id() else {
            self.state.settings.error = self.state.config_error.clone();
            return;
        };
        let settings = &self.state.settings;
        let name = settings.name.trim();
        if name.is_empty() {
            self.state.settings.error = Some("Введите название оператора".to_string());
            return;
        }
        let body = OperatorUpsert {
            name: name.to_string(),
            description: settings.description.trim().to_string(),
            telegram_id,
        };

        let (result, success) = match settings.mode {
            SettingsMode::Edit(id) => (
                self.client.update_operator(id, &body).await,
                "Оператор успешно обновлен!",
            ),
            _ => (
                self.client.create_operator(&body).await,
                "Оператор успешно добавлен!",
            ),
        };

        match result {
            Ok(()) => {
                tracing::info!(name = %body.name, "operator saved");
                self.state.settings.close_editor();
                self.toast(ToastLevel::Success, success);
                self.load_operators().await;
            }
            Err(err) => {
                tracing::error!(%err, "operator save failed");
                self.state.settings.error = Some(err.user_message());
            }
        }
    }

    pub(super) async fn delete_operator(&mut self, id: i64) {
        let Some(telegram_id) = self.telegram_id() else {
            return;
        };
        match self.client.delete_operator(id, telegram_id).await {
            Ok(()) => {
                tracing::info!(id, "operator deleted");
                self.toast(ToastLevel::Success, "Оператор успешно удален!");
                self.load_operators().await;
            }
            Err(err) => self.report("удаление оператора", &err),
        }
    }

    pub(super) async fn load_operators(&mut self) {
        let Some(telegram_id) = self.telegram_id() else {
            return;
        };
        match self.client.operators(telegram_id).await {
            Ok(operators) => {
                tracing::debug!(count = operators.len(), "operators loaded");
                let settings = &mut self.state.settings;
                settings.operators = operators;
                settings.selected = settings
                    .selected
                    .min(settings.operators.len().saturating_sub(1));
                self.refresh_form_options();
            }
            Err(err) => self.report("загрузка операторов", &err),
        }
    }

    pub(super) async fn load_categories(&mut self) {
        match self.client.categories().await {
            Ok(categories) => self.state.settings.categories = categories,
            // The page still works without them.
            Err(err) => tracing::warn!(%err, "categories not loaded"),
        }
    }
}
