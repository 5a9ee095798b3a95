use engine::Transaction;

use super::{App, PendingAction, ToastLevel};
use crate::ui::keymap::AppAction;

#[derive(Debug, Default)]
pub struct TrashState {
    pub items: Vec<Transaction>,
    pub selected: usize,
    /// Cleared whenever something is moved to the trash elsewhere.
    pub loaded: bool,
}

impl TrashState {
    fn selected_id(&self) -> Option<i64> {
        self.items.get(self.selected).map(|tx| tx.id)
    }

    fn remove(&mut self, id: i64) {
        self.items.retain(|tx| tx.id != id);
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
    }

    fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.items.len() - 1);
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

impl App {
    pub(super) async fn handle_trash_key(&mut self, action: AppAction) {
        match action {
            AppAction::Up => self.state.trash.select_prev(),
            AppAction::Down => self.state.trash.select_next(),
            AppAction::Input('u' | 'U') => {
                if let Some(id) = self.state.trash.selected_id() {
                    self.restore(id).await;
                }
            }
            AppAction::Input('D') => {
                if let Some(id) = self.state.trash.selected_id() {
                    self.state.confirm = Some(PendingAction::PermanentDelete(id));
                }
            }
            AppAction::Input('E') => {
                if !self.state.trash.items.is_empty() {
                    self.state.confirm = Some(PendingAction::EmptyTrash);
                }
            }
            AppAction::Input('r' | 'R') => self.load_trash().await,
            _ => {}
        }
    }

    pub(super) async fn load_trash(&mut self) {
        if let Some(message) = self.state.config_error.clone() {
            self.toast(ToastLevel::Error, message);
            return;
        }
        match self.client.trash().await {
            Ok(items) => {
                let items: Vec<Transaction> = items.into_iter().map(|tx| self.ingest(tx)).collect();
                tracing::debug!(count = items.len(), "trash loaded");
                self.state.trash.items = items;
                self.state.trash.selected = 0;
                self.state.trash.loaded = true;
            }
            Err(err) => self.report("загрузка корзины", &err),
        }
    }

    async fn restore(&mut self, id: i64) {
        match self.client.restore(id).await {
            Ok(_) => {
                tracing::info!(id, "transaction restored");
                self.state.trash.remove(id);
                self.toast(ToastLevel::Success, "Транзакция успешно восстановлена");
                self.load_transactions().await;
            }
            Err(err) => self.report("восстановление транзакции", &err),
        }
    }

    pub(super) async fn permanent_delete(&mut self, id: i64) {
        match self.client.permanent_delete(id).await {
            Ok(_) => {
                tracing::info!(id, "transaction permanently deleted");
                self.state.trash.remove(id);
                self.toast(ToastLevel::Success, "Транзакция окончательно удалена");
            }
            Err(err) => self.report("окончательное удаление", &err),
        }
    }

    pub(super) async fn empty_trash(&mut self) {
        match self.client.empty_trash().await {
            Ok(_) => {
                tracing::info!(count = self.state.trash.items.len(), "trash emptied");
                self.state.trash.items.clear();
                self.state.trash.selected = 0;
                self.toast(ToastLevel::Success, "Корзина очищена");
            }
            Err(err) => self.report("очистка корзины", &err),
        }
    }
}
