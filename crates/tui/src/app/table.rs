use api_types::formatting::Alignment;
use engine::{
    Column, FilterField, Filters, TransactionChange, table::edit, table::next_cell_color,
    unique_values,
};

use super::{App, PendingAction, ToastLevel};
use crate::ui::keymap::AppAction;

/// Pixels added or removed per `<` / `>` press.
const RESIZE_STEP_PX: i64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableMode {
    #[default]
    Browse,
    Search,
    Filter,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    pub id: i64,
    pub column: Column,
    pub input: String,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct TableView {
    pub mode: TableMode,
    pub selected_row: usize,
    pub selected_col: usize,
    pub filter_focus: usize,
    pub edit: Option<CellEdit>,
}

impl TableView {
    pub fn clamp_selection(&mut self, rows: usize, columns: usize) {
        self.selected_row = self.selected_row.min(rows.saturating_sub(1));
        self.selected_col = self.selected_col.min(columns.saturating_sub(1));
    }

    pub fn focused_filter(&self) -> FilterField {
        FilterField::ALL[self.filter_focus.min(FilterField::ALL.len() - 1)]
    }
}

/// Filter fields picked from values present in the data rather than typed.
pub fn is_choice_filter(field: FilterField) -> bool {
    matches!(
        field,
        FilterField::Category
            | FilterField::TransactionType
            | FilterField::Operator
            | FilterField::Application
    )
}

fn next_alignment(current: Alignment) -> Alignment {
    match current {
        Alignment::Left => Alignment::Center,
        Alignment::Center => Alignment::Right,
        Alignment::Right => Alignment::Left,
    }
}

impl App {
    pub(super) async fn handle_table_key(&mut self, action: AppAction) {
        match self.state.table.mode {
            TableMode::Browse => self.table_browse(action).await,
            TableMode::Search => self.table_search(action),
            TableMode::Filter => self.table_filter(action),
            TableMode::Edit => self.table_edit(action).await,
        }
    }

    async fn table_browse(&mut self, action: AppAction) {
        let rows = self.state.list.visible().len();
        let table = &mut self.state.table;
        match action {
            AppAction::Up => table.selected_row = table.selected_row.saturating_sub(1),
            AppAction::Down => {
                table.selected_row = (table.selected_row + 1).min(rows.saturating_sub(1));
            }
            AppAction::Left => table.selected_col = table.selected_col.saturating_sub(1),
            AppAction::Right => {
                let columns = self.state.layout.order().len();
                table.selected_col = (table.selected_col + 1).min(columns.saturating_sub(1));
            }
            AppAction::MoveLeft => self.move_focused_column(-1),
            AppAction::MoveRight => self.move_focused_column(1),
            AppAction::Cancel => {
                if self.state.list.filters().is_active() {
                    self.update_filters(Filters::clear);
                }
            }
            AppAction::Submit | AppAction::Input('e' | 'E') => self.start_edit(),
            AppAction::Input('/') => self.state.table.mode = TableMode::Search,
            AppAction::Input('f' | 'F') => self.state.table.mode = TableMode::Filter,
            AppAction::Input('<') => self.resize_focused_column(-RESIZE_STEP_PX),
            AppAction::Input('>') => self.resize_focused_column(RESIZE_STEP_PX),
            AppAction::Input('a' | 'A') => {
                if let Some(column) = self.focused_column() {
                    let next = next_alignment(self.state.layout.alignment(column));
                    self.state.layout.set_column_alignment(column, Some(next));
                }
            }
            AppAction::Input('z' | 'Z') => {
                if let Some(column) = self.focused_column() {
                    self.state.layout.set_column_alignment(column, None);
                }
            }
            AppAction::Input('c' | 'C') => self.cycle_cell_color(),
            AppAction::Input('w' | 'W') => {
                let font = self.state.measurer.font();
                let measurer = self.state.measurer;
                self.state
                    .layout
                    .auto_fit_all(self.state.list.all(), &measurer, &font);
                self.toast(ToastLevel::Info, "Ширина колонок подобрана по содержимому");
            }
            AppAction::Input('x' | 'X') => {
                self.state.layout.reset_to_defaults();
                self.state.table.selected_col = 0;
                self.toast(ToastLevel::Info, "Настройки таблицы сброшены");
            }
            AppAction::Input('d') => {
                if let Some(id) = self.focused_row_id() {
                    self.state.confirm = Some(PendingAction::SoftDelete(id));
                }
            }
            AppAction::Input('r' | 'R') => {
                if let Some(message) = self.state.config_error.clone() {
                    self.toast(ToastLevel::Error, message);
                    return;
                }
                self.load_transactions().await;
                self.load_formatting().await;
            }
            _ => {}
        }
    }

    fn table_search(&mut self, action: AppAction) {
        match action {
            AppAction::Input(ch) => self.update_filters(|f| f.search.push(ch)),
            AppAction::Backspace => self.update_filters(|f| {
                f.search.pop();
            }),
            AppAction::Cancel => {
                self.update_filters(|f| f.search.clear());
                self.state.table.mode = TableMode::Browse;
            }
            AppAction::Submit => self.state.table.mode = TableMode::Browse,
            _ => {}
        }
    }

    fn table_filter(&mut self, action: AppAction) {
        let field = self.state.table.focused_filter();
        match action {
            AppAction::Up | AppAction::PrevField => {
                self.state.table.filter_focus = self.state.table.filter_focus.saturating_sub(1);
            }
            AppAction::Down | AppAction::NextField => {
                let last = FilterField::ALL.len() - 1;
                self.state.table.filter_focus = (self.state.table.filter_focus + 1).min(last);
            }
            AppAction::Left | AppAction::Right if is_choice_filter(field) => {
                let step = if action == AppAction::Left { -1 } else { 1 };
                self.cycle_filter_choice(field, step);
            }
            AppAction::Input(ch) => self.update_filters(|f| f.get_mut(field).push(ch)),
            AppAction::Backspace => self.update_filters(|f| {
                f.get_mut(field).pop();
            }),
            AppAction::Delete => self.update_filters(Filters::clear),
            AppAction::Submit | AppAction::Cancel => self.state.table.mode = TableMode::Browse,
            _ => {}
        }
    }

    async fn table_edit(&mut self, action: AppAction) {
        let Some(cell) = self.state.table.edit.as_mut() else {
            self.state.table.mode = TableMode::Browse;
            return;
        };
        match action {
            AppAction::Input(ch) => cell.input.push(ch),
            AppAction::Backspace => {
                cell.input.pop();
            }
            AppAction::Cancel => {
                self.state.table.edit = None;
                self.state.table.mode = TableMode::Browse;
            }
            AppAction::Submit => self.save_edit().await,
            _ => {}
        }
    }

    fn start_edit(&mut self) {
        let (Some(column), Some(tx)) = (
            self.focused_column(),
            self.state.list.visible().get(self.state.table.selected_row),
        ) else {
            return;
        };
        if !edit::is_editable(column) {
            let message = edit::EditError::NotEditable(column.label()).to_string();
            self.toast(ToastLevel::Info, message);
            return;
        }
        self.state.table.edit = Some(CellEdit {
            id: tx.id,
            column,
            input: edit::edit_seed(tx, column),
            error: None,
        });
        self.state.table.mode = TableMode::Edit;
    }

    async fn save_edit(&mut self) {
        let Some(cell) = self.state.table.edit.clone() else {
            return;
        };
        let Some(telegram_id) = self.telegram_id() else {
            self.set_edit_error(self.state.config_error.clone().unwrap_or_default());
            return;
        };
        let update = match edit::cell_update(cell.column, &cell.input, telegram_id) {
            Ok(update) => update,
            Err(err) => {
                self.set_edit_error(err.to_string());
                return;
            }
        };

        match self.client.update_transaction(cell.id, &update).await {
            Ok(updated) => {
                tracing::info!(id = cell.id, column = cell.column.key(), "cell updated");
                let updated = self.ingest(updated);
                self.state.list.apply(TransactionChange::Updated(updated));
                self.state.table.edit = None;
                self.state.table.mode = TableMode::Browse;
                self.refit_columns();
                self.toast(ToastLevel::Success, "Транзакция обновлена");
            }
            Err(err) => {
                tracing::error!(id = cell.id, %err, "cell update failed");
                self.set_edit_error(err.user_message());
            }
        }
    }

    fn set_edit_error(&mut self, message: String) {
        if let Some(cell) = self.state.table.edit.as_mut() {
            cell.error = Some(message);
        }
    }

    pub(super) async fn soft_delete(&mut self, id: i64) {
        match self.client.soft_delete(id).await {
            Ok(_) => {
                tracing::info!(id, "transaction moved to trash");
                self.state.list.apply(TransactionChange::Deleted(id));
                self.state.trash.loaded = false;
                self.state.table.clamp_selection(
                    self.state.list.visible().len(),
                    self.state.layout.order().len(),
                );
                self.toast(ToastLevel::Success, "Транзакция перемещена в корзину");
            }
            Err(err) => self.report("удаление транзакции", &err),
        }
    }

    fn focused_column(&self) -> Option<Column> {
        self.state
            .layout
            .order()
            .get(self.state.table.selected_col)
            .copied()
    }

    fn focused_row_id(&self) -> Option<i64> {
        self.state
            .list
            .visible()
            .get(self.state.table.selected_row)
            .map(|tx| tx.id)
    }

    fn move_focused_column(&mut self, step: isize) {
        let Some(column) = self.focused_column() else {
            return;
        };
        self.state.layout.move_column(column, step);
        if let Some(idx) = self.state.layout.order().iter().position(|c| *c == column) {
            self.state.table.selected_col = idx;
        }
    }

    fn resize_focused_column(&mut self, delta: i64) {
        if let Some(column) = self.focused_column() {
            self.state.layout.resize_column(column, delta);
        }
    }

    fn cycle_cell_color(&mut self) {
        let (Some(column), Some(id)) = (self.focused_column(), self.focused_row_id()) else {
            return;
        };
        let next = next_cell_color(self.state.layout.cell_color(id, column));
        self.state.layout.set_cell_color(id, column, next);
    }

    fn cycle_filter_choice(&mut self, field: FilterField, step: isize) {
        let mut choices = vec![String::new()];
        choices.extend(unique_values(self.state.list.all(), field));
        let current = self.state.list.filters().get(field);
        let idx = choices.iter().position(|c| c == current).unwrap_or(0);
        let next = (idx as isize + step).rem_euclid(choices.len() as isize) as usize;
        let value = choices.swap_remove(next);
        self.update_filters(|f| f.set(field, value));
    }

    fn update_filters(&mut self, change: impl FnOnce(&mut Filters)) {
        let mut filters = self.state.list.filters().clone();
        change(&mut filters);
        self.state.list.set_filters(filters);
        self.state.table.clamp_selection(
            self.state.list.visible().len(),
            self.state.layout.order().len(),
        );
    }
}
