use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use crossterm::event::{self, Event, KeyEvent};
use engine::{IngestDefaults, TableLayout, Transaction, TransactionList, form::SubmitError};
use tokio::sync::mpsc;

use crate::{
    client::{Client, ClientError},
    config::AppConfig,
    error::{AppError, Result},
    local_state::FileStorage,
    sync::RemoteAlignmentSink,
    ui::{
        self,
        keymap::{AppAction, map_key},
        measure::CellMeasurer,
    },
};

mod add;
mod settings;
mod table;
mod trash;

pub use add::{AddMode, AddState, FormReply, is_choice};
pub use settings::{OperatorField, SettingsMode, SettingsState};
pub use table::{CellEdit, TableMode, TableView, is_choice_filter};
pub use trash::TrashState;

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Table,
    Trash,
    Add,
    Settings,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Table, Page::Trash, Page::Add, Page::Settings];

    pub fn label(self) -> &'static str {
        match self {
            Self::Table => "Транзакции",
            Self::Trash => "Корзина",
            Self::Add => "Добавить",
            Self::Settings => "Настройки",
        }
    }

    fn from_digit(ch: char) -> Option<Self> {
        let idx = ch.to_digit(10)?.checked_sub(1)?;
        Self::ALL.get(idx as usize).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    expires_at: Instant,
}

/// Destructive actions waiting for an explicit yes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    SoftDelete(i64),
    PermanentDelete(i64),
    EmptyTrash,
    DeleteOperator(i64),
}

impl PendingAction {
    pub fn prompt(self) -> &'static str {
        match self {
            Self::SoftDelete(_) => "Переместить эту транзакцию в корзину?",
            Self::PermanentDelete(_) => {
                "Удалить транзакцию окончательно? Это действие нельзя отменить."
            }
            Self::EmptyTrash => {
                "Окончательно удалить ВСЕ транзакции из корзины? Это действие нельзя отменить!"
            }
            Self::DeleteOperator(_) => "Удалить этого оператора?",
        }
    }
}

pub struct AppState {
    pub page: Page,
    /// Set when the client cannot talk to the backend on behalf of a user.
    pub config_error: Option<String>,
    pub user: String,
    pub base_url: String,
    pub connection_ok: bool,
    pub last_refresh: Option<DateTime<Tz>>,
    pub toast: Option<ToastState>,
    pub confirm: Option<PendingAction>,
    pub list: TransactionList,
    pub layout: TableLayout<FileStorage>,
    pub measurer: CellMeasurer,
    pub table: TableView,
    pub trash: TrashState,
    pub add: AddState,
    pub settings: SettingsState,
}

impl AppState {
    /// Whether printable keys go into a text input.
    pub fn typing(&self) -> bool {
        if self.confirm.is_some() {
            return false;
        }
        match self.page {
            Page::Table => self.table.mode != TableMode::Browse,
            Page::Trash => false,
            Page::Add => self.add.typing(),
            Page::Settings => self.settings.mode != SettingsMode::List,
        }
    }
}

pub struct App {
    config: AppConfig,
    client: Client,
    defaults: IngestDefaults,
    pub state: AppState,
    replies: mpsc::UnboundedSender<FormReply>,
    pending: mpsc::UnboundedReceiver<FormReply>,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url)?;
        let storage = FileStorage::open(&config.state_path)?;
        let user_key = config.user_key();
        let mut layout = TableLayout::load(storage, user_key.as_deref());
        if let Some(telegram_id) = config.telegram_id {
            layout = layout.with_sink(RemoteAlignmentSink::new(client.clone(), telegram_id));
        }

        let identity = config.telegram_id.map(|telegram_id| engine::form::Identity {
            telegram_id,
            username: Some(config.username.clone()).filter(|u| !u.trim().is_empty()),
        });
        let config_error = match config.telegram_id {
            Some(_) => None,
            None => {
                tracing::warn!("telegram_id is not configured, data loading disabled");
                Some(SubmitError::NotConfigured.to_string())
            }
        };
        let user = match (&config.telegram_id, config.username.trim()) {
            (Some(id), "") => id.to_string(),
            (Some(id), name) => format!("{name} ({id})"),
            (None, _) => "-".to_string(),
        };

        let state = AppState {
            page: Page::Table,
            config_error,
            user,
            base_url: config.base_url.clone(),
            connection_ok: true,
            last_refresh: None,
            toast: None,
            confirm: None,
            list: TransactionList::default(),
            layout,
            measurer: CellMeasurer::new(config.cell_width_px),
            table: TableView::default(),
            trash: TrashState::default(),
            add: AddState::new(identity),
            settings: SettingsState::default(),
        };

        let (replies, pending) = mpsc::unbounded_channel();
        Ok(Self {
            defaults: IngestDefaults {
                currency: config.default_currency.clone(),
            },
            config,
            client,
            state,
            replies,
            pending,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        self.reload_all().await;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key).await;
                }
            }
            self.drain_form_replies();
            self.expire_toast();
        }

        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        let action = map_key(key, self.state.typing());
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }

        if let Some(pending) = self.state.confirm.take() {
            match action {
                AppAction::Submit | AppAction::Input('y' | 'Y' | 'д' | 'Д') => {
                    self.run_confirmed(pending).await;
                }
                _ => self.toast(ToastLevel::Info, "Отменено"),
            }
            return;
        }

        if !self.state.typing() {
            if let AppAction::Input(ch) = action {
                if let Some(page) = Page::from_digit(ch) {
                    self.switch_page(page).await;
                    return;
                }
            }
        }

        match self.state.page {
            Page::Table => self.handle_table_key(action).await,
            Page::Trash => self.handle_trash_key(action).await,
            Page::Add => self.handle_add_key(action).await,
            Page::Settings => self.handle_settings_key(action).await,
        }
    }

    async fn switch_page(&mut self, page: Page) {
        if self.state.page == page {
            return;
        }
        self.state.page = page;
        if page == Page::Trash && !self.state.trash.loaded {
            self.load_trash().await;
        }
    }

    async fn run_confirmed(&mut self, pending: PendingAction) {
        match pending {
            PendingAction::SoftDelete(id) => self.soft_delete(id).await,
            PendingAction::PermanentDelete(id) => self.permanent_delete(id).await,
            PendingAction::EmptyTrash => self.empty_trash().await,
            PendingAction::DeleteOperator(id) => self.delete_operator(id).await,
        }
    }

    /// Loads everything the pages need. Each source fails independently.
    async fn reload_all(&mut self) {
        if self.telegram_id().is_none() {
            return;
        }
        self.load_transactions().await;
        self.load_formatting().await;
        self.load_operators().await;
        self.load_categories().await;
    }

    async fn load_transactions(&mut self) {
        let Some(telegram_id) = self.telegram_id() else {
            return;
        };
        match self.client.transactions(telegram_id).await {
            Ok(transactions) => {
                let rows: Vec<Transaction> = transactions
                    .into_iter()
                    .map(|tx| Transaction::from_api(tx, &self.defaults))
                    .collect();
                tracing::info!(count = rows.len(), "transactions loaded");
                self.state.list.replace_all(rows);
                self.refit_columns();
                self.state.table.clamp_selection(
                    self.state.list.visible().len(),
                    self.state.layout.order().len(),
                );
                self.state.connection_ok = true;
                self.state.last_refresh = Some(Utc::now().with_timezone(&self.config.time_zone()));
            }
            Err(err) => self.report("загрузка транзакций", &err),
        }
    }

    async fn load_formatting(&mut self) {
        let Some(telegram_id) = self.telegram_id() else {
            return;
        };
        match self.client.column_formatting(telegram_id).await {
            Ok(columns) => self.state.layout.merge_remote_alignments(&columns),
            // Local alignment stays authoritative when the backend is silent.
            Err(err) => tracing::warn!(%err, "column formatting not loaded"),
        }
    }

    fn drain_form_replies(&mut self) {
        while let Ok(reply) = self.pending.try_recv() {
            self.apply_form_reply(reply);
        }
    }

    /// Widths follow content for every column not resized by hand.
    fn refit_columns(&mut self) {
        let font = self.state.measurer.font();
        let measurer = self.state.measurer;
        self.state
            .layout
            .apply_auto_widths(self.state.list.all(), &measurer, &font);
    }

    fn telegram_id(&self) -> Option<i64> {
        self.config.telegram_id
    }

    fn ingest(&self, api: api_types::transaction::ApiTransaction) -> Transaction {
        Transaction::from_api(api, &self.defaults)
    }

    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.config.time_zone())
    }

    fn toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.state.toast = Some(ToastState {
            message: message.into(),
            level,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    /// Logs a failed backend call and shows its user-facing message.
    fn report(&mut self, what: &str, err: &ClientError) {
        tracing::error!(%err, "{what} failed");
        if matches!(err, ClientError::Transport(_)) {
            self.state.connection_ok = false;
        }
        self.toast(ToastLevel::Error, err.user_message());
    }

    fn expire_toast(&mut self) {
        if self
            .state
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= Instant::now())
        {
            self.state.toast = None;
        }
    }
}
