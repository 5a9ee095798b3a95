use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Startup and terminal failures. Backend failures stay in
/// [`ClientError`](crate::client::ClientError) and end up as toasts.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("terminal error: {0}")]
    Terminal(String),
}
