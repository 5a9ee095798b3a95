//! Errors shared by the engine components.
//!
//! - [`StorageError`] is raised by a [`KeyValueStorage`] implementation.
//! - [`RemoteError`] is raised by a [`Backend`] implementation.
//!
//!  [`KeyValueStorage`]: crate::storage::KeyValueStorage
//!  [`Backend`]: crate::remote::Backend
use thiserror::Error;

/// Message shown when the backend answered without a usable error body.
pub const GENERIC_REMOTE_MESSAGE: &str = "Не удалось выполнить запрос к серверу";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("stored record is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never completed.
    #[error("network error: {0}")]
    Transport(String),
    /// Non-2xx answer.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

impl RemoteError {
    /// Builds a [`RemoteError::Rejected`] falling back to the generic message
    /// when the body carried none.
    pub fn rejected(status: u16, message: Option<String>) -> Self {
        Self::Rejected {
            status,
            message: message.unwrap_or_else(|| GENERIC_REMOTE_MESSAGE.to_string()),
        }
    }

    /// Text suitable for a toast or a form banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => "Ошибка сети: сервер недоступен".to_string(),
            Self::Rejected { message, .. } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_without_body_uses_generic_message() {
        let err = RemoteError::rejected(500, None);
        assert_eq!(err.user_message(), GENERIC_REMOTE_MESSAGE);
        assert_eq!(err.to_string(), GENERIC_REMOTE_MESSAGE);
    }

    #[test]
    fn rejected_keeps_backend_message() {
        let err = RemoteError::rejected(400, Some("Сумма должна быть числом".to_string()));
        assert_eq!(err.user_message(), "Сумма должна быть числом");
    }
}
