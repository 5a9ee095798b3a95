//! HTTP client for the receipt tracker backend.

use std::collections::BTreeMap;

use api_types::{
    ErrorResponse,
    ai::{ParseAndSave, ParseAndSaveResponse},
    category::{CategoriesResponse, Category},
    formatting::{Alignment, ColumnAlignmentUpdate, ColumnFormatting, ColumnsFormattingResponse},
    operator::{Operator, OperatorUpsert, OperatorsResponse},
    transaction::{
        ActionResponse, ApiTransaction, ManualTransactionNew, TransactionListResponse,
        TransactionResponse, TransactionUpdate,
    },
};
use engine::RemoteError;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::{AppError, Result};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("rejected with status {status}")]
    Rejected { status: u16, message: Option<String> },
}

impl ClientError {
    pub fn user_message(&self) -> String {
        RemoteError::from(self).user_message()
    }
}

impl From<&ClientError> for RemoteError {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Endpoint(msg) => RemoteError::Transport(msg.clone()),
            ClientError::Transport(err) => RemoteError::Transport(err.to_string()),
            ClientError::Decode(_) => RemoteError::rejected(200, None),
            ClientError::Rejected { status, message } => {
                RemoteError::rejected(*status, message.clone())
            }
        }
    }
}

impl From<ClientError> for RemoteError {
    fn from(err: ClientError) -> Self {
        RemoteError::from(&err)
    }
}

type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(|err| AppError::InvalidSetting {
            key: "base_url",
            reason: err.to_string(),
        })?;
        // `Url::join` replaces the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn transactions(&self, telegram_id: i64) -> ClientResult<Vec<ApiTransaction>> {
        let res = self
            .request(Method::GET, "api/transactions")?
            .query(&[("telegram_id", telegram_id)])
            .send()
            .await
            .map_err(ClientError::Transport)?;
        let body: TransactionListResponse = read_json(res).await?;
        Ok(body.transactions)
    }

    pub async fn create_transaction(
        &self,
        payload: &ManualTransactionNew,
    ) -> ClientResult<ApiTransaction> {
        let res = self
            .request(Method::POST, "api/transactions")?
            .json(payload)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        let body: TransactionResponse = read_json(res).await?;
        Ok(body.transaction)
    }

    pub async fn update_transaction(
        &self,
        id: i64,
        update: &TransactionUpdate,
    ) -> ClientResult<ApiTransaction> {
        let res = self
            .request(Method::PUT, &format!("api/transactions/{id}"))?
            .json(update)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        let body: TransactionResponse = read_json(res).await?;
        Ok(body.transaction)
    }

    pub async fn soft_delete(&self, id: i64) -> ClientResult<ActionResponse> {
        self.action(Method::POST, &format!("api/transactions/{id}/soft-delete"))
            .await
    }

    pub async fn restore(&self, id: i64) -> ClientResult<ActionResponse> {
        self.action(Method::POST, &format!("api/transactions/{id}/restore"))
            .await
    }

    pub async fn permanent_delete(&self, id: i64) -> ClientResult<ActionResponse> {
        self.action(
            Method::DELETE,
            &format!("api/transactions/{id}/permanent-delete"),
        )
        .await
    }

    pub async fn trash(&self) -> ClientResult<Vec<ApiTransaction>> {
        let res = self
            .request(Method::GET, "api/trash/transactions")?
            .send()
            .await
            .map_err(ClientError::Transport)?;
        let body: TransactionListResponse = read_json(res).await?;
        Ok(body.transactions)
    }

    pub async fn empty_trash(&self) -> ClientResult<ActionResponse> {
        self.action(Method::DELETE, "api/trash/empty").await
    }

    pub async fn operators(&self, telegram_id: i64) -> ClientResult<Vec<Operator>> {
        let res = self
            .request(Method::GET, "api/operators")?
            .query(&[("telegram_id", telegram_id)])
            .send()
            .await
            .map_err(ClientError::Transport)?;
        let body: OperatorsResponse = read_json(res).await?;
        Ok(body.operators)
    }

    pub async fn create_operator(&self, operator: &OperatorUpsert) -> ClientResult<()> {
        let res = self
            .request(Method::POST, "api/operators")?
            .json(operator)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        ensure_success(res).await
    }

    pub async fn update_operator(&self, id: i64, operator: &OperatorUpsert) -> ClientResult<()> {
        let res = self
            .request(Method::PUT, &format!("api/operators/{id}"))?
            .json(operator)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        ensure_success(res).await
    }

    pub async fn delete_operator(&self, id: i64, telegram_id: i64) -> ClientResult<()> {
        let res = self
            .request(Method::DELETE, &format!("api/operators/{id}"))?
            .query(&[("telegram_id", telegram_id)])
            .send()
            .await
            .map_err(ClientError::Transport)?;
        ensure_success(res).await
    }

    pub async fn categories(&self) -> ClientResult<Vec<Category>> {
        let res = self
            .request(Method::GET, "api/categories")?
            .send()
            .await
            .map_err(ClientError::Transport)?;
        let body: CategoriesResponse = read_json(res).await?;
        Ok(body.into_vec())
    }

    pub async fn column_formatting(
        &self,
        telegram_id: i64,
    ) -> ClientResult<BTreeMap<String, ColumnFormatting>> {
        let res = self
            .request(Method::GET, "api/formatting/columns")?
            .query(&[("telegram_id", telegram_id)])
            .send()
            .await
            .map_err(ClientError::Transport)?;
        let body: ColumnsFormattingResponse = read_json(res).await?;
        Ok(body.columns)
    }

    /// `alignment: None` deletes the stored record.
    pub async fn update_column_alignment(
        &self,
        column_key: &str,
        telegram_id: i64,
        alignment: Option<Alignment>,
    ) -> ClientResult<()> {
        let res = self
            .request(Method::PUT, &format!("api/formatting/columns/{column_key}"))?
            .json(&ColumnAlignmentUpdate {
                telegram_id,
                alignment,
            })
            .send()
            .await
            .map_err(ClientError::Transport)?;
        ensure_success(res).await
    }

    pub async fn parse_and_save(&self, request: &ParseAndSave) -> ClientResult<ParseAndSaveResponse> {
        let res = self
            .request(Method::POST, "api/ai/parse-and-save")?
            .json(request)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        read_json(res).await
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let endpoint = self
            .base_url
            .join(path)
            .map_err(|err| ClientError::Endpoint(format!("{path}: {err}")))?;
        tracing::debug!(%method, %endpoint, "backend request");
        Ok(self.http.request(method, endpoint))
    }

    async fn action(&self, method: Method, path: &str) -> ClientResult<ActionResponse> {
        let res = self
            .request(method, path)?
            .send()
            .await
            .map_err(ClientError::Transport)?;
        let status = res.status();
        let res = check_status(res).await?;
        // Some handlers answer with an empty body.
        let bytes = res.bytes().await.map_err(ClientError::Transport)?;
        if bytes.is_empty() {
            return Ok(ActionResponse::default());
        }
        serde_json::from_slice(&bytes).or_else(|err| {
            tracing::debug!(%err, status = status.as_u16(), "ignoring unexpected action body");
            Ok(ActionResponse::default())
        })
    }
}

impl engine::Backend for Client {
    async fn create_transaction(
        &self,
        payload: &ManualTransactionNew,
    ) -> std::result::Result<ApiTransaction, RemoteError> {
        Client::create_transaction(self, payload)
            .await
            .map_err(RemoteError::from)
    }

    async fn parse_and_save(
        &self,
        request: &ParseAndSave,
    ) -> std::result::Result<ParseAndSaveResponse, RemoteError> {
        Client::parse_and_save(self, request)
            .await
            .map_err(RemoteError::from)
    }
}

async fn read_json<T: DeserializeOwned>(res: Response) -> ClientResult<T> {
    let res = check_status(res).await?;
    res.json::<T>().await.map_err(ClientError::Decode)
}

async fn ensure_success(res: Response) -> ClientResult<()> {
    check_status(res).await.map(|_| ())
}

/// Passes 2xx responses through; otherwise reads the error body, preferring
/// `message` over `error`.
async fn check_status(res: Response) -> ClientResult<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let message = res
        .json::<ErrorResponse>()
        .await
        .ok()
        .and_then(ErrorResponse::into_message);
    tracing::warn!(status = status.as_u16(), ?message, "backend rejected request");
    Err(ClientError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_a_trailing_slash() {
        let client = Client::new("http://localhost:5000/backend").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/backend/");
        let endpoint = client.base_url().join("api/transactions").unwrap();
        assert_eq!(endpoint.as_str(), "http://localhost:5000/backend/api/transactions");
    }

    #[test]
    fn invalid_base_url_is_a_startup_error() {
        assert!(matches!(
            Client::new("not a url"),
            Err(AppError::InvalidSetting { key: "base_url", .. })
        ));
    }

    #[test]
    fn rejection_maps_to_user_message() {
        let err = ClientError::Rejected {
            status: 400,
            message: Some("Неверная сумма".to_string()),
        };
        assert_eq!(err.user_message(), "Неверная сумма");

        let err = ClientError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), engine::GENERIC_REMOTE_MESSAGE);
    }
}
