//! Backend capabilities the engine components call into.
//!
//! The HTTP client of the binary implements these; tests use in-memory fakes.

use api_types::{
    ai::{ParseAndSave, ParseAndSaveResponse},
    formatting::Alignment,
    transaction::{ApiTransaction, ManualTransactionNew},
};

use crate::{Column, error::RemoteError};

/// Transaction creation endpoints used by the manual form.
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn create_transaction(
        &self,
        payload: &ManualTransactionNew,
    ) -> Result<ApiTransaction, RemoteError>;

    async fn parse_and_save(
        &self,
        request: &ParseAndSave,
    ) -> Result<ParseAndSaveResponse, RemoteError>;
}

/// Receives column alignment changes for best-effort remote sync.
///
/// Implementations must not block: the layout state is already updated when
/// this is called, and a failure is only reported through logs.
pub trait AlignmentSink {
    fn alignment_changed(&self, column: Column, alignment: Option<Alignment>);
}

/// Sink used when no backend identity is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl AlignmentSink for NoopSink {
    fn alignment_changed(&self, column: Column, alignment: Option<Alignment>) {
        tracing::debug!(column = column.key(), ?alignment, "alignment sync skipped");
    }
}

impl<F> AlignmentSink for F
where
    F: Fn(Column, Option<Alignment>),
{
    fn alignment_changed(&self, column: Column, alignment: Option<Alignment>) {
        self(column, alignment)
    }
}
