//! Fire-and-forget push of column alignment to the backend.

use api_types::formatting::Alignment;
use engine::{AlignmentSink, Column};

use crate::client::Client;

/// Spawns one `PUT /api/formatting/columns/{name}` per change. No retry;
/// failures only reach the log.
#[derive(Debug, Clone)]
pub struct RemoteAlignmentSink {
    client: Client,
    telegram_id: i64,
}

impl RemoteAlignmentSink {
    pub fn new(client: Client, telegram_id: i64) -> Self {
        Self {
            client,
            telegram_id,
        }
    }
}

impl AlignmentSink for RemoteAlignmentSink {
    fn alignment_changed(&self, column: Column, alignment: Option<Alignment>) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(column = column.key(), "no runtime, alignment not synced");
            return;
        };
        let client = self.client.clone();
        let telegram_id = self.telegram_id;
        runtime.spawn(async move {
            match client
                .update_column_alignment(column.key(), telegram_id, alignment)
                .await
            {
                Ok(()) => tracing::debug!(column = column.key(), ?alignment, "alignment synced"),
                Err(err) => tracing::warn!(column = column.key(), %err, "alignment sync failed"),
            }
        });
    }
}
