//! Client-side core of the receipt tracker.
//!
//! - [`form`]: the manual transaction form (schema, validation, payload,
//!   submission lifecycle).
//! - [`table`]: the transaction table layout (order, widths, alignment,
//!   colors, formatting, persistence).
//! - [`list`] and [`filter`]: the in-memory transaction list and its
//!   filtered view.
//!
//! The backend and the key/value storage are reached through the
//! [`Backend`], [`AlignmentSink`] and [`KeyValueStorage`] traits.

pub use error::{GENERIC_REMOTE_MESSAGE, RemoteError, StorageError};
pub use filter::{FilterField, Filters, unique_values};
pub use list::TransactionList;
pub use remote::{AlignmentSink, Backend, NoopSink};
pub use storage::{KeyValueStorage, MemoryStorage};
pub use table::{Column, LayoutState, TableLayout};
pub use transaction::{
    DEFAULT_CURRENCY, IngestDefaults, OperationType, Transaction, TransactionChange,
};

pub mod datetime;
mod error;
pub mod filter;
pub mod form;
pub mod list;
pub mod remote;
pub mod storage;
pub mod table;
pub mod transaction;
