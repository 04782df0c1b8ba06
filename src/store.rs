//! The document-store boundary consumed by [`crate::backfill`].
//!
//! The store itself, and JSON/BSON decoding of its documents, are both out
//! of scope here: this module only defines the shape of what Backfill
//! expects to receive and the small synchronous query interface it drives.
//! No concrete database client is implemented here; `InMemoryStore` exists
//! purely so tests can exercise Backfill without a real store.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Failure talking to the backing document store. Wrapped by
/// [`crate::error::TfError::StoreUnavailable`] at the Backfill boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("store connection unavailable: {0}")]
    Unavailable(String),

    #[error("store query timed out")]
    TimedOut,
}

/// A single TF record within a stored document's `transforms` array.
#[derive(Debug, Clone, Deserialize)]
pub struct TfRecord {
    pub frame_id: String,
    /// Nanoseconds since epoch. The wire format is an ISO-8601 string
    /// (`header.stamp.$date`); decoding that string happens outside this
    /// crate, which only ever receives the already-parsed value.
    pub stamp_nanos: i64,
    pub child_frame_id: String,
    pub translation: [f64; 3],
    /// `[x, y, z, w]`.
    pub rotation: [f64; 4],
}

/// One document from the `tf` collection: a batch of records captured at
/// one wall-clock instant.
#[derive(Debug, Clone, Deserialize)]
pub struct TfDocument {
    pub recorded: DateTime<Utc>,
    pub transforms: Vec<TfRecord>,
}

/// A time-bounded query against the `tf` collection, as issued by Backfill:
/// `child_frame_id == F AND recorded_at in [start, end)`.
#[derive(Debug, Clone)]
pub struct TfQuery {
    pub child_frame_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A cursor over matching documents, already sorted per the caller's
/// request. `close` is explicit rather than relying on `Drop`, matching an
/// "iteration with explicit close" contract.
pub trait TfCursor {
    fn next_doc(&mut self) -> Option<TfDocument>;
    fn close(&mut self);
}

/// The small query interface Backfill drives. Implementations adapt a real
/// document store; this crate ships none.
pub trait DocumentStore {
    /// `find(collection, filter, projection)` + `sort(cursor, spec)`,
    /// collapsed into one call: the contract guarantees the returned cursor
    /// already yields documents sorted by `recorded` descending.
    fn find_tf(&self, query: &TfQuery) -> Result<Box<dyn TfCursor>, StoreError>;
}

/// An in-memory stand-in for a document store, used by tests and the
/// Backfill scenario tests in `tests/`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    documents: Vec<TfDocument>,
}

impl InMemoryStore {
    pub fn new(documents: Vec<TfDocument>) -> Self {
        Self { documents }
    }
}

struct VecCursor(VecDeque<TfDocument>);

impl TfCursor for VecCursor {
    fn next_doc(&mut self) -> Option<TfDocument> {
        self.0.pop_front()
    }

    fn close(&mut self) {
        self.0.clear();
    }
}

impl DocumentStore for InMemoryStore {
    fn find_tf(&self, query: &TfQuery) -> Result<Box<dyn TfCursor>, StoreError> {
        let mut matched: Vec<TfDocument> = self
            .documents
            .iter()
            .filter(|doc| {
                doc.recorded >= query.start
                    && doc.recorded < query.end
                    && doc
                        .transforms
                        .iter()
                        .any(|r| r.child_frame_id == query.child_frame_id)
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.recorded.cmp(&a.recorded));
        Ok(Box::new(VecCursor(matched.into())))
    }
}

/// A store that always reports unavailable, for exercising the
/// `StoreUnavailable` degrade path.
#[derive(Debug, Clone, Default)]
pub struct UnavailableStore;

impl DocumentStore for UnavailableStore {
    fn find_tf(&self, _query: &TfQuery) -> Result<Box<dyn TfCursor>, StoreError> {
        Err(StoreError::Unavailable("no store configured".to_string()))
    }
}
