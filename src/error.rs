use thiserror::Error;

use crate::ids::FrameId;
use crate::store::StoreError;

/// Errors reported to callers of [`crate::core::TransformCore`].
///
/// Ingestion-time problems (malformed records, self-transforms, bad
/// quaternions) never reach this type: they are logged and the offending
/// record is skipped instead (see [`IngestError`] and [`crate::backfill`]).
/// Only query-time failures are surfaced here.
#[derive(Error, Debug)]
pub enum TfError {
    #[error("frame `{0}` is unknown to the registry")]
    UnknownFrameID(String),

    #[error("no data available for frame `{0}`")]
    NoData(String),

    #[error("no connecting path between `{source}` and `{target}`")]
    NotConnected { source: String, target: String },

    #[error("the document store is unavailable")]
    StoreUnavailable(#[source] StoreError),

    #[error("lookup for `{source}` -> `{target}` exceeded its deadline")]
    Timeout { source: String, target: String },
}

impl TfError {
    pub(crate) fn not_connected(source: &FrameId, target: &FrameId) -> Self {
        TfError::NotConnected {
            source: source.as_str().to_string(),
            target: target.as_str().to_string(),
        }
    }

    pub(crate) fn timeout(source: &FrameId, target: &FrameId) -> Self {
        TfError::Timeout {
            source: source.as_str().to_string(),
            target: target.as_str().to_string(),
        }
    }
}

/// Locally-recovered errors encountered while ingesting a single record
/// (live `set_transform` calls or a [`crate::backfill`] batch).
///
/// These never propagate to a query caller: the offending record is logged
/// via `log::warn!` and the batch continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestError {
    #[error("`{frame_id}` (reported by `{authority}`) cannot be its own child_frame_id")]
    SelfTransform { authority: String, frame_id: String },

    #[error("`{field}` reported by `{authority}` is empty")]
    EmptyFrameID { authority: String, field: &'static str },

    #[error("quaternion missing or not unit length for edge `{parent}` -> `{child}`")]
    InvalidQuaternion { parent: String, child: String },

    #[error("malformed record: {0}")]
    MalformedRecord(String),
}
