//! Time-indexed coordinate-transform cache with on-demand backfill and
//! bidirectional best-first path search across a multi-parent frame graph.

mod accumulator;
pub mod backfill;
pub mod cache;
pub mod config;
pub mod core;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod ids;
pub mod registry;
pub mod search;
pub mod store;
pub mod time;
pub mod transform_storage;

pub use config::TfConfig;
pub use core::{StampedTransform, TransformCore};
pub use error::{IngestError, TfError};
pub use geometry::{Point, Pose, Stamped};
pub use ids::FrameId;
pub use registry::{FrameHandle, FrameRegistry};
pub use store::{DocumentStore, InMemoryStore, StoreError, TfCursor, TfDocument, TfQuery, TfRecord, UnavailableStore};
pub use time::Timestamp;
pub use transform_storage::TransformStorage;
