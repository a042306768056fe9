//! weft-core: event log, canonical-path resolution, and projection engine
//! for an evolving narrative built from a branching chat.
//!
//! The pipeline: external collaborators observe chat text and produce typed
//! [`event::EventData`] deltas → [`store::EventLog::append`] → on every query
//! a [`path::SwipeContext`] filters the multi-branch log down to the selected
//! timeline → [`projection::project`] folds the filtered sequence into a
//! [`snapshot::Snapshot`] → consumed by the CLI/UI or exported. Edits go
//! through [`store::EventLog::delete_at`] / [`store::EventLog::replace_at`];
//! no cached projection survives an edit, because there are no cached
//! projections.
//!
//! # Conventions
//!
//! - **Errors**: per-module `thiserror` enums; `anyhow::Result` at the
//!   config/CLI boundary.
//! - **Logging**: `tracing` macros (`warn!`, `debug!`).
//! - **Determinism**: replay reads no clocks, randomness, or ambient state;
//!   all folded collections are B-tree ordered.

pub mod chapters;
pub mod clock;
pub mod config;
pub mod consolidate;
pub mod error;
pub mod event;
pub mod path;
pub mod projection;
pub mod snapshot;
pub mod store;
pub mod transcript;

pub use chapters::{Chapter, MilestoneInfo};
pub use config::EngineConfig;
pub use error::ProjectionError;
pub use event::{Event, EventData, EventKind, EventSource, ValidateError};
pub use path::SwipeContext;
pub use snapshot::{CharacterState, InitialSnapshot, PairKey, RelationshipState, Snapshot};
pub use store::EventLog;
pub use transcript::{Transcript, TranscriptError};
