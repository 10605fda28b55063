//! # Propscope Scheduling and Orchestration
//!
//! Event-driven orchestration around the `propscope-core` engine:
//! debounced, per-document, mutually-exclusive scheduling of sync
//! operations against an external metadata store.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │ Lifecycle Events│───▶│   SyncManager    │───▶│  MetadataStore  │
//! │ (open/modify/   │    │                  │    │    (Trait)      │
//! │  create/meta)   │    └──────────────────┘    └─────────────────┘
//! └─────────────────┘             │
//!                                 ▼
//!                        ┌──────────────────┐
//!                        │  ScheduleGuard   │
//!                        │ (debounce table, │
//!                        │  in-flight set)  │
//!                        └──────────────────┘
//! ```
//!
//! The [`ScheduleGuard`] is the correctness boundary: per document
//! path, at most one pending debounce timer and at most one in-flight
//! read-modify-write. Triggers for a busy path are dropped, never
//! queued; a later natural trigger re-settles state.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod error;
mod events;
mod guard;
mod manager;
pub mod traits;

pub use error::{Error, Result};
pub use events::{SyncReason, VaultEvent, VaultEventKind};
pub use guard::ScheduleGuard;
pub use manager::{
    has_frontmatter_block, RestoreOutcome, RestoreSummary, SyncManager, SyncOutcome, SyncSummary,
    TemplateOutcome,
};
pub use traits::{ContentReader, FrontmatterMutator, MetadataStore};
