//! # Record Tracker
//!
//! A change-tracking mapper between application code and a remote,
//! schema-less record store reached over RPC.
//!
//! ## Core Concepts
//!
//! - **Tracked records**: known field values plus the changeset written
//!   since the last load or save
//! - **Minimal writes**: saving sends only the changeset, creates when the
//!   record has no identity, and skips empty updates
//! - **Targeted refresh**: reloading some fields drops pending changes to
//!   exactly those fields
//! - **Pre-operation mode**: writes and saves land in a caller-owned
//!   mutation buffer instead of the store
//! - **Batches**: request objects collected and submitted in one call
//!
//! ## Example
//!
//! ```ignore
//! use record_tracker::{InMemoryStore, TrackedRecord};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryStore::new());
//!
//! let mut contact = TrackedRecord::new("contact").with_store(store.clone());
//! contact.set("firstname", "Ada");
//! contact.set("lastname", "Lovelace");
//! contact.save()?; // create
//!
//! contact.set("lastname", "Byron");
//! contact.save()?; // update { lastname }
//! contact.save()?; // nothing pending, no call
//! ```

pub mod action;
pub mod batch;
pub mod diagnostics;
pub mod error;
pub mod record;
pub mod remote;
pub mod time;
pub mod types;

// Re-exports
pub use action::{run_action, ActionInvocation, ActionResponse, ActionStatus};
pub use batch::{chunk, execute_batch, execute_batches, BatchConfig, BatchReport, RequestBuffer};
pub use diagnostics::{DiagnosticSink, MemorySink, TracingSink};
pub use error::{Result, TrackerError};
pub use record::{
    fetch_typed, merge, typed_list, MutationBuffer, SaveOutcome, TrackedRecord, TypedRecord,
};
pub use remote::{
    retrieve_all, BatchItemResult, BatchSettings, InMemoryStore, Page, PageRequest, RemoteStore,
    Request, RequestKind, StoreCall,
};
pub use time::{local_time_for_current_user, to_local_time, TimeZoneSource};
pub use types::*;
