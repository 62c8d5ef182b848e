//! Remote store contract.
//!
//! The store is reached over RPC by a transport this crate does not own.
//! Every call is a blocking round trip; retries and timeouts belong to
//! the transport behind the trait.

mod memory;
mod paging;
mod request;

pub use memory::{InMemoryStore, StoreCall};
pub use paging::{retrieve_all, Page, PageRequest};
pub use request::{BatchItemResult, BatchSettings, Request, RequestKind};

use crate::error::Result;
use crate::types::{RecordId, RemoteRecord};

/// Operations a tracked record needs from the remote record store.
pub trait RemoteStore: Send + Sync {
    /// Retrieve the named fields of a record.
    ///
    /// An empty field list requests every column. Returns `Ok(None)` when
    /// the record does not exist.
    fn retrieve(
        &self,
        type_name: &str,
        id: RecordId,
        fields: &[&str],
    ) -> Result<Option<RemoteRecord>>;

    /// Create a record and return its store-assigned identifier.
    fn create(&self, record: &RemoteRecord) -> Result<RecordId>;

    /// Update the attributes of an existing record. `record.id` must be set.
    fn update(&self, record: &RemoteRecord) -> Result<()>;

    fn delete(&self, type_name: &str, id: RecordId) -> Result<()>;

    /// Execute many requests in one round trip.
    ///
    /// Per-request faults are reported in the returned list; only a failure
    /// of the batch call itself is an `Err`.
    fn execute_batch(
        &self,
        requests: &[Request],
        settings: &BatchSettings,
    ) -> Result<Vec<BatchItemResult>>;
}
