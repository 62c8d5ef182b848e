//! Change-tracking wrapper around one remote record.

use super::buffer::MutationBuffer;
use crate::error::{Result, TrackerError};
use crate::remote::{RemoteStore, Request};
use crate::types::{
    core_fields, id_attribute, Attributes, OptionValue, RecordId, RecordRef, RemoteRecord, Value,
};
use std::fmt;
use std::sync::Arc;

/// What a call to [`TrackedRecord::save`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The record was created and received this identifier.
    Created(RecordId),
    /// Pending changes were sent as an update.
    Updated,
    /// The record exists and nothing changed; no call was made.
    Unchanged,
    /// Pending changes were copied into the pre-operation buffer.
    Redirected,
}

/// One remote record with field-level change tracking.
///
/// `values` holds the last known state of every field that was loaded or
/// written. `changes` holds only the fields written since the last load or
/// save, and is exactly what [`save`](Self::save) sends.
///
/// A tracked record has a single owner: every mutating operation takes
/// `&mut self` and there is no internal locking. Share it across threads
/// only behind the caller's own synchronization.
pub struct TrackedRecord {
    id: Option<RecordId>,
    type_name: String,
    values: Attributes,
    changes: Attributes,
    store: Option<Arc<dyn RemoteStore>>,

    /// Set in pre-operation mode; writes and saves go here instead.
    pre_operation: Option<MutationBuffer>,
}

impl TrackedRecord {
    /// A record that does not exist remotely yet.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            id: None,
            type_name: type_name.into(),
            values: Attributes::new(),
            changes: Attributes::new(),
            store: None,
            pre_operation: None,
        }
    }

    /// A record known to exist, with nothing loaded.
    ///
    /// Fields stay absent until [`refresh`](Self::refresh) loads them. A
    /// nil identifier is treated as absent.
    pub fn with_id(type_name: impl Into<String>, id: RecordId) -> Self {
        let mut record = Self::new(type_name);
        record.set_id(Some(id));
        record
    }

    /// Wrap a snapshot returned by a prior retrieval.
    ///
    /// Every snapshot attribute becomes a known value and nothing is
    /// pending. A nil identifier is treated as absent.
    pub fn from_snapshot(record: RemoteRecord) -> Self {
        Self {
            id: record.id.filter(|id| !id.is_nil()),
            type_name: record.type_name,
            values: record.attributes,
            changes: Attributes::new(),
            store: None,
            pre_operation: None,
        }
    }

    /// A fresh record whose every attribute is pending creation.
    ///
    /// The template's identifier is dropped.
    pub fn from_template(record: RemoteRecord) -> Self {
        Self {
            id: None,
            type_name: record.type_name,
            changes: record.attributes.clone(),
            values: record.attributes,
            store: None,
            pre_operation: None,
        }
    }

    /// Retrieve a record and wrap it.
    pub fn fetch(
        store: Arc<dyn RemoteStore>,
        type_name: &str,
        id: RecordId,
        fields: &[&str],
    ) -> Result<Self> {
        match store.retrieve(type_name, id, fields)? {
            Some(record) => Ok(Self::from_snapshot(record).with_store(store)),
            None => Err(TrackerError::NotFound {
                type_name: type_name.to_string(),
                id,
            }),
        }
    }

    /// Bind the remote store used by refresh, save and delete.
    pub fn with_store(mut self, store: Arc<dyn RemoteStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn set_store(&mut self, store: Arc<dyn RemoteStore>) {
        self.store = Some(store);
    }

    pub fn store(&self) -> Option<&Arc<dyn RemoteStore>> {
        self.store.as_ref()
    }

    // --- Identity ---

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    /// Set or clear the identity. A nil identifier clears it.
    pub fn set_id(&mut self, id: Option<RecordId>) {
        self.id = id.filter(|id| !id.is_nil());
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Reference to this record.
    ///
    /// Fails for a record that has not been created yet.
    pub fn reference(&self) -> Result<RecordRef> {
        match self.id {
            Some(id) => Ok(RecordRef::new(self.type_name.clone(), id)),
            None => Err(TrackerError::Precondition(format!(
                "cannot reference a {} that has not been created",
                self.type_name
            ))),
        }
    }

    // --- Field access ---

    /// Last known value of a field. Never contacts the store.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Write a field.
    ///
    /// In pre-operation mode the write lands in the mutation buffer and is
    /// not recorded as a pending change; `values` is updated either way.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();

        self.values.insert(field.clone(), value.clone());

        if let Some(buffer) = &self.pre_operation {
            buffer.set(field, value);
            return;
        }

        self.changes.insert(field, value);
    }

    pub fn values(&self) -> &Attributes {
        &self.values
    }

    /// Fields written since the last load or save.
    pub fn changes(&self) -> &Attributes {
        &self.changes
    }

    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn status(&self) -> Option<&OptionValue> {
        self.get(core_fields::STATUS).and_then(Value::as_option)
    }

    pub fn set_status(&mut self, status: OptionValue) {
        self.set(core_fields::STATUS, status);
    }

    pub fn status_reason(&self) -> Option<&OptionValue> {
        self.get(core_fields::STATUS_REASON).and_then(Value::as_option)
    }

    pub fn set_status_reason(&mut self, reason: OptionValue) {
        self.set(core_fields::STATUS_REASON, reason);
    }

    // --- Pre-operation mode ---

    /// Redirect writes and saves into a caller-owned buffer.
    ///
    /// Used when the harness commits the record itself, so saving must not
    /// reach the store.
    pub fn register_as_pre_operation(&mut self, buffer: MutationBuffer) {
        tracing::debug!(type_name = %self.type_name, "registered as pre-operation");
        self.pre_operation = Some(buffer);
    }

    pub fn is_pre_operation(&self) -> bool {
        self.pre_operation.is_some()
    }

    // --- Refresh ---

    /// Reload the given fields from the store.
    ///
    /// Returns `Ok(false)` without touching local state when the record
    /// has no identity, does not exist remotely, or the retrieval fails.
    /// On success each requested field takes the server value, or
    /// [`Value::Null`] if the server has none, and pending changes to those
    /// fields are dropped. Pending changes to other fields are kept.
    ///
    /// An empty field list behaves like [`refresh_all`](Self::refresh_all).
    pub fn refresh(&mut self, fields: &[&str]) -> Result<bool> {
        if fields.is_empty() {
            return self.refresh_all();
        }

        let Some(record) = self.retrieve_self(fields)? else {
            return Ok(false);
        };

        for field in fields {
            let value = record.attributes.get(*field).cloned().unwrap_or(Value::Null);
            self.values.insert(field.to_string(), value);
        }

        self.changes
            .retain(|name, _| !fields.contains(&name.as_str()));
        Ok(true)
    }

    /// Reload every column the store returns.
    ///
    /// Pending changes to returned fields are dropped; pending changes to
    /// fields the store did not return are kept.
    pub fn refresh_all(&mut self) -> Result<bool> {
        let Some(record) = self.retrieve_self(&[])? else {
            return Ok(false);
        };

        for (field, value) in record.attributes {
            self.changes.remove(&field);
            self.values.insert(field, value);
        }
        Ok(true)
    }

    /// Reload one field and return its value.
    pub fn refresh_field(&mut self, field: &str) -> Result<Option<&Value>> {
        self.refresh(&[field])?;
        Ok(self.get(field))
    }

    fn retrieve_self(&self, fields: &[&str]) -> Result<Option<RemoteRecord>> {
        let Some(id) = self.id else {
            return Ok(None);
        };
        let store = self.require_store("refresh")?;

        match store.retrieve(&self.type_name, id, fields) {
            Ok(Some(record)) => Ok(Some(record)),
            Ok(None) => {
                tracing::debug!(type_name = %self.type_name, %id, "refresh: record not found");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(type_name = %self.type_name, %id, error = %e, "refresh failed");
                Ok(None)
            }
        }
    }

    // --- Persistence ---

    /// Push pending changes.
    ///
    /// Creates the record when it has no identity, otherwise updates it.
    /// An update with nothing pending makes no call. In pre-operation mode
    /// pending changes are copied into the buffer and kept, and the store
    /// is never contacted.
    pub fn save(&mut self) -> Result<SaveOutcome> {
        if let Some(buffer) = &self.pre_operation {
            buffer.extend(&self.changes);
            tracing::debug!(
                type_name = %self.type_name,
                fields = self.changes.len(),
                "save redirected to pre-operation buffer"
            );
            return Ok(SaveOutcome::Redirected);
        }

        let store = Arc::clone(self.require_store("save")?);
        let record = self.to_change_record();

        let outcome = match self.id {
            Some(id) => {
                if self.changes.is_empty() {
                    return Ok(SaveOutcome::Unchanged);
                }
                store.update(&record)?;
                tracing::debug!(type_name = %self.type_name, %id, fields = record.attributes.len(), "updated");
                SaveOutcome::Updated
            }
            None => {
                let id = store.create(&record)?;
                tracing::debug!(type_name = %self.type_name, %id, "created");
                self.id = Some(id);
                SaveOutcome::Created(id)
            }
        };

        self.changes.clear();
        Ok(outcome)
    }

    /// Delete the record remotely.
    ///
    /// A record without identity is left alone and `Ok(false)` returned.
    /// Local state is not modified.
    pub fn delete(&self) -> Result<bool> {
        let Some(id) = self.id else {
            return Ok(false);
        };
        let store = self.require_store("delete")?;

        store.delete(&self.type_name, id)?;
        tracing::debug!(type_name = %self.type_name, %id, "deleted");
        Ok(true)
    }

    fn require_store(&self, operation: &str) -> Result<&Arc<dyn RemoteStore>> {
        self.store.as_ref().ok_or_else(|| {
            TrackerError::NotConfigured(format!(
                "cannot {} a {} without a remote store",
                operation, self.type_name
            ))
        })
    }

    // --- Request builders ---

    /// Bare record holding only the pending changes, plus the identity.
    pub fn to_change_record(&self) -> RemoteRecord {
        RemoteRecord {
            type_name: self.type_name.clone(),
            id: self.id,
            attributes: self.changes.clone(),
        }
    }

    /// Bare record holding every known value, plus the identity.
    pub fn to_full_record(&self) -> RemoteRecord {
        RemoteRecord {
            type_name: self.type_name.clone(),
            id: self.id,
            attributes: self.values.clone(),
        }
    }

    pub fn create_request(&self) -> Request {
        Request::Create {
            target: self.to_change_record(),
        }
    }

    /// `None` when there is nothing to update.
    pub fn update_request(&self) -> Option<Request> {
        if self.id.is_none() || self.changes.is_empty() {
            return None;
        }
        Some(Request::Update {
            target: self.to_change_record(),
        })
    }

    /// `None` when the record has no identity.
    pub fn delete_request(&self) -> Option<Request> {
        let target = self.reference().ok()?;
        Some(Request::Delete { target })
    }

    // --- Copying ---

    /// Turn a snapshot into a creation template: identity cleared and the
    /// `<type>id` attribute removed.
    pub fn copy_snapshot(mut record: RemoteRecord) -> RemoteRecord {
        record.id = None;
        record.remove(&id_attribute(&record.type_name));
        record
    }

    /// Creation template built from every known value of this record.
    pub fn copy_record(&self) -> RemoteRecord {
        let mut record = RemoteRecord {
            type_name: self.type_name.clone(),
            id: None,
            attributes: self.values.clone(),
        };
        record.remove(&id_attribute(&self.type_name));
        tracing::trace!(attributes = record.attributes.len(), "copy record");
        record
    }

    /// Fresh, unsaved copy of this record bound to the same store.
    pub fn duplicate(&self) -> TrackedRecord {
        let mut copy = TrackedRecord::from_template(self.copy_record());
        copy.store = self.store.clone();
        copy
    }
}

impl fmt::Debug for TrackedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedRecord")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("values", &self.values)
            .field("changes", &self.changes)
            .field("has_store", &self.store.is_some())
            .field("pre_operation", &self.pre_operation.is_some())
            .finish()
    }
}
