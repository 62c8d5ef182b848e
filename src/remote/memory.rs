//! In-process remote store.
//!
//! Keeps records in memory and logs every call it receives, so callers can
//! assert exactly which round trips a tracked record issued.

use super::paging::{Page, PageRequest};
use super::request::{BatchItemResult, BatchSettings, Request};
use super::RemoteStore;
use crate::error::{Result, TrackerError};
use crate::time::TimeZoneSource;
use crate::types::{id_attribute, Attributes, RecordId, RemoteRecord, Value};
use chrono::FixedOffset;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;

/// A call received by [`InMemoryStore`].
#[derive(Clone, Debug, PartialEq)]
pub enum StoreCall {
    Retrieve {
        type_name: String,
        id: RecordId,
        fields: Vec<String>,
    },
    Create {
        type_name: String,
        attributes: Attributes,
    },
    Update {
        type_name: String,
        id: RecordId,
        attributes: Attributes,
    },
    Delete {
        type_name: String,
        id: RecordId,
    },
    ExecuteBatch {
        request_count: usize,
    },
}

/// Remote store backed by a hash map.
#[derive(Default)]
pub struct InMemoryStore {
    /// (type name, id) -> attributes.
    records: RwLock<HashMap<(String, RecordId), Attributes>>,

    /// Every call received, in order.
    calls: Mutex<Vec<StoreCall>>,

    /// Type name -> message for injected failures.
    faults: RwLock<HashMap<String, String>>,

    /// UTC offset of the calling user, if one is configured.
    user_offset: RwLock<Option<FixedOffset>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record without logging a call. Assigns an id if it has none.
    pub fn insert(&self, record: RemoteRecord) -> RecordId {
        let id = record
            .id
            .filter(|id| !id.is_nil())
            .unwrap_or_else(RecordId::new_v4);
        let mut attributes = record.attributes;
        attributes.insert(id_attribute(&record.type_name), Value::Guid(id.0));
        self.records
            .write()
            .insert((record.type_name, id), attributes);
        id
    }

    /// Current stored state of a record, without logging a call.
    pub fn get(&self, type_name: &str, id: RecordId) -> Option<RemoteRecord> {
        self.records
            .read()
            .get(&(type_name.to_string(), id))
            .map(|attributes| RemoteRecord {
                type_name: type_name.to_string(),
                id: Some(id),
                attributes: attributes.clone(),
            })
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Make every operation on `type_name` fail with `message`.
    pub fn fail_type(&self, type_name: impl Into<String>, message: impl Into<String>) {
        self.faults.write().insert(type_name.into(), message.into());
    }

    pub fn clear_faults(&self) {
        self.faults.write().clear();
    }

    pub fn set_user_offset(&self, offset: Option<FixedOffset>) {
        *self.user_offset.write() = offset;
    }

    /// Fetch one page of records of a type, ordered by id.
    pub fn retrieve_page(
        &self,
        type_name: &str,
        request: &PageRequest,
        page_size: usize,
    ) -> Result<Page> {
        self.check_fault(type_name)?;

        let page_size = page_size.max(1);
        let records = self.records.read();
        let mut matching: Vec<(&RecordId, &Attributes)> = records
            .iter()
            .filter(|((t, _), _)| t == type_name)
            .map(|((_, id), attrs)| (id, attrs))
            .collect();
        matching.sort_by_key(|(id, _)| id.0);

        let start = (request.page_number.saturating_sub(1) as usize) * page_size;
        let page_records: Vec<RemoteRecord> = matching
            .iter()
            .skip(start)
            .take(page_size)
            .map(|(id, attrs)| RemoteRecord {
                type_name: type_name.to_string(),
                id: Some(**id),
                attributes: (*attrs).clone(),
            })
            .collect();
        let more_records = start + page_records.len() < matching.len();

        Ok(Page {
            paging_cookie: more_records.then(|| format!("{}", request.page_number)),
            records: page_records,
            more_records,
        })
    }

    fn log(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }

    fn check_fault(&self, type_name: &str) -> Result<()> {
        match self.faults.read().get(type_name) {
            Some(message) => Err(TrackerError::Remote(message.clone())),
            None => Ok(()),
        }
    }

    fn apply_create(&self, record: &RemoteRecord) -> Result<RecordId> {
        self.check_fault(&record.type_name)?;

        let id = record
            .id
            .filter(|id| !id.is_nil())
            .unwrap_or_else(RecordId::new_v4);
        let key = (record.type_name.clone(), id);

        let mut records = self.records.write();
        if records.contains_key(&key) {
            return Err(TrackerError::Remote(format!(
                "{} with id {} already exists",
                record.type_name, id
            )));
        }

        let mut attributes = record.attributes.clone();
        attributes.insert(id_attribute(&record.type_name), Value::Guid(id.0));
        records.insert(key, attributes);
        Ok(id)
    }

    fn apply_update(&self, record: &RemoteRecord) -> Result<()> {
        self.check_fault(&record.type_name)?;

        let id = record
            .id
            .ok_or_else(|| TrackerError::Remote("update requires an id".to_string()))?;
        let mut records = self.records.write();
        let existing = records
            .get_mut(&(record.type_name.clone(), id))
            .ok_or_else(|| {
                TrackerError::Remote(format!("{} with id {} does not exist", record.type_name, id))
            })?;

        for (field, value) in &record.attributes {
            existing.insert(field.clone(), value.clone());
        }
        Ok(())
    }

    fn apply_delete(&self, type_name: &str, id: RecordId) -> Result<()> {
        self.check_fault(type_name)?;

        match self.records.write().remove(&(type_name.to_string(), id)) {
            Some(_) => Ok(()),
            None => Err(TrackerError::Remote(format!(
                "{} with id {} does not exist",
                type_name, id
            ))),
        }
    }
}

impl RemoteStore for InMemoryStore {
    fn retrieve(
        &self,
        type_name: &str,
        id: RecordId,
        fields: &[&str],
    ) -> Result<Option<RemoteRecord>> {
        self.log(StoreCall::Retrieve {
            type_name: type_name.to_string(),
            id,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        });
        self.check_fault(type_name)?;

        let records = self.records.read();
        let Some(stored) = records.get(&(type_name.to_string(), id)) else {
            return Ok(None);
        };

        let attributes = if fields.is_empty() {
            stored.clone()
        } else {
            fields
                .iter()
                .filter_map(|f| stored.get(*f).map(|v| (f.to_string(), v.clone())))
                .collect()
        };

        Ok(Some(RemoteRecord {
            type_name: type_name.to_string(),
            id: Some(id),
            attributes,
        }))
    }

    fn create(&self, record: &RemoteRecord) -> Result<RecordId> {
        self.log(StoreCall::Create {
            type_name: record.type_name.clone(),
            attributes: record.attributes.clone(),
        });
        self.apply_create(record)
    }

    fn update(&self, record: &RemoteRecord) -> Result<()> {
        self.log(StoreCall::Update {
            type_name: record.type_name.clone(),
            id: record.id.unwrap_or_else(RecordId::nil),
            attributes: record.attributes.clone(),
        });
        self.apply_update(record)
    }

    fn delete(&self, type_name: &str, id: RecordId) -> Result<()> {
        self.log(StoreCall::Delete {
            type_name: type_name.to_string(),
            id,
        });
        self.apply_delete(type_name, id)
    }

    fn execute_batch(
        &self,
        requests: &[Request],
        settings: &BatchSettings,
    ) -> Result<Vec<BatchItemResult>> {
        self.log(StoreCall::ExecuteBatch {
            request_count: requests.len(),
        });

        let mut results = Vec::new();
        for (request_index, request) in requests.iter().enumerate() {
            let outcome = match request {
                Request::Create { target } => self.apply_create(target).map(Some),
                Request::Update { target } => self.apply_update(target).map(|_| None),
                Request::Delete { target } => {
                    self.apply_delete(&target.type_name, target.id).map(|_| None)
                }
            };

            match outcome {
                Ok(id) => {
                    if settings.return_responses {
                        results.push(BatchItemResult::Success { request_index, id });
                    }
                }
                Err(e) => {
                    results.push(BatchItemResult::Fault {
                        request_index,
                        message: e.to_string(),
                    });
                    if !settings.continue_on_error {
                        break;
                    }
                }
            }
        }

        Ok(results)
    }
}

impl TimeZoneSource for InMemoryStore {
    fn current_user_offset(&self) -> Result<Option<FixedOffset>> {
        Ok(*self.user_offset.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_assigns_id_and_id_attribute() {
        let store = InMemoryStore::new();
        let id = store
            .create(&RemoteRecord::new("contact").with("firstname", "Ada"))
            .unwrap();

        let stored = store.get("contact", id).unwrap();
        assert_eq!(stored.get("contactid"), Some(&Value::Guid(id.0)));
        assert_eq!(stored.get("firstname"), Some(&Value::from("Ada")));
        assert_eq!(store.call_count(), 1);
    }

    #[test]
    fn test_retrieve_returns_only_requested_fields() {
        let store = InMemoryStore::new();
        let id = store.insert(
            RemoteRecord::new("contact")
                .with("firstname", "Ada")
                .with("lastname", "Lovelace"),
        );

        let record = store.retrieve("contact", id, &["lastname"]).unwrap().unwrap();
        assert_eq!(record.attributes.len(), 1);
        assert_eq!(record.get("lastname"), Some(&Value::from("Lovelace")));

        let missing = store.retrieve("contact", RecordId::new_v4(), &[]).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_update_missing_record_fails() {
        let store = InMemoryStore::new();
        let record = RemoteRecord::new("contact").with_id(RecordId::new_v4());
        assert!(matches!(store.update(&record), Err(TrackerError::Remote(_))));
    }

    #[test]
    fn test_injected_fault() {
        let store = InMemoryStore::new();
        store.fail_type("contact", "plugin rejected the operation");

        let result = store.create(&RemoteRecord::new("contact"));
        match result {
            Err(TrackerError::Remote(message)) => {
                assert_eq!(message, "plugin rejected the operation")
            }
            other => panic!("unexpected result: {:?}", other),
        }

        store.clear_faults();
        assert!(store.create(&RemoteRecord::new("contact")).is_ok());
    }

    #[test]
    fn test_batch_stops_on_error_when_configured() {
        let store = InMemoryStore::new();
        let requests = vec![
            Request::Update {
                target: RemoteRecord::new("contact").with_id(RecordId::new_v4()),
            },
            Request::Create {
                target: RemoteRecord::new("contact"),
            },
        ];

        let settings = BatchSettings {
            continue_on_error: false,
            return_responses: true,
        };
        let results = store.execute_batch(&requests, &settings).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_fault());
        assert!(store.is_empty());
    }

    #[test]
    fn test_batch_without_responses_reports_only_faults() {
        let store = InMemoryStore::new();
        let requests = vec![
            Request::Create {
                target: RemoteRecord::new("contact"),
            },
            Request::Delete {
                target: crate::types::RecordRef::new("contact", RecordId::new_v4()),
            },
        ];

        let settings = BatchSettings {
            continue_on_error: true,
            return_responses: false,
        };
        let results = store.execute_batch(&requests, &settings).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].request_index(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_paging() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store.insert(RemoteRecord::new("contact").with("n", i as i64));
        }
        store.insert(RemoteRecord::new("account"));

        let first = store
            .retrieve_page("contact", &PageRequest::default(), 2)
            .unwrap();
        assert_eq!(first.records.len(), 2);
        assert!(first.more_records);

        let all = crate::remote::retrieve_all(|request| store.retrieve_page("contact", request, 2))
            .unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.iter().all(|r| r.type_name == "contact"));
    }
}
