//! Typed wrappers over tracked records.
//!
//! A wrapper fixes the record type at compile time and layers named
//! accessors over the same field map; storage stays a [`TrackedRecord`].

use super::tracked::TrackedRecord;
use crate::error::{Result, TrackerError};
use crate::remote::RemoteStore;
use crate::types::{RecordId, RemoteRecord};
use std::sync::Arc;

/// A tracked record of one known type.
pub trait TypedRecord: Sized {
    /// Logical type name this wrapper accepts.
    const TYPE_NAME: &'static str;

    /// Wrap a record already known to be of `TYPE_NAME`.
    fn from_tracked(record: TrackedRecord) -> Self;

    fn tracked(&self) -> &TrackedRecord;

    fn tracked_mut(&mut self) -> &mut TrackedRecord;

    fn into_tracked(self) -> TrackedRecord;

    /// A new, unsaved record bound to `store`.
    fn create_new(store: Arc<dyn RemoteStore>) -> Self {
        Self::from_tracked(TrackedRecord::new(Self::TYPE_NAME).with_store(store))
    }
}

impl TrackedRecord {
    /// Convert into a typed wrapper, checking the type name.
    pub fn into_typed<T: TypedRecord>(self) -> Result<T> {
        if self.type_name() != T::TYPE_NAME {
            return Err(TrackerError::TypeMismatch {
                type_name: self.type_name().to_string(),
                expected: T::TYPE_NAME.to_string(),
            });
        }
        Ok(T::from_tracked(self))
    }
}

/// Wrap each snapshot of a result set in `T`, binding `store`.
pub fn typed_list<T: TypedRecord>(
    records: Vec<RemoteRecord>,
    store: &Arc<dyn RemoteStore>,
) -> Result<Vec<T>> {
    records
        .into_iter()
        .map(|record| {
            TrackedRecord::from_snapshot(record)
                .with_store(Arc::clone(store))
                .into_typed()
        })
        .collect()
}

/// Retrieve a record of type `T`.
pub fn fetch_typed<T: TypedRecord>(
    store: Arc<dyn RemoteStore>,
    id: RecordId,
    fields: &[&str],
) -> Result<T> {
    TrackedRecord::fetch(store, T::TYPE_NAME, id, fields)?.into_typed()
}

/// Copy every attribute of `source` onto `target`, overwriting.
pub fn merge<'a>(target: &'a mut RemoteRecord, source: &RemoteRecord) -> &'a mut RemoteRecord {
    for (field, value) in &source.attributes {
        target.attributes.insert(field.clone(), value.clone());
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::InMemoryStore;
    use crate::types::Value;

    struct Account(TrackedRecord);

    impl TypedRecord for Account {
        const TYPE_NAME: &'static str = "account";

        fn from_tracked(record: TrackedRecord) -> Self {
            Account(record)
        }

        fn tracked(&self) -> &TrackedRecord {
            &self.0
        }

        fn tracked_mut(&mut self) -> &mut TrackedRecord {
            &mut self.0
        }

        fn into_tracked(self) -> TrackedRecord {
            self.0
        }
    }

    #[test]
    fn test_into_typed_checks_type() {
        let ok = TrackedRecord::new("account").into_typed::<Account>();
        assert!(ok.is_ok());

        let err = TrackedRecord::new("contact").into_typed::<Account>();
        assert!(matches!(err, Err(TrackerError::TypeMismatch { .. })));
    }

    #[test]
    fn test_typed_list_rejects_foreign_rows() {
        let store: Arc<dyn RemoteStore> = Arc::new(InMemoryStore::new());
        let rows = vec![RemoteRecord::new("account"), RemoteRecord::new("account")];
        let accounts: Vec<Account> = typed_list(rows, &store).unwrap();
        assert_eq!(accounts.len(), 2);
        assert!(accounts[0].tracked().store().is_some());

        let mixed = vec![RemoteRecord::new("account"), RemoteRecord::new("contact")];
        assert!(typed_list::<Account>(mixed, &store).is_err());
    }

    #[test]
    fn test_merge_overwrites() {
        let mut target = RemoteRecord::new("account").with("name", "Old").with("city", "Oslo");
        let source = RemoteRecord::new("account").with("name", "New");

        merge(&mut target, &source);
        assert_eq!(target.get("name"), Some(&Value::from("New")));
        assert_eq!(target.get("city"), Some(&Value::from("Oslo")));
    }
}
