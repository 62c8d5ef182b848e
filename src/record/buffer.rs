//! Caller-owned mutation buffer for pre-operation mode.

use crate::types::{Attributes, Value};
use parking_lot::Mutex;
use std::sync::Arc;

/// Field mutations owned by the invoking harness.
///
/// In pre-operation mode the harness commits these itself, so a tracked
/// record writes into the buffer instead of calling the remote store.
/// Cloning yields another handle to the same buffer.
#[derive(Clone, Debug, Default)]
pub struct MutationBuffer {
    inner: Arc<Mutex<Attributes>>,
}

impl MutationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the harness's existing target attributes.
    pub fn from_attributes(attributes: Attributes) -> Self {
        Self {
            inner: Arc::new(Mutex::new(attributes)),
        }
    }

    pub fn set(&self, field: impl Into<String>, value: Value) {
        self.inner.lock().insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<Value> {
        self.inner.lock().get(field).cloned()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.inner.lock().contains_key(field)
    }

    pub fn remove(&self, field: &str) -> Option<Value> {
        self.inner.lock().remove(field)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Attributes {
        self.inner.lock().clone()
    }

    /// Copy every entry of `attributes` into the buffer.
    pub fn extend(&self, attributes: &Attributes) {
        let mut inner = self.inner.lock();
        for (field, value) in attributes {
            inner.insert(field.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_contents() {
        let buffer = MutationBuffer::new();
        let handle = buffer.clone();

        handle.set("firstname", Value::from("Ada"));
        assert_eq!(buffer.get("firstname"), Some(Value::from("Ada")));
        assert_eq!(buffer.len(), 1);

        buffer.remove("firstname");
        assert!(handle.is_empty());
    }
}
