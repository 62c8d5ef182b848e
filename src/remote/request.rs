//! Request objects for batched submission.

use crate::types::{RecordId, RecordRef, RemoteRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a batched request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Create => write!(f, "Create"),
            RequestKind::Update => write!(f, "Update"),
            RequestKind::Delete => write!(f, "Delete"),
        }
    }
}

/// A single create/update/delete destined for a batch call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Request {
    Create { target: RemoteRecord },
    Update { target: RemoteRecord },
    Delete { target: RecordRef },
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Create { .. } => RequestKind::Create,
            Request::Update { .. } => RequestKind::Update,
            Request::Delete { .. } => RequestKind::Delete,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Request::Create { target } | Request::Update { target } => &target.type_name,
            Request::Delete { target } => &target.type_name,
        }
    }

    /// Identifier the request addresses, if any.
    pub fn id(&self) -> Option<RecordId> {
        match self {
            Request::Create { target } | Request::Update { target } => target.id,
            Request::Delete { target } => Some(target.id),
        }
    }
}

/// Store-side settings for a batch call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchSettings {
    /// Keep executing after a request faults.
    pub continue_on_error: bool,

    /// Return a result for every request, not just the faulted ones.
    pub return_responses: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            return_responses: true,
        }
    }
}

/// Outcome of one request within a batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchItemResult {
    Success {
        request_index: usize,
        /// Identifier assigned by a create.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<RecordId>,
    },
    Fault {
        request_index: usize,
        message: String,
    },
}

impl BatchItemResult {
    pub fn request_index(&self) -> usize {
        match self {
            BatchItemResult::Success { request_index, .. }
            | BatchItemResult::Fault { request_index, .. } => *request_index,
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, BatchItemResult::Fault { .. })
    }

    pub fn fault_message(&self) -> Option<&str> {
        match self {
            BatchItemResult::Fault { message, .. } => Some(message),
            BatchItemResult::Success { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accessors() {
        let id = RecordId::new_v4();
        let create = Request::Create {
            target: RemoteRecord::new("contact"),
        };
        let delete = Request::Delete {
            target: RecordRef::new("account", id),
        };

        assert_eq!(create.kind(), RequestKind::Create);
        assert_eq!(create.type_name(), "contact");
        assert_eq!(create.id(), None);
        assert_eq!(delete.kind(), RequestKind::Delete);
        assert_eq!(delete.type_name(), "account");
        assert_eq!(delete.id(), Some(id));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(RequestKind::Update.to_string(), "Update");
    }

    #[test]
    fn test_fault_accessors() {
        let fault = BatchItemResult::Fault {
            request_index: 3,
            message: "boom".to_string(),
        };
        assert!(fault.is_fault());
        assert_eq!(fault.request_index(), 3);
        assert_eq!(fault.fault_message(), Some("boom"));

        let ok = BatchItemResult::Success {
            request_index: 0,
            id: None,
        };
        assert!(!ok.is_fault());
        assert_eq!(ok.fault_message(), None);
    }
}
