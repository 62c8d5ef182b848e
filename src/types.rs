//! Core types shared by tracked records and remote stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Store-assigned identifier of a remote record.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Generate a fresh random identifier.
    pub fn new_v4() -> Self {
        RecordId(Uuid::new_v4())
    }

    /// The all-zero identifier, used by the remote store to mean "unset".
    pub fn nil() -> Self {
        RecordId(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RecordId {
    fn from(id: Uuid) -> Self {
        RecordId(id)
    }
}

/// Value of a choice/option field: a numeric code with an optional label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionValue {
    pub code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl OptionValue {
    pub fn new(code: i32) -> Self {
        Self { code, label: None }
    }

    pub fn with_label(code: i32, label: impl Into<String>) -> Self {
        Self {
            code,
            label: Some(label.into()),
        }
    }
}

/// Reference to another remote record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    pub type_name: String,
    pub id: RecordId,
}

impl RecordRef {
    pub fn new(type_name: impl Into<String>, id: RecordId) -> Self {
        Self {
            type_name: type_name.into(),
            id,
        }
    }
}

/// A field value held by a record.
///
/// The remote store is schema-less, so every field is one of these variants
/// and callers are responsible for writing the variant the store expects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Field is unset remotely.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Guid(Uuid),
    /// UTC instant; local-time conversion lives in [`crate::time`].
    DateTime(DateTime<Utc>),
    /// Choice/option field.
    Option(OptionValue),
    /// Lookup to another record.
    Reference(RecordRef),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Value::Guid(g) => Some(*g),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_option(&self) -> Option<&OptionValue> {
        match self {
            Value::Option(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&RecordRef> {
        match self {
            Value::Reference(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Guid(_) => "guid",
            Value::DateTime(_) => "datetime",
            Value::Option(_) => "option",
            Value::Reference(_) => "reference",
            Value::List(_) => "list",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Uuid> for Value {
    fn from(g: Uuid) -> Self {
        Value::Guid(g)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<OptionValue> for Value {
    fn from(o: OptionValue) -> Self {
        Value::Option(o)
    }
}

impl From<RecordRef> for Value {
    fn from(r: RecordRef) -> Self {
        Value::Reference(r)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Field name to value mapping.
pub type Attributes = HashMap<String, Value>;

/// Name of the attribute that carries a record's own identifier.
pub fn id_attribute(type_name: &str) -> String {
    format!("{}id", type_name)
}

/// Fields every remote record type carries.
pub mod core_fields {
    pub const STATUS: &str = "statecode";
    pub const STATUS_REASON: &str = "statuscode";
    pub const CREATED_BY: &str = "createdby";
    pub const CREATED_ON: &str = "createdon";
    pub const MODIFIED_BY: &str = "modifiedby";
    pub const MODIFIED_ON: &str = "modifiedon";
    pub const OWNER_ID: &str = "ownerid";
}

/// A bare record as exchanged with the remote store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub type_name: String,
    pub id: Option<RecordId>,
    pub attributes: Attributes,
}

impl RemoteRecord {
    /// Create an empty record of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Builder-style attribute setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(field.into(), value.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.attributes.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.attributes.remove(field)
    }

    /// Reference to this record, if it has an identifier.
    pub fn reference(&self) -> Option<RecordRef> {
        self.id.map(|id| RecordRef::new(self.type_name.clone(), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_attribute() {
        assert_eq!(id_attribute("contact"), "contactid");
    }

    #[test]
    fn test_option_value_serializes_code_and_label() {
        let value = Value::Option(OptionValue::with_label(1, "Active"));
        let encoded = serde_json::to_value(&value).unwrap();
        assert_eq!(
            encoded,
            json!({"type": "option", "value": {"code": 1, "label": "Active"}})
        );

        let bare = serde_json::to_value(Value::Option(OptionValue::new(2))).unwrap();
        assert_eq!(bare, json!({"type": "option", "value": {"code": 2}}));
    }

    #[test]
    fn test_option_is_not_an_int() {
        let value = Value::from(OptionValue::new(3));
        assert_eq!(value.as_int(), None);
        assert_eq!(value.as_option().map(|o| o.code), Some(3));
    }

    #[test]
    fn test_reference_decodes() {
        let id = RecordId::new_v4();
        let encoded = json!({
            "type": "reference",
            "value": {"type_name": "account", "id": id.0.to_string()}
        });
        let value: Value = serde_json::from_value(encoded).unwrap();
        assert_eq!(value.as_reference(), Some(&RecordRef::new("account", id)));
    }

    #[test]
    fn test_remote_record_builder() {
        let id = RecordId::new_v4();
        let record = RemoteRecord::new("contact")
            .with_id(id)
            .with("firstname", "Ada")
            .with("age", 36);

        assert_eq!(record.get("firstname"), Some(&Value::from("Ada")));
        assert_eq!(record.get("age").and_then(Value::as_int), Some(36));
        assert_eq!(record.reference(), Some(RecordRef::new("contact", id)));
        assert!(RemoteRecord::new("contact").reference().is_none());
    }
}
