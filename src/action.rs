//! Custom action invocation.
//!
//! Actions receive named input parameters from the harness and answer with
//! a JSON-encoded [`ActionResponse`] in the `Response` output parameter.

use crate::diagnostics::DiagnosticSink;
use crate::error::{Result, TrackerError};
use crate::types::{Attributes, Value};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const ACTION_NAME_PARAMETER: &str = "ActionName";
pub const PARAMETERS_PARAMETER: &str = "Parameters";
pub const RESPONSE_PARAMETER: &str = "Response";

/// Outcome reported to the action's caller. Encoded as 1 / 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionStatus {
    Success,
    Error,
}

impl ActionStatus {
    pub fn code(self) -> u8 {
        match self {
            ActionStatus::Success => 1,
            ActionStatus::Error => 0,
        }
    }
}

impl Serialize for ActionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for ActionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(ActionStatus::Success),
            0 => Ok(ActionStatus::Error),
            other => Err(serde::de::Error::custom(format!(
                "invalid action status: {}",
                other
            ))),
        }
    }
}

/// Payload returned by an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionResponse {
    pub status: ActionStatus,
    pub value: String,
}

impl Default for ActionResponse {
    fn default() -> Self {
        Self {
            status: ActionStatus::Success,
            value: "No response".to_string(),
        }
    }
}

impl ActionResponse {
    pub fn success(value: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Success,
            value: value.into(),
        }
    }

    pub fn error(value: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Error,
            value: value.into(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TrackerError::Deserialization(e.to_string()))
    }
}

/// Parameters of one action invocation.
#[derive(Clone, Debug, Default)]
pub struct ActionInvocation {
    pub input_parameters: Attributes,
    pub output_parameters: Attributes,
}

impl ActionInvocation {
    pub fn new(action_name: impl Into<String>) -> Self {
        let mut invocation = Self::default();
        invocation
            .input_parameters
            .insert(ACTION_NAME_PARAMETER.to_string(), Value::String(action_name.into()));
        invocation
    }

    pub fn with_parameters(mut self, parameters: impl Into<String>) -> Self {
        self.input_parameters.insert(
            PARAMETERS_PARAMETER.to_string(),
            Value::String(parameters.into()),
        );
        self
    }

    /// The decoded `Response` output parameter, once the action has run.
    pub fn response(&self) -> Result<Option<ActionResponse>> {
        match self.output_parameters.get(RESPONSE_PARAMETER) {
            Some(Value::String(json)) => ActionResponse::from_json(json).map(Some),
            Some(other) => Err(TrackerError::Deserialization(format!(
                "response parameter is a {}, expected string",
                other.type_name()
            ))),
            None => Ok(None),
        }
    }
}

/// Run an action handler against an invocation.
///
/// The handler receives the action name and the raw `Parameters` string
/// (empty when absent). Its response is serialized into the `Response`
/// output parameter. Any failure surfaces as [`TrackerError::Invocation`]
/// carrying the original message.
pub fn run_action<F>(
    invocation: &mut ActionInvocation,
    tracer: Option<&dyn DiagnosticSink>,
    handler: F,
) -> Result<()>
where
    F: FnOnce(&str, &str) -> Result<ActionResponse>,
{
    execute(invocation, tracer, handler).map_err(|e| match e {
        TrackerError::Invocation(message) => TrackerError::Invocation(message),
        other => TrackerError::Invocation(other.to_string()),
    })
}

fn execute<F>(
    invocation: &mut ActionInvocation,
    tracer: Option<&dyn DiagnosticSink>,
    handler: F,
) -> Result<()>
where
    F: FnOnce(&str, &str) -> Result<ActionResponse>,
{
    let action_name = match invocation.input_parameters.get(ACTION_NAME_PARAMETER) {
        Some(Value::String(name)) => name.clone(),
        _ => {
            return Err(TrackerError::Precondition(format!(
                "missing {} input parameter",
                ACTION_NAME_PARAMETER
            )))
        }
    };
    let parameters = invocation
        .input_parameters
        .get(PARAMETERS_PARAMETER)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    trace_parameters(tracer, &invocation.input_parameters);
    tracing::debug!(%action_name, "running action");

    let response = handler(&action_name, &parameters)?;
    invocation.output_parameters.insert(
        RESPONSE_PARAMETER.to_string(),
        Value::String(response.to_json()?),
    );

    if let Some(tracer) = tracer {
        tracer.trace("OutputParameters:");
    }
    trace_parameters(tracer, &invocation.output_parameters);
    Ok(())
}

fn trace_parameters(tracer: Option<&dyn DiagnosticSink>, parameters: &Attributes) {
    let Some(tracer) = tracer else {
        return;
    };
    let mut names: Vec<&String> = parameters.keys().collect();
    names.sort();
    for name in names {
        if let Some(value) = parameters.get(name) {
            tracer.trace(&format!("{} = {}", name, display_value(value)));
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => format!("{:?}", other),
    }
}
