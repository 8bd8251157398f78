use serde::Serialize;
use serde_json::Value;

/// The result of one domain command: a success flag, a human-readable
/// message, and an optional machine-readable payload. Handler failures are
/// reported here, never raised past the handler boundary.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl CommandOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        CommandOutcome {
            success: true,
            message: message.into(),
            payload: Value::Null,
        }
    }

    pub fn ok_with(message: impl Into<String>, payload: Value) -> Self {
        CommandOutcome {
            success: true,
            message: message.into(),
            payload,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        CommandOutcome {
            success: false,
            message: message.into(),
            payload: Value::Null,
        }
    }
}
