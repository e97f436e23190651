//! Typed event unions for the duplex channel
//!
//! Events are `type`-tagged JSON objects. The names are deliberately
//! backend-neutral: any service emitting the same four event families
//! (session lifecycle, text output, function-call output, error) can be
//! bridged by a thin adapter without touching the session state machine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared output shape the remote must conform its responses to.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Instructions plus declared tool, carried by a session update.
#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    pub instructions: String,
    pub tool: ToolSpec,
}

/// Events sent to the remote.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Overwrite the session's instructions and declared tool. The remote
    /// acknowledges with `session.created` (first time) or
    /// `session.updated`.
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionConfig },

    /// One analysis request. The remote answers with a stream of output
    /// events ending in a terminal event.
    #[serde(rename = "response.create")]
    ResponseCreate { input: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionInfo {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
}

/// Events received from the remote.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "session.created")]
    SessionCreated { session: SessionInfo },

    #[serde(rename = "session.updated")]
    SessionUpdated { session: SessionInfo },

    /// Incremental free-text output.
    #[serde(rename = "response.text.delta")]
    TextDelta { delta: String },

    /// Complete free-text output.
    #[serde(rename = "response.text.done")]
    TextDone { text: String },

    /// Incremental fragment of the structured (function-call) arguments.
    #[serde(rename = "response.function_call.delta")]
    FunctionCallDelta { delta: String },

    /// Terminal: the full structured arguments string.
    #[serde(rename = "response.function_call.done")]
    FunctionCallDone { arguments: String },

    /// Terminal: the response finished without structured output.
    #[serde(rename = "response.done")]
    Done,

    /// Terminal: the remote reported a failure for this turn.
    #[serde(rename = "error")]
    Error { error: ErrorInfo },

    /// Any event type this client does not know; ignored.
    #[serde(other)]
    Unknown,
}
