//! The bridge's event feed: one tagged JSON object per SSE data frame.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Backend configuration announced once at the start of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaInfo {
    #[serde(rename = "mcp_server_url", alias = "server_url", default)]
    pub server_url: String,
    #[serde(rename = "deepseek_base_url", alias = "base_url", default)]
    pub base_url: String,
    #[serde(rename = "deepseek_model", alias = "model", default)]
    pub model: String,
    #[serde(default)]
    pub max_steps: u32,
}

/// One event from the stream, in arrival order.
///
/// Tags and payload shapes match the bridge's wire format. A recognizable
/// object whose payload does not fit the typed shape degrades to [`Other`]
/// and is rendered generically instead of being dropped.
///
/// [`Other`]: AgentEvent::Other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentEvent {
    #[serde(rename = "meta")]
    Meta(MetaInfo),

    #[serde(rename = "tools")]
    Tools {
        #[serde(default)]
        count: u32,
        /// Full tool schemas, present only on verbose runs.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tools: Option<Value>,
    },

    #[serde(rename = "status")]
    Status {
        #[serde(default)]
        message: Option<String>,
    },

    #[serde(rename = "deepseek_request", alias = "upstream_request")]
    UpstreamRequest {
        #[serde(default)]
        step: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        preview: Option<Value>,
    },

    #[serde(rename = "deepseek_response", alias = "upstream_response")]
    UpstreamResponse {
        #[serde(default)]
        step: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<Value>,
    },

    #[serde(rename = "tool_call")]
    ToolCall {
        #[serde(default)]
        name: String,
        #[serde(default)]
        arguments: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        raw_arguments: Option<String>,
    },

    #[serde(rename = "tool_result")]
    ToolResult {
        #[serde(default)]
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "final")]
    Final {
        #[serde(default)]
        content: String,
    },

    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        message: Option<String>,
    },

    /// Any unrecognized tag, kept verbatim for generic display.
    #[serde(untagged)]
    Other(Value),
}

impl AgentEvent {
    pub fn tag(&self) -> &str {
        match self {
            AgentEvent::Meta(_) => "meta",
            AgentEvent::Tools { .. } => "tools",
            AgentEvent::Status { .. } => "status",
            AgentEvent::UpstreamRequest { .. } => "upstream_request",
            AgentEvent::UpstreamResponse { .. } => "upstream_response",
            AgentEvent::ToolCall { .. } => "tool_call",
            AgentEvent::ToolResult { .. } => "tool_result",
            AgentEvent::Final { .. } => "final",
            AgentEvent::Error { .. } => "error",
            AgentEvent::Other(payload) => payload
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentEvent::Final { .. } | AgentEvent::Error { .. })
    }
}

/// Parse one frame body into an event.
///
/// Returns `None` for anything that is not a JSON object with a string
/// `type` field; such frames are dropped by the caller without touching the
/// session.
pub fn parse_frame(data: &str) -> Option<AgentEvent> {
    let value: Value = serde_json::from_str(data).ok()?;
    if !value.get("type").map_or(false, Value::is_string) {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(event) => Some(event),
        // Known tag, unusable payload: still renderable generically.
        Err(_) => Some(AgentEvent::Other(value)),
    }
}

/// Truncate display text to `max_chars`, marking the cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

impl fmt::Display for AgentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentEvent::Meta(meta) => write!(
                f,
                "meta: model={} server={} max_steps={}",
                meta.model, meta.server_url, meta.max_steps
            ),
            AgentEvent::Tools { count, .. } => write!(f, "tools: {count} available"),
            AgentEvent::Status { message } => {
                write!(f, "status: {}", message.as_deref().unwrap_or("running"))
            }
            AgentEvent::UpstreamRequest { step, .. } => {
                write!(f, "step {step}: request to model")
            }
            AgentEvent::UpstreamResponse { step, .. } => {
                write!(f, "step {step}: response from model")
            }
            AgentEvent::ToolCall {
                name, arguments, ..
            } => write!(
                f,
                "tool call: {name}({})",
                preview(&arguments.to_string(), 120)
            ),
            AgentEvent::ToolResult { name, result, error } => match error {
                Some(error) => write!(f, "tool result: {name} failed: {}", preview(error, 160)),
                None => {
                    let rendered = match result {
                        Some(Value::String(s)) => preview(s, 160),
                        Some(value) => preview(&value.to_string(), 160),
                        None => "(empty)".to_string(),
                    };
                    write!(f, "tool result: {name} -> {rendered}")
                }
            },
            AgentEvent::Final { content } => {
                write!(f, "final answer ({} chars)", content.chars().count())
            }
            AgentEvent::Error { message } => {
                write!(f, "error: {}", message.as_deref().unwrap_or("Unknown error"))
            }
            AgentEvent::Other(payload) => {
                write!(f, "{}: {}", self.tag(), preview(&payload.to_string(), 160))
            }
        }
    }
}
