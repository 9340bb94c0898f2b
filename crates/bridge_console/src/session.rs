//! Lifecycle of one streamed question/answer run.
//!
//! The session owns every piece of UI-relevant state and exposes exactly
//! three mutation entry points ([`Session::start`], [`Session::ingest`],
//! [`Session::stop`]) plus the transport-error hook. Once a terminal state
//! is reached nothing mutates until the next `start`, which makes the
//! no-mutation-after-termination invariant mechanically checkable.

use crate::events::{parse_frame, preview, AgentEvent, MetaInfo};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Fixed diagnostic ingested when the transport drops mid-run.
pub const CONNECTION_LOST: &str = "Connection to the bridge was lost before the run finished";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("query must not be empty")]
    EmptyQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Idle,
    Connecting,
    Running,
    Done,
    Error,
    Stopped,
}

impl ConnectionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ConnectionStatus::Done | ConnectionStatus::Error | ConnectionStatus::Stopped
        )
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConnectionStatus::Idle => "idle",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Running => "running",
            ConnectionStatus::Done => "done",
            ConnectionStatus::Error => "error",
            ConnectionStatus::Stopped => "stopped",
        };
        f.write_str(text)
    }
}

#[derive(Debug)]
pub struct Session {
    query: String,
    status: ConnectionStatus,
    status_text: String,
    is_running: bool,
    meta: Option<MetaInfo>,
    tools_count: Option<u32>,
    events: Vec<AgentEvent>,
    final_text: String,
    error_text: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            status: ConnectionStatus::Idle,
            status_text: String::new(),
            is_running: false,
            meta: None,
            tools_count: None,
            events: Vec::new(),
            final_text: String::new(),
            error_text: String::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Human-readable status line, driven by `status` events while the
    /// stream is open and by lifecycle transitions otherwise.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn meta(&self) -> Option<&MetaInfo> {
        self.meta.as_ref()
    }

    pub fn tools_count(&self) -> Option<u32> {
        self.tools_count
    }

    /// The literal transcript, in arrival order.
    pub fn events(&self) -> &[AgentEvent] {
        &self.events
    }

    pub fn final_text(&self) -> &str {
        &self.final_text
    }

    pub fn error_text(&self) -> &str {
        &self.error_text
    }

    /// Begin a new run. Rejects empty/whitespace queries without touching
    /// any other state; otherwise performs a full reset of the projection
    /// state. A still-running session is torn down through [`Self::stop`]
    /// first so the caller never leaks a live subscription.
    pub fn start(&mut self, query: &str) -> Result<(), SessionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }
        if self.is_running {
            self.stop();
        }

        self.query = query.to_string();
        self.status = ConnectionStatus::Connecting;
        self.status_text = "connecting".to_string();
        self.is_running = true;
        self.meta = None;
        self.tools_count = None;
        self.events.clear();
        self.final_text.clear();
        self.error_text.clear();
        Ok(())
    }

    /// Fold one event into the session.
    ///
    /// The event is appended to the transcript unconditionally (unknown tags
    /// included), then projected by kind. No-op once terminal.
    pub fn ingest(&mut self, event: AgentEvent) {
        if self.status.is_terminal() {
            debug!("ignoring {} event after termination", event.tag());
            return;
        }
        if self.status == ConnectionStatus::Connecting {
            self.status = ConnectionStatus::Running;
            self.status_text = "running".to_string();
        }

        match &event {
            AgentEvent::Meta(meta) => self.meta = Some(meta.clone()),
            AgentEvent::Tools { count, .. } => self.tools_count = Some(*count),
            AgentEvent::Status { message } => {
                self.status_text = message.clone().unwrap_or_else(|| "running".to_string());
            }
            AgentEvent::Final { content } => {
                self.final_text = content.clone();
                self.status = ConnectionStatus::Done;
                self.status_text = "done".to_string();
                self.is_running = false;
            }
            AgentEvent::Error { message } => {
                self.error_text = message.clone().unwrap_or_else(|| "Unknown error".to_string());
                self.status = ConnectionStatus::Error;
                self.status_text = "error".to_string();
                self.is_running = false;
            }
            _ => {}
        }
        self.events.push(event);
    }

    /// Parse one frame body and ingest it. Frames that do not parse as a
    /// structured event are dropped silently; a corrupted frame must not
    /// abort an otherwise healthy run.
    pub fn ingest_frame(&mut self, data: &str) {
        match parse_frame(data) {
            Some(event) => self.ingest(event),
            None => debug!("dropping malformed frame: {}", preview(data, 120)),
        }
    }

    /// Cancel the run. Idempotent; safe after natural termination.
    pub fn stop(&mut self) {
        self.is_running = false;
        if !matches!(self.status, ConnectionStatus::Done | ConnectionStatus::Error) {
            self.status = ConnectionStatus::Stopped;
            self.status_text = "stopped".to_string();
        }
    }

    /// Transport dropped. Abnormal only while a run is active; the ordinary
    /// close-after-final case arrives here too and is ignored.
    pub fn on_transport_error(&mut self) {
        if !self.is_running {
            return;
        }
        self.ingest(AgentEvent::Error {
            message: Some(CONNECTION_LOST.to_string()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn started() -> Session {
        let mut session = Session::new();
        session.start("What is the price of AAPL?").unwrap();
        session
    }

    #[test]
    fn empty_query_is_rejected_in_idle() {
        let mut session = Session::new();
        assert_eq!(session.start(""), Err(SessionError::EmptyQuery));
        assert_eq!(session.start("   \t"), Err(SessionError::EmptyQuery));
        assert_eq!(session.status(), ConnectionStatus::Idle);
        assert!(!session.is_running());
        assert!(session.events().is_empty());
    }

    #[test]
    fn start_resets_previous_state() {
        let mut session = started();
        session.ingest(AgentEvent::Tools { count: 3, tools: None });
        session.ingest(AgentEvent::Final { content: "done".to_string() });

        session.start("second question").unwrap();
        assert_eq!(session.status(), ConnectionStatus::Connecting);
        assert!(session.is_running());
        assert!(session.events().is_empty());
        assert_eq!(session.tools_count(), None);
        assert_eq!(session.final_text(), "");
    }

    #[test]
    fn events_project_in_order() {
        let mut session = started();
        session.ingest(AgentEvent::Status { message: Some("A".to_string()) });
        session.ingest(AgentEvent::Tools { count: 3, tools: None });
        session.ingest(AgentEvent::Final { content: "done".to_string() });

        assert_eq!(session.status(), ConnectionStatus::Done);
        assert_eq!(session.tools_count(), Some(3));
        assert_eq!(session.events().len(), 3);
        assert_eq!(session.final_text(), "done");
        assert!(!session.is_running());
    }

    #[test]
    fn status_event_updates_the_status_line() {
        let mut session = started();
        session.ingest(AgentEvent::Status { message: Some("fetching tools".to_string()) });
        assert_eq!(session.status_text(), "fetching tools");
        assert_eq!(session.status(), ConnectionStatus::Running);

        session.ingest(AgentEvent::Status { message: None });
        assert_eq!(session.status_text(), "running");
    }

    #[test]
    fn error_event_is_terminal_with_default_message() {
        let mut session = started();
        session.ingest(AgentEvent::Error { message: None });
        assert_eq!(session.status(), ConnectionStatus::Error);
        assert_eq!(session.error_text(), "Unknown error");
        assert!(!session.is_running());
    }

    #[test]
    fn nothing_mutates_after_termination() {
        let mut session = started();
        session.ingest(AgentEvent::Final { content: "answer".to_string() });

        session.ingest(AgentEvent::Status { message: Some("late".to_string()) });
        session.ingest(AgentEvent::Error { message: Some("late".to_string()) });
        assert_eq!(session.status(), ConnectionStatus::Done);
        assert_eq!(session.status_text(), "done");
        assert_eq!(session.error_text(), "");
        assert_eq!(session.events().len(), 1);
    }

    #[test]
    fn stop_is_idempotent_after_final() {
        let mut session = started();
        session.ingest(AgentEvent::Final { content: "done".to_string() });
        session.stop();
        session.stop();
        assert_eq!(session.status(), ConnectionStatus::Done);
    }

    #[test]
    fn stop_mid_run_is_terminal_cancelled() {
        let mut session = started();
        session.ingest(AgentEvent::Status { message: None });
        session.stop();
        assert_eq!(session.status(), ConnectionStatus::Stopped);
        assert!(!session.is_running());

        // Late events after a manual stop are ignored too.
        session.ingest(AgentEvent::Final { content: "late".to_string() });
        assert_eq!(session.final_text(), "");
    }

    #[test]
    fn transport_error_mid_run_becomes_an_error_event() {
        let mut session = started();
        session.on_transport_error();
        assert_eq!(session.status(), ConnectionStatus::Error);
        assert_eq!(session.error_text(), CONNECTION_LOST);
        assert_eq!(session.events().len(), 1);
    }

    #[test]
    fn transport_error_after_final_is_ignored() {
        let mut session = started();
        session.ingest(AgentEvent::Final { content: "done".to_string() });
        session.on_transport_error();
        assert_eq!(session.status(), ConnectionStatus::Done);
        assert_eq!(session.error_text(), "");
    }

    #[test]
    fn malformed_frames_change_nothing() {
        let mut session = started();
        session.ingest_frame(r#"{"type":"status","message":"ok"}"#);
        let len = session.events().len();
        let status_text = session.status_text().to_string();

        session.ingest_frame("not json at all");
        session.ingest_frame(r#"{"missing":"type"}"#);
        assert_eq!(session.events().len(), len);
        assert_eq!(session.status_text(), status_text);
    }

    #[test]
    fn unknown_tags_still_append_to_the_transcript() {
        let mut session = started();
        session.ingest(AgentEvent::Other(json!({"type": "heartbeat"})));
        assert_eq!(session.events().len(), 1);
        assert_eq!(session.status(), ConnectionStatus::Running);
    }

    #[test]
    fn start_while_running_tears_down_first() {
        let mut session = started();
        session.ingest(AgentEvent::Tools { count: 2, tools: None });
        assert!(session.is_running());

        session.start("another question").unwrap();
        assert_eq!(session.status(), ConnectionStatus::Connecting);
        assert_eq!(session.query(), "another question");
        assert!(session.events().is_empty());
    }

    #[test]
    fn meta_snapshot_is_replaced_not_merged() {
        let mut session = started();
        session.ingest(AgentEvent::Meta(MetaInfo {
            model: "deepseek-chat".to_string(),
            ..Default::default()
        }));
        session.ingest(AgentEvent::Meta(MetaInfo {
            server_url: "http://127.0.0.1:19420/".to_string(),
            ..Default::default()
        }));
        let meta = session.meta().unwrap();
        assert_eq!(meta.model, "");
        assert_eq!(meta.server_url, "http://127.0.0.1:19420/");
    }
}
