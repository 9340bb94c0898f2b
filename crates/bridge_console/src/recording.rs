//! Capture and replay of the bridge's event feed.
//!
//! A recording holds the raw SSE data frames of one run together with their
//! arrival offsets, so a replay can reproduce the original pacing without a
//! bridge or a model anywhere near.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

/// One raw frame as received, with its offset from the start of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub data: String,
    pub timestamp_ms: u64,
}

/// A full recorded run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedSession {
    pub query: String,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
    pub frames: Vec<RecordedFrame>,
}

struct RecorderState {
    session: Option<RecordedSession>,
    started: Option<Instant>,
}

/// Collects frames during a live run and writes them out when it ends.
/// One run per file; a later run overwrites an earlier one.
pub struct SessionRecorder {
    path: PathBuf,
    state: Mutex<RecorderState>,
}

impl SessionRecorder {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: Mutex::new(RecorderState {
                session: None,
                started: None,
            }),
        }
    }

    pub fn start(&self, query: &str) {
        let mut state = self.state.lock().unwrap();
        state.session = Some(RecordedSession {
            query: query.to_string(),
            recorded_at: chrono::Utc::now(),
            frames: Vec::new(),
        });
        state.started = Some(Instant::now());
    }

    pub fn record_frame(&self, data: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let started = state.started;
        if let (Some(session), Some(started)) = (state.session.as_mut(), started) {
            session.frames.push(RecordedFrame {
                data: data.to_string(),
                timestamp_ms: started.elapsed().as_millis() as u64,
            });
        }
        Ok(())
    }

    /// Write the collected run to disk and clear the recorder.
    pub fn finish(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(session) = state.session.take() {
            let json = serde_json::to_string_pretty(&session)?;
            std::fs::write(&self.path, json)
                .with_context(|| format!("failed to write recording to {}", self.path.display()))?;
        }
        state.started = None;
        Ok(())
    }
}

pub fn load_recording<P: AsRef<Path>>(path: P) -> Result<RecordedSession> {
    let contents = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to open recording {}", path.as_ref().display()))?;
    serde_json::from_str(&contents).context("failed to parse recording file")
}
