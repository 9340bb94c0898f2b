//! Chunked SSE transport shared by live connections and recorded playback.
//!
//! [`ChunkStream`] is the seam between the session machine and the network:
//! the driver only ever sees byte chunks, so tests (and the playback path)
//! substitute a synthetic source for a live HTTP response with no change to
//! the processing logic.

use crate::events::AgentEvent;
use crate::recording::{RecordedFrame, SessionRecorder};
use crate::session::Session;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Response;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[async_trait]
pub trait ChunkStream: Send {
    /// Next raw chunk, or `None` when the stream is over.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Live HTTP response chunk stream.
pub struct HttpChunkStream {
    response: Response,
}

impl HttpChunkStream {
    pub fn new(response: Response) -> Self {
        Self { response }
    }
}

#[async_trait]
impl ChunkStream for HttpChunkStream {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        match self.response.chunk().await {
            Ok(Some(chunk)) => Ok(Some(chunk.to_vec())),
            Ok(None) => Ok(None),
            Err(err) => Err(anyhow::anyhow!("HTTP chunk error: {err}")),
        }
    }
}

/// Replays recorded frames, either at their original pacing or as fast as
/// the consumer can drain them.
pub struct PlaybackChunkStream {
    frames: Vec<RecordedFrame>,
    current: usize,
    started: Instant,
    fast: bool,
}

impl PlaybackChunkStream {
    pub fn new(frames: Vec<RecordedFrame>, fast: bool) -> Self {
        Self {
            frames,
            current: 0,
            started: Instant::now(),
            fast,
        }
    }
}

#[async_trait]
impl ChunkStream for PlaybackChunkStream {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if self.current >= self.frames.len() {
            return Ok(None);
        }
        let frame = &self.frames[self.current];

        if !self.fast {
            let expected = Duration::from_millis(frame.timestamp_ms);
            let elapsed = self.started.elapsed();
            if elapsed < expected {
                tokio::time::sleep(expected - elapsed).await;
            }
        }

        let line = format!("data: {}\n\n", frame.data);
        self.current += 1;
        Ok(Some(line.into_bytes()))
    }
}

/// Pump a chunk stream into the session until it terminates.
///
/// Chunks are split on newlines through a persistent byte buffer, so a frame
/// fragmented across chunk boundaries (or split mid-codepoint) reassembles
/// correctly. Only `data:` lines carry events; everything else on the wire
/// is ignored. Reading stops as soon as the session leaves the running
/// state; stream EOF or a read error while still running counts as a
/// transport failure.
pub async fn drive_session(
    session: &mut Session,
    stream: &mut dyn ChunkStream,
    recorder: Option<&SessionRecorder>,
    mut on_event: impl FnMut(&AgentEvent),
) -> Result<()> {
    let mut line_buffer: Vec<u8> = Vec::new();

    loop {
        match stream.next_chunk().await {
            Ok(Some(chunk)) => {
                for &byte in &chunk {
                    if byte == b'\n' {
                        if !line_buffer.is_empty() {
                            process_line(session, recorder, &line_buffer, &mut on_event)?;
                            line_buffer.clear();
                        }
                    } else {
                        line_buffer.push(byte);
                    }
                }
                if !session.is_running() {
                    debug!("session reached {} state, closing stream", session.status());
                    break;
                }
            }
            Ok(None) => {
                // The backend may close right after the last frame; flush a
                // trailing line before deciding whether this was abnormal.
                if !line_buffer.is_empty() {
                    process_line(session, recorder, &line_buffer, &mut on_event)?;
                    line_buffer.clear();
                }
                session.on_transport_error();
                break;
            }
            Err(err) => {
                warn!("stream read failed: {err:#}");
                session.on_transport_error();
                break;
            }
        }
    }
    Ok(())
}

fn process_line(
    session: &mut Session,
    recorder: Option<&SessionRecorder>,
    line: &[u8],
    on_event: &mut impl FnMut(&AgentEvent),
) -> Result<()> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches('\r');
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(());
    };
    let data = data.strip_prefix(' ').unwrap_or(data);

    if let Some(recorder) = recorder {
        recorder.record_frame(data)?;
    }

    let before = session.events().len();
    session.ingest_frame(data);
    if session.events().len() > before {
        if let Some(event) = session.events().last() {
            on_event(event);
        }
    }
    Ok(())
}
