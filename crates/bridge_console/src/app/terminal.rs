//! Terminal frontend: live event log while the stream runs, then the final
//! answer. One-shot with `--query`, interactive otherwise.

use crate::cli::Args;
use crate::client::{BridgeClient, ChatRequest};
use crate::config::Config;
use crate::events::AgentEvent;
use crate::recording::{load_recording, SessionRecorder};
use crate::report;
use crate::session::{ConnectionStatus, Session};
use crate::streaming::{drive_session, ChunkStream, PlaybackChunkStream};
use anyhow::Result;
use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};

pub async fn run(args: Args) -> Result<()> {
    let config = Config::resolve(&args);
    let recorder = args.record.as_ref().map(SessionRecorder::new);

    if let Some(path) = args.playback.clone() {
        return replay(&args, &path).await;
    }

    match args.query.clone() {
        Some(query) => run_once(&args, &config, recorder.as_ref(), &query).await,
        None => interactive(&args, &config, recorder.as_ref()).await,
    }
}

/// Replay a recorded feed through the same driver, no bridge required.
async fn replay(args: &Args, path: &std::path::Path) -> Result<()> {
    let recording = load_recording(path)?;
    println!(
        "{}",
        format!(
            "replaying {} ({} frames, recorded {})",
            path.display(),
            recording.frames.len(),
            recording.recorded_at.format("%Y-%m-%d %H:%M UTC")
        )
        .dark_grey()
    );

    let mut session = Session::new();
    session.start(&recording.query)?;
    let mut stream = PlaybackChunkStream::new(recording.frames, args.fast_playback);
    drive_session(&mut session, &mut stream, None, print_event).await?;

    finish(args, &session)
}

async fn run_once(
    args: &Args,
    config: &Config,
    recorder: Option<&SessionRecorder>,
    query: &str,
) -> Result<()> {
    let mut session = Session::new();
    if let Err(err) = session.start(query) {
        eprintln!("{} {err}", "invalid input:".red());
        return Ok(());
    }

    let client = BridgeClient::new(&config.bridge_url)?;
    let request = ChatRequest {
        query: session.query().to_string(),
        server_url: config.server_url.clone(),
        max_steps: config.max_steps,
        verbose: Some(config.payloads),
    };
    let mut stream: Box<dyn ChunkStream> = Box::new(client.open_chat_stream(&request).await?);

    if let Some(recorder) = recorder {
        recorder.start(session.query());
    }

    let cancelled = {
        let drive = drive_session(&mut session, stream.as_mut(), recorder, print_event);
        tokio::pin!(drive);
        tokio::select! {
            result = &mut drive => {
                result?;
                false
            }
            _ = tokio::signal::ctrl_c() => true,
        }
    };
    drop(stream);
    if cancelled {
        session.stop();
    }

    if let Some(recorder) = recorder {
        recorder.finish()?;
    }
    finish(args, &session)
}

async fn interactive(
    args: &Args,
    config: &Config,
    recorder: Option<&SessionRecorder>,
) -> Result<()> {
    println!("interactive mode; type 'exit' or 'quit' to leave");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query, "exit" | "quit") {
            break;
        }

        if let Err(err) = run_once(args, config, recorder, query).await {
            eprintln!("{} {err:#}", "run failed:".red());
        }
    }
    Ok(())
}

fn print_event(event: &AgentEvent) {
    let line = event.to_string();
    let styled = match event {
        AgentEvent::Error { .. } => line.as_str().red().to_string(),
        AgentEvent::Final { .. } => line.as_str().green().to_string(),
        AgentEvent::ToolCall { .. } | AgentEvent::ToolResult { .. } => {
            line.as_str().cyan().to_string()
        }
        _ => line.as_str().dark_grey().to_string(),
    };
    println!("{styled}");
}

fn finish(args: &Args, session: &Session) -> Result<()> {
    match session.status() {
        ConnectionStatus::Done => {
            println!();
            println!("{}", session.final_text());
        }
        ConnectionStatus::Error => {
            eprintln!("{} {}", "error:".red(), session.error_text());
        }
        ConnectionStatus::Stopped => {
            println!("{}", "stopped".dark_grey());
        }
        _ => {}
    }

    if let Some(path) = &args.html_out {
        report::write_report(session, path)?;
        println!("{}", format!("report written to {}", path.display()).dark_grey());
    }
    Ok(())
}
