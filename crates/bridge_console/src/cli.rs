use clap::Parser;
use std::path::PathBuf;

/// Console client for the agent bridge: streams one question through the
/// model ↔ tools loop and renders the final answer.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// One-shot question; omit to enter interactive mode
    #[arg(short, long)]
    pub query: Option<String>,

    /// Base URL of the bridge server (also BRIDGE_URL)
    #[arg(long)]
    pub bridge_url: Option<String>,

    /// MCP server URL forwarded to the bridge; the bridge picks its own
    /// default when omitted (also MCP_SERVER_URL)
    #[arg(long)]
    pub server_url: Option<String>,

    /// Tool-call loop bound forwarded to the bridge
    #[arg(long)]
    pub max_steps: Option<u32>,

    /// Ask the bridge to include full request/response payloads in the feed
    #[arg(long)]
    pub payloads: bool,

    /// Enable verbose logging (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Record the raw event feed to a file
    #[arg(long)]
    pub record: Option<PathBuf>,

    /// Replay a recorded event feed instead of connecting
    #[arg(long)]
    pub playback: Option<PathBuf>,

    /// Ignore original frame timing when replaying
    #[arg(long)]
    pub fast_playback: bool,

    /// Write an HTML session report to this path
    #[arg(long)]
    pub html_out: Option<PathBuf>,
}

impl Args {
    pub fn parse() -> Self {
        <Args as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn default_args_parse() {
        let args = Args::try_parse_from(["test"]).expect("failed to parse default args");
        assert!(args.query.is_none());
        assert!(args.bridge_url.is_none());
        assert!(args.server_url.is_none());
        assert!(args.max_steps.is_none());
        assert!(!args.payloads);
        assert_eq!(args.verbose, 0);
        assert!(!args.fast_playback);
    }

    #[test]
    fn verbose_flag_counts() {
        let args = Args::try_parse_from(["test", "-vv"]).expect("failed to parse verbose args");
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn one_shot_query_with_options() {
        let args = Args::try_parse_from([
            "test",
            "-q",
            "price of AAPL?",
            "--max-steps",
            "4",
            "--payloads",
            "--html-out",
            "session.html",
        ])
        .expect("failed to parse one-shot args");
        assert_eq!(args.query.as_deref(), Some("price of AAPL?"));
        assert_eq!(args.max_steps, Some(4));
        assert!(args.payloads);
        assert_eq!(args.html_out, Some(PathBuf::from("session.html")));
    }
}
