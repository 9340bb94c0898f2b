//! Runtime configuration: flag beats environment beats default, the same
//! precedence the original tooling around the bridge uses.

use crate::cli::Args;

pub const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:19500";

#[derive(Debug, Clone)]
pub struct Config {
    pub bridge_url: String,
    /// Forwarded verbatim when set; the bridge chooses its own default
    /// otherwise.
    pub server_url: Option<String>,
    pub max_steps: Option<u32>,
    pub payloads: bool,
}

impl Config {
    pub fn resolve(args: &Args) -> Self {
        Self {
            bridge_url: args
                .bridge_url
                .clone()
                .or_else(|| env_value("BRIDGE_URL"))
                .unwrap_or_else(|| DEFAULT_BRIDGE_URL.to_string()),
            server_url: args.server_url.clone().or_else(|| env_value("MCP_SERVER_URL")),
            max_steps: args.max_steps,
            payloads: args.payloads,
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_apply_without_flags_or_env() {
        let config = Config::resolve(&args(&["test"]));
        assert_eq!(config.bridge_url, DEFAULT_BRIDGE_URL);
        assert_eq!(config.server_url, None);
        assert_eq!(config.max_steps, None);
    }

    #[test]
    fn flags_win_over_defaults() {
        let config = Config::resolve(&args(&[
            "test",
            "--bridge-url",
            "http://10.0.0.2:19500",
            "--server-url",
            "http://10.0.0.3:19420/",
            "--max-steps",
            "3",
        ]));
        assert_eq!(config.bridge_url, "http://10.0.0.2:19500");
        assert_eq!(config.server_url.as_deref(), Some("http://10.0.0.3:19420/"));
        assert_eq!(config.max_steps, Some(3));
    }
}
