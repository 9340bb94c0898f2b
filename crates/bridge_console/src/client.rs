//! HTTP client for the bridge's streaming chat endpoint.

use crate::streaming::HttpChunkStream;
use anyhow::{Context, Result};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

/// Parameters of one chat subscription. Optional fields are omitted from the
/// request entirely; the bridge applies its own defaults.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub query: String,
    pub server_url: Option<String>,
    pub max_steps: Option<u32>,
    pub verbose: Option<bool>,
}

pub struct BridgeClient {
    http: Client,
    base_url: String,
}

impl BridgeClient {
    pub fn new(base_url: &str) -> Result<Self> {
        // Connect timeout only: the stream itself may stay open for as long
        // as the tool-calling loop runs.
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    /// Build the `/api/chat` subscription URL. Empty or absent options are
    /// left out rather than sent as empty values; `verbose` is encoded as
    /// `1`/`0`.
    pub fn chat_url(&self, request: &ChatRequest) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("invalid bridge URL: {}", self.base_url))?
            .join("api/chat")
            .context("failed to build chat endpoint URL")?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &request.query);
            if let Some(server_url) = request.server_url.as_deref().filter(|s| !s.trim().is_empty())
            {
                pairs.append_pair("server_url", server_url);
            }
            if let Some(max_steps) = request.max_steps {
                pairs.append_pair("max_steps", &max_steps.to_string());
            }
            if let Some(verbose) = request.verbose {
                pairs.append_pair("verbose", if verbose { "1" } else { "0" });
            }
        }
        Ok(url)
    }

    /// Open the streaming subscription for one query.
    pub async fn open_chat_stream(&self, request: &ChatRequest) -> Result<HttpChunkStream> {
        let url = self.chat_url(request)?;
        debug!("opening chat stream: {url}");

        let response = self
            .http
            .get(url)
            .header("Accept", "text/event-stream")
            .send()
            .await
            .context("failed to reach the bridge")?
            .error_for_status()
            .context("bridge rejected the chat request")?;

        Ok(HttpChunkStream::new(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BridgeClient {
        BridgeClient::new("http://127.0.0.1:19500").unwrap()
    }

    #[test]
    fn url_carries_all_parameters() {
        let url = client()
            .chat_url(&ChatRequest {
                query: "price of AAPL?".to_string(),
                server_url: Some("http://127.0.0.1:19420/".to_string()),
                max_steps: Some(8),
                verbose: Some(true),
            })
            .unwrap();
        let text = url.as_str();
        assert!(text.starts_with("http://127.0.0.1:19500/api/chat?"));
        assert!(text.contains("query=price+of+AAPL%3F"));
        assert!(text.contains("server_url=http%3A%2F%2F127.0.0.1%3A19420%2F"));
        assert!(text.contains("max_steps=8"));
        assert!(text.contains("verbose=1"));
    }

    #[test]
    fn absent_options_are_omitted_entirely() {
        let url = client()
            .chat_url(&ChatRequest {
                query: "q".to_string(),
                server_url: None,
                max_steps: None,
                verbose: None,
            })
            .unwrap();
        let text = url.as_str();
        assert!(text.contains("query=q"));
        assert!(!text.contains("server_url"));
        assert!(!text.contains("max_steps"));
        assert!(!text.contains("verbose"));
    }

    #[test]
    fn empty_server_url_is_treated_as_absent() {
        let url = client()
            .chat_url(&ChatRequest {
                query: "q".to_string(),
                server_url: Some("   ".to_string()),
                max_steps: None,
                verbose: None,
            })
            .unwrap();
        assert!(!url.as_str().contains("server_url"));
    }

    #[test]
    fn verbose_false_is_sent_as_zero() {
        let url = client()
            .chat_url(&ChatRequest {
                query: "q".to_string(),
                server_url: None,
                max_steps: None,
                verbose: Some(false),
            })
            .unwrap();
        assert!(url.as_str().contains("verbose=0"));
    }

    #[test]
    fn invalid_base_url_is_an_error() {
        let client = BridgeClient::new("not a url").unwrap();
        let result = client.chat_url(&ChatRequest {
            query: "q".to_string(),
            server_url: None,
            max_steps: None,
            verbose: None,
        });
        assert!(result.is_err());
    }
}
