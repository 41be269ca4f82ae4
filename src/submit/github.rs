//! GitHub contents API sink
//!
//! Each response is created with one `PUT /repos/{owner}/{repo}/contents/{path}`
//! call, which commits the file directly to the configured branch.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::sink::{PersistReceipt, PersistRequest, PersistenceSink, SinkError};
use crate::core::config::SinkSettings;

const FALLBACK_ERROR: &str = "Failed to save response to GitHub";

/// Request body for the contents API
#[derive(Debug, Serialize)]
struct PutContentsBody<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    content: ContentInfo,
    commit: CommitInfo,
}

#[derive(Debug, Deserialize)]
struct ContentInfo {
    path: String,
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    sha: String,
}

/// Sink that commits files through the GitHub REST API
pub struct GitHubSink {
    settings: SinkSettings,
    http_client: reqwest::Client,
}

impl GitHubSink {
    pub fn new(settings: SinkSettings) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("workshop-forms/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            settings,
            http_client,
        }
    }

    /// Contents API URL for a repository path
    pub fn contents_url(&self, path: &str) -> String {
        let encoded: Vec<_> = path.split('/').map(urlencoding::encode).collect();
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.settings.api_base,
            self.settings.owner,
            self.settings.repo,
            encoded.join("/")
        )
    }
}

#[async_trait]
impl PersistenceSink for GitHubSink {
    async fn persist(&self, request: PersistRequest) -> Result<PersistReceipt, SinkError> {
        let url = self.contents_url(&request.destination_path);
        let body = PutContentsBody {
            message: &request.commit_message,
            content: general_purpose::STANDARD.encode(&request.content),
            branch: &self.settings.branch,
        };
        debug!(url = %url, bytes = request.content.len(), "Committing response");

        let response = self
            .http_client
            .put(&url)
            .header("Authorization", format!("token {}", self.settings.token))
            .header("Accept", "application/vnd.github.v3+json")
            .json(&body)
            .send()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SinkError::Transport(format!("Body read failed: {e}")))?;

        if !status.is_success() {
            let message = error_message(&bytes);
            warn!(status = status.as_u16(), message = %message, "GitHub API error");
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: PutContentsResponse = serde_json::from_slice(&bytes)
            .map_err(|e| SinkError::InvalidResponse(e.to_string()))?;

        Ok(PersistReceipt {
            committed_path: parsed.content.path,
            commit_id: parsed.commit.sha,
            html_url: parsed.content.html_url,
        })
    }
}

/// Pull the human-readable message out of an error body: `message`, then
/// `error.message`, then a generic fallback.
pub fn error_message(body: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) else {
        return FALLBACK_ERROR.to_string();
    };

    value
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| value.pointer("/error/message").and_then(|m| m.as_str()))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(FALLBACK_ERROR)
        .to_string()
}
