//! Persistence sink interface

use async_trait::async_trait;
use thiserror::Error;

/// One file to commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistRequest {
    /// Repository-relative path of the new file
    pub destination_path: String,
    pub content: Vec<u8>,
    pub commit_message: String,
}

/// Confirmation returned by the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistReceipt {
    pub committed_path: String,
    pub commit_id: String,
    /// Browser URL of the committed file, when the sink reports one
    pub html_url: Option<String>,
}

/// Transport-level failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The request never produced a response
    #[error("Network error: {0}")]
    Transport(String),

    /// The sink answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },

    /// The sink answered success but the body was unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Destination for submitted records
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Commit one file. Exactly one attempt; no retries.
    async fn persist(&self, request: PersistRequest) -> Result<PersistReceipt, SinkError>;
}
