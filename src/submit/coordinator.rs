//! Single-flight submission state machine
//!
//! `Idle -> Submitting -> Acknowledged` on success, `Submitting -> Idle` on
//! failure. The sink call runs on the tokio runtime; the UI thread picks up
//! the result with [`SubmissionCoordinator::poll`] without blocking.

use std::sync::Arc;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};

use super::sink::{PersistReceipt, PersistRequest, PersistenceSink, SinkError};
use crate::core::config::ConfigError;
use crate::form::SubmissionRecord;

/// Where a form instance is in its submission lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Submitting,
    /// Terminal: the response was committed
    Acknowledged(PersistReceipt),
}

/// Reasons a submit did not go through
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("A submission is already in progress")]
    InFlight,

    #[error("This response has already been saved")]
    AlreadyAcknowledged,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Result of one settled submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Acknowledged(PersistReceipt),
    Failed(SubmitError),
}

type PendingResult = oneshot::Receiver<Result<PersistReceipt, SinkError>>;

/// Drives one form instance's submissions
pub struct SubmissionCoordinator {
    sink: Result<Arc<dyn PersistenceSink>, ConfigError>,
    runtime: Handle,
    phase: SubmitPhase,
    pending: Option<PendingResult>,
}

impl SubmissionCoordinator {
    /// Create a coordinator. A sink that could not be configured is kept as
    /// its error and reported on every submit.
    pub fn new(sink: Result<Arc<dyn PersistenceSink>, ConfigError>, runtime: Handle) -> Self {
        Self {
            sink,
            runtime,
            phase: SubmitPhase::Idle,
            pending: None,
        }
    }

    pub fn phase(&self) -> &SubmitPhase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SubmitPhase::Submitting
    }

    /// Why responses cannot be saved at all, if the sink is not configured
    pub fn config_error(&self) -> Option<&ConfigError> {
        self.sink.as_ref().err()
    }

    /// Whether the submit control should accept input
    pub fn can_submit(&self) -> bool {
        self.phase == SubmitPhase::Idle
    }

    /// Start one attempt for `record`. Rejected locally while an attempt is in
    /// flight or after the response was acknowledged.
    pub fn submit(&mut self, record: &SubmissionRecord) -> Result<(), SubmitError> {
        match self.phase {
            SubmitPhase::Submitting => return Err(SubmitError::InFlight),
            SubmitPhase::Acknowledged(_) => return Err(SubmitError::AlreadyAcknowledged),
            SubmitPhase::Idle => {}
        }

        let missing = missing_fields(record);
        if !missing.is_empty() {
            return Err(SubmitError::MissingFields(missing));
        }

        let sink = self.sink.clone()?;
        let request = PersistRequest {
            destination_path: record.storage_path(),
            content: record.to_text().into_bytes(),
            commit_message: record.commit_message(),
        };
        tracing::info!("Submitting {}", request.destination_path);

        let (tx, rx) = oneshot::channel();
        self.runtime.spawn(async move {
            let result = sink.persist(request).await;
            // The receiver is gone only if the form was closed meanwhile
            let _ = tx.send(result);
        });

        self.phase = SubmitPhase::Submitting;
        self.pending = Some(rx);
        Ok(())
    }

    /// Check for a finished attempt without blocking
    pub fn poll(&mut self) -> Option<SubmitOutcome> {
        let pending = self.pending.as_mut()?;
        let result = match pending.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(abandoned()),
        };
        self.pending = None;
        Some(self.settle(result))
    }

    /// Wait for the in-flight attempt, if any
    pub async fn settled(&mut self) -> Option<SubmitOutcome> {
        let pending = self.pending.take()?;
        let result = pending.await.unwrap_or_else(|_| Err(abandoned()));
        Some(self.settle(result))
    }

    fn settle(&mut self, result: Result<PersistReceipt, SinkError>) -> SubmitOutcome {
        match result {
            Ok(receipt) => {
                tracing::info!(
                    "Response committed to {} ({})",
                    receipt.committed_path,
                    receipt.commit_id
                );
                self.phase = SubmitPhase::Acknowledged(receipt.clone());
                SubmitOutcome::Acknowledged(receipt)
            }
            Err(e) => {
                tracing::error!("Failed to save response: {}", e);
                self.phase = SubmitPhase::Idle;
                SubmitOutcome::Failed(e.into())
            }
        }
    }
}

fn missing_fields(record: &SubmissionRecord) -> Vec<&'static str> {
    [
        (record.identity_name.as_str(), "user name"),
        (record.document_title.as_str(), "workshop title"),
        (record.document_slug.as_str(), "workshop slug"),
    ]
    .into_iter()
    .filter(|(value, _)| value.trim().is_empty())
    .map(|(_, label)| label)
    .collect()
}

fn abandoned() -> SinkError {
    SinkError::Transport("submission task ended before responding".to_string())
}
