//! One open workshop: its derived form, the values being entered, and the
//! submission lifecycle

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;

use crate::core::config::ConfigError;
use crate::core::document::Document;
use crate::form::{FormState, SubmissionRecord, WorkshopForm};
use crate::submit::{PersistenceSink, SubmissionCoordinator, SubmitError, SubmitOutcome};

/// State for the workshop currently on screen
pub struct WorkshopSession {
    pub document: Document,
    pub form: WorkshopForm,
    pub state: FormState,
    coordinator: SubmissionCoordinator,
    last_outcome: Option<SubmitOutcome>,
}

impl WorkshopSession {
    pub fn open(
        document: Document,
        sink: Result<Arc<dyn PersistenceSink>, ConfigError>,
        runtime: Handle,
    ) -> Self {
        let form = WorkshopForm::derive(&document);
        let state = FormState::for_registry(&form.registry);
        Self {
            document,
            form,
            state,
            coordinator: SubmissionCoordinator::new(sink, runtime),
            last_outcome: None,
        }
    }

    pub fn coordinator(&self) -> &SubmissionCoordinator {
        &self.coordinator
    }

    /// Whether the session can be closed without losing an in-flight result
    pub fn can_leave(&self) -> bool {
        !self.coordinator.is_submitting()
    }

    /// Most recent settled outcome, or a locally rejected submit
    pub fn last_outcome(&self) -> Option<&SubmitOutcome> {
        self.last_outcome.as_ref()
    }

    /// Submit the current values on behalf of `identity`
    pub fn submit(&mut self, identity: &str) -> Result<(), SubmitError> {
        self.submit_at(identity, Utc::now())
    }

    pub fn submit_at(&mut self, identity: &str, timestamp: DateTime<Utc>) -> Result<(), SubmitError> {
        let record = SubmissionRecord::capture(
            identity,
            &self.document.title(),
            self.document.slug(),
            &self.form.registry,
            &self.state,
            timestamp,
        );

        match self.coordinator.submit(&record) {
            Ok(()) => {
                self.last_outcome = None;
                Ok(())
            }
            Err(e) => {
                // Rejections while in flight leave the pending attempt's notice alone
                if e != SubmitError::InFlight {
                    self.last_outcome = Some(SubmitOutcome::Failed(e.clone()));
                }
                Err(e)
            }
        }
    }

    /// Pick up a finished attempt, if any, and apply it to the form
    pub fn poll(&mut self) -> Option<&SubmitOutcome> {
        let outcome = self.coordinator.poll()?;
        Some(self.apply(outcome))
    }

    /// Wait for the in-flight attempt and apply it
    pub async fn settled(&mut self) -> Option<&SubmitOutcome> {
        let outcome = self.coordinator.settled().await?;
        Some(self.apply(outcome))
    }

    fn apply(&mut self, outcome: SubmitOutcome) -> &SubmitOutcome {
        // Values survive failures so the user can retry
        if matches!(outcome, SubmitOutcome::Acknowledged(_)) {
            self.state.clear();
        }
        self.last_outcome.insert(outcome)
    }
}
