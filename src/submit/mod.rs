//! Response submission: the sink interface, the GitHub sink, and the
//! single-flight coordinator

pub mod coordinator;
pub mod github;
pub mod sink;

pub use coordinator::{SubmissionCoordinator, SubmitError, SubmitOutcome, SubmitPhase};
pub use github::GitHubSink;
pub use sink::{PersistenceSink, SinkError};
