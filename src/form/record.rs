//! Response records
//!
//! A [`SubmissionRecord`] is the plain-text file committed for one submission.
//! Layout:
//!
//! ```text
//! Workshop Response
//! ================
//!
//! User Name: <identity>
//! Workshop: <title>
//! Date: <ISO-8601 UTC, milliseconds>
//!
//! Responses:
//! <blocks>
//! ```
//!
//! Each field block is `"\n<name>:\n<value>\n"`; blocks are joined with
//! `"\n---\n"` and the record ends with a single newline. A reader splits on
//! the `---` lines and takes the first line of each block as the field name.

use chrono::{DateTime, SecondsFormat, Utc};

use super::marker::MarkerRegistry;
use super::state::FormState;

/// Folder that holds every committed response
pub const RESPONSES_DIR: &str = "responses";
/// File name of a response inside its folder
pub const RESPONSE_FILE: &str = "response.txt";

const FIELD_SEPARATOR: &str = "\n---\n";

/// Everything persisted for one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub identity_name: String,
    pub document_title: String,
    pub document_slug: String,
    pub timestamp: DateTime<Utc>,
    /// Field values in declaration order
    pub fields: Vec<(String, String)>,
}

impl SubmissionRecord {
    /// Snapshot the form state for every registry field, in registry order
    pub fn capture(
        identity_name: &str,
        document_title: &str,
        document_slug: &str,
        registry: &MarkerRegistry,
        state: &FormState,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            identity_name: identity_name.to_string(),
            document_title: document_title.to_string(),
            document_slug: document_slug.to_string(),
            timestamp,
            fields: registry
                .names()
                .map(|name| (name.to_string(), state.get(name).to_string()))
                .collect(),
        }
    }

    /// ISO-8601 form used in the `Date:` line
    pub fn iso_timestamp(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Serialize to the persisted text layout
    pub fn to_text(&self) -> String {
        let responses = self
            .fields
            .iter()
            .map(|(name, value)| format!("\n{name}:\n{value}\n"))
            .collect::<Vec<_>>()
            .join(FIELD_SEPARATOR);

        format!(
            "Workshop Response\n================\n\nUser Name: {}\nWorkshop: {}\nDate: {}\n\nResponses:\n{}\n",
            self.identity_name,
            self.document_title,
            self.iso_timestamp(),
            responses
        )
    }

    /// Folder for this submission: `<identity>_<slug>_<timestamp>`
    pub fn folder_name(&self) -> String {
        format!(
            "{}_{}_{}",
            sanitize_identity(&self.identity_name),
            self.document_slug,
            self.iso_timestamp().replace([':', '.'], "-")
        )
    }

    /// Repository path the record is committed to
    pub fn storage_path(&self) -> String {
        format!("{RESPONSES_DIR}/{}/{RESPONSE_FILE}", self.folder_name())
    }

    pub fn commit_message(&self) -> String {
        format!(
            "Add response from {} for {}",
            self.identity_name, self.document_title
        )
    }
}

/// Replace every character that is not an ASCII letter or digit with `_`
pub fn sanitize_identity(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::marker::extract_markers;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
            + chrono::Duration::milliseconds(42)
    }

    #[test]
    fn test_single_field_record() {
        let registry = extract_markers("[INPUT:textarea:Your Response]").registry;
        let mut state = FormState::for_registry(&registry);
        state.set("Your Response", "hello");

        let record =
            SubmissionRecord::capture("Ada Lovelace", "Step 0", "step-0", &registry, &state, fixed_time());
        let text = record.to_text();

        assert!(text.contains("\nUser Name: Ada Lovelace\n"));
        assert!(text.contains("\nWorkshop: Step 0\n"));
        assert!(text.contains("\nDate: 2024-03-09T14:05:07.042Z\n"));
        assert!(text.contains("Your Response:\nhello"));
        assert_eq!(
            text,
            "Workshop Response\n================\n\nUser Name: Ada Lovelace\nWorkshop: Step 0\n\
             Date: 2024-03-09T14:05:07.042Z\n\nResponses:\n\nYour Response:\nhello\n\n"
        );
    }

    #[test]
    fn test_field_order_follows_registry_not_edits() {
        let registry = extract_markers("[INPUT:text:First] [INPUT:text:Second] [INPUT:text:Third]").registry;
        let mut state = FormState::default();
        state.set("Third", "3");
        state.set("First", "1");
        state.set("Second", "2");

        let record = SubmissionRecord::capture("A", "T", "t", &registry, &state, fixed_time());
        let names: Vec<&str> = record.fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);

        let text = record.to_text();
        let first = text.find("First:").unwrap();
        let second = text.find("Second:").unwrap();
        let third = text.find("Third:").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_unset_fields_serialize_empty_with_separators() {
        let registry = extract_markers("[INPUT:text:A] [INPUT:text:B]").registry;
        let record = SubmissionRecord::capture("A", "T", "t", &registry, &FormState::default(), fixed_time());
        assert!(record.to_text().ends_with("Responses:\n\nA:\n\n\n---\n\nB:\n\n\n"));
    }

    #[test]
    fn test_zero_fields() {
        let record = SubmissionRecord::capture(
            "A",
            "T",
            "t",
            &MarkerRegistry::default(),
            &FormState::default(),
            fixed_time(),
        );
        assert!(record.fields.is_empty());
        assert!(record.to_text().ends_with("Responses:\n\n"));
    }

    #[test]
    fn test_storage_path_and_commit_message() {
        let record = SubmissionRecord::capture(
            "Ada Lovelace-Byron",
            "Step 0",
            "step-0",
            &MarkerRegistry::default(),
            &FormState::default(),
            fixed_time(),
        );
        assert_eq!(
            record.storage_path(),
            "responses/Ada_Lovelace_Byron_step-0_2024-03-09T14-05-07-042Z/response.txt"
        );
        assert_eq!(record.commit_message(), "Add response from Ada Lovelace-Byron for Step 0");
    }

    #[test]
    fn test_sanitize_identity() {
        assert_eq!(sanitize_identity("José O'Neil"), "Jos__O_Neil");
        assert_eq!(sanitize_identity("abc123"), "abc123");
    }
}
