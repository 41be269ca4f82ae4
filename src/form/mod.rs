//! Document-to-form transformation
//!
//! Raw worksheet text goes through [`marker::extract_markers`], markdown
//! conversion, and [`resolve::resolve_segments`]; the user fills a
//! [`state::FormState`]; [`record::SubmissionRecord`] turns the filled state
//! into the committed text.

pub mod marker;
pub mod record;
pub mod resolve;
pub mod state;

pub use marker::{FieldMarker, MarkerRegistry};
pub use record::SubmissionRecord;
pub use resolve::{RenderSegment, Resolution};
pub use state::FormState;

use crate::core::document::Document;

/// Render-ready form for one loaded document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkshopForm {
    pub registry: MarkerRegistry,
    pub resolution: Resolution,
}

impl WorkshopForm {
    /// Derive the form from a document. Pure; the same document always yields
    /// the same form.
    pub fn derive(document: &Document) -> Self {
        let resolution = resolve::resolve_segments(&document.markup, &document.fields);
        tracing::debug!(
            "Resolved {} with {:?} placeholders: {} slot(s) in {} segment(s)",
            document.slug(),
            resolution.strategy,
            resolution.slots().count(),
            resolution.segments.len()
        );
        Self {
            registry: document.fields.clone(),
            resolution,
        }
    }

    pub fn segments(&self) -> &[RenderSegment] {
        &self.resolution.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_stable() {
        let doc = Document::from_source(
            "step-1",
            "---\ntitle: Step 1\n---\n\n# Goals\n\n[INPUT:textarea:Goal]\n\nWhy?\n\n[INPUT:text:Reason]\n",
        );
        let form = WorkshopForm::derive(&doc);
        assert_eq!(form, WorkshopForm::derive(&doc));
        assert_eq!(
            form.resolution.slots().collect::<Vec<_>>(),
            form.registry.names().collect::<Vec<_>>()
        );
        assert_eq!(form.segments().len(), 4);
    }

    #[test]
    fn test_zero_marker_document() {
        let doc = Document::from_source("plain", "Nothing to fill in here.");
        let form = WorkshopForm::derive(&doc);
        assert!(form.registry.is_empty());
        assert_eq!(form.segments().len(), 1);
        assert!(matches!(
            &form.segments()[0],
            RenderSegment::StaticMarkup { html, .. } if *html == doc.markup
        ));
    }
}
