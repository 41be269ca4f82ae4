//! Placeholder resolution
//!
//! Splits converted markup into an ordered run of static markup and field
//! slots. Field slots only carry the field name; the current value always
//! comes from the form state at render time.

use std::ops::Range;
use std::sync::OnceLock;

use regex_lite::{Captures, Regex};

use super::marker::{unescape_attribute, MarkerRegistry};

/// One ordered unit of a resolved document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderSegment {
    /// Markup rendered as-is
    StaticMarkup { html: String, range: Range<usize> },
    /// Editable input bound to a field
    FieldSlot { field: String, range: Range<usize> },
}

impl RenderSegment {
    /// Byte range of this segment in the markup; appended slots have an empty
    /// range at the end of the markup
    pub fn range(&self) -> Range<usize> {
        match self {
            RenderSegment::StaticMarkup { range, .. } => range.clone(),
            RenderSegment::FieldSlot { range, .. } => range.clone(),
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            RenderSegment::FieldSlot { field, .. } => Some(field),
            RenderSegment::StaticMarkup { .. } => None,
        }
    }
}

/// How field positions are located in the markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStrategy {
    /// `<div data-input-placeholder=".." data-field-name=".."></div>` elements
    Structural,
    /// `<!-- INPUT_PLACEHOLDER:..:.. -->` comments
    Comment,
    /// No placeholders in the markup
    None,
}

impl PlaceholderStrategy {
    /// Pick the strategy for a piece of markup. Structural placeholders win;
    /// comments are only consulted when there are none.
    pub fn detect(markup: &str) -> Self {
        if structural_regex().is_match(markup) {
            PlaceholderStrategy::Structural
        } else if comment_regex().is_match(markup) {
            PlaceholderStrategy::Comment
        } else {
            PlaceholderStrategy::None
        }
    }

    fn pattern(self) -> Option<&'static Regex> {
        match self {
            PlaceholderStrategy::Structural => Some(structural_regex()),
            PlaceholderStrategy::Comment => Some(comment_regex()),
            PlaceholderStrategy::None => None,
        }
    }

    fn field_name(self, caps: &Captures<'_>) -> String {
        let raw = caps.get(2).map_or("", |m| m.as_str());
        match self {
            PlaceholderStrategy::Structural => unescape_attribute(raw).trim().to_string(),
            _ => raw.trim().to_string(),
        }
    }
}

/// Resolved segment sequence for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub strategy: PlaceholderStrategy,
    pub segments: Vec<RenderSegment>,
}

impl Resolution {
    /// Field names in slot order
    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(RenderSegment::field)
    }
}

/// Split `markup` into static and field segments.
///
/// Every field in `registry` ends up with exactly one slot: fields whose
/// placeholder could not be found in the markup are appended after the last
/// static segment. Placeholders naming fields the registry does not know
/// stay part of the surrounding static markup.
pub fn resolve_segments(markup: &str, registry: &MarkerRegistry) -> Resolution {
    let strategy = PlaceholderStrategy::detect(markup);
    let mut segments = Vec::new();
    let mut cursor = 0;

    if let Some(pattern) = strategy.pattern() {
        for caps in pattern.captures_iter(markup) {
            let Some(whole) = caps.get(0) else { continue };
            let field = strategy.field_name(&caps);
            if !registry.contains(&field) {
                continue;
            }

            push_static(&mut segments, markup, cursor..whole.start());
            segments.push(RenderSegment::FieldSlot {
                field,
                range: whole.range(),
            });
            cursor = whole.end();
        }
    }
    push_static(&mut segments, markup, cursor..markup.len());

    let missing: Vec<String> = registry
        .names()
        .filter(|name| !segments.iter().any(|s| s.field() == Some(*name)))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        tracing::debug!("Appending {} field(s) without placeholders", missing.len());
    }
    for field in missing {
        segments.push(RenderSegment::FieldSlot {
            field,
            range: markup.len()..markup.len(),
        });
    }

    Resolution { strategy, segments }
}

fn push_static(segments: &mut Vec<RenderSegment>, markup: &str, range: Range<usize>) {
    let html = &markup[range.clone()];
    if !html.trim().is_empty() {
        segments.push(RenderSegment::StaticMarkup {
            html: html.to_string(),
            range,
        });
    }
}

fn structural_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<div data-input-placeholder="(\w+)" data-field-name="([^"]+)"></div>"#)
            .unwrap_or_else(|e| panic!("invalid placeholder pattern: {e}"))
    })
}

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<!-- INPUT_PLACEHOLDER:(\w+):([^>]+) -->")
            .unwrap_or_else(|e| panic!("invalid placeholder pattern: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::markdown::to_markup;
    use crate::form::marker::{extract_markers, FieldMarker};

    fn resolve_source(text: &str) -> (String, Resolution) {
        let extraction = extract_markers(text);
        let markup = to_markup(&extraction.rewritten);
        let resolution = resolve_segments(&markup, &extraction.registry);
        (markup, resolution)
    }

    fn registry(names: &[&str]) -> MarkerRegistry {
        MarkerRegistry::from_markers(names.iter().enumerate().map(|(ordinal, name)| FieldMarker {
            name: name.to_string(),
            declared_type: "textarea".to_string(),
            ordinal,
        }))
    }

    #[test]
    fn test_intro_field_outro() {
        let (_, resolution) = resolve_source("Intro.\n\n[INPUT:textarea:Notes]\n\nOutro.");
        assert_eq!(resolution.strategy, PlaceholderStrategy::Structural);
        assert_eq!(resolution.segments.len(), 3);

        match &resolution.segments[0] {
            RenderSegment::StaticMarkup { html, .. } => assert!(html.contains("Intro.")),
            other => panic!("expected static markup, got {other:?}"),
        }
        assert_eq!(resolution.segments[1].field(), Some("Notes"));
        match &resolution.segments[2] {
            RenderSegment::StaticMarkup { html, .. } => {
                assert!(html.contains("Outro."));
                assert!(!html.contains("Intro."));
            }
            other => panic!("expected static markup, got {other:?}"),
        }
    }

    #[test]
    fn test_document_without_markers_is_one_static_segment() {
        let (markup, resolution) = resolve_source("# Heading\n\nSome *text*.\n\n- a\n- b\n");
        assert_eq!(resolution.strategy, PlaceholderStrategy::None);
        assert_eq!(
            resolution.segments,
            vec![RenderSegment::StaticMarkup {
                html: markup.clone(),
                range: 0..markup.len(),
            }]
        );
    }

    #[test]
    fn test_segments_are_contiguous() {
        let (markup, resolution) =
            resolve_source("A\n\n[INPUT:text:One]\n\nB\n\n[INPUT:text:Two]\n\nC");
        let mut cursor = 0;
        for segment in &resolution.segments {
            let range = segment.range();
            // Skipped spans may only hold whitespace
            assert!(markup[cursor..range.start].trim().is_empty());
            cursor = range.end;
        }
        assert!(markup[cursor..].trim().is_empty());
        assert_eq!(resolution.slots().collect::<Vec<_>>(), vec!["One", "Two"]);
    }

    #[test]
    fn test_adjacent_placeholders_have_no_empty_static_between() {
        let (_, resolution) = resolve_source("[INPUT:text:One][INPUT:text:Two]");
        assert_eq!(resolution.slots().collect::<Vec<_>>(), vec!["One", "Two"]);
        assert_eq!(resolution.segments.len(), 2);
    }

    #[test]
    fn test_comment_fallback() {
        let (_, resolution) =
            resolve_source("Before\n\n<!-- INPUT_PLACEHOLDER:text:Goal -->\n\nAfter");
        assert_eq!(resolution.strategy, PlaceholderStrategy::Comment);
        assert_eq!(resolution.slots().collect::<Vec<_>>(), vec!["Goal"]);
        assert_eq!(resolution.segments.len(), 3);
    }

    #[test]
    fn test_structural_mode_ignores_comments() {
        let markup = concat!(
            "<p>A</p>\n",
            r#"<div data-input-placeholder="text" data-field-name="One"></div>"#,
            "\n<!-- INPUT_PLACEHOLDER:text:Two -->\n<p>B</p>\n"
        );
        let resolution = resolve_segments(markup, &registry(&["One", "Two"]));
        assert_eq!(resolution.strategy, PlaceholderStrategy::Structural);

        // The comment stays inside static markup and the field is appended
        match &resolution.segments[2] {
            RenderSegment::StaticMarkup { html, .. } => assert!(html.contains("INPUT_PLACEHOLDER")),
            other => panic!("expected static markup, got {other:?}"),
        }
        assert_eq!(resolution.slots().collect::<Vec<_>>(), vec!["One", "Two"]);
        assert_eq!(resolution.segments.last().and_then(RenderSegment::field), Some("Two"));
    }

    #[test]
    fn test_fields_without_placeholders_are_appended_once() {
        let resolution = resolve_segments("<p>Only prose</p>\n", &registry(&["X", "Y"]));
        assert_eq!(resolution.segments.len(), 3);
        assert_eq!(resolution.slots().collect::<Vec<_>>(), vec!["X", "Y"]);
    }

    #[test]
    fn test_marker_inside_code_block_is_still_offered() {
        let (_, resolution) = resolve_source("```\n[INPUT:text:Hidden]\n```\n");
        assert_eq!(resolution.slots().collect::<Vec<_>>(), vec!["Hidden"]);
    }

    #[test]
    fn test_repeated_field_gets_a_slot_per_placeholder() {
        let (_, resolution) = resolve_source("[INPUT:text:Same]\n\nmiddle\n\n[INPUT:text:Same]");
        assert_eq!(resolution.slots().collect::<Vec<_>>(), vec!["Same", "Same"]);
    }

    #[test]
    fn test_unknown_placeholder_stays_static() {
        let markup = r#"<div data-input-placeholder="text" data-field-name="Ghost"></div>"#;
        let resolution = resolve_segments(markup, &MarkerRegistry::default());
        assert_eq!(resolution.slots().count(), 0);
        assert_eq!(resolution.segments.len(), 1);
    }

    #[test]
    fn test_escaped_names_resolve_to_registry_names() {
        let (_, resolution) = resolve_source(r#"[INPUT:text:Say "hi"]"#);
        assert_eq!(resolution.slots().collect::<Vec<_>>(), vec![r#"Say "hi""#]);
        assert_eq!(resolution.segments.len(), 1);
    }
}
