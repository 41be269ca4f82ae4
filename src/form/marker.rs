//! Input marker extraction
//!
//! Workshop bodies declare their input fields inline, either with the bracket
//! form `[INPUT:<type>:<name>]` written in prose or with the comment form
//! `<!-- INPUT_PLACEHOLDER:<type>:<name> -->` written as raw HTML. Extraction
//! collects both into one [`MarkerRegistry`] and rewrites every bracket marker
//! into a structural placeholder element that markdown conversion emits
//! untouched, so the resolver can find the field positions again in the
//! generated markup.

use std::ops::Range;
use std::sync::OnceLock;

use regex_lite::Regex;

/// Attribute carrying the declared type on a structural placeholder
pub const PLACEHOLDER_TYPE_ATTR: &str = "data-input-placeholder";
/// Attribute carrying the field name on a structural placeholder
pub const PLACEHOLDER_NAME_ATTR: &str = "data-field-name";

/// One declared input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMarker {
    /// Field label and binding key
    pub name: String,
    /// Declared input type, kept opaque
    pub declared_type: String,
    /// Index of the first marker occurrence that declared this field
    pub ordinal: usize,
}

/// The two textual marker forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSyntax {
    /// `[INPUT:<type>:<name>]`
    Bracket,
    /// `<!-- INPUT_PLACEHOLDER:<type>:<name> -->`
    Comment,
}

impl MarkerSyntax {
    /// Literal prefix that opens a marker of this syntax
    pub fn opener(self) -> &'static str {
        match self {
            MarkerSyntax::Bracket => "[INPUT:",
            MarkerSyntax::Comment => "<!-- INPUT_PLACEHOLDER:",
        }
    }

    /// Literal text that closes a marker of this syntax
    pub fn terminator(self) -> &'static str {
        match self {
            MarkerSyntax::Bracket => "]",
            MarkerSyntax::Comment => "-->",
        }
    }

    fn opener_regex(self) -> &'static Regex {
        static BRACKET: OnceLock<Regex> = OnceLock::new();
        static COMMENT: OnceLock<Regex> = OnceLock::new();
        match self {
            MarkerSyntax::Bracket => BRACKET.get_or_init(|| compile(r"\[INPUT:\w+:")),
            MarkerSyntax::Comment => COMMENT.get_or_init(|| compile(r"<!-- INPUT_PLACEHOLDER:\w+:")),
        }
    }

    fn marker_regex(self) -> &'static Regex {
        static BRACKET: OnceLock<Regex> = OnceLock::new();
        static COMMENT: OnceLock<Regex> = OnceLock::new();
        match self {
            MarkerSyntax::Bracket => BRACKET.get_or_init(|| compile(r"^\[INPUT:(\w+):([^\]]+)\]")),
            MarkerSyntax::Comment => {
                COMMENT.get_or_init(|| compile(r"^<!-- INPUT_PLACEHOLDER:(\w+):([^>]+) -->"))
            }
        }
    }
}

/// A marker that was opened but never properly terminated.
///
/// Everything from `offset` onwards is treated as static content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedMarker {
    pub syntax: MarkerSyntax,
    /// Byte offset of the opener in the raw text
    pub offset: usize,
}

/// Ordered, de-duplicated set of fields declared by a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerRegistry {
    markers: Vec<FieldMarker>,
}

impl MarkerRegistry {
    /// Build a registry from markers in declaration order, keeping the first
    /// declaration of every name
    pub fn from_markers(markers: impl IntoIterator<Item = FieldMarker>) -> Self {
        let mut registry = Self::default();
        for marker in markers {
            if !registry.contains(&marker.name) {
                registry.markers.push(marker);
            }
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldMarker> {
        self.markers.iter()
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&FieldMarker> {
        self.markers.iter().find(|m| m.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(|m| m.name.as_str())
    }
}

impl<'a> IntoIterator for &'a MarkerRegistry {
    type Item = &'a FieldMarker;
    type IntoIter = std::slice::Iter<'a, FieldMarker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}

/// Result of scanning a raw document body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub registry: MarkerRegistry,
    /// Body with every bracket marker replaced by a structural placeholder
    pub rewritten: String,
    pub malformed: Vec<MalformedMarker>,
}

#[derive(Debug)]
struct Occurrence {
    syntax: MarkerSyntax,
    range: Range<usize>,
    declared_type: String,
    name: String,
}

/// Scan `text` for input markers of both syntaxes.
pub fn extract_markers(text: &str) -> Extraction {
    let (mut occurrences, bracket_fault) = scan(text, MarkerSyntax::Bracket);
    let (comments, comment_fault) = scan(text, MarkerSyntax::Comment);
    occurrences.extend(comments);

    let malformed: Vec<MalformedMarker> = [bracket_fault, comment_fault].into_iter().flatten().collect();
    for fault in &malformed {
        tracing::warn!(
            "Unterminated {:?} input marker at byte {}; treating the rest of the document as text",
            fault.syntax,
            fault.offset
        );
    }

    // Nothing after the first malformed opener counts as a declaration
    let cutoff = malformed.iter().map(|m| m.offset).min().unwrap_or(text.len());
    occurrences.retain(|o| o.range.start < cutoff);
    occurrences.sort_by_key(|o| o.range.start);

    let rewritten = rewrite_brackets(text, &occurrences);
    let registry = MarkerRegistry::from_markers(occurrences.into_iter().enumerate().map(
        |(ordinal, o)| FieldMarker {
            name: o.name,
            declared_type: o.declared_type,
            ordinal,
        },
    ));

    let mut malformed = malformed;
    malformed.sort_by_key(|m| m.offset);

    Extraction {
        registry,
        rewritten,
        malformed,
    }
}

/// Render the structural placeholder element for a field
pub fn placeholder_element(declared_type: &str, name: &str) -> String {
    format!(
        r#"<div {PLACEHOLDER_TYPE_ATTR}="{declared_type}" {PLACEHOLDER_NAME_ATTR}="{}"></div>"#,
        escape_attribute(name)
    )
}

/// Escape a field name for use inside a double-quoted attribute
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Reverse [`escape_attribute`]
pub fn unescape_attribute(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn scan(text: &str, syntax: MarkerSyntax) -> (Vec<Occurrence>, Option<MalformedMarker>) {
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(open) = syntax.opener_regex().find(&text[cursor..]) {
        let start = cursor + open.start();
        let tail = &text[start..];

        let Some(caps) = syntax.marker_regex().captures(tail) else {
            let rest = &tail[open.len()..];
            let closed_at = rest.find(syntax.terminator());
            let next_open = syntax.opener_regex().find(rest).map(|m| m.start());
            match (closed_at, next_open) {
                (Some(close), Some(next)) if next < close => {
                    return (found, Some(MalformedMarker { syntax, offset: start }));
                }
                (Some(_), _) => {
                    // Closed but unparseable, like an empty name: not a declaration
                    tracing::debug!("Skipping unreadable {:?} input marker at byte {}", syntax, start);
                    cursor = start + open.len();
                    continue;
                }
                (None, _) => return (found, Some(MalformedMarker { syntax, offset: start })),
            }
        };
        let whole = caps.get(0).map_or(0, |m| m.end());
        let declared_type = caps.get(1).map_or("", |m| m.as_str());
        let raw_name = caps.get(2).map_or("", |m| m.as_str());

        // A name that runs into the next opener means this one was never closed
        if raw_name.contains(syntax.opener()) {
            return (found, Some(MalformedMarker { syntax, offset: start }));
        }

        let name = raw_name.trim();
        if !name.is_empty() {
            found.push(Occurrence {
                syntax,
                range: start..start + whole,
                declared_type: declared_type.to_string(),
                name: name.to_string(),
            });
        }
        cursor = start + whole;
    }

    (found, None)
}

fn rewrite_brackets(text: &str, occurrences: &[Occurrence]) -> String {
    let mut rewritten = String::with_capacity(text.len());
    let mut cursor = 0;

    for occurrence in occurrences.iter().filter(|o| o.syntax == MarkerSyntax::Bracket) {
        rewritten.push_str(&text[cursor..occurrence.range.start]);
        rewritten.push_str("\n\n");
        rewritten.push_str(&placeholder_element(&occurrence.declared_type, &occurrence.name));
        rewritten.push_str("\n\n");
        cursor = occurrence.range.end;
    }
    rewritten.push_str(&text[cursor..]);
    rewritten
}

fn compile(pattern: &str) -> Regex {
    // Patterns are compile-time constants
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid marker pattern {pattern}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(extraction: &Extraction) -> Vec<&str> {
        extraction.registry.names().collect()
    }

    #[test]
    fn test_single_bracket_marker() {
        let extraction = extract_markers("Intro.\n\n[INPUT:textarea:Notes]\n\nOutro.");
        assert_eq!(extraction.registry.len(), 1);
        let marker = extraction.registry.get("Notes").unwrap();
        assert_eq!(marker.declared_type, "textarea");
        assert_eq!(marker.ordinal, 0);
        assert!(extraction
            .rewritten
            .contains(r#"<div data-input-placeholder="textarea" data-field-name="Notes"></div>"#));
        assert!(!extraction.rewritten.contains("[INPUT:"));
        assert!(extraction.malformed.is_empty());
    }

    #[test]
    fn test_repeated_names_keep_first_occurrence() {
        let text = "[INPUT:text:B] [INPUT:text:A]\n[INPUT:textarea:B]\n[INPUT:text:C] [INPUT:text:A]";
        let extraction = extract_markers(text);
        assert_eq!(names(&extraction), vec!["B", "A", "C"]);
        assert_eq!(extraction.registry.get("B").unwrap().declared_type, "text");
        assert_eq!(extraction.registry.get("C").unwrap().ordinal, 3);
    }

    #[test]
    fn test_names_are_trimmed() {
        let extraction = extract_markers("[INPUT:text:   Your Response  ]");
        assert_eq!(names(&extraction), vec!["Your Response"]);
    }

    #[test]
    fn test_no_markers() {
        let text = "# Title\n\nJust prose with [a link](https://example.com).";
        let extraction = extract_markers(text);
        assert!(extraction.registry.is_empty());
        assert_eq!(extraction.rewritten, text);
    }

    #[test]
    fn test_comment_markers_declare_fields_in_position_order() {
        let text = "<!-- INPUT_PLACEHOLDER:text:First -->\n\nBody\n\n[INPUT:textarea:Second]";
        let extraction = extract_markers(text);
        assert_eq!(names(&extraction), vec!["First", "Second"]);
        // Comments are left for the resolver to find in the markup
        assert!(extraction.rewritten.starts_with("<!-- INPUT_PLACEHOLDER:text:First -->"));
    }

    #[test]
    fn test_unterminated_bracket_fails_open() {
        let text = "[INPUT:text:Kept]\n\nThen [INPUT:text:never closed";
        let extraction = extract_markers(text);
        assert_eq!(names(&extraction), vec!["Kept"]);
        assert_eq!(
            extraction.malformed,
            vec![MalformedMarker {
                syntax: MarkerSyntax::Bracket,
                offset: text.find("[INPUT:text:never").unwrap(),
            }]
        );
        assert!(extraction.rewritten.ends_with("Then [INPUT:text:never closed"));
    }

    #[test]
    fn test_marker_swallowing_next_opener_is_malformed() {
        let text = "[INPUT:text:Open\n\nMore [INPUT:text:Later] [INPUT:text:After]";
        let extraction = extract_markers(text);
        assert!(extraction.registry.is_empty());
        assert_eq!(extraction.malformed.len(), 1);
        assert_eq!(extraction.rewritten, text);
    }

    #[test]
    fn test_malformed_cutoff_applies_to_both_syntaxes() {
        let text = "[INPUT:text:A]\n[INPUT:text:broken\n<!-- INPUT_PLACEHOLDER:text:B -->";
        let extraction = extract_markers(text);
        assert_eq!(names(&extraction), vec!["A"]);
    }

    #[test]
    fn test_names_are_attribute_escaped() {
        let extraction = extract_markers(r#"[INPUT:text:Say "hi" & <wave>]"#);
        assert_eq!(names(&extraction), vec![r#"Say "hi" & <wave>"#]);
        assert!(extraction
            .rewritten
            .contains(r#"data-field-name="Say &quot;hi&quot; &amp; &lt;wave&gt;""#));
        assert_eq!(
            unescape_attribute("Say &quot;hi&quot; &amp; &lt;wave&gt;"),
            r#"Say "hi" & <wave>"#
        );
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "[INPUT:text:X]\n<!-- INPUT_PLACEHOLDER:text:Y -->\n[INPUT:text:Z]";
        assert_eq!(extract_markers(text), extract_markers(text));
    }

    #[test]
    fn test_closed_bracket_with_empty_name_is_skipped() {
        let text = "Q1 [INPUT:text:] then\n\n[INPUT:textarea:Real Answer]\n\n[INPUT:text:Second]";
        let extraction = extract_markers(text);
        assert_eq!(names(&extraction), vec!["Real Answer", "Second"]);
        assert!(extraction.malformed.is_empty());
        assert!(extraction.rewritten.starts_with("Q1 [INPUT:text:] then"));
    }

    #[test]
    fn test_closed_comment_with_unreadable_name_is_skipped() {
        let text = "<!-- INPUT_PLACEHOLDER:text:a>b -->\n\n<!-- INPUT_PLACEHOLDER:text:Goal -->\n\n[INPUT:text:Later]";
        let extraction = extract_markers(text);
        assert_eq!(names(&extraction), vec!["Goal", "Later"]);
        assert!(extraction.malformed.is_empty());
    }

    #[test]
    fn test_unterminated_comment_fails_open() {
        let text = "[INPUT:text:Kept]\n\n<!-- INPUT_PLACEHOLDER:text:Lost\n\n[INPUT:text:After]";
        let extraction = extract_markers(text);
        assert_eq!(names(&extraction), vec!["Kept"]);
        assert_eq!(
            extraction.malformed,
            vec![MalformedMarker {
                syntax: MarkerSyntax::Comment,
                offset: text.find("<!--").unwrap(),
            }]
        );
    }
}
