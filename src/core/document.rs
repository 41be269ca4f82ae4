//! Workshop documents loaded from markdown files

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::markdown::to_markup;
use crate::form::marker::{extract_markers, MalformedMarker, MarkerRegistry};

/// A workshop worksheet
///
/// Immutable once loaded: the markup and field registry are derived from the
/// body at load time.
#[derive(Debug, Clone)]
pub struct Document {
    /// Identifier used by the library (file stem)
    pub id: String,
    /// Source file, if loaded from disk
    pub path: Option<PathBuf>,
    /// Frontmatter metadata
    pub metadata: DocumentMetadata,
    /// Body text without frontmatter
    pub content: String,
    /// HTML produced from the body after marker rewriting
    pub markup: String,
    /// Declared input fields
    pub fields: MarkerRegistry,
    /// Markers that were opened but not terminated
    pub malformed: Vec<MalformedMarker>,
}

/// Document metadata from YAML frontmatter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Document {
    /// Open a document from a file; the file stem becomes its id
    pub fn open(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read workshop: {}", path.display()))?;

        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut document = Self::from_source(&id, &source);
        document.path = Some(path.to_path_buf());
        tracing::info!(
            "Loaded workshop {} ({} fields)",
            document.slug(),
            document.fields.len()
        );
        Ok(document)
    }

    /// Build a document from raw file contents
    pub fn from_source(id: &str, source: &str) -> Self {
        let metadata = Self::parse_frontmatter(source).unwrap_or_default();
        let content = Self::strip_frontmatter(source).to_string();

        let extraction = extract_markers(&content);
        let markup = to_markup(&extraction.rewritten);

        Self {
            id: id.to_string(),
            path: None,
            metadata,
            content,
            markup,
            fields: extraction.registry,
            malformed: extraction.malformed,
        }
    }

    /// Frontmatter slug, falling back to the id
    pub fn slug(&self) -> &str {
        self.metadata
            .slug
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.id)
    }

    /// Frontmatter title, falling back to the slug in title case
    pub fn title(&self) -> String {
        self.metadata
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| title_from_slug(self.slug()))
    }

    /// Parse YAML frontmatter from content
    fn parse_frontmatter(content: &str) -> Option<DocumentMetadata> {
        let (frontmatter, _) = split_frontmatter(content)?;
        let frontmatter = frontmatter.trim();

        serde_json::from_str(frontmatter).ok().or_else(|| {
            // Simple key-value parsing
            let mut metadata = DocumentMetadata::default();
            for line in frontmatter.lines() {
                if let Some((key, value)) = line.split_once(':') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"');
                    match key {
                        "title" => metadata.title = Some(value.to_string()),
                        "slug" => metadata.slug = Some(value.to_string()),
                        "tags" => {
                            metadata.tags = value
                                .trim_matches(|c| c == '[' || c == ']')
                                .split(',')
                                .map(|s| s.trim().trim_matches('"').to_string())
                                .filter(|s| !s.is_empty())
                                .collect();
                        }
                        _ => {}
                    }
                }
            }
            Some(metadata)
        })
    }

    /// Content without the frontmatter block
    fn strip_frontmatter(content: &str) -> &str {
        match split_frontmatter(content) {
            Some((_, body)) => body.trim_start(),
            None => content,
        }
    }
}

/// Split `---` delimited frontmatter from the body. The closing delimiter must
/// sit on its own line.
fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---")?;
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    let rest = rest.strip_prefix('\n')?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// `step-0` -> `Step 0`
pub fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
