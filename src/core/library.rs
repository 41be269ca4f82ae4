//! Workshop library backed by a directory of markdown files

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use super::document::Document;

/// Errors raised while looking up workshops
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Workshop not found: {0}")]
    NotFound(String),

    #[error("Failed to read workshop {id}: {message}")]
    Read { id: String, message: String },
}

/// Source of workshop documents, addressed by id
pub trait DocumentSource {
    /// Ids of every available document, sorted
    fn list_document_ids(&self) -> Vec<String>;

    /// Load one document
    fn load_document(&self, id: &str) -> Result<Document, LibraryError>;

    /// Load every document, skipping the ones that fail to load
    fn load_all(&self) -> Vec<Document> {
        self.list_document_ids()
            .iter()
            .filter_map(|id| match self.load_document(id) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    tracing::warn!("Skipping workshop {}: {}", id, e);
                    None
                }
            })
            .collect()
    }
}

/// Workshops stored as `<id>.md` files in one directory
#[derive(Debug, Clone)]
pub struct WorkshopLibrary {
    root: PathBuf,
}

impl WorkshopLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Markdown files directly inside the library directory
    fn markdown_files(&self) -> Vec<PathBuf> {
        if !self.root.is_dir() {
            return Vec::new();
        }

        WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
            .map(|e| e.into_path())
            .filter(|p| is_markdown(p))
            .collect()
    }
}

impl DocumentSource for WorkshopLibrary {
    fn list_document_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .markdown_files()
            .iter()
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().to_string()))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    fn load_document(&self, id: &str) -> Result<Document, LibraryError> {
        // Ids are plain file stems; anything path-like cannot name a workshop
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(LibraryError::NotFound(id.to_string()));
        }

        let path = ["md", "markdown"]
            .iter()
            .map(|ext| self.root.join(format!("{id}.{ext}")))
            .find(|p| p.is_file())
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;

        Document::open(&path).map_err(|e| LibraryError::Read {
            id: id.to_string(),
            message: format!("{e:#}"),
        })
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "md" || ext == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn library_with(files: &[(&str, &str)]) -> (tempfile::TempDir, WorkshopLibrary) {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        let library = WorkshopLibrary::new(dir.path());
        (dir, library)
    }

    #[test]
    fn test_list_document_ids() {
        let (_dir, library) = library_with(&[
            ("step-1.md", "one"),
            ("step-0.md", "zero"),
            ("notes.txt", "ignored"),
            (".hidden.md", "ignored"),
        ]);
        assert_eq!(library.list_document_ids(), vec!["step-0", "step-1"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let library = WorkshopLibrary::new("/definitely/not/a/workshop/dir");
        assert!(library.list_document_ids().is_empty());
        assert!(library.load_all().is_empty());
    }

    #[test]
    fn test_load_document_and_not_found() {
        let (_dir, library) = library_with(&[("step-0.md", "---\ntitle: Step 0\n---\n[INPUT:text:A]")]);

        let doc = library.load_document("step-0").unwrap();
        assert_eq!(doc.title(), "Step 0");
        assert_eq!(doc.fields.len(), 1);

        assert!(matches!(
            library.load_document("step-9"),
            Err(LibraryError::NotFound(id)) if id == "step-9"
        ));
        assert!(matches!(
            library.load_document("../step-0"),
            Err(LibraryError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_all() {
        let (_dir, library) = library_with(&[("a.md", "A"), ("b.md", "B")]);
        let docs = library.load_all();
        assert_eq!(docs.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
