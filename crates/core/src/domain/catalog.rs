// Work Item Catalog

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a work item's bytes are reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Http(String),
    File(PathBuf),
}

/// One producible output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub name: String,
    pub source: String,
}

impl WorkItem {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Classify the source reference (`http://`, `https://` or `file://`)
    pub fn source_kind(&self) -> Result<SourceKind> {
        if self.source.starts_with("http://") || self.source.starts_with("https://") {
            return Ok(SourceKind::Http(self.source.clone()));
        }
        if let Some(path) = self.source.strip_prefix("file://") {
            if path.is_empty() {
                return Err(DomainError::ValidationError(format!(
                    "Work item '{}' has an empty file path",
                    self.name
                )));
            }
            return Ok(SourceKind::File(PathBuf::from(path)));
        }
        Err(DomainError::ValidationError(format!(
            "Work item '{}' has unsupported source '{}'",
            self.name, self.source
        )))
    }

    /// File extension of the source, used to name the stored artifact
    pub fn extension(&self) -> &str {
        let path = self.source.split(['?', '#']).next().unwrap_or_default();
        let file_name = path.rsplit('/').next().unwrap_or_default();
        match file_name.rsplit_once('.') {
            Some((stem, ext))
                if !stem.is_empty()
                    && !ext.is_empty()
                    && ext.len() <= 8
                    && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                ext
            }
            _ => "bin",
        }
    }
}

/// Fixed, non-empty set of work items established at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<WorkItem>,
}

impl Catalog {
    /// Build a catalog, rejecting empty lists and unsupported sources
    pub fn new(items: Vec<WorkItem>) -> Result<Self> {
        if items.is_empty() {
            return Err(DomainError::ValidationError(
                "Catalog must contain at least one work item".to_string(),
            ));
        }
        for item in &items {
            item.source_kind()?;
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    // Never true: construction rejects empty catalogs
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WorkItem> {
        self.items.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(Catalog::new(vec![]).is_err());
    }

    #[test]
    fn test_unsupported_source_rejected() {
        let result = Catalog::new(vec![WorkItem::new("ftp", "ftp://host/video.mp4")]);
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_source_kind() {
        let http = WorkItem::new("a", "https://cdn.example.com/v/a.mp4");
        assert_eq!(
            http.source_kind().unwrap(),
            SourceKind::Http("https://cdn.example.com/v/a.mp4".to_string())
        );

        let file = WorkItem::new("b", "file:///srv/assets/b.mp4");
        assert_eq!(
            file.source_kind().unwrap(),
            SourceKind::File(PathBuf::from("/srv/assets/b.mp4"))
        );

        assert!(WorkItem::new("c", "file://").source_kind().is_err());
    }

    #[test]
    fn test_extension() {
        assert_eq!(
            WorkItem::new("a", "https://cdn.example.com/Peppo%20AI/clip_r9g9i1.mp4").extension(),
            "mp4"
        );
        assert_eq!(
            WorkItem::new("b", "https://cdn.example.com/clip.webm?sig=abc").extension(),
            "webm"
        );
        assert_eq!(WorkItem::new("c", "https://cdn.example.com/clip").extension(), "bin");
        assert_eq!(WorkItem::new("d", "file:///tmp/.hidden").extension(), "bin");
    }
}
