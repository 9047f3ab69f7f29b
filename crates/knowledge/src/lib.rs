mod sections;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use guide_core::KnowledgeDoc;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

pub use sections::split_sections;

pub const MIN_CONTENT_CHARS: usize = 1000;

pub const REQUIRED_SECTIONS: &[&str] = &[
    "City Overview",
    "Languages Spoken",
    "Local Slang and Meanings",
    "Traffic Patterns and Peak Hours",
    "Popular Breakfast Spots and Street Food Areas",
    "Cultural Norms and Etiquette",
    "Practical Local Tips",
];

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("knowledge file not found: {0}")]
    NotFound(String),
    #[error("knowledge file is empty: {0}")]
    Empty(String),
    #[error("knowledge file content appears incomplete ({chars} characters, need {min})")]
    Incomplete { chars: usize, min: usize },
    #[error("knowledge file missing required sections: {}", .0.join(", "))]
    MissingSections(Vec<String>),
    #[error("failed reading knowledge file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeSummary {
    pub source_path: String,
    pub title: String,
    pub last_updated: DateTime<Utc>,
    pub content_length: usize,
    pub sections_count: usize,
    pub sections: Vec<String>,
}

impl KnowledgeSummary {
    pub fn of(doc: &KnowledgeDoc) -> Self {
        Self {
            source_path: doc.source_path.clone(),
            title: doc.title.clone(),
            last_updated: doc.last_modified,
            content_length: doc.body.chars().count(),
            sections_count: doc.sections.len(),
            sections: doc
                .sections
                .iter()
                .map(|section| section.title.clone())
                .collect(),
        }
    }
}

/// Location of the knowledge document. Holds no cached state.
#[derive(Debug, Clone)]
pub struct KnowledgeSource {
    path: PathBuf,
}

impl KnowledgeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Arc<KnowledgeDoc>, KnowledgeError> {
        load_knowledge(&self.path).map(Arc::new)
    }

    /// Always reads the file again and returns a fresh snapshot.
    pub fn reload(&self) -> Result<Arc<KnowledgeDoc>, KnowledgeError> {
        info!(path = %self.path.display(), "reloading knowledge document");
        self.load()
    }

    /// Returns a new snapshot only when the file changed after `current` was taken.
    pub fn reload_if_changed(
        &self,
        current: &KnowledgeDoc,
    ) -> Result<Option<Arc<KnowledgeDoc>>, KnowledgeError> {
        let modified = modified_at(&self.path)?;
        if modified <= current.last_modified {
            debug!(path = %self.path.display(), "knowledge document unchanged");
            return Ok(None);
        }

        self.reload().map(Some)
    }
}

pub fn load_knowledge(path: impl AsRef<Path>) -> Result<KnowledgeDoc, KnowledgeError> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    if !path.exists() {
        return Err(KnowledgeError::NotFound(shown));
    }

    let raw = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
        path: shown.clone(),
        source,
    })?;
    let last_modified = modified_at(path)?;

    let fallback_title = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("untitled")
        .replace(['-', '_'], " ");

    let doc = parse_knowledge(&shown, &raw, &fallback_title, last_modified)?;
    info!(
        path = %shown,
        sections = doc.sections.len(),
        chars = doc.body.len(),
        "knowledge document loaded"
    );
    Ok(doc)
}

/// Validates markdown content and builds a snapshot from it.
pub fn parse_knowledge(
    source_path: &str,
    content: &str,
    fallback_title: &str,
    last_modified: DateTime<Utc>,
) -> Result<KnowledgeDoc, KnowledgeError> {
    if content.trim().is_empty() {
        return Err(KnowledgeError::Empty(source_path.to_string()));
    }

    let chars = content.chars().count();
    if chars < MIN_CONTENT_CHARS {
        return Err(KnowledgeError::Incomplete {
            chars,
            min: MIN_CONTENT_CHARS,
        });
    }

    let missing = REQUIRED_SECTIONS
        .iter()
        .filter(|section| !content.contains(&format!("## {section}")))
        .map(|section| section.to_string())
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(KnowledgeError::MissingSections(missing));
    }

    let heading_regex = Regex::new(r"(?m)^#\s+(.+)$").expect("valid heading regex");
    let title = heading_regex
        .captures(content)
        .and_then(|captures| {
            captures
                .get(1)
                .map(|value| value.as_str().trim().to_string())
        })
        .unwrap_or_else(|| fallback_title.to_string());

    Ok(KnowledgeDoc {
        source_path: source_path.to_string(),
        title,
        body: content.to_string(),
        sections: split_sections(content),
        last_modified,
    })
}

fn modified_at(path: &Path) -> Result<DateTime<Utc>, KnowledgeError> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(DateTime::<Utc>::from)
        .map_err(|source| KnowledgeError::Io {
            path: path.display().to_string(),
            source,
        })
}
