// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError(pub String);

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for SourceError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ManifestSection {
    Modules,
    Quizzes,
    LearningPaths,
}

impl ManifestSection {
    pub const ALL: [Self; 3] = [Self::Modules, Self::Quizzes, Self::LearningPaths];

    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Modules => "modules",
            Self::Quizzes => "quizzes",
            Self::LearningPaths => "learning-paths",
        }
    }
}

pub const CATEGORIES_FILE: &str = "categories.json";
pub const EXAM_CHANGES_FILE: &str = "exam-changes-2025.json";

/// Read access to a content manifest directory. Listing and fetching
/// are the loader's suspension points.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Document names (without directory) in a section, sorted.
    async fn list_documents(&self, section: ManifestSection) -> Result<Vec<String>, SourceError>;

    async fn read_document(
        &self,
        section: ManifestSection,
        name: &str,
    ) -> Result<String, SourceError>;

    /// Metadata file under `metadata/`; absent files are `None`.
    async fn read_metadata(&self, name: &str) -> Result<Option<String>, SourceError>;
}

/// Manifest directory on disk: `modules/`, `quizzes/`,
/// `learning-paths/`, `metadata/`.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentSource for DirSource {
    async fn list_documents(&self, section: ManifestSection) -> Result<Vec<String>, SourceError> {
        let dir = self.root.join(section.dir_name());
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SourceError(format!("{}: {e}", dir.display()))),
        };
        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SourceError(format!("{}: {e}", dir.display())))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".json") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn read_document(
        &self,
        section: ManifestSection,
        name: &str,
    ) -> Result<String, SourceError> {
        let path = self.root.join(section.dir_name()).join(name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SourceError(format!("{}: {e}", path.display())))
    }

    async fn read_metadata(&self, name: &str) -> Result<Option<String>, SourceError> {
        let path = self.root.join("metadata").join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SourceError(format!("{}: {e}", path.display()))),
        }
    }
}

/// In-memory manifest for tests and embedded corpora.
#[derive(Default)]
pub struct MemorySource {
    documents: BTreeMap<(ManifestSection, String), String>,
    metadata: BTreeMap<String, String>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(
        mut self,
        section: ManifestSection,
        name: &str,
        body: impl Into<String>,
    ) -> Self {
        self.documents.insert((section, name.to_string()), body.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, name: &str, body: impl Into<String>) -> Self {
        self.metadata.insert(name.to_string(), body.into());
        self
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn list_documents(&self, section: ManifestSection) -> Result<Vec<String>, SourceError> {
        Ok(self
            .documents
            .keys()
            .filter(|(s, _)| *s == section)
            .map(|(_, name)| name.clone())
            .collect())
    }

    async fn read_document(
        &self,
        section: ManifestSection,
        name: &str,
    ) -> Result<String, SourceError> {
        self.documents
            .get(&(section, name.to_string()))
            .cloned()
            .ok_or_else(|| SourceError(format!("{}/{name} missing", section.dir_name())))
    }

    async fn read_metadata(&self, name: &str) -> Result<Option<String>, SourceError> {
        Ok(self.metadata.get(name).cloned())
    }
}
