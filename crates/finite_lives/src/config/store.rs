use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::info;

use super::chapter::Chapter;
use super::parser::parse_into;
use super::types::{ConfigError, ParseReport};

/// First source to commit a chapter name owns it.
#[derive(Debug, Default, Clone)]
pub struct ConfigStore {
    chapters: HashMap<String, Chapter>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse_str(&mut self, source_name: &str, raw: &str) -> Result<ParseReport, ConfigError> {
        let report = parse_into(&mut self.chapters, source_name, raw)?;
        info!(
            source = source_name,
            chapters_added = report.chapters_added.len(),
            skipped_fragments = report.notes.len(),
            total_chapters = self.chapters.len(),
            "config_source_parsed"
        );
        Ok(report)
    }

    pub fn parse_file(&mut self, path: &Path) -> Result<ParseReport, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&path.display().to_string(), &raw)
    }

    pub fn lives(&self, chapter: &str, level: &str) -> Option<u32> {
        self.chapters.get(chapter)?.lives(level)
    }

    pub fn chapter(&self, name: &str) -> Option<&Chapter> {
        self.chapters.get(name)
    }

    pub fn contains_chapter(&self, name: &str) -> bool {
        self.chapters.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn chapter_names(&self) -> Vec<&str> {
        let mut names = self.chapters.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}
