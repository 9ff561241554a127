use std::collections::HashMap;

/// Per-level lives overrides for one chapter.
///
/// Stored values are already floored at zero; zero means the level grants
/// infinite lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    name: String,
    levels: HashMap<String, u32>,
}

impl Chapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            levels: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Negative values collapse to zero.
    pub fn add_or_update_level(&mut self, level: impl Into<String>, lives: i32) {
        let floored = u32::try_from(lives).unwrap_or(0);
        self.levels.insert(level.into(), floored);
    }

    pub fn lives(&self, level: &str) -> Option<u32> {
        self.levels.get(level).copied()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}
