use crate::{Result, ScriptestError};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Resolves script names to source text
pub trait LoadPath: Send + Sync {
    fn load(&self, name: &str) -> Result<String>;
}

/// Searches a list of directories in order
#[derive(Debug, Clone)]
pub struct FsLoadPath {
    roots: Vec<PathBuf>,
}

impl FsLoadPath {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl Default for FsLoadPath {
    fn default() -> Self {
        Self::new(vec![PathBuf::from("scripts")])
    }
}

impl LoadPath for FsLoadPath {
    fn load(&self, name: &str) -> Result<String> {
        for root in &self.roots {
            let candidate = root.join(name);
            if !candidate.is_file() {
                continue;
            }

            tracing::debug!(script = name, path = %candidate.display(), "Loading script");
            return fs::read_to_string(&candidate).map_err(|e| ScriptestError::Load {
                name: name.to_string(),
                source: anyhow::Error::new(e).context(candidate.display().to_string()),
            });
        }

        Err(ScriptestError::ScriptNotFound {
            name: name.to_string(),
            searched: self.roots.clone(),
        })
    }
}

/// In-memory scripts, e.g. sources embedded with `include_str!`
#[derive(Debug, Clone, Default)]
pub struct StaticLoadPath {
    scripts: HashMap<String, String>,
}

impl StaticLoadPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.scripts.insert(name.into(), source.into());
    }
}

impl LoadPath for StaticLoadPath {
    fn load(&self, name: &str) -> Result<String> {
        self.scripts
            .get(name)
            .cloned()
            .ok_or_else(|| ScriptestError::ScriptNotFound {
                name: name.to_string(),
                searched: Vec::new(),
            })
    }
}
