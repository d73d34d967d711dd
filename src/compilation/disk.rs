use crate::Result;
use crate::compilation::ScriptKey;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const ARTIFACT_EXTENSION: &str = "json";

/// Envelope written for each compiled artifact
#[derive(Debug, Serialize, Deserialize)]
struct StoredArtifact<A> {
    name: String,
    digest: u64,
    source: String,
    compiled_at: DateTime<Utc>,
    artifact: A,
}

/// Directory of persisted compiled artifacts, shared by processes
#[derive(Debug, Clone)]
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &ScriptKey) -> PathBuf {
        self.dir
            .join(format!("{}.{}", key.file_stem(), ARTIFACT_EXTENSION))
    }

    /// Read a persisted artifact.
    ///
    /// Missing, unreadable or mismatching entries are a miss, not an error:
    /// the caller recompiles and overwrites them.
    pub fn load<A: DeserializeOwned>(&self, key: &ScriptKey) -> Option<A> {
        let path = self.path_for(key);
        if !path.exists() {
            return None;
        }

        match Self::read_locked(&path) {
            Ok(content) => match serde_json::from_str::<StoredArtifact<A>>(&content) {
                Ok(stored)
                    if stored.name == key.name()
                        && stored.digest == key.digest()
                        && stored.source == key.source() =>
                {
                    tracing::debug!(key = %key, compiled_at = %stored.compiled_at, "Loaded persisted artifact");
                    Some(stored.artifact)
                }
                Ok(_) => {
                    tracing::warn!(path = %path.display(), "Persisted artifact does not match its key");
                    None
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt persisted artifact");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read persisted artifact");
                None
            }
        }
    }

    /// Persist an artifact.
    ///
    /// The file is written under an exclusive `fs2` lock so concurrent
    /// processes never observe a half-written entry.
    pub fn store<A: Serialize>(&self, key: &ScriptKey, artifact: &A) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let stored = StoredArtifact {
            name: key.name().to_string(),
            digest: key.digest(),
            source: key.source().to_string(),
            compiled_at: Utc::now(),
            artifact,
        };
        let json = serde_json::to_string(&stored)?;

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.path_for(key))?;

        file.lock_exclusive()?;
        file.set_len(0)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        // Unlock on drop
        drop(file);

        tracing::debug!(key = %key, dir = %self.dir.display(), "Persisted compiled artifact");
        Ok(())
    }

    fn read_locked(path: &Path) -> Result<String> {
        let mut file = fs::File::open(path)?;
        file.lock_shared()?;

        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(content)
    }
}
