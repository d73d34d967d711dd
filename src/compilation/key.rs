use rustc_hash::FxHasher;
use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

/// Identity of a script source: its name plus its full content.
///
/// Equality compares the source text itself. The FxHash digest is only a
/// name for persisted artifacts; it is deterministic across processes but
/// may collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptKey {
    name: String,
    source: Arc<str>,
    digest: u64,
}

impl ScriptKey {
    pub fn new(name: &str, source: &str) -> Self {
        let mut hasher = FxHasher::default();
        hasher.write(source.as_bytes());
        Self::with_digest(name, source, hasher.finish())
    }

    pub(crate) fn with_digest(name: &str, source: &str, digest: u64) -> Self {
        Self {
            name: name.to_string(),
            source: Arc::from(source),
            digest,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn digest(&self) -> u64 {
        self.digest
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    /// File-system safe stem for persisted artifacts
    pub fn file_stem(&self) -> String {
        let name: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}-{:016x}-{}", name, self.digest, self.source_len())
    }
}

impl fmt::Display for ScriptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:016x}", self.name, self.digest)
    }
}
