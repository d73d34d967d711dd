use std::path::PathBuf;
use thiserror::Error;

/// Which lifecycle hook raised a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Before,
    After,
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookKind::Before => write!(f, "before"),
            HookKind::After => write!(f, "after"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ScriptestError {
    #[error("script `{name}` not found in load path {searched:?}")]
    ScriptNotFound { name: String, searched: Vec<PathBuf> },

    #[error("failed to load script `{name}`: {source}")]
    Load {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to compile script `{name}`: {source}")]
    Compile {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to instantiate `{class}`: {source}")]
    Instantiate {
        class: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to initialize runner for `{class}`: {source}")]
    Initialization {
        class: String,
        #[source]
        source: Box<ScriptestError>,
    },

    #[error("test discovery failed for `{class}`: {source}")]
    Discovery {
        class: String,
        #[source]
        source: Box<ScriptestError>,
    },

    #[error("no public no-arg method `{method}` on `{class}`")]
    NoSuchMethod { class: String, method: String },

    #[error("getArguments failed on `{class}`: {source}")]
    Arguments {
        class: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{kind} hook `{name}` failed: {source}")]
    Hook {
        kind: HookKind,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("test method `{method}` failed: {source}")]
    Native {
        method: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("script entry point `{entry_point}` failed: {source}")]
    Script {
        entry_point: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{what} panicked: {message}")]
    Panicked { what: String, message: String },

    #[error("{} failures: {}", .0.len(), join_messages(.0))]
    Multiple(Vec<ScriptestError>),

    #[error("execution context imbalance: {0}")]
    ContextImbalance(String),

    #[error("script engine failed to {phase} context: {source}")]
    Context {
        phase: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Run stopped at `test` after an internal error; the cause itself was
    /// reported as that test's failure
    #[error("run aborted at {test}: {message}")]
    Aborted { test: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("invalid test filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    #[error("{0}")]
    Other(String),
}

fn join_messages(errors: &[ScriptestError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ScriptestError {
    /// Internal errors mean state leaked between tests. They abort the run
    /// instead of being reported as an ordinary test failure.
    pub fn is_internal(&self) -> bool {
        match self {
            ScriptestError::ContextImbalance(_)
            | ScriptestError::Context { .. }
            | ScriptestError::Aborted { .. } => true,
            ScriptestError::Multiple(errors) => errors.iter().any(ScriptestError::is_internal),
            _ => false,
        }
    }

    /// Collapse a list of failures into the single cause reported for a child.
    pub fn aggregate(mut errors: Vec<ScriptestError>) -> Option<ScriptestError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(ScriptestError::Multiple(errors)),
        }
    }

    pub(crate) fn initialization(class: &str, source: ScriptestError) -> Self {
        ScriptestError::Initialization {
            class: class.to_string(),
            source: Box::new(source),
        }
    }
}

// Add conversion from anyhow::Error
impl From<anyhow::Error> for ScriptestError {
    fn from(err: anyhow::Error) -> Self {
        ScriptestError::Other(err.to_string())
    }
}

/// Result type for scriptest crate
pub type Result<T> = std::result::Result<T, ScriptestError>;
