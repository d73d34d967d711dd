use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_SCRIPT_ROOT: &str = "scripts";
const DEFAULT_EXTENSION: &str = "js";
const DEFAULT_HARNESS: &str = "scriptest/unittest";
const DEFAULT_CACHE_DIR: &str = "/tmp/scriptest-script-cache";

/// Environment variable overriding `[cache] dir`
pub const CACHE_DIR_ENV: &str = "SCRIPTEST_CACHE_DIR";
/// Environment variable overriding `[scripts] roots` (platform path-list syntax)
pub const SCRIPT_ROOTS_ENV: &str = "SCRIPTEST_SCRIPT_ROOTS";

/// Where scripts are loaded from and how they are bound
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Load path roots, searched in order
    pub roots: Vec<PathBuf>,

    /// Extension appended to a class's declared script filename
    pub extension: String,

    /// Harness module namespace handed to the engine when a script is instantiated
    pub harness: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(DEFAULT_SCRIPT_ROOT)],
            extension: DEFAULT_EXTENSION.to_string(),
            harness: DEFAULT_HARNESS.to_string(),
        }
    }
}

impl ScriptsConfig {
    /// File name looked up in the load path for a declared script
    pub fn file_name(&self, script: &str) -> String {
        if self.extension.is_empty() {
            script.to_string()
        } else {
            format!("{}.{}", script, self.extension.trim_start_matches('.'))
        }
    }
}

/// Compiled artifact persistence
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dir: PathBuf,

    /// When false compiled scripts only live in memory
    pub persist: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_CACHE_DIR),
            persist: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Regex selecting which children `run` executes
    pub filter: Option<String>,

    pub verbose: bool,
}

/// Complete `scriptest.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scripts: ScriptsConfig,
    pub cache: CacheConfig,
    pub run: RunConfig,
}

impl Config {
    /// Apply `SCRIPTEST_CACHE_DIR` and `SCRIPTEST_SCRIPT_ROOTS` on top of the file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var(CACHE_DIR_ENV)
            && !dir.trim().is_empty()
        {
            self.cache.dir = PathBuf::from(dir);
        }

        if let Some(roots) = std::env::var_os(SCRIPT_ROOTS_ENV) {
            let roots: Vec<PathBuf> = std::env::split_paths(&roots)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if !roots.is_empty() {
                self.scripts.roots = roots;
            }
        }
    }
}
