use crate::compilation::CompilationCache;
use crate::config::Config;
use crate::script::{FsLoadPath, LoadPath, ScriptEngine};
use std::sync::Arc;

/// Everything a runner borrows from its surroundings: the process-wide
/// compilation cache, the script load path and configuration.
///
/// Cheap to clone; clones share the cache.
pub struct ScriptEnvironment<E: ScriptEngine> {
    cache: Arc<CompilationCache<E>>,
    load_path: Arc<dyn LoadPath>,
    config: Config,
}

impl<E: ScriptEngine> ScriptEnvironment<E> {
    pub fn new(cache: Arc<CompilationCache<E>>, load_path: Arc<dyn LoadPath>, config: Config) -> Self {
        Self {
            cache,
            load_path,
            config,
        }
    }

    /// Build the cache and file-system load path described by `config`
    pub fn from_config(engine: Arc<E>, config: Config) -> Self {
        let cache = Arc::new(CompilationCache::from_config(engine, &config.cache));
        let load_path: Arc<dyn LoadPath> = Arc::new(FsLoadPath::new(config.scripts.roots.clone()));
        Self::new(cache, load_path, config)
    }

    /// Same cache and config, different load path
    pub fn with_load_path(mut self, load_path: Arc<dyn LoadPath>) -> Self {
        self.load_path = load_path;
        self
    }

    pub fn cache(&self) -> &Arc<CompilationCache<E>> {
        &self.cache
    }

    pub fn engine(&self) -> &E {
        self.cache.engine()
    }

    pub fn load_path(&self) -> Arc<dyn LoadPath> {
        Arc::clone(&self.load_path)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<E: ScriptEngine> Clone for ScriptEnvironment<E> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            load_path: Arc::clone(&self.load_path),
            config: self.config.clone(),
        }
    }
}
