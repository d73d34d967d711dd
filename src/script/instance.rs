use crate::compilation::{CompilationCache, CompiledScript};
use crate::script::{LoadPath, ScriptArg, ScriptEngine, ScriptModule};
use crate::{Result, ScriptestError};
use serde_json::Value;
use std::sync::Arc;

/// A compiled script bound to a load path and harness namespace
pub struct ScriptInstance<E: ScriptEngine> {
    name: String,
    compiled: CompiledScript<E::Artifact>,
    module: E::Module,
}

impl<E: ScriptEngine> ScriptInstance<E> {
    /// Load `file_name` through `load_path`, compile it through `cache`,
    /// and bind it into `namespace`.
    pub fn load(
        name: &str,
        file_name: &str,
        cache: &CompilationCache<E>,
        load_path: Arc<dyn LoadPath>,
        namespace: &str,
    ) -> Result<Self> {
        let source = load_path.load(file_name)?;
        let compiled = cache.get_or_compile(name, &source)?;
        let module = cache
            .engine()
            .instantiate(compiled.artifact(), load_path, namespace)
            .map_err(|source| ScriptestError::Load {
                name: name.to_string(),
                source,
            })?;

        tracing::debug!(script = name, key = %compiled.key(), namespace, "Script instance ready");

        Ok(Self {
            name: name.to_string(),
            compiled,
            module,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compiled(&self) -> &CompiledScript<E::Artifact> {
        &self.compiled
    }

    /// Invoke an entry point, tagging failures with its name
    pub fn run(&self, entry_point: &str, args: &[ScriptArg<'_>]) -> Result<Value> {
        self.module
            .run(entry_point, args)
            .map_err(|source| ScriptestError::Script {
                entry_point: entry_point.to_string(),
                source,
            })
    }
}
