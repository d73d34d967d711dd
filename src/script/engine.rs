//! Interfaces consumed from a script engine.
//!
//! The engine itself (parsing, evaluation, its global context) is a black box.
//! scriptest only needs to compile source into an artifact, bind an artifact
//! into a runnable module, invoke named entry points, and bracket invocations
//! with the engine-wide context pair.

use crate::script::LoadPath;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

pub trait ScriptEngine: Send + Sync + 'static {
    /// Compiled form of a script. Serializable so it can be persisted.
    type Artifact: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// A compiled script bound to a load path and namespace
    type Module: ScriptModule;

    fn compile(&self, name: &str, source: &str) -> anyhow::Result<Self::Artifact>;

    fn instantiate(
        &self,
        artifact: Arc<Self::Artifact>,
        load_path: Arc<dyn LoadPath>,
        namespace: &str,
    ) -> anyhow::Result<Self::Module>;

    /// Engine-wide context entry. Paired with [`ScriptEngine::exit_context`].
    fn enter_context(&self) -> anyhow::Result<()>;

    fn exit_context(&self) -> anyhow::Result<()>;
}

pub trait ScriptModule {
    /// Invoke a named entry point. Script-level failures surface as `Err`.
    fn run(&self, entry_point: &str, args: &[ScriptArg<'_>]) -> anyhow::Result<Value>;
}

/// Argument passed into a script entry point
pub enum ScriptArg<'a> {
    Value(Value),
    /// The module's own top-level scope
    Scope,
    /// The host fixture instance
    Instance(Arc<dyn HostInstance>),
    /// Out-collection populated by `unittest.collectTests`
    Collector(&'a TestCollector),
}

impl fmt::Debug for ScriptArg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptArg::Value(v) => f.debug_tuple("Value").field(v).finish(),
            ScriptArg::Scope => write!(f, "Scope"),
            ScriptArg::Instance(i) => f.debug_tuple("Instance").field(&i.class_name()).finish(),
            ScriptArg::Collector(c) => f.debug_tuple("Collector").field(c).finish(),
        }
    }
}

/// Host object reachable from script code
pub trait HostInstance: Send + Sync {
    fn class_name(&self) -> &str;

    /// Invoke a public host method by name
    fn invoke(&self, method: &str, args: &[Value]) -> anyhow::Result<Value>;
}

/// Test names collected by a script, in the order the script pushed them
#[derive(Debug, Default)]
pub struct TestCollector {
    names: RefCell<Vec<String>>,
}

impl TestCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, name: impl Into<String>) {
        self.names.borrow_mut().push(name.into());
    }

    pub fn len(&self) -> usize {
        self.names.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.borrow().is_empty()
    }

    pub fn into_names(self) -> Vec<String> {
        self.names.into_inner()
    }
}
