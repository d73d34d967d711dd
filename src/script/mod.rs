pub mod context;
pub mod engine;
pub mod instance;
pub mod load_path;

pub use context::{ContextGuard, context_depth};
pub use engine::{HostInstance, ScriptArg, ScriptEngine, ScriptModule, TestCollector};
pub use instance::ScriptInstance;
pub use load_path::{FsLoadPath, LoadPath, StaticLoadPath};
