//! Run tests authored in an embedded scripting language as children of a
//! host test runner.
//!
//! A [`TestClass`] declares fixture hooks and, optionally, a script. The
//! [`ScriptRunner`] compiles that script through a shared
//! [`CompilationCache`], asks it for its tests, and runs each one inside a
//! fresh engine context wrapped in the class's before and after hooks.

pub mod class;
pub mod compilation;
pub mod config;
pub mod error;
pub mod logger;
pub mod runner;
pub mod script;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use class::{Annotation, InstanceHandle, MethodDef, TestClass, Visibility};
pub use compilation::{CompilationCache, CompiledScript, DiskStore, ScriptKey};
pub use config::{Config, ConfigLoader};
pub use error::{HookKind, Result, ScriptestError};
pub use runner::{
    ConsoleNotifier, Description, Failure, RecordingNotifier, RunNotifier, ScriptEnvironment, ScriptRunner,
    TestOutcome, TestResult, TestSummary,
};
pub use script::{
    FsLoadPath, HostInstance, LoadPath, ScriptArg, ScriptEngine, ScriptInstance, ScriptModule, StaticLoadPath,
    TestCollector,
};
