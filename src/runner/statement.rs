//! Lifecycle execution of one child.
//!
//! A resolved [`TestBody`] is wrapped with the class's before and after
//! hooks. Befores run in declaration order and stop at the first failure,
//! which also skips the body. Afters always run, all of them, and each
//! failing after is collected alongside whatever failed earlier.

use crate::class::{Annotation, InstanceHandle, MethodDef, TestClass};
use crate::error::HookKind;
use crate::script::{ContextGuard, HostInstance, ScriptArg, ScriptEngine, ScriptInstance};
use crate::{Result, ScriptestError};
use serde_json::Value;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Entry point handing the fixture instance to script code
pub const SET_TEST_INSTANCE: &str = "unittest.setTestInstance";

/// Where a child's body comes from
pub enum TestBody<'r, E: ScriptEngine, T> {
    Native(&'r MethodDef<T>),
    Script {
        script: &'r ScriptInstance<E>,
        entry_point: &'r str,
        arguments: Vec<Value>,
    },
}

pub struct Lifecycle<'r, E: ScriptEngine, T> {
    class: &'r TestClass<T>,
    handle: &'r InstanceHandle<T>,
    engine: &'r E,
}

impl<'r, E: ScriptEngine, T: Send + 'static> Lifecycle<'r, E, T> {
    pub fn new(class: &'r TestClass<T>, handle: &'r InstanceHandle<T>, engine: &'r E) -> Self {
        Self {
            class,
            handle,
            engine,
        }
    }

    /// Run befores, body and afters. Returns every failure, in order.
    pub fn evaluate(&self, body: TestBody<'_, E, T>) -> Vec<ScriptestError> {
        let mut failures = Vec::new();

        match self.run_befores() {
            Ok(()) => {
                if let Err(e) = self.run_body(body) {
                    failures.push(e);
                }
            }
            Err(e) => failures.push(e),
        }

        for after in self.class.annotated(Annotation::After) {
            if let Err(e) = self.run_hook(HookKind::After, after) {
                failures.push(e);
            }
        }

        failures
    }

    fn run_befores(&self) -> Result<()> {
        for before in self.class.annotated(Annotation::Before) {
            self.run_hook(HookKind::Before, before)?;
        }
        Ok(())
    }

    fn run_hook(&self, kind: HookKind, method: &MethodDef<T>) -> Result<()> {
        guarded(
            || format!("{} hook `{}`", kind, method.name),
            || {
                self.handle
                    .call(method, &[])
                    .map(drop)
                    .map_err(|source| ScriptestError::Hook {
                        kind,
                        name: method.name.clone(),
                        source,
                    })
            },
        )
    }

    fn run_body(&self, body: TestBody<'_, E, T>) -> Result<()> {
        match body {
            TestBody::Native(method) => guarded(
                || format!("test method `{}`", method.name),
                || {
                    self.handle
                        .call(method, &[])
                        .map(drop)
                        .map_err(|source| ScriptestError::Native {
                            method: method.name.clone(),
                            source,
                        })
                },
            ),
            TestBody::Script {
                script,
                entry_point,
                arguments,
            } => self.run_script(script, entry_point, arguments),
        }
    }

    /// Enter a fresh context, hand over the fixture, invoke the entry point,
    /// and exit the context whatever happened.
    fn run_script(&self, script: &ScriptInstance<E>, entry_point: &str, arguments: Vec<Value>) -> Result<()> {
        let guard = ContextGuard::enter(self.engine)?;

        let instance: Arc<dyn HostInstance> = Arc::new(self.handle.clone());
        let outcome = guarded(
            || format!("script entry point `{}`", entry_point),
            || {
                script.run(SET_TEST_INSTANCE, &[ScriptArg::Instance(instance)])?;
                let args: Vec<ScriptArg<'_>> = arguments.into_iter().map(ScriptArg::Value).collect();
                script.run(entry_point, &args).map(drop)
            },
        );

        match guard.exit() {
            Ok(()) => outcome,
            Err(exit) => {
                let mut failures: Vec<ScriptestError> = outcome.err().into_iter().collect();
                failures.push(exit);
                Err(ScriptestError::aggregate(failures).unwrap_or_else(|| {
                    ScriptestError::ContextImbalance("context exit failed".to_string())
                }))
            }
        }
    }
}

/// Run `f`, turning a panic into a `Panicked` failure for `what`
pub(crate) fn guarded<R>(what: impl FnOnce() -> String, f: impl FnOnce() -> Result<R>) -> Result<R> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(ScriptestError::Panicked {
            what: what(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
