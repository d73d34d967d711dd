//! Runner façade: the host framework's view of one test class.
//!
//! Construction creates the fixture instance, loads and compiles the declared
//! script, and enumerates the children. Any failure there is an
//! initialization error and no child is ever reported. Afterwards children
//! run one at a time, in discovery order, on the calling thread.

use crate::class::{GET_ARGUMENTS, InstanceHandle, TestClass};
use crate::runner::discovery::discover;
use crate::runner::environment::ScriptEnvironment;
use crate::runner::notifier::{Description, Failure, RunNotifier};
use crate::runner::statement::{Lifecycle, TestBody, guarded};
use crate::runner::types::{TestResult, TestSummary};
use crate::script::{ScriptEngine, ScriptInstance};
use crate::{Result, ScriptestError};
use regex::Regex;
use serde_json::Value;
use std::time::Instant;

pub struct ScriptRunner<E: ScriptEngine, T> {
    class: TestClass<T>,
    method: Option<String>,
    handle: InstanceHandle<T>,
    script: Option<ScriptInstance<E>>,
    env: ScriptEnvironment<E>,
    children: Vec<String>,
    filter: Option<Regex>,
}

impl<E: ScriptEngine, T: Send + 'static> ScriptRunner<E, T> {
    /// Runner for every test of `class`
    pub fn new(class: TestClass<T>, env: ScriptEnvironment<E>) -> Result<Self> {
        Self::build(class, None, env)
    }

    /// Runner restricted to the single child `method`
    pub fn for_method(class: TestClass<T>, method: impl Into<String>, env: ScriptEnvironment<E>) -> Result<Self> {
        Self::build(class, Some(method.into()), env)
    }

    fn build(class: TestClass<T>, method: Option<String>, env: ScriptEnvironment<E>) -> Result<Self> {
        let class_name = class.name().to_string();
        Self::construct(class, method, env).map_err(|e| {
            tracing::error!(class = %class_name, error = %e, "Runner initialization failed");
            ScriptestError::initialization(&class_name, e)
        })
    }

    fn construct(class: TestClass<T>, method: Option<String>, env: ScriptEnvironment<E>) -> Result<Self> {
        let instance = class
            .instantiate()
            .map_err(|source| ScriptestError::Instantiate {
                class: class.name().to_string(),
                source,
            })?;
        let handle = InstanceHandle::new(class.name(), class.shared_methods(), instance);

        let script = match class.script() {
            None => None,
            Some(name) => {
                let scripts = &env.config().scripts;
                Some(ScriptInstance::load(
                    name,
                    &scripts.file_name(name),
                    env.cache(),
                    env.load_path(),
                    &scripts.harness,
                )?)
            }
        };

        let filter = env
            .config()
            .run
            .filter
            .as_deref()
            .map(Regex::new)
            .transpose()?;

        let children = discover(&class, method.as_deref(), script.as_ref(), env.engine())?;

        tracing::info!(
            class = class.name(),
            script = ?class.script(),
            children = children.len(),
            "Runner constructed"
        );

        Ok(Self {
            class,
            method,
            handle,
            script,
            env,
            children,
            filter,
        })
    }

    pub fn class(&self) -> &TestClass<T> {
        &self.class
    }

    pub fn script(&self) -> Option<&ScriptInstance<E>> {
        self.script.as_ref()
    }

    /// Children in discovery order
    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub fn describe_child(&self, child: &str) -> Description {
        Description::new(self.class.name(), child)
    }

    /// Whether `run` executes `child` under the configured filter
    pub fn is_selected(&self, child: &str) -> bool {
        self.method.is_some() || self.filter.as_ref().is_none_or(|re| re.is_match(child))
    }

    /// Run every selected child in discovery order.
    ///
    /// Test failures are reported through `notifier` and never stop the
    /// loop. An internal error is reported as the current child's failure
    /// and then aborts the run; later children are not started.
    pub fn run(&self, notifier: &mut dyn RunNotifier) -> Result<TestSummary> {
        let selected: Vec<&str> = self
            .children
            .iter()
            .map(String::as_str)
            .filter(|child| self.is_selected(child))
            .collect();

        tracing::info!(class = self.class.name(), total = selected.len(), "Running tests");

        let mut results = Vec::with_capacity(selected.len());
        for child in selected {
            results.push(self.run_child(child, notifier)?);
        }

        let summary = TestSummary::from_results(&results);
        tracing::info!(
            class = self.class.name(),
            passed = summary.passed,
            failed = summary.failed,
            "Finished tests"
        );
        Ok(summary)
    }

    /// Run one child: exactly one started/finished pair and at most one
    /// failure reach `notifier`. An internal error is also returned as
    /// [`ScriptestError::Aborted`].
    pub fn run_child(&self, child: &str, notifier: &mut dyn RunNotifier) -> Result<TestResult> {
        let description = self.describe_child(child);
        notifier.fire_test_started(&description);
        let started = Instant::now();
        tracing::debug!(test = %description, "Test started");

        let failures = match self.resolve_body(child) {
            Ok(body) => Lifecycle::new(&self.class, &self.handle, self.env.engine()).evaluate(body),
            Err(e) => vec![e],
        };

        let result = match ScriptestError::aggregate(failures) {
            None => TestResult::passed(description.clone(), started.elapsed()),
            Some(cause) if cause.is_internal() => {
                let message = cause.to_string();
                tracing::error!(test = %description, error = %message, "Internal error, aborting run");
                notifier.fire_test_failure(Failure::new(description.clone(), cause));
                notifier.fire_test_finished(&description);
                return Err(ScriptestError::Aborted {
                    test: description.to_string(),
                    message,
                });
            }
            Some(cause) => {
                let message = cause.to_string();
                tracing::debug!(test = %description, error = %message, "Test failed");
                notifier.fire_test_failure(Failure::new(description.clone(), cause));
                TestResult::failed(description.clone(), message, started.elapsed())
            }
        };

        notifier.fire_test_finished(&description);
        Ok(result)
    }

    fn resolve_body<'r>(&'r self, child: &'r str) -> Result<TestBody<'r, E, T>> {
        match &self.script {
            None => self
                .class
                .public_method(child)
                .map(TestBody::Native)
                .ok_or_else(|| ScriptestError::NoSuchMethod {
                    class: self.class.name().to_string(),
                    method: child.to_string(),
                }),
            Some(script) => Ok(TestBody::Script {
                script,
                entry_point: child,
                arguments: self.resolve_arguments()?,
            }),
        }
    }

    /// Arguments for a script test: whatever `getArguments` returns, or none
    /// when the class has no such accessor.
    fn resolve_arguments(&self) -> Result<Vec<Value>> {
        let Some(accessor) = self.class.public_method(GET_ARGUMENTS) else {
            return Ok(Vec::new());
        };

        let class = self.class.name();
        let value = guarded(
            || format!("`{}` on {}", GET_ARGUMENTS, class),
            || {
                self.handle
                    .call(accessor, &[])
                    .map_err(|source| ScriptestError::Arguments {
                        class: class.to_string(),
                        source,
                    })
            },
        )?;

        match value {
            Value::Array(arguments) => Ok(arguments),
            other => Err(ScriptestError::Arguments {
                class: class.to_string(),
                source: anyhow::anyhow!("expected an array of arguments, got {}", other),
            }),
        }
    }
}
