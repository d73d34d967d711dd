//! Deterministic script engine for integration tests.
//!
//! A script is a list of directives, one per line:
//!
//! ```text
//! test addsNumbers                 # passes
//! test handlesZero fail div by 0   # raises "div by 0"
//! test usesFixture call increment  # calls a host method on the test instance
//! test takesArgs args 2            # raises unless invoked with 2 arguments
//! test explodes panic kaboom       # panics inside the engine
//! collect-error not ready          # unittest.collectTests raises
//! ```
//!
//! Anything else fails compilation.

#![allow(dead_code)]

use scriptest::config::Config;
use scriptest::runner::{COLLECT_TESTS, SET_TEST_INSTANCE};
use scriptest::{
    CompilationCache, HostInstance, LoadPath, ScriptArg, ScriptEngine, ScriptEnvironment, ScriptModule,
    StaticLoadPath, TestClass,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    Pass,
    Fail(String),
    Call(String),
    ExpectArgs(usize),
    Panic(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeArtifact {
    pub source: String,
    pub tests: Vec<(String, Step)>,
    pub collect_error: Option<String>,
}

#[derive(Default)]
pub struct EngineState {
    compiles: AtomicUsize,
    enters: AtomicUsize,
    exits: AtomicUsize,
    depth: AtomicIsize,
    max_depth: AtomicIsize,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    instances: Mutex<Vec<String>>,
}

#[derive(Default)]
pub struct FakeEngine {
    state: Arc<EngineState>,
    compile_delay: Duration,
    healthy_exits: Option<usize>,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Engine whose compile step is slow enough for callers to race
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            compile_delay: delay,
            ..Self::default()
        })
    }

    /// Engine whose `exit_context` fails once `healthy` exits have succeeded
    pub fn failing_exit_after(healthy: usize) -> Arc<Self> {
        Arc::new(Self {
            healthy_exits: Some(healthy),
            ..Self::default()
        })
    }

    pub fn compiles(&self) -> usize {
        self.state.compiles.load(Ordering::SeqCst)
    }

    pub fn enters(&self) -> usize {
        self.state.enters.load(Ordering::SeqCst)
    }

    pub fn exits(&self) -> usize {
        self.state.exits.load(Ordering::SeqCst)
    }

    pub fn depth(&self) -> isize {
        self.state.depth.load(Ordering::SeqCst)
    }

    pub fn max_depth(&self) -> isize {
        self.state.max_depth.load(Ordering::SeqCst)
    }

    /// Test entry points invoked so far, with their arguments
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn invoked(&self) -> Vec<String> {
        self.calls().into_iter().map(|(name, _)| name).collect()
    }

    /// Class names handed to `unittest.setTestInstance`
    pub fn instances(&self) -> Vec<String> {
        self.state.instances.lock().unwrap().clone()
    }
}

fn parse(source: &str) -> anyhow::Result<FakeArtifact> {
    let mut tests = Vec::new();
    let mut collect_error = None;

    for line in source.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let mut words = line.split_whitespace();
        match words.next() {
            Some("test") => {
                let name = words
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("test without a name"))?
                    .to_string();
                let rest: Vec<&str> = words.collect();
                let step = match rest.split_first() {
                    None => Step::Pass,
                    Some((&"fail", msg)) => Step::Fail(msg.join(" ")),
                    Some((&"call", [method])) => Step::Call(method.to_string()),
                    Some((&"args", [n])) => Step::ExpectArgs(n.parse()?),
                    Some((&"panic", msg)) => Step::Panic(msg.join(" ")),
                    Some((other, _)) => anyhow::bail!("SyntaxError: unknown step `{}`", other),
                };
                tests.push((name, step));
            }
            Some("collect-error") => {
                collect_error = Some(words.collect::<Vec<_>>().join(" "));
            }
            Some(other) => anyhow::bail!("SyntaxError: unexpected `{}`", other),
            None => {}
        }
    }

    Ok(FakeArtifact {
        source: source.to_string(),
        tests,
        collect_error,
    })
}

impl ScriptEngine for FakeEngine {
    type Artifact = FakeArtifact;
    type Module = FakeModule;

    fn compile(&self, _name: &str, source: &str) -> anyhow::Result<FakeArtifact> {
        self.state.compiles.fetch_add(1, Ordering::SeqCst);
        if !self.compile_delay.is_zero() {
            std::thread::sleep(self.compile_delay);
        }
        parse(source)
    }

    fn instantiate(
        &self,
        artifact: Arc<FakeArtifact>,
        _load_path: Arc<dyn LoadPath>,
        namespace: &str,
    ) -> anyhow::Result<FakeModule> {
        anyhow::ensure!(namespace == "scriptest/unittest", "unknown harness `{}`", namespace);
        Ok(FakeModule {
            artifact,
            state: Arc::clone(&self.state),
            instance: Mutex::new(None),
        })
    }

    fn enter_context(&self) -> anyhow::Result<()> {
        self.state.enters.fetch_add(1, Ordering::SeqCst);
        let depth = self.state.depth.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_depth.fetch_max(depth, Ordering::SeqCst);
        Ok(())
    }

    fn exit_context(&self) -> anyhow::Result<()> {
        let previous = self.state.exits.fetch_add(1, Ordering::SeqCst);
        self.state.depth.fetch_sub(1, Ordering::SeqCst);
        if self.healthy_exits.is_some_and(|healthy| previous >= healthy) {
            anyhow::bail!("context torn down by engine");
        }
        Ok(())
    }
}

pub struct FakeModule {
    artifact: Arc<FakeArtifact>,
    state: Arc<EngineState>,
    instance: Mutex<Option<Arc<dyn HostInstance>>>,
}

impl ScriptModule for FakeModule {
    fn run(&self, entry_point: &str, args: &[ScriptArg<'_>]) -> anyhow::Result<Value> {
        anyhow::ensure!(
            self.state.depth.load(Ordering::SeqCst) == 1,
            "`{}` invoked outside of a context",
            entry_point
        );

        if entry_point == COLLECT_TESTS {
            if let Some(msg) = &self.artifact.collect_error {
                anyhow::bail!("{}", msg);
            }
            let collector = args
                .iter()
                .find_map(|a| match a {
                    ScriptArg::Collector(c) => Some(*c),
                    _ => None,
                })
                .ok_or_else(|| anyhow::anyhow!("collectTests called without a collector"))?;
            for (name, _) in &self.artifact.tests {
                collector.push(name.clone());
            }
            return Ok(Value::Null);
        }

        if entry_point == SET_TEST_INSTANCE {
            let Some(ScriptArg::Instance(instance)) = args.first() else {
                anyhow::bail!("setTestInstance called without an instance");
            };
            self.state
                .instances
                .lock()
                .unwrap()
                .push(instance.class_name().to_string());
            *self.instance.lock().unwrap() = Some(Arc::clone(instance));
            return Ok(Value::Null);
        }

        let (_, step) = self
            .artifact
            .tests
            .iter()
            .find(|(name, _)| name == entry_point)
            .ok_or_else(|| anyhow::anyhow!("ReferenceError: {} is not defined", entry_point))?;

        let values: Vec<Value> = args
            .iter()
            .filter_map(|a| match a {
                ScriptArg::Value(v) => Some(v.clone()),
                _ => None,
            })
            .collect();
        let arg_count = values.len();
        self.state
            .calls
            .lock()
            .unwrap()
            .push((entry_point.to_string(), values));

        match step {
            Step::Pass => Ok(Value::Null),
            Step::Fail(msg) => anyhow::bail!("AssertionError: {}", msg),
            Step::Call(method) => {
                let instance = self
                    .instance
                    .lock()
                    .unwrap()
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("no test instance set"))?;
                instance.invoke(method, &[])
            }
            Step::ExpectArgs(n) => {
                anyhow::ensure!(arg_count == *n, "expected {} arguments, got {}", n, arg_count);
                Ok(Value::Null)
            }
            Step::Panic(msg) => panic!("{}", msg),
        }
    }
}

/// Shared log a fixture writes to, observable from the test
pub type Log = Arc<Mutex<Vec<String>>>;

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Fixture instance used by the test classes below
pub struct Fixture {
    pub log: Log,
    pub counter: i64,
}

impl Fixture {
    pub fn record(&self, entry: &str) {
        self.log.lock().unwrap().push(entry.to_string());
    }
}

/// Builder for a class whose fixture writes to `log`
pub fn class_builder(name: &str, log: &Log) -> scriptest::class::TestClassBuilder<Fixture> {
    let log = Arc::clone(log);
    TestClass::builder(name, move || {
        Ok(Fixture {
            log: Arc::clone(&log),
            counter: 0,
        })
    })
}

/// In-memory environment serving `scripts` as `<name>.js`
pub fn environment(engine: &Arc<FakeEngine>, scripts: &[(&str, &str)]) -> ScriptEnvironment<FakeEngine> {
    let mut load_path = StaticLoadPath::new();
    for (name, source) in scripts {
        load_path.insert(format!("{}.js", name), *source);
    }

    let mut config = Config::default();
    config.cache.persist = false;

    let cache = Arc::new(CompilationCache::new(Arc::clone(engine)));
    ScriptEnvironment::new(cache, Arc::new(load_path), config)
}
