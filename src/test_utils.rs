//! Minimal engine for unit tests: the artifact is the source text and every
//! entry point succeeds.

use crate::script::{LoadPath, ScriptArg, ScriptEngine, ScriptModule};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub(crate) struct CountingEngine {
    compiles: AtomicUsize,
    enters: AtomicUsize,
    exits: AtomicUsize,
    fail_enter: bool,
}

impl CountingEngine {
    pub(crate) fn failing_enter() -> Self {
        Self {
            fail_enter: true,
            ..Self::default()
        }
    }

    pub(crate) fn compiles(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }

    pub(crate) fn enters(&self) -> usize {
        self.enters.load(Ordering::SeqCst)
    }

    pub(crate) fn exits(&self) -> usize {
        self.exits.load(Ordering::SeqCst)
    }
}

pub(crate) struct EchoModule;

impl ScriptModule for EchoModule {
    fn run(&self, _entry_point: &str, _args: &[ScriptArg<'_>]) -> anyhow::Result<Value> {
        Ok(Value::Null)
    }
}

impl ScriptEngine for CountingEngine {
    type Artifact = String;
    type Module = EchoModule;

    fn compile(&self, _name: &str, source: &str) -> anyhow::Result<String> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        if source.contains("syntax error") {
            anyhow::bail!("unexpected token");
        }
        Ok(source.to_string())
    }

    fn instantiate(
        &self,
        _artifact: Arc<String>,
        _load_path: Arc<dyn LoadPath>,
        _namespace: &str,
    ) -> anyhow::Result<EchoModule> {
        Ok(EchoModule)
    }

    fn enter_context(&self) -> anyhow::Result<()> {
        if self.fail_enter {
            anyhow::bail!("engine not initialized");
        }
        self.enters.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn exit_context(&self) -> anyhow::Result<()> {
        self.exits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
