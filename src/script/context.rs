//! Scoped acquisition of the engine-wide execution context.
//!
//! [`ContextGuard::enter`] calls `enter_context` and [`ContextGuard::exit`]
//! (or `Drop`, during unwinding) calls `exit_context`, so every entry is
//! released on every exit path of the protected region.
//!
//! Depth is tracked per thread and bounded at one: entering while a context
//! is already active on the same thread is an internal error. Use across
//! threads needs whatever synchronization the engine itself requires.

use crate::script::ScriptEngine;
use crate::{Result, ScriptestError};
use std::cell::Cell;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Number of contexts currently held on this thread (0 or 1)
pub fn context_depth() -> usize {
    DEPTH.with(Cell::get)
}

pub struct ContextGuard<'e, E: ScriptEngine> {
    engine: &'e E,
    active: bool,
}

impl<'e, E: ScriptEngine> ContextGuard<'e, E> {
    pub fn enter(engine: &'e E) -> Result<Self> {
        if context_depth() != 0 {
            return Err(ScriptestError::ContextImbalance(
                "context entered while another is active on this thread".to_string(),
            ));
        }

        engine
            .enter_context()
            .map_err(|source| ScriptestError::Context {
                phase: "enter",
                source,
            })?;
        DEPTH.with(|d| d.set(1));
        tracing::trace!("Entered script context");

        Ok(Self {
            engine,
            active: true,
        })
    }

    /// Release the context, reporting an engine failure to exit
    pub fn exit(mut self) -> Result<()> {
        self.active = false;
        self.release()
    }

    fn release(&self) -> Result<()> {
        let depth = context_depth();
        DEPTH.with(|d| d.set(0));
        if depth != 1 {
            return Err(ScriptestError::ContextImbalance(format!(
                "exit with depth {}",
                depth
            )));
        }

        tracing::trace!("Exited script context");
        self.engine
            .exit_context()
            .map_err(|source| ScriptestError::Context {
                phase: "exit",
                source,
            })
    }
}

impl<E: ScriptEngine> Drop for ContextGuard<'_, E> {
    fn drop(&mut self) {
        if self.active
            && let Err(e) = self.release()
        {
            tracing::error!(error = %e, "Script context was not released cleanly");
        }
    }
}
