use crate::class::{Annotation, TestClass};
use crate::runner::statement::guarded;
use crate::script::{ContextGuard, ScriptArg, ScriptEngine, ScriptInstance, TestCollector};
use crate::{Result, ScriptestError};

/// Entry point a script implements to declare its tests
pub const COLLECT_TESTS: &str = "unittest.collectTests";

/// Enumerate the children of a test class.
///
/// - A single-method restriction is returned as-is.
/// - Without a script, every public no-arg method annotated as a test, in
///   declaration order.
/// - With a script, exactly the names the script pushes from
///   `unittest.collectTests`, in push order.
pub fn discover<E: ScriptEngine, T>(
    class: &TestClass<T>,
    method: Option<&str>,
    script: Option<&ScriptInstance<E>>,
    engine: &E,
) -> Result<Vec<String>> {
    if let Some(method) = method {
        return Ok(vec![method.to_string()]);
    }

    match script {
        None => Ok(native_tests(class)),
        Some(script) => collect_script_tests(script, engine).map_err(|e| ScriptestError::Discovery {
            class: class.name().to_string(),
            source: Box::new(e),
        }),
    }
}

fn native_tests<T>(class: &TestClass<T>) -> Vec<String> {
    class
        .annotated(Annotation::Test)
        .filter(|m| m.is_public_no_arg())
        .map(|m| m.name.clone())
        .collect()
}

fn collect_script_tests<E: ScriptEngine>(script: &ScriptInstance<E>, engine: &E) -> Result<Vec<String>> {
    let collector = TestCollector::new();

    let guard = ContextGuard::enter(engine)?;
    let collected = guarded(
        || format!("`{}` in {}", COLLECT_TESTS, script.name()),
        || script.run(COLLECT_TESTS, &[ScriptArg::Scope, ScriptArg::Collector(&collector)]),
    );
    match (collected, guard.exit()) {
        (Ok(_), Ok(())) => {}
        (Err(e), Ok(())) | (Ok(_), Err(e)) => return Err(e),
        (Err(collect), Err(exit)) => return Err(ScriptestError::Multiple(vec![collect, exit])),
    }

    let names = collector.into_names();
    tracing::debug!(script = script.name(), count = names.len(), "Collected script tests");
    Ok(names)
}
