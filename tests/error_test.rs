use scriptest::{HookKind, Result, ScriptestError};

#[test]
fn test_compile_error_message() {
    let err = ScriptestError::Compile {
        name: "math".to_string(),
        source: anyhow::anyhow!("unexpected token"),
    };
    assert_eq!(err.to_string(), "failed to compile script `math`: unexpected token");
}

#[test]
fn test_hook_error_message() {
    let err = ScriptestError::Hook {
        kind: HookKind::Before,
        name: "setUp".to_string(),
        source: anyhow::anyhow!("database unavailable"),
    };
    assert_eq!(err.to_string(), "before hook `setUp` failed: database unavailable");
}

#[test]
fn test_error_conversion_from_anyhow() {
    let anyhow_err = anyhow::anyhow!("test anyhow error");
    let err: ScriptestError = anyhow_err.into();
    assert!(err.to_string().contains("test anyhow error"));
}

#[test]
fn test_aggregate() {
    assert!(ScriptestError::aggregate(vec![]).is_none());

    let single = ScriptestError::aggregate(vec![ScriptestError::Other("one".to_string())]).unwrap();
    assert_eq!(single.to_string(), "one");

    let multiple = ScriptestError::aggregate(vec![
        ScriptestError::Other("body".to_string()),
        ScriptestError::Other("after".to_string()),
    ])
    .unwrap();
    assert_eq!(multiple.to_string(), "2 failures: body; after");
}

#[test]
fn test_internal_errors() {
    assert!(ScriptestError::ContextImbalance("leak".to_string()).is_internal());
    assert!(!ScriptestError::Other("assertion".to_string()).is_internal());

    let aborted = ScriptestError::Aborted {
        test: "a(ContextTest)".to_string(),
        message: "context torn down".to_string(),
    };
    assert!(aborted.is_internal());
    assert_eq!(aborted.to_string(), "run aborted at a(ContextTest): context torn down");

    let nested = ScriptestError::Multiple(vec![
        ScriptestError::Other("assertion".to_string()),
        ScriptestError::Context {
            phase: "exit",
            source: anyhow::anyhow!("engine gone"),
        },
    ]);
    assert!(nested.is_internal());
}

#[test]
fn test_result_type() {
    fn returns_error() -> Result<()> {
        Err(ScriptestError::NoSuchMethod {
            class: "MathTest".to_string(),
            method: "missing".to_string(),
        })
    }

    match returns_error() {
        Err(ScriptestError::NoSuchMethod { method, .. }) => assert_eq!(method, "missing"),
        _ => panic!("Expected NoSuchMethod"),
    }
}
