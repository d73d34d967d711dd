use crate::class::types::MethodDef;
use crate::script::HostInstance;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared handle to a fixture instance plus its capability table.
///
/// Handed to scripts through `unittest.setTestInstance` so script code can
/// call back into public host methods by name.
pub struct InstanceHandle<T> {
    class_name: String,
    methods: Arc<[MethodDef<T>]>,
    instance: Arc<Mutex<T>>,
}

impl<T> InstanceHandle<T> {
    pub fn new(class_name: impl Into<String>, methods: Arc<[MethodDef<T>]>, instance: T) -> Self {
        Self {
            class_name: class_name.into(),
            methods,
            instance: Arc::new(Mutex::new(instance)),
        }
    }

    /// Lock the instance. A panicking test poisons the lock; the fixture
    /// is still handed out so later children keep running.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.instance.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run one method against the instance
    pub fn call(&self, method: &MethodDef<T>, args: &[Value]) -> anyhow::Result<Value> {
        let mut guard = self.lock();
        method.invoke(&mut guard, args)
    }
}

impl<T> Clone for InstanceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            class_name: self.class_name.clone(),
            methods: Arc::clone(&self.methods),
            instance: Arc::clone(&self.instance),
        }
    }
}

impl<T: Send> HostInstance for InstanceHandle<T> {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn invoke(&self, method: &str, args: &[Value]) -> anyhow::Result<Value> {
        let def = self
            .methods
            .iter()
            .find(|m| m.name == method && m.is_public() && m.arity == args.len())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "no public method `{}` taking {} argument(s) on `{}`",
                    method,
                    args.len(),
                    self.class_name
                )
            })?;
        self.call(def, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::TestClass;
    use serde_json::json;

    #[test]
    fn test_invoke_by_name_and_arity() {
        let class = TestClass::builder("Fixture", || Ok(0i64))
            .function("bump", 1, |n: &mut i64, args| {
                *n += args[0].as_i64().unwrap_or(0);
                Ok(json!(*n))
            })
            .build();
        let handle = InstanceHandle::new(class.name(), class.shared_methods(), 0i64);

        assert_eq!(handle.invoke("bump", &[json!(3)]).unwrap(), json!(3));
        assert_eq!(*handle.lock(), 3);

        let err = handle.invoke("bump", &[]).unwrap_err();
        assert!(err.to_string().contains("no public method `bump`"));
        assert_eq!(handle.class_name(), "Fixture");
    }
}
