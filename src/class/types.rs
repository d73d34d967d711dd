use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A host method body. Receives the fixture instance and positional arguments.
pub type MethodFn<T> = Arc<dyn Fn(&mut T, &[Value]) -> anyhow::Result<Value> + Send + Sync>;

type Factory<T> = Box<dyn Fn() -> anyhow::Result<T> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    Test,
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// One entry of a class's capability table
pub struct MethodDef<T> {
    pub name: String,
    pub visibility: Visibility,
    /// Number of declared parameters
    pub arity: usize,
    pub annotations: Vec<Annotation>,
    pub body: MethodFn<T>,
}

impl<T> MethodDef<T> {
    pub fn is_annotated(&self, annotation: Annotation) -> bool {
        self.annotations.contains(&annotation)
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Whether this method can be looked up as a public no-arg method
    pub fn is_public_no_arg(&self) -> bool {
        self.is_public() && self.arity == 0
    }

    pub fn invoke(&self, instance: &mut T, args: &[Value]) -> anyhow::Result<Value> {
        (self.body)(instance, args)
    }
}

impl<T> Clone for MethodDef<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            visibility: self.visibility,
            arity: self.arity,
            annotations: self.annotations.clone(),
            body: Arc::clone(&self.body),
        }
    }
}

impl<T> fmt::Debug for MethodDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("arity", &self.arity)
            .field("annotations", &self.annotations)
            .finish_non_exhaustive()
    }
}

/// Immutable description of a unit under test
pub struct TestClass<T> {
    name: String,
    script: Option<String>,
    factory: Factory<T>,
    methods: Arc<[MethodDef<T>]>,
}

impl<T> TestClass<T> {
    pub fn builder<F>(name: impl Into<String>, factory: F) -> TestClassBuilder<T>
    where
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        TestClassBuilder {
            name: name.into(),
            script: None,
            factory: Box::new(factory),
            methods: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared script filename, without extension
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    pub fn methods(&self) -> &[MethodDef<T>] {
        &self.methods
    }

    pub(crate) fn shared_methods(&self) -> Arc<[MethodDef<T>]> {
        Arc::clone(&self.methods)
    }

    /// Create a fresh fixture instance
    pub fn instantiate(&self) -> anyhow::Result<T> {
        (self.factory)()
    }

    /// Look up a method by name the way `Class.getMethod(name)` would:
    /// public and taking no parameters.
    pub fn public_method(&self, name: &str) -> Option<&MethodDef<T>> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.is_public_no_arg())
    }

    /// Methods carrying `annotation`, in declaration order
    pub fn annotated(&self, annotation: Annotation) -> impl Iterator<Item = &MethodDef<T>> {
        self.methods
            .iter()
            .filter(move |m| m.is_annotated(annotation))
    }
}

impl<T> fmt::Debug for TestClass<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestClass")
            .field("name", &self.name)
            .field("script", &self.script)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

pub struct TestClassBuilder<T> {
    name: String,
    script: Option<String>,
    factory: Factory<T>,
    methods: Vec<MethodDef<T>>,
}

impl<T> TestClassBuilder<T> {
    /// Declare the script holding this class's tests
    pub fn script(mut self, filename: impl Into<String>) -> Self {
        self.script = Some(filename.into());
        self
    }

    /// Register an arbitrary method
    pub fn method(mut self, def: MethodDef<T>) -> Self {
        self.methods.push(def);
        self
    }

    /// Public no-arg method annotated as a test
    pub fn test<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.annotated(name, Annotation::Test, body)
    }

    pub fn before<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.annotated(name, Annotation::Before, body)
    }

    pub fn after<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.annotated(name, Annotation::After, body)
    }

    /// Public method callable by name, e.g. from script code
    pub fn function<F>(mut self, name: impl Into<String>, arity: usize, body: F) -> Self
    where
        F: Fn(&mut T, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.methods.push(MethodDef {
            name: name.into(),
            visibility: Visibility::Public,
            arity,
            annotations: Vec::new(),
            body: Arc::new(body),
        });
        self
    }

    /// Register the `getArguments` accessor supplying script test arguments
    pub fn arguments<F>(self, body: F) -> Self
    where
        F: Fn(&mut T) -> anyhow::Result<Vec<Value>> + Send + Sync + 'static,
    {
        self.function(super::GET_ARGUMENTS, 0, move |instance, _| {
            body(instance).map(Value::Array)
        })
    }

    pub fn build(self) -> TestClass<T> {
        TestClass {
            name: self.name,
            script: self.script,
            factory: self.factory,
            methods: self.methods.into(),
        }
    }

    fn annotated<F>(mut self, name: impl Into<String>, annotation: Annotation, body: F) -> Self
    where
        F: Fn(&mut T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.methods.push(MethodDef {
            name: name.into(),
            visibility: Visibility::Public,
            arity: 0,
            annotations: vec![annotation],
            body: Arc::new(move |instance: &mut T, _: &[Value]| body(instance).map(|_| Value::Null)),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Counter {
        hits: i64,
    }

    fn counter_class() -> TestClass<Counter> {
        TestClass::builder("CounterTest", || Ok(Counter::default()))
            .before("setUp", |c: &mut Counter| {
                c.hits = 10;
                Ok(())
            })
            .test("increments", |c: &mut Counter| {
                c.hits += 1;
                Ok(())
            })
            .function("add", 1, |c: &mut Counter, args| {
                c.hits += args[0].as_i64().unwrap_or(0);
                Ok(json!(c.hits))
            })
            .after("tearDown", |_| Ok(()))
            .build()
    }

    #[test]
    fn test_public_method_requires_no_args() {
        let class = counter_class();
        assert!(class.public_method("increments").is_some());
        assert!(class.public_method("setUp").is_some());
        // `add` takes a parameter
        assert!(class.public_method("add").is_none());
        assert!(class.public_method("missing").is_none());
    }

    #[test]
    fn test_annotated_in_declaration_order() {
        let class = TestClass::builder("Hooks", || Ok(()))
            .before("first", |_| Ok(()))
            .test("t", |_| Ok(()))
            .before("second", |_| Ok(()))
            .build();

        let names: Vec<_> = class
            .annotated(Annotation::Before)
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_invoke_method() {
        let class = counter_class();
        let mut instance = class.instantiate().unwrap();

        let add = class.methods().iter().find(|m| m.name == "add").unwrap();
        let result = add.invoke(&mut instance, &[json!(5)]).unwrap();
        assert_eq!(result, json!(5));
        assert_eq!(instance.hits, 5);
    }

    #[test]
    fn test_arguments_accessor_returns_array() {
        let class = TestClass::builder("Args", || Ok(()))
            .arguments(|_| Ok(vec![json!(1), json!("two")]))
            .build();

        let accessor = class.public_method(crate::class::GET_ARGUMENTS).unwrap();
        let value = accessor.invoke(&mut (), &[]).unwrap();
        assert_eq!(value, json!([1, "two"]));
    }
}
