//! Test class descriptors.
//!
//! A [`TestClass`] stands in for a reflected test class: it owns a factory
//! for the fixture instance, an optional declared script, and a capability
//! table of named methods carrying their annotations, visibility and arity.

pub mod handle;
pub mod types;

pub use handle::InstanceHandle;
pub use types::{Annotation, MethodDef, MethodFn, TestClass, TestClassBuilder, Visibility};

/// Accessor consulted on the fixture instance for script test arguments
pub const GET_ARGUMENTS: &str = "getArguments";
