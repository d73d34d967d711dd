pub mod cache;
pub mod disk;
pub mod key;

pub use cache::{CompilationCache, CompiledScript};
pub use disk::DiskStore;
pub use key::ScriptKey;
