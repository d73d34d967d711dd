pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{CacheConfig, Config, RunConfig, ScriptsConfig};
