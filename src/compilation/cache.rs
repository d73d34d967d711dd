//! Process-wide memo of compiled scripts.
//!
//! Each key owns a `OnceCell`. The first caller for a key compiles while
//! racing callers block on the same cell and then share its artifact, so a
//! key is compiled at most once per cache. A failed compile leaves the cell
//! empty and the next caller retries; the empty slot is dropped once no
//! other caller is waiting on it.

use crate::compilation::{DiskStore, ScriptKey};
use crate::config::CacheConfig;
use crate::script::ScriptEngine;
use crate::{Result, ScriptestError};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A compiled artifact together with the key it was compiled from
#[derive(Debug)]
pub struct CompiledScript<A> {
    key: ScriptKey,
    artifact: Arc<A>,
}

impl<A> CompiledScript<A> {
    pub fn key(&self) -> &ScriptKey {
        &self.key
    }

    pub fn artifact(&self) -> Arc<A> {
        Arc::clone(&self.artifact)
    }

    /// Whether two handles share one compiled artifact
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.artifact, &other.artifact)
    }
}

impl<A> Clone for CompiledScript<A> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            artifact: Arc::clone(&self.artifact),
        }
    }
}

type Slot<A> = Arc<OnceCell<Arc<A>>>;

pub struct CompilationCache<E: ScriptEngine> {
    engine: Arc<E>,
    entries: Mutex<HashMap<ScriptKey, Slot<E::Artifact>>>,
    store: Option<DiskStore>,
}

impl<E: ScriptEngine> CompilationCache<E> {
    /// In-memory cache
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            entries: Mutex::new(HashMap::new()),
            store: None,
        }
    }

    /// Cache that also persists artifacts to `store`
    pub fn with_disk_store(engine: Arc<E>, store: DiskStore) -> Self {
        Self {
            store: Some(store),
            ..Self::new(engine)
        }
    }

    pub fn from_config(engine: Arc<E>, config: &CacheConfig) -> Self {
        if config.persist {
            Self::with_disk_store(engine, DiskStore::new(&config.dir))
        } else {
            Self::new(engine)
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn disk_store(&self) -> Option<&DiskStore> {
        self.store.as_ref()
    }

    /// Return the artifact for `(name, source)`, compiling it on first use
    pub fn get_or_compile(&self, name: &str, source: &str) -> Result<CompiledScript<E::Artifact>> {
        let key = ScriptKey::new(name, source);
        let slot = self.slot(&key);

        if let Some(artifact) = slot.get() {
            tracing::debug!(key = %key, "Compilation cache hit");
            return Ok(CompiledScript {
                key,
                artifact: Arc::clone(artifact),
            });
        }

        let artifact = match slot.get_or_try_init(|| self.compile(&key, source)) {
            Ok(artifact) => artifact,
            Err(e) => {
                self.evict_empty(&key, &slot);
                return Err(e);
            }
        };
        Ok(CompiledScript {
            key,
            artifact: Arc::clone(artifact),
        })
    }

    /// Whether an artifact for `key` is held in memory
    pub fn contains(&self, key: &ScriptKey) -> bool {
        self.lock_entries()
            .get(key)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of compiled artifacts held in memory
    pub fn len(&self) -> usize {
        self.lock_entries()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: &ScriptKey) -> Slot<E::Artifact> {
        let mut entries = self.lock_entries();
        Arc::clone(entries.entry(key.clone()).or_default())
    }

    /// Drop `slot` from the map if it is still empty and only held by us.
    /// Clones are taken under the entries lock, so the count is stable here.
    fn evict_empty(&self, key: &ScriptKey, slot: &Slot<E::Artifact>) {
        let mut entries = self.lock_entries();
        let unused = entries.get(key).is_some_and(|held| {
            Arc::ptr_eq(held, slot) && held.get().is_none() && Arc::strong_count(slot) == 2
        });
        if unused {
            entries.remove(key);
        }
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<ScriptKey, Slot<E::Artifact>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn compile(&self, key: &ScriptKey, source: &str) -> Result<Arc<E::Artifact>> {
        if let Some(store) = &self.store
            && let Some(artifact) = store.load::<E::Artifact>(key)
        {
            return Ok(Arc::new(artifact));
        }

        tracing::debug!(key = %key, "Compiling script");
        let artifact = self
            .engine
            .compile(key.name(), source)
            .map_err(|source| ScriptestError::Compile {
                name: key.name().to_string(),
                source,
            })?;

        if let Some(store) = &self.store
            && let Err(e) = store.store(key, &artifact)
        {
            tracing::warn!(key = %key, error = %e, "Failed to persist compiled script");
        }

        Ok(Arc::new(artifact))
    }
}
