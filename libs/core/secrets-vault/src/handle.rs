// [libs/core/secrets-vault/src/handle.rs]
//! Hot-swappable handle over [`NovaConfig`]: readers take a cheap `Arc`
//! clone, reconfiguration builds a brand new snapshot and swaps the pointer.

use std::sync::{Arc, RwLock};

use crate::config::{ConfigError, NovaConfig};

#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<Arc<NovaConfig>>>,
}

impl ConfigHandle {
    pub fn load() -> Result<Self, ConfigError> {
        let config = NovaConfig::from_env()?;
        Ok(Self { inner: Arc::new(RwLock::new(Arc::new(config))) })
    }

    pub fn from_config(config: NovaConfig) -> Self {
        Self { inner: Arc::new(RwLock::new(Arc::new(config))) }
    }

    /// Returns the currently active snapshot. Cheap: bumps a refcount, never
    /// blocks on the writer for longer than a pointer swap.
    pub fn current(&self) -> Arc<NovaConfig> {
        self.inner.read().expect("config lock poisoned").clone()
    }

    /// Re-reads the environment and atomically swaps in the new snapshot.
    /// In-flight requests keep holding their own `Arc<NovaConfig>` from
    /// before the swap, so a reconfigure never changes behavior mid-request.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let fresh = NovaConfig::from_env()?;
        let mut guard = self.inner.write().expect("config lock poisoned");
        *guard = Arc::new(fresh);
        tracing::info!("🔐 [CONFIG_RELOADED]: NovaConfig snapshot replaced atomically.");
        Ok(())
    }
}
