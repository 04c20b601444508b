use anyhow::{Context, Result};
use std::path::Path;

use crate::auth::IdentityService;
use crate::db;
use crate::session::Session;
use crate::store::SqliteStore;

/// The identity service plus the session that mirrors it, wired to one
/// database file. Both surfaces drive the app through this.
pub(crate) struct Backend {
    pub identity: IdentityService,
    pub session: Session<SqliteStore>,
}

impl Backend {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        }
        let store = SqliteStore::new(db::open(path)?);
        let identity = IdentityService::new(db::open(path)?).map_err(|e| {
            log::error!("event=identity_init status=failed error={e}");
            anyhow::Error::new(e).context("Identity service failed to start")
        })?;
        let mut backend = Self::wire(identity, store);
        backend.sync()?;
        Ok(backend)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let store = SqliteStore::new(db::open_in_memory()?);
        let identity = IdentityService::new(db::open_in_memory()?)?;
        let mut backend = Self::wire(identity, store);
        backend.sync()?;
        Ok(backend)
    }

    fn wire(identity: IdentityService, store: SqliteStore) -> Self {
        let subscription = identity.subscribe();
        Self {
            identity,
            session: Session::new(store, subscription),
        }
    }

    /// Let the session catch up with identity changes. Call after every
    /// identity operation.
    pub(crate) fn sync(&mut self) -> Result<()> {
        self.session
            .sync_identity()
            .context("Failed to load projects")
    }
}
