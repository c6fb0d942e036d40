//! libSQL-backed persistent cache store.
//!
//! The converter is synchronous, so the store owns a small current-thread
//! tokio runtime and blocks on each libSQL call. It must not be used from
//! inside another async runtime.

use std::path::Path;

use chrono::Utc;
use libsql::{Connection, Database, params};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use mfnf_shared::{MfnfError, Result};

use crate::migrations;
use crate::store::CacheStore;

/// Cache entries in a local libSQL database file.
pub struct SqliteStore {
    runtime: Runtime,
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

fn storage_err(e: impl std::fmt::Display) -> MfnfError {
    MfnfError::Storage(e.to_string())
}

impl SqliteStore {
    /// Open or create the database at `path` and apply pending migrations.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MfnfError::io(parent, e))?;
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| MfnfError::io(path, e))?;

        let db = runtime
            .block_on(libsql::Builder::new_local(path).build())
            .map_err(storage_err)?;
        let conn = db.connect().map_err(storage_err)?;

        let store = Self { runtime, db, conn };
        store.run_migrations()?;
        debug!(path = %path.display(), "cache database opened");
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let current_version = self.schema_version();

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.runtime
                    .block_on(self.conn.execute_batch(migration.sql))
                    .map_err(|e| {
                        MfnfError::Storage(format!("migration v{} failed: {e}", migration.version))
                    })?;
            }
        }
        Ok(())
    }

    /// Current schema version, or 0 if no migrations have been applied.
    pub(crate) fn schema_version(&self) -> u32 {
        self.runtime.block_on(async {
            let Ok(mut rows) = self
                .conn
                .query("SELECT MAX(version) FROM schema_migrations", params![])
                .await
            else {
                return 0;
            };
            match rows.next().await {
                Ok(Some(row)) => row.get::<u32>(0).unwrap_or(0),
                _ => 0,
            }
        })
    }
}

impl CacheStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.runtime.block_on(async {
            let mut rows = self
                .conn
                .query("SELECT value FROM cache WHERE key = ?1", params![key])
                .await
                .map_err(storage_err)?;
            match rows.next().await.map_err(storage_err)? {
                Some(row) => Ok(Some(row.get::<String>(0).map_err(storage_err)?)),
                None => Ok(None),
            }
        })
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.runtime
            .block_on(self.conn.execute(
                "INSERT OR REPLACE INTO cache (key, value, created_at) VALUES (?1, ?2, ?3)",
                params![key, value, now.as_str()],
            ))
            .map_err(storage_err)?;
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        self.runtime.block_on(async {
            let mut rows = self
                .conn
                .query("SELECT COUNT(*) FROM cache", params![])
                .await
                .map_err(storage_err)?;
            let count = match rows.next().await.map_err(storage_err)? {
                Some(row) => row.get::<i64>(0).map_err(storage_err)?,
                None => 0,
            };
            Ok(usize::try_from(count).unwrap_or(0))
        })
    }
}
