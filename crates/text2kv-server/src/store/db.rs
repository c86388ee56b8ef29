use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};
use tracing::debug;

use super::backend::{KvBackend, ReadOptions};

const ENTRIES: TableDefinition<&str, &str> = TableDefinition::new("entries");

/// Persistent backend stored in a single redb file.
///
/// redb reads go straight to the committed state, so every `get` is fresh
/// and the cache TTL is never needed.
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).context("open redb database")?;

        // Ensure the table exists so reads on a fresh file don't fail.
        let write_txn = db.begin_write()?;
        write_txn.open_table(ENTRIES)?;
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait]
impl KvBackend for RedbBackend {
    async fn get(&self, key: &str, _opts: ReadOptions) -> Result<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES)?;
        let value = table.get(key)?.map(|guard| guard.value().to_owned());
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ENTRIES)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;

        debug!(key = %key, bytes = value.len(), "stored entry");
        Ok(())
    }
}
