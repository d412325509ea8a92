// src/fetch/store.rs

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::cache::{CacheKey, TableCache};
use crate::fetch::SheetsClient;
use crate::table::Table;

/// Cache-backed access to the spreadsheet's worksheets.
///
/// A hit inside the TTL serves the held snapshot; a miss or expiry refetches
/// and replaces it. `refresh` is the explicit user-facing invalidation.
pub struct SheetStore {
    client: SheetsClient,
    cache: TableCache,
}

impl SheetStore {
    pub fn new(client: SheetsClient, ttl: Duration) -> Self {
        SheetStore {
            client,
            cache: TableCache::new(ttl),
        }
    }

    pub fn client(&self) -> &SheetsClient {
        &self.client
    }

    fn key(&self, worksheet: &str) -> CacheKey {
        CacheKey::new(self.client.spreadsheet_id(), worksheet)
    }

    fn put_snapshot(&self, worksheet: &str, table: Table) -> Arc<Table> {
        self.cache.put(self.key(worksheet), table)
    }

    /// Snapshot of one worksheet by exact title.
    pub async fn table(&self, worksheet: &str) -> Result<Arc<Table>> {
        if let Some(table) = self.cache.get(&self.key(worksheet)) {
            debug!(worksheet, "cache hit");
            return Ok(table);
        }
        let table = self.client.fetch_values(worksheet).await?;
        Ok(self.put_snapshot(worksheet, table))
    }

    /// Snapshot of a worksheet resolved through its alias list; `None` when
    /// no alias matches (the dependent feature degrades). The snapshot is
    /// cached under the resolved title, so exact-title access hits too.
    pub async fn table_by_aliases(&self, aliases: &[&str]) -> Result<Option<Arc<Table>>> {
        for alias in aliases {
            if let Some(table) = self.cache.get(&self.key(alias)) {
                debug!(worksheet = alias, "cache hit");
                return Ok(Some(table));
            }
        }
        match self.client.fetch_by_aliases(aliases).await? {
            Some((title, table)) => Ok(Some(self.put_snapshot(&title, table))),
            None => Ok(None),
        }
    }

    /// Drop every cached snapshot so the next render refetches.
    pub fn refresh(&self) {
        info!("refresh requested; clearing cached worksheets");
        self.cache.invalidate_all();
    }
}
