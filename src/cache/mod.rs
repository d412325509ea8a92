// src/cache/mod.rs

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
    time::{Duration, Instant},
};

use tracing::debug;

use crate::table::Table;

/// How long a worksheet snapshot stays fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub spreadsheet_id: String,
    pub worksheet: String,
}

impl CacheKey {
    pub fn new(spreadsheet_id: impl Into<String>, worksheet: impl Into<String>) -> Self {
        CacheKey {
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: worksheet.into(),
        }
    }
}

struct Entry {
    table: Arc<Table>,
    fetched_at: Instant,
}

/// TTL cache of worksheet snapshots, keyed by (spreadsheet id, worksheet).
///
/// Snapshots are immutable `Arc<Table>`s rebuilt from scratch on every miss;
/// the lock only guards the map. An expired entry behaves exactly like a
/// missing one, and `invalidate`/`invalidate_all` back the user-facing
/// refresh control.
pub struct TableCache {
    ttl: Duration,
    map: RwLock<HashMap<CacheKey, Entry>>,
}

impl TableCache {
    pub fn new(ttl: Duration) -> Self {
        TableCache {
            ttl,
            map: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<Table>> {
        let map = self.map.read().unwrap_or_else(|e| e.into_inner());
        let entry = map.get(key)?;
        if entry.fetched_at.elapsed() > self.ttl {
            debug!(worksheet = %key.worksheet, "cache entry expired");
            return None;
        }
        Some(Arc::clone(&entry.table))
    }

    pub fn put(&self, key: CacheKey, table: Table) -> Arc<Table> {
        let table = Arc::new(table);
        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());
        map.insert(
            key,
            Entry {
                table: Arc::clone(&table),
                fetched_at: Instant::now(),
            },
        );
        table
    }

    pub fn invalidate(&self, key: &CacheKey) {
        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());
        map.remove(key);
    }

    /// Drop every snapshot; the next access of each worksheet refetches.
    pub fn invalidate_all(&self) {
        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());
        map.clear();
    }
}

impl Default for TableCache {
    fn default() -> Self {
        TableCache::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn sample_table() -> Table {
        Table::new(vec!["A".into()], vec![vec!["1".into()]])
    }

    fn key(ws: &str) -> CacheKey {
        CacheKey::new("sheet-1", ws)
    }

    #[test]
    fn hit_inside_ttl_returns_the_same_snapshot() {
        let cache = TableCache::new(Duration::from_secs(60));
        let put = cache.put(key("Contest Details"), sample_table());
        let got = cache.get(&key("Contest Details")).unwrap();
        assert!(Arc::ptr_eq(&put, &got));
    }

    #[test]
    fn expired_entries_behave_like_misses() {
        let cache = TableCache::new(Duration::from_millis(10));
        cache.put(key("Contest Details"), sample_table());
        sleep(Duration::from_millis(25));
        assert!(cache.get(&key("Contest Details")).is_none());
    }

    #[test]
    fn keys_separate_worksheets() {
        let cache = TableCache::new(Duration::from_secs(60));
        cache.put(key("Contest Details"), sample_table());
        assert!(cache.get(&key("Winner Details")).is_none());
    }

    #[test]
    fn invalidate_forces_a_refetch_path() {
        let cache = TableCache::new(Duration::from_secs(60));
        cache.put(key("Contest Details"), sample_table());
        cache.invalidate(&key("Contest Details"));
        assert!(cache.get(&key("Contest Details")).is_none());
    }

    #[test]
    fn invalidate_all_clears_every_entry() {
        let cache = TableCache::new(Duration::from_secs(60));
        cache.put(key("Contest Details"), sample_table());
        cache.put(key("Winner Details"), sample_table());
        cache.invalidate_all();
        assert!(cache.get(&key("Contest Details")).is_none());
        assert!(cache.get(&key("Winner Details")).is_none());
    }
}
