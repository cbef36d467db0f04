//! Persisted best-score table
//!
//! One row per player. Backends only store and order rows; the best-score
//! rule (never decrease) is applied by the submit handler.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::error::StoreError;
use super::types::LeaderboardEntry;

/// Best-score table keyed by player id
pub trait ScoreStore {
    fn best_score(&self, player_id: &str) -> Result<Option<u64>, StoreError>;

    /// Insert or overwrite a player's best. `updated_at` moves only when the
    /// row is new or the stored value changes.
    fn upsert_best(
        &mut self,
        player_id: &str,
        best_score: u64,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Top `limit` rows in leaderboard order
    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;
}

/// Best score descending, then earliest update, then player id
pub fn sort_leaderboard(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| {
        b.best_score
            .cmp(&a.best_score)
            .then(a.updated_at.cmp(&b.updated_at))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
}

/// In-memory table
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: BTreeMap<String, LeaderboardEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = LeaderboardEntry>) -> Self {
        Self {
            rows: entries
                .into_iter()
                .map(|e| (e.player_id.clone(), e))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &LeaderboardEntry> {
        self.rows.values()
    }
}

impl ScoreStore for MemoryStore {
    fn best_score(&self, player_id: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.rows.get(player_id).map(|row| row.best_score))
    }

    fn upsert_best(
        &mut self,
        player_id: &str,
        best_score: u64,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        match self.rows.get_mut(player_id) {
            Some(row) if row.best_score == best_score => {}
            Some(row) => {
                row.best_score = best_score;
                row.updated_at = now;
            }
            None => {
                self.rows.insert(
                    player_id.to_string(),
                    LeaderboardEntry {
                        player_id: player_id.to_string(),
                        best_score,
                        updated_at: now,
                    },
                );
            }
        }
        Ok(())
    }

    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let mut entries: Vec<_> = self.rows.values().cloned().collect();
        sort_leaderboard(&mut entries);
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use super::*;

    /// Score table persisted as a JSON array of rows.
    ///
    /// Every write goes to a sibling temp file first and is renamed over the
    /// table, so a crash never leaves a half-written file behind.
    #[derive(Debug)]
    pub struct JsonFileStore {
        path: PathBuf,
        table: MemoryStore,
    }

    impl JsonFileStore {
        /// Open (or start) the table at `path`. A missing file is an empty table.
        pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
            let path = path.as_ref().to_path_buf();
            let table = match fs::read_to_string(&path) {
                Ok(json) if json.trim().is_empty() => MemoryStore::new(),
                Ok(json) => {
                    let entries: Vec<LeaderboardEntry> = serde_json::from_str(&json)?;
                    MemoryStore::from_entries(entries)
                }
                Err(e) if e.kind() == ErrorKind::NotFound => MemoryStore::new(),
                Err(e) => return Err(e.into()),
            };
            log::info!("Opened score table {} ({} rows)", path.display(), table.len());
            Ok(Self { path, table })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn persist(&self) -> Result<(), StoreError> {
            let mut entries: Vec<_> = self.table.entries().cloned().collect();
            sort_leaderboard(&mut entries);
            let json = serde_json::to_string_pretty(&entries)?;

            let tmp = self.path.with_extension("json.tmp");
            fs::write(&tmp, json)?;
            fs::rename(&tmp, &self.path)?;
            Ok(())
        }
    }

    impl ScoreStore for JsonFileStore {
        fn best_score(&self, player_id: &str) -> Result<Option<u64>, StoreError> {
            self.table.best_score(player_id)
        }

        fn upsert_best(
            &mut self,
            player_id: &str,
            best_score: u64,
            now: DateTime<Utc>,
        ) -> Result<(), StoreError> {
            self.table.upsert_best(player_id, best_score, now)?;
            self.persist()
        }

        fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
            self.table.top(limit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_upsert_and_read() {
        let mut store = MemoryStore::new();
        assert_eq!(store.best_score("ab").unwrap(), None);
        store.upsert_best("ab", 150, at(10)).unwrap();
        assert_eq!(store.best_score("ab").unwrap(), Some(150));
    }

    #[test]
    fn test_unchanged_best_keeps_timestamp() {
        let mut store = MemoryStore::new();
        store.upsert_best("ab", 150, at(10)).unwrap();
        store.upsert_best("ab", 150, at(99)).unwrap();
        assert_eq!(store.top(1).unwrap()[0].updated_at, at(10));
        store.upsert_best("ab", 200, at(99)).unwrap();
        assert_eq!(store.top(1).unwrap()[0].updated_at, at(99));
    }

    #[test]
    fn test_top_order_and_limit() {
        let mut store = MemoryStore::new();
        store.upsert_best("late", 100, at(30)).unwrap();
        store.upsert_best("early", 100, at(10)).unwrap();
        store.upsert_best("best", 500, at(50)).unwrap();
        store.upsert_best("low", 5, at(1)).unwrap();

        let top = store.top(3).unwrap();
        let ids: Vec<_> = top.iter().map(|e| e.player_id.as_str()).collect();
        assert_eq!(ids, vec!["best", "early", "late"]);
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("pig-jump-store-{}", std::process::id()));
        fs_setup(&dir);
        let path = dir.join("scores.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.upsert_best("ab", 150, at(10)).unwrap();
        store.upsert_best("cd", 90, at(20)).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.best_score("ab").unwrap(), Some(150));
        assert_eq!(reopened.top(10).unwrap().len(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = std::env::temp_dir().join(format!("pig-jump-corrupt-{}", std::process::id()));
        fs_setup(&dir);
        let path = dir.join("scores.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Corrupt(_))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    fn fs_setup(dir: &std::path::Path) {
        std::fs::remove_dir_all(dir).ok();
        std::fs::create_dir_all(dir).unwrap();
    }
}
