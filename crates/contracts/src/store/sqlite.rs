//! SQLite-backed vector store.

use super::{MetadataFilter, QueryMatch, StoreStats, VectorRecord, VectorStore};
use crate::embeddings::cosine_similarity;
use clausal_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Records written per transaction.
const UPSERT_BATCH_SIZE: usize = 100;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS vectors (
        id TEXT PRIMARY KEY,
        embedding BLOB NOT NULL,
        dimension INTEGER NOT NULL,
        metadata TEXT NOT NULL
    );
"#;

/// Brute-force cosine ranking over every stored row.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Store(format!("Failed to create index directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Store(format!("Failed to open SQLite index: {}", e)))?;
        tracing::debug!("Opened SQLite index at {:?}", db_path);

        Self::with_connection(conn)
    }

    pub fn in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Store(format!("Failed to open SQLite index: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Store(format!("Failed to create tables: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Store("SQLite connection lock poisoned".to_string()))
    }

    fn stored_dimension(conn: &Connection) -> AppResult<Option<usize>> {
        conn.query_row("SELECT dimension FROM vectors LIMIT 1", [], |row| {
            row.get::<_, i64>(0)
        })
        .optional()
        .map(|d| d.map(|d| d as usize))
        .map_err(|e| AppError::Store(format!("Failed to read index dimension: {}", e)))
    }

    fn check_dimensions(records: &[VectorRecord], stored: Option<usize>) -> AppResult<()> {
        let expected = match stored.or_else(|| records.first().map(|r| r.values.len())) {
            Some(expected) => expected,
            None => return Ok(()),
        };

        if let Some(bad) = records.iter().find(|r| r.values.len() != expected) {
            return Err(AppError::Store(format!(
                "Vector '{}' has {} dimensions, index expects {}",
                bad.id,
                bad.values.len(),
                expected
            )));
        }

        Ok(())
    }
}

impl VectorStore for SqliteStore {
    fn upsert(&self, records: &[VectorRecord]) -> AppResult<usize> {
        if records.is_empty() {
            tracing::warn!("No vectors to upsert");
            return Ok(0);
        }

        let mut conn = self.lock()?;
        Self::check_dimensions(records, Self::stored_dimension(&conn)?)?;

        for (batch_index, batch) in records.chunks(UPSERT_BATCH_SIZE).enumerate() {
            let tx = conn
                .transaction()
                .map_err(|e| AppError::Store(format!("Failed to begin transaction: {}", e)))?;

            for record in batch {
                let metadata_json = serde_json::to_string(&record.metadata)?;
                tx.execute(
                    "INSERT OR REPLACE INTO vectors (id, embedding, dimension, metadata)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        record.id,
                        embedding_to_bytes(&record.values),
                        record.values.len() as i64,
                        metadata_json,
                    ],
                )
                .map_err(|e| AppError::Store(format!("Failed to upsert vector: {}", e)))?;
            }

            tx.commit()
                .map_err(|e| AppError::Store(format!("Failed to commit batch: {}", e)))?;
            tracing::debug!("Upserted batch {}", batch_index + 1);
        }

        tracing::info!("Upserted {} vectors", records.len());
        Ok(records.len())
    }

    fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> AppResult<Vec<QueryMatch>> {
        let records = {
            let conn = self.lock()?;
            let mut stmt = conn
                .prepare("SELECT id, embedding, metadata FROM vectors")
                .map_err(|e| AppError::Store(format!("Failed to prepare query: {}", e)))?;
            let rows = stmt
                .query_map([], read_record)
                .map_err(|e| AppError::Store(format!("Failed to query vectors: {}", e)))?;
            let records: Vec<VectorRecord> = rows
                .collect::<Result<_, _>>()
                .map_err(|e| AppError::Store(format!("Failed to read vector row: {}", e)))?;
            records
        };

        let mut matches: Vec<QueryMatch> = records
            .into_iter()
            .filter(|record| filter.map_or(true, |f| f.matches(&record.metadata)))
            .map(|record| QueryMatch {
                score: cosine_similarity(vector, &record.values),
                id: record.id,
                metadata: record.metadata,
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_k);

        tracing::debug!(
            "Retrieved {} vectors (requested top-{})",
            matches.len(),
            top_k
        );
        Ok(matches)
    }

    fn fetch(&self, ids: &[String]) -> AppResult<Vec<VectorRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, embedding, metadata FROM vectors WHERE id = ?1")
            .map_err(|e| AppError::Store(format!("Failed to prepare fetch: {}", e)))?;

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let record = stmt
                .query_row(params![id], read_record)
                .optional()
                .map_err(|e| AppError::Store(format!("Failed to fetch vector '{}': {}", id, e)))?;
            records.extend(record);
        }

        Ok(records)
    }

    fn delete(&self, ids: &[String]) -> AppResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Store(format!("Failed to begin transaction: {}", e)))?;

        let mut removed = 0;
        for id in ids {
            removed += tx
                .execute("DELETE FROM vectors WHERE id = ?1", params![id])
                .map_err(|e| AppError::Store(format!("Failed to delete vector: {}", e)))?;
        }

        tx.commit()
            .map_err(|e| AppError::Store(format!("Failed to commit delete: {}", e)))?;

        tracing::info!("Deleted {} vectors", removed);
        Ok(removed)
    }

    fn delete_all(&self) -> AppResult<()> {
        self.lock()?
            .execute("DELETE FROM vectors", [])
            .map_err(|e| AppError::Store(format!("Failed to delete vectors: {}", e)))?;

        tracing::info!("Deleted all vectors from index");
        Ok(())
    }

    fn stats(&self) -> AppResult<StoreStats> {
        let conn = self.lock()?;
        let total_vectors = conn
            .query_row("SELECT COUNT(*) FROM vectors", [], |row| row.get::<_, i64>(0))
            .map_err(|e| AppError::Store(format!("Failed to count vectors: {}", e)))?;

        Ok(StoreStats {
            total_vectors: total_vectors as usize,
            dimension: Self::stored_dimension(&conn)?,
        })
    }
}

fn read_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<VectorRecord> {
    let embedding_bytes: Vec<u8> = row.get(1)?;
    let values = bytes_to_embedding(&embedding_bytes).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Blob,
            "Invalid embedding bytes length".into(),
        )
    })?;

    let metadata_json: String = row.get(2)?;
    let metadata = serde_json::from_str(&metadata_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(VectorRecord {
        id: row.get(0)?,
        values,
        metadata,
    })
}

/// Convert embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }

    Some(
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(id: &str, values: Vec<f32>, heading: &str) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            values,
            metadata: json!({ "heading": heading }),
        }
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".clausal").join("index.db");

        let store = SqliteStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.stats().unwrap(), StoreStats::default());
    }

    #[test]
    fn test_upsert_and_query_ranking() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .upsert(&[
                record("a", vec![1.0, 0.0, 0.0], "1. Termination"),
                record("b", vec![0.0, 1.0, 0.0], "2. Payment"),
                record("c", vec![0.9, 0.1, 0.0], "3. Notice"),
            ])
            .unwrap();

        let matches = store.query(&[1.0, 0.0, 0.0], 2, None).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "a");
        assert_eq!(matches[1].id, "c");
        assert!((matches[0].score - 1.0).abs() < 1e-6);
        assert_eq!(matches[0].metadata["heading"], "1. Termination");
    }

    #[test]
    fn test_query_with_filter() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .upsert(&[
                record("a", vec![1.0, 0.0], "1. Termination"),
                record("b", vec![0.0, 1.0], "2. Payment"),
            ])
            .unwrap();

        let filter = MetadataFilter::new().with("heading", "2. Payment");
        let matches = store.query(&[1.0, 0.0], 5, Some(&filter)).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "b");
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let store = SqliteStore::in_memory().unwrap();
        store.upsert(&[record("a", vec![1.0, 0.0], "old")]).unwrap();
        store.upsert(&[record("a", vec![0.0, 1.0], "new")]).unwrap();

        let fetched = store.fetch(&["a".to_string()]).unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].values, vec![0.0, 1.0]);
        assert_eq!(fetched[0].metadata["heading"], "new");
        assert_eq!(store.stats().unwrap().total_vectors, 1);
    }

    #[test]
    fn test_upsert_spans_several_batches() {
        let store = SqliteStore::in_memory().unwrap();
        let records: Vec<VectorRecord> = (0..250)
            .map(|i| record(&format!("v{}", i), vec![i as f32, 1.0], "bulk"))
            .collect();

        assert_eq!(store.upsert(&records).unwrap(), 250);
        assert_eq!(
            store.stats().unwrap(),
            StoreStats {
                total_vectors: 250,
                dimension: Some(2)
            }
        );
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let store = SqliteStore::in_memory().unwrap();
        store.upsert(&[record("a", vec![1.0, 0.0], "x")]).unwrap();

        let result = store.upsert(&[record("b", vec![1.0, 0.0, 0.0], "y")]);
        assert!(matches!(result, Err(AppError::Store(_))));
    }

    #[test]
    fn test_fetch_skips_unknown_ids() {
        let store = SqliteStore::in_memory().unwrap();
        store.upsert(&[record("a", vec![1.0], "x")]).unwrap();

        let fetched = store
            .fetch(&["missing".to_string(), "a".to_string()])
            .unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, "a");
    }

    #[test]
    fn test_delete_and_delete_all() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .upsert(&[
                record("a", vec![1.0], "x"),
                record("b", vec![1.0], "y"),
                record("c", vec![1.0], "z"),
            ])
            .unwrap();

        assert_eq!(store.delete(&["a".to_string(), "zzz".to_string()]).unwrap(), 1);
        assert_eq!(store.stats().unwrap().total_vectors, 2);

        store.delete_all().unwrap();
        assert_eq!(store.stats().unwrap(), StoreStats::default());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.upsert(&[record("a", vec![0.5, 0.5], "x")]).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.stats().unwrap().total_vectors, 1);
    }

    #[test]
    fn test_embedding_bytes_length_check() {
        assert_eq!(bytes_to_embedding(&[0, 0, 128]), None);
        let bytes = embedding_to_bytes(&[1.5, -2.0]);
        assert_eq!(bytes_to_embedding(&bytes), Some(vec![1.5, -2.0]));
    }
}
