use async_trait::async_trait;
use lib::database::SqliteDatabase;
use lib::types::{BatchId, CallRecord, RecipientId};
use sqlx::Row;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CallRecordStoreError {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Persists one row per attempted call, keyed by recipient id. The upsert
/// must be idempotent under the same key so operator-driven replays are
/// safe.
#[async_trait]
pub trait CallRecordStore {
    async fn upsert_record(
        &self,
        record: &CallRecord,
    ) -> Result<(), CallRecordStoreError>;

    async fn get_record(
        &self,
        id: &RecipientId,
    ) -> Result<Option<CallRecord>, CallRecordStoreError>;

    async fn get_records_for_batch(
        &self,
        batch_id: &BatchId,
    ) -> Result<Vec<CallRecord>, CallRecordStoreError>;
}

pub struct SqlCallRecordStore {
    db: SqliteDatabase,
}

impl SqlCallRecordStore {
    pub async fn create(
        db: SqliteDatabase,
    ) -> Result<Self, CallRecordStoreError> {
        let s = Self { db };
        s.prepare().await?;
        Ok(s)
    }

    async fn prepare(&self) -> Result<(), CallRecordStoreError> {
        // Only recipient_id and batch_id are owned by the dispatcher. The
        // remaining columns of call_data are filled by other processes.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS call_data (
                recipient_id TEXT PRIMARY KEY,
                batch_id TEXT NOT NULL
            )
        "#,
        )
        .execute(&self.db.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CallRecordStore for SqlCallRecordStore {
    async fn upsert_record(
        &self,
        record: &CallRecord,
    ) -> Result<(), CallRecordStoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO call_data (recipient_id,batch_id) \
             VALUES (?,?)",
        )
        .bind(record.recipient_id.to_string())
        .bind(record.batch_id.to_string())
        .execute(&self.db.pool)
        .await?;
        Ok(())
    }

    async fn get_record(
        &self,
        id: &RecipientId,
    ) -> Result<Option<CallRecord>, CallRecordStoreError> {
        let result = sqlx::query(
            "SELECT recipient_id, batch_id FROM call_data WHERE \
             recipient_id = ?",
        )
        .bind(id.to_string())
        .fetch_one(&self.db.pool)
        .await;

        match result {
            | Ok(r) => {
                Ok(Some(CallRecord {
                    recipient_id: RecipientId::from(
                        r.get::<String, _>("recipient_id"),
                    ),
                    batch_id: BatchId::from(r.get::<String, _>("batch_id")),
                }))
            }
            | Err(sqlx::Error::RowNotFound) => Ok(None),
            | Err(e) => Err(e.into()),
        }
    }

    async fn get_records_for_batch(
        &self,
        batch_id: &BatchId,
    ) -> Result<Vec<CallRecord>, CallRecordStoreError> {
        let results = sqlx::query(
            "SELECT recipient_id, batch_id FROM call_data WHERE batch_id = ?",
        )
        .bind(batch_id.to_string())
        .fetch_all(&self.db.pool)
        .await?
        .into_iter()
        .map(|r| {
            CallRecord {
                recipient_id: RecipientId::from(
                    r.get::<String, _>("recipient_id"),
                ),
                batch_id: BatchId::from(r.get::<String, _>("batch_id")),
            }
        })
        .collect();
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use lib::database::SqliteDatabase;
    use lib::types::{BatchId, CallRecord, RecipientId};

    use super::{CallRecordStore, SqlCallRecordStore};

    fn build_record(batch_id: &BatchId) -> CallRecord {
        CallRecord {
            recipient_id: RecipientId::new(),
            batch_id: batch_id.clone(),
        }
    }

    #[tokio::test]
    async fn test_sql_call_record_store() -> anyhow::Result<()> {
        let db = SqliteDatabase::in_memory().await?;
        let store = SqlCallRecordStore::create(db).await?;

        let batch1 = BatchId::new();
        let batch2 = BatchId::new();

        let r1 = build_record(&batch1);
        let r2 = build_record(&batch2);
        let r3 = build_record(&batch1);

        store.upsert_record(&r1).await?;
        store.upsert_record(&r2).await?;
        store.upsert_record(&r3).await?;

        // Test getters
        assert_eq!(
            store.get_record(&r1.recipient_id).await?,
            Some(r1.clone())
        );
        assert_eq!(
            store.get_record(&r2.recipient_id).await?,
            Some(r2.clone())
        );

        // Test fetching non existent record
        assert_eq!(
            store
                .get_record(&RecipientId::from("non_existent".to_string()))
                .await?,
            None
        );

        // Test get all for a certain batch
        let mut results = store.get_records_for_batch(&batch1).await?;
        let mut expected = vec![r1, r3];
        expected.sort_by(|a, b| a.recipient_id.cmp(&b.recipient_id));
        results.sort_by(|a, b| a.recipient_id.cmp(&b.recipient_id));
        assert_eq!(results, expected);

        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_per_recipient() -> anyhow::Result<()> {
        let db = SqliteDatabase::in_memory().await?;
        let store = SqlCallRecordStore::create(db).await?;

        let record = build_record(&BatchId::new());

        // Replaying the same upsert must not duplicate the row.
        store.upsert_record(&record).await?;
        store.upsert_record(&record).await?;
        assert_eq!(
            store.get_records_for_batch(&record.batch_id).await?,
            vec![record.clone()]
        );

        // A replay under a new batch id rewrites the same row.
        let replayed = CallRecord {
            recipient_id: record.recipient_id.clone(),
            batch_id: BatchId::new(),
        };
        store.upsert_record(&replayed).await?;
        assert_eq!(
            store.get_record(&record.recipient_id).await?,
            Some(replayed)
        );

        Ok(())
    }
}
