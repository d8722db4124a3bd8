//! SQLite-backed checkpointer (SqliteSaver). Persistent across process restarts.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, TransactionBehavior};

use crate::graph::StepName;
use crate::memory::checkpoint::{Checkpoint, CheckpointListItem};
use crate::memory::checkpointer::{CheckpointError, Checkpointer};
use crate::memory::serializer::Serializer;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn storage(e: impl std::fmt::Display) -> CheckpointError {
    CheckpointError::Storage(e.to_string())
}

fn open(db_path: &Path) -> Result<rusqlite::Connection, CheckpointError> {
    let conn = rusqlite::Connection::open(db_path).map_err(storage)?;
    conn.busy_timeout(BUSY_TIMEOUT).map_err(storage)?;
    Ok(conn)
}

fn step_from_column(v: Option<String>) -> Result<Option<StepName>, CheckpointError> {
    v.map(|s| s.parse::<StepName>().map_err(CheckpointError::Serialization))
        .transpose()
}

/// SQLite-backed checkpointer. One row per session (latest checkpoint only).
///
/// Every `put` runs the version check and the replace inside one IMMEDIATE transaction,
/// so concurrent writers (threads or processes sharing the file) serialize and a write is
/// never partially visible. Uses spawn_blocking for async.
///
/// **Interaction**: Used as `Arc<dyn Checkpointer<S>>` by `TutorEngine`.
pub struct SqliteSaver<S> {
    db_path: PathBuf,
    serializer: Arc<dyn Serializer<S>>,
}

impl<S> SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Opens (or creates) the database file and ensures the table exists.
    pub fn new(
        path: impl AsRef<Path>,
        serializer: Arc<dyn Serializer<S>>,
    ) -> Result<Self, CheckpointError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = open(&db_path)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS session_checkpoints (
                session_id TEXT PRIMARY KEY NOT NULL,
                version INTEGER NOT NULL,
                last_step TEXT,
                ts TEXT NOT NULL,
                payload BLOB NOT NULL
            )
            "#,
            [],
        )
        .map_err(storage)?;
        Ok(Self {
            db_path,
            serializer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl<S> Checkpointer<S> for SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn get(&self, session_id: &str) -> Result<Option<Checkpoint<S>>, CheckpointError> {
        if session_id.is_empty() {
            return Err(CheckpointError::SessionIdRequired);
        }
        let db_path = self.db_path.clone();
        let id = session_id.to_string();

        type Row = (i64, Option<String>, String, Vec<u8>);
        let row: Option<Row> = tokio::task::spawn_blocking(move || -> Result<Option<Row>, CheckpointError> {
            let conn = open(&db_path)?;
            conn.query_row(
                "SELECT version, last_step, ts, payload FROM session_checkpoints WHERE session_id = ?1",
                params![id],
                |r| -> rusqlite::Result<Row> { Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)) },
            )
            .optional()
            .map_err(storage)
        })
        .await
        .map_err(storage)??;

        let Some((version, last_step, ts, payload)) = row else {
            return Ok(None);
        };
        Ok(Some(Checkpoint {
            session_id: session_id.to_string(),
            state: self.serializer.deserialize(&payload)?,
            last_completed_step: step_from_column(last_step)?,
            version: version as u64,
            ts,
        }))
    }

    async fn put(&self, checkpoint: &Checkpoint<S>) -> Result<u64, CheckpointError> {
        if checkpoint.session_id.is_empty() {
            return Err(CheckpointError::SessionIdRequired);
        }
        let payload = self.serializer.serialize(&checkpoint.state)?;
        let session_id = checkpoint.session_id.clone();
        let version = checkpoint.version;
        let last_step = checkpoint.last_completed_step.map(|s| s.as_str());
        let ts = checkpoint.ts.clone();
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = open(&db_path)?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(storage)?;
            let stored: Option<i64> = tx
                .query_row(
                    "SELECT version FROM session_checkpoints WHERE session_id = ?1",
                    params![session_id],
                    |r| r.get(0),
                )
                .optional()
                .map_err(storage)?;
            CheckpointError::check_version(&session_id, version, stored.map(|v| v as u64))?;
            tx.execute(
                r#"
                INSERT OR REPLACE INTO session_checkpoints (session_id, version, last_step, ts, payload)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![session_id, version as i64, last_step, ts, payload],
            )
            .map_err(storage)?;
            tx.commit().map_err(storage)?;
            Ok::<u64, CheckpointError>(version)
        })
        .await
        .map_err(storage)?
    }

    async fn delete(&self, session_id: &str) -> Result<bool, CheckpointError> {
        if session_id.is_empty() {
            return Err(CheckpointError::SessionIdRequired);
        }
        let db_path = self.db_path.clone();
        let id = session_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = open(&db_path)?;
            let n = conn
                .execute(
                    "DELETE FROM session_checkpoints WHERE session_id = ?1",
                    params![id],
                )
                .map_err(storage)?;
            Ok::<bool, CheckpointError>(n > 0)
        })
        .await
        .map_err(storage)?
    }

    async fn list_sessions(&self) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let db_path = self.db_path.clone();
        type Row = (String, i64, Option<String>, String);
        let rows: Vec<Row> = tokio::task::spawn_blocking(move || {
            let conn = open(&db_path)?;
            let mut stmt = conn
                .prepare(
                    "SELECT session_id, version, last_step, ts FROM session_checkpoints ORDER BY session_id",
                )
                .map_err(storage)?;
            let rows = stmt
                .query_map([], |r| -> rusqlite::Result<Row> {
                    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
                })
                .map_err(storage)?
                .collect::<Result<Vec<Row>, _>>()
                .map_err(storage)?;
            Ok::<Vec<Row>, CheckpointError>(rows)
        })
        .await
        .map_err(storage)??;

        rows.into_iter()
            .map(|(session_id, version, last_step, ts)| -> Result<CheckpointListItem, CheckpointError> {
                Ok(CheckpointListItem {
                    session_id,
                    version: version as u64,
                    last_completed_step: step_from_column(last_step)?,
                    ts,
                })
            })
            .collect()
    }
}
