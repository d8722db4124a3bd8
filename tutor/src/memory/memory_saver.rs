//! In-memory checkpointer (MemorySaver). Not persistent; for dev and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem};
use crate::memory::checkpointer::{CheckpointError, Checkpointer};

/// In-memory checkpointer. Key: session_id; holds only the latest checkpoint.
///
/// The version check and the replacement happen under one write lock, so `put` is atomic.
///
/// **Interaction**: Used as `Arc<dyn Checkpointer<S>>` by `TutorEngine`.
pub struct MemorySaver<S> {
    inner: Arc<RwLock<HashMap<String, Checkpoint<S>>>>,
}

impl<S> MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<S> Default for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

fn require_id(session_id: &str) -> Result<(), CheckpointError> {
    if session_id.is_empty() {
        Err(CheckpointError::SessionIdRequired)
    } else {
        Ok(())
    }
}

#[async_trait]
impl<S> Checkpointer<S> for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn get(&self, session_id: &str) -> Result<Option<Checkpoint<S>>, CheckpointError> {
        require_id(session_id)?;
        let guard = self.inner.read().await;
        Ok(guard.get(session_id).cloned())
    }

    async fn put(&self, checkpoint: &Checkpoint<S>) -> Result<u64, CheckpointError> {
        require_id(&checkpoint.session_id)?;
        let mut guard = self.inner.write().await;
        let stored = guard.get(&checkpoint.session_id).map(|cp| cp.version);
        CheckpointError::check_version(&checkpoint.session_id, checkpoint.version, stored)?;
        guard.insert(checkpoint.session_id.clone(), checkpoint.clone());
        Ok(checkpoint.version)
    }

    async fn delete(&self, session_id: &str) -> Result<bool, CheckpointError> {
        require_id(session_id)?;
        let mut guard = self.inner.write().await;
        Ok(guard.remove(session_id).is_some())
    }

    async fn list_sessions(&self) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let guard = self.inner.read().await;
        let mut items: Vec<CheckpointListItem> = guard.values().map(CheckpointListItem::from).collect();
        items.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        Ok(items)
    }
}
