use anyhow::Context;
use domain::QueuedOperation;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::warn;

use crate::traits::KeyValueStore;

pub const POST_QUEUE_KEY: &str = "post-queue";

pub struct QueueStore {
    store: Arc<dyn KeyValueStore>,
    mutex: Mutex<()>,
}

impl QueueStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            mutex: Mutex::new(()),
        }
    }

    pub async fn load(&self) -> Vec<QueuedOperation> {
        read_queue(self.store.as_ref()).await
    }

    pub async fn save(&self, ops: &[QueuedOperation]) -> anyhow::Result<()> {
        self.lock().await.save(ops).await
    }

    pub async fn enqueue(&self, op: QueuedOperation) -> anyhow::Result<usize> {
        let guard = self.lock().await;
        // 读失败时不能当作空队列覆盖写回
        let mut queue = guard.try_load().await?;
        queue.push(op);
        guard.save(&queue).await?;
        Ok(queue.len())
    }

    pub async fn lock(&self) -> QueueGuard<'_> {
        QueueGuard {
            store: self.store.as_ref(),
            _guard: self.mutex.lock().await,
        }
    }
}

pub struct QueueGuard<'a> {
    store: &'a dyn KeyValueStore,
    _guard: MutexGuard<'a, ()>,
}

impl QueueGuard<'_> {
    pub async fn load(&self) -> Vec<QueuedOperation> {
        read_queue(self.store).await
    }

    /// Like `load`, but a failing store read is an error instead of an empty queue.
    pub async fn try_load(&self) -> anyhow::Result<Vec<QueuedOperation>> {
        try_read_queue(self.store).await
    }

    pub async fn save(&self, ops: &[QueuedOperation]) -> anyhow::Result<()> {
        let json = serde_json::to_string(ops)?;
        self.store
            .set(POST_QUEUE_KEY, &json)
            .await
            .context("failed to save pending queue")
    }
}

async fn read_queue(store: &dyn KeyValueStore) -> Vec<QueuedOperation> {
    try_read_queue(store).await.unwrap_or_else(|e| {
        warn!("Failed to read pending queue: {:?}", e);
        Vec::new()
    })
}

async fn try_read_queue(store: &dyn KeyValueStore) -> anyhow::Result<Vec<QueuedOperation>> {
    let Some(raw) = store
        .get(POST_QUEUE_KEY)
        .await
        .context("failed to read pending queue")?
    else {
        return Ok(Vec::new());
    };

    Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Pending queue is malformed, treating as empty: {}", e);
        Vec::new()
    }))
}
