use domain::{ApiError, QueuedOperation};
use std::sync::Arc;
use storage::QueueStore;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::traits::{ApiRequest, Method, Transport};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub attempted: usize,
    pub delivered: usize,
    pub remaining: usize,
}

pub struct FlushCoordinator {
    transport: Arc<dyn Transport>,
    queue: Arc<QueueStore>,
    running: Mutex<()>,
}

impl FlushCoordinator {
    pub fn new(transport: Arc<dyn Transport>, queue: Arc<QueueStore>) -> Self {
        Self {
            transport,
            queue,
            running: Mutex::new(()),
        }
    }

    pub async fn flush(&self) -> FlushReport {
        // 同一时间只允许一次 flush
        let _running = self.running.lock().await;

        let snapshot = self.queue.load().await;
        if snapshot.is_empty() {
            return FlushReport::default();
        }

        info!("Attempting to flush {} item(s) from queue...", snapshot.len());
        let mut remaining: Vec<QueuedOperation> = Vec::new();
        for op in &snapshot {
            match self.deliver(op).await {
                Ok(()) => info!("Successfully synced {} to {}", op.payload.id(), op.url),
                Err(e) => {
                    warn!("Sync failed for {}, keeping in queue: {}", op.url, e);
                    remaining.push(op.clone());
                }
            }
        }
        let delivered = snapshot.len() - remaining.len();

        let guard = self.queue.lock().await;
        let current = match guard.try_load().await {
            Ok(current) => current,
            Err(e) => {
                // 保留原队列，已送达的项下次会被重发
                error!("Failed to re-read queue after flush, keeping it as is: {:?}", e);
                return FlushReport {
                    attempted: snapshot.len(),
                    delivered,
                    remaining: snapshot.len(),
                };
            }
        };
        // 快照之后新入队的操作接在剩余项之后
        if let Some(appended) = current.get(snapshot.len()..) {
            remaining.extend_from_slice(appended);
        }
        if let Err(e) = guard.save(&remaining).await {
            error!("Failed to persist queue after flush: {:?}", e);
        }

        FlushReport {
            attempted: snapshot.len(),
            delivered,
            remaining: remaining.len(),
        }
    }

    async fn deliver(&self, op: &QueuedOperation) -> Result<(), ApiError> {
        let body = op
            .payload
            .to_body()
            .map_err(|e| ApiError::DecodeError(e.to_string()))?;
        let resp = self
            .transport
            .send(ApiRequest::new(Method::Post, op.url.clone()).with_body(body))
            .await?;
        if !resp.is_success() {
            return Err(ApiError::from_status(resp.status, &op.url, resp.body));
        }
        Ok(())
    }
}
