mod config;
mod connectivity;
mod drivers;
mod error;
mod flush;
mod resource;
#[cfg(test)]
mod testing;
mod traits;

pub use config::ApiConfig;
pub use connectivity::{probe, ConnectivityHandle, ConnectivityMonitor};
pub use drivers::http::HttpTransport;
pub use error::ClientError;
pub use flush::{FlushCoordinator, FlushReport};
pub use resource::{CreateOutcome, ResourceClient};
pub use traits::{ApiRequest, ApiResponse, Method, Transport};

use domain::{Comment, Post, QueuedOperation};
use std::sync::Arc;
use std::time::Duration;
use storage::{QueueStore, SnapshotCache};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Clone)]
pub struct OfflineClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    queue: Arc<QueueStore>,
    flusher: Arc<FlushCoordinator>,
    posts: ResourceClient<Post>,
    comments: ResourceClient<Comment>,
}

impl OfflineClient {
    pub fn new(config: ApiConfig) -> Self {
        let cache = SnapshotCache::new(config.storage.clone());
        let queue = Arc::new(QueueStore::new(config.storage));
        let flusher = Arc::new(FlushCoordinator::new(
            config.transport.clone(),
            queue.clone(),
        ));

        Self {
            posts: ResourceClient::new(config.transport.clone(), cache.clone(), queue.clone()),
            comments: ResourceClient::new(config.transport.clone(), cache, queue.clone()),
            base_url: config.base_url,
            transport: config.transport,
            queue,
            flusher,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn posts(&self) -> &ResourceClient<Post> {
        &self.posts
    }

    pub fn comments(&self) -> &ResourceClient<Comment> {
        &self.comments
    }

    pub async fn flush(&self) -> FlushReport {
        self.flusher.flush().await
    }

    /// Operations still waiting to be delivered, oldest first.
    pub async fn pending(&self) -> Vec<QueuedOperation> {
        self.queue.load().await
    }

    pub async fn is_server_reachable(&self) -> bool {
        probe(self.transport.as_ref()).await
    }

    pub fn monitor(&self, interval: Duration) -> (ConnectivityMonitor, ConnectivityHandle) {
        ConnectivityMonitor::new(self.transport.clone(), self.flusher.clone(), interval)
    }

    pub fn start_with_cancel_token(
        &self,
        interval: Duration,
        cancel_token: CancellationToken,
    ) -> (tokio::task::JoinHandle<()>, ConnectivityHandle) {
        info!("Watching {} for connectivity changes...", self.base_url);
        let (monitor, handle) = self.monitor(interval);
        (tokio::spawn(monitor.run(cancel_token)), handle)
    }
}
