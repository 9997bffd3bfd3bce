use std::sync::Arc;
use std::time::Duration;
use storage::KeyValueStore;

use crate::drivers::http::HttpTransport;
use crate::traits::Transport;

#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub storage: Arc<dyn KeyValueStore>,
    pub transport: Arc<dyn Transport>,
}

impl ApiConfig {
    pub fn new(
        base_url: impl Into<String>,
        storage: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            storage,
            transport,
        }
    }

    pub fn http(
        base_url: impl Into<String>,
        storage: Arc<dyn KeyValueStore>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(base_url, timeout)?;
        Ok(Self {
            base_url: transport.base_url().to_string(),
            storage,
            transport: Arc::new(transport),
        })
    }
}
