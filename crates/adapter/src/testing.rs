use async_trait::async_trait;
use domain::ApiError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use storage::{KeyValueStore, MemoryStore};

use crate::traits::{ApiRequest, ApiResponse, Transport};

type Responder = Box<dyn FnMut(&ApiRequest) -> Result<ApiResponse, ApiError> + Send>;

pub(crate) struct ScriptedTransport {
    responder: Mutex<Responder>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: FnMut(&ApiRequest) -> Result<ApiResponse, ApiError> + Send + 'static,
    {
        Self {
            responder: Mutex::new(Box::new(responder)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn offline() -> Self {
        Self::new(|_| Err(ApiError::NetworkUnreachable("connection refused".into())))
    }

    pub fn set_responder<F>(&self, responder: F)
    where
        F: FnMut(&ApiRequest) -> Result<ApiResponse, ApiError> + Send + 'static,
    {
        *self.responder.lock().unwrap() = Box::new(responder);
    }

    pub fn go_offline(&self) {
        self.set_responder(|_| Err(ApiError::NetworkUnreachable("connection refused".into())));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut responder = self.responder.lock().unwrap();
        (*responder)(&request)
    }
}

pub(crate) fn echo(status: u16) -> impl FnMut(&ApiRequest) -> Result<ApiResponse, ApiError> + Send {
    move |req| {
        let body = req
            .body
            .as_ref()
            .map(|b| b.to_string())
            .unwrap_or_default();
        Ok(ApiResponse::new(status, body))
    }
}

#[derive(Default)]
pub(crate) struct CountingStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for CountingStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("database is locked");
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }
}
