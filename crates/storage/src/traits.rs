use anyhow::Result;
use async_trait::async_trait;

/// `set` replaces the whole value in one step; a concurrent `get` sees either
/// the old or the new value, never a mix.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
