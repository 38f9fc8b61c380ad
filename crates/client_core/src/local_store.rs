use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use storage::Storage;
use tokio::sync::Mutex;

/// Key under which the bearer credential is persisted.
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Key under which the serialized team session is persisted.
pub const SESSION_KEY: &str = "session";

/// Durable client-side key/value storage.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
    async fn remove_item(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl LocalStore for Storage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Storage::get_item(self, key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        Storage::set_item(self, key, value).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        Storage::remove_item(self, key).await.map(|_| ())
    }
}

/// Process-local store, used for tests and for runs that must not touch disk.
#[derive(Default)]
pub struct MemoryLocalStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.items.lock().await.clone()
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.items.lock().await.remove(key);
        Ok(())
    }
}
