use crate::error::Result;
use async_trait::async_trait;

pub mod board_store;
pub mod file_storage;
pub mod memory_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

pub use board_store::BoardStore;
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Key-value store holding string blobs
#[async_trait]
pub trait Storage: Send + Sync {
    /// Prepares the backend (directories, tables)
    async fn initialize(&self) -> Result<()>;

    /// Reads the value under `key`, `None` if absent
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`; removing an absent key is not an error
    async fn remove_item(&self, key: &str) -> Result<()>;
}
