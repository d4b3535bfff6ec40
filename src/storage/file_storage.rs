use crate::{error::Result, storage::Storage};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage: one `<key>.json` file per key
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const EXTENSION: &'static str = "json";

    /// Creates a new FileStorage writing into `data_dir`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root_path: data_dir.as_ref().to_path_buf(),
        }
    }

    fn item_file(&self, key: &str) -> PathBuf {
        // Keys map to a single file inside the data dir
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root_path.join(format!("{}.{}", safe, Self::EXTENSION))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.item_file(key);

        if !file_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&file_path).await?;
        Ok(Some(contents))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        // Readers never observe a partially written blob
        let file_path = self.item_file(key);
        let tmp_path = file_path.with_extension("json.tmp");
        fs::write(&tmp_path, value).await?;
        fs::rename(&tmp_path, &file_path).await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let file_path = self.item_file(key);

        if file_path.exists() {
            fs::remove_file(file_path).await?;
        }
        Ok(())
    }
}
