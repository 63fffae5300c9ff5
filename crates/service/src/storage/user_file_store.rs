use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use models::UserStore;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::repository::UserRepository;

/// JSON file holding the whole [`UserStore`].
///
/// `load` treats a missing file as an empty store. Unreadable or corrupt files
/// are also treated as empty unless `strict_load` is set, in which case they
/// surface as [`ServiceError::Storage`].
#[derive(Clone, Debug)]
pub struct UserFileStore {
    file_path: PathBuf,
    strict_load: bool,
}

impl UserFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), strict_load: false }
    }

    pub fn strict(mut self, strict_load: bool) -> Self {
        self.strict_load = strict_load;
        self
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read and parse the whole file.
    pub async fn load(&self) -> Result<UserStore, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.file_path.display(), "store file absent; starting empty");
                return Ok(UserStore::default());
            }
            Err(e) => return self.fail_open("read", e),
        };
        match serde_json::from_slice::<UserStore>(&bytes) {
            Ok(store) => {
                debug!(path = %self.file_path.display(), users = store.list.len(), increment = store.increment, "store loaded");
                Ok(store)
            }
            Err(e) => self.fail_open("parse", e),
        }
    }

    /// Serialize the whole store and replace the file via temp + rename.
    pub async fn save(&self, store: &UserStore) -> Result<(), ServiceError> {
        let data = serde_json::to_vec(store)?;
        let mut tmp = TempFile::create_beside(&self.file_path).await?;
        tmp.write_and_sync(&data).await?;
        tmp.persist(&self.file_path).await?;
        debug!(path = %self.file_path.display(), bytes = data.len(), "store saved");
        Ok(())
    }

    fn fail_open(&self, stage: &str, err: impl Display) -> Result<UserStore, ServiceError> {
        if self.strict_load {
            error!(path = %self.file_path.display(), stage, err = %err, "store file unusable");
            return Err(ServiceError::storage(&format!("{stage} {}", self.file_path.display()), err));
        }
        warn!(path = %self.file_path.display(), stage, err = %err, "store file unusable; treating as empty");
        Ok(UserStore::default())
    }
}

#[async_trait]
impl UserRepository for UserFileStore {
    async fn load(&self) -> Result<UserStore, ServiceError> { self.load().await }
    async fn save(&self, store: &UserStore) -> Result<(), ServiceError> { self.save(store).await }
}

/// Uniquely named sibling of the target; removed on drop unless persisted.
struct TempFile {
    path: PathBuf,
    file: Option<fs::File>,
    persisted: bool,
}

impl TempFile {
    async fn create_beside(target: &Path) -> Result<Self, ServiceError> {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string());
        let path = target.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()));
        let file = fs::File::create(&path)
            .await
            .map_err(|e| ServiceError::storage("create temp file", e))?;
        Ok(Self { path, file: Some(file), persisted: false })
    }

    async fn write_and_sync(&mut self, data: &[u8]) -> Result<(), ServiceError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| ServiceError::storage("write temp file", "file already closed"))?;
        file.write_all(data).await.map_err(|e| ServiceError::storage("write temp file", e))?;
        file.flush().await.map_err(|e| ServiceError::storage("flush temp file", e))?;
        file.sync_all().await.map_err(|e| ServiceError::storage("sync temp file", e))?;
        Ok(())
    }

    async fn persist(mut self, target: &Path) -> Result<(), ServiceError> {
        drop(self.file.take());
        fs::rename(&self.path, target)
            .await
            .map_err(|e| ServiceError::storage("replace store file", e))?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        drop(self.file.take());
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), err = %e, "failed to remove temp store file");
            }
        }
    }
}
