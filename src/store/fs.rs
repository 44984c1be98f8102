use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use super::Store;
use crate::error::PersistError;

/// Stores artifacts as files in a single directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

#[async_trait]
impl Store for FsStore {
    async fn persist(&self, name: &str, bytes: &[u8]) -> Result<(), PersistError> {
        let path = self.path_of(name);

        // `create_new` reserves the name; nothing existing is ever replaced.
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|err| PersistError::from_io(name, &err))?;

        write_or_discard(file, &path, name, bytes).await?;

        debug!(path = %path.display(), len = bytes.len(), "artifact written");
        Ok(())
    }
}

/// Write `bytes` through `writer` into the freshly created `path`.
/// On failure the partial file is removed so only complete artifacts remain.
async fn write_or_discard<W: AsyncWrite + Unpin>(
    mut writer: W,
    path: &Path,
    name: &str,
    bytes: &[u8],
) -> Result<(), PersistError> {
    let written = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;

    let Err(err) = written else {
        return Ok(());
    };
    drop(writer);

    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(remove_err) if remove_err.kind() == io::ErrorKind::NotFound => {}
        Err(remove_err) => warn!(
            path = %path.display(),
            error = %remove_err,
            "failed to remove partial artifact"
        ),
    }
    Err(PersistError::from_io(name, &err))
}
