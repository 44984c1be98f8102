mod fs;

pub use fs::FsStore;

use async_trait::async_trait;

use crate::error::PersistError;

/// Writes one artifact under a name chosen by the coordinator.
///
/// Names are unique per coordinator; a backend is expected to refuse to overwrite
/// and report `PersistError::NameCollision` instead.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn persist(&self, name: &str, bytes: &[u8]) -> Result<(), PersistError>;
}
