use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

/// Supplies raw file content to the token cache.
///
/// Implement this to highlight sources that do not live on the local disk.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    async fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Reads from the local filesystem, optionally below a base directory
#[derive(Debug, Clone, Default)]
pub struct LocalFs {
    base: Option<PathBuf>,
}

impl LocalFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative paths are resolved against `base`
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        match &self.base {
            Some(base) => base.join(path),
            None => PathBuf::from(path),
        }
    }
}

#[async_trait]
impl SourceProvider for LocalFs {
    async fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.full_path(path)).await
    }
}

/// In-memory sources keyed by path
#[derive(Debug, Default)]
pub struct MemorySource {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.write().insert(path.into(), content.into());
    }

    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.files.write().remove(path)
    }
}

impl<P, C> FromIterator<(P, C)> for MemorySource
where
    P: Into<String>,
    C: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let files = iter
            .into_iter()
            .map(|(path, content)| (path.into(), content.into()))
            .collect();
        Self {
            files: RwLock::new(files),
        }
    }
}

#[async_trait]
impl SourceProvider for MemorySource {
    async fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files.read().get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such source: {path}"))
        })
    }
}
