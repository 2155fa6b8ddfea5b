//! Content providers: where document text comes from and goes back to.
//!
//! The console fetches and saves over SFTP; this host reads and writes the
//! local filesystem. The engine never sees either transport.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0}: no such document")]
    NotFound(String),
    #[error("{id}: {source}")]
    Io {
        id: String,
        #[source]
        source: io::Error,
    },
}

impl ProviderError {
    fn io(id: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(id.to_string())
        } else {
            Self::Io {
                id: id.to_string(),
                source,
            }
        }
    }
}

/// Fetches and saves document text by identifier.
pub trait ContentProvider {
    fn fetch(&self, id: &str) -> impl Future<Output = Result<String, ProviderError>> + Send;

    fn save(&self, id: &str, text: &str) -> impl Future<Output = Result<(), ProviderError>> + Send;
}

/// Documents are files; identifiers are paths relative to `root`.
#[derive(Debug, Clone)]
pub struct LocalFileProvider {
    root: PathBuf,
}

impl LocalFileProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }
}

impl ContentProvider for LocalFileProvider {
    fn fetch(&self, id: &str) -> impl Future<Output = Result<String, ProviderError>> + Send {
        let path = self.resolve(id);
        let id = id.to_string();
        async move {
            log::debug!("fetch {}", path.display());
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| ProviderError::io(&id, e))
        }
    }

    fn save(&self, id: &str, text: &str) -> impl Future<Output = Result<(), ProviderError>> + Send {
        let path = self.resolve(id);
        let id = id.to_string();
        let text = text.to_string();
        async move {
            log::debug!("save {} ({} bytes)", path.display(), text.len());
            tokio::fs::write(&path, text)
                .await
                .map_err(|e| ProviderError::io(&id, e))
        }
    }
}
