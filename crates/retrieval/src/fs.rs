use crate::error::{Result, RetrievalError};
use crate::retriever::DocumentAccessor;
use async_trait::async_trait;
use context_assembly::DocumentRef;
use std::path::{Path, PathBuf};

/// Reads documents from disk; relative URIs resolve against `root`
#[derive(Debug, Clone)]
pub struct FsDocumentAccessor {
    root: PathBuf,
}

impl FsDocumentAccessor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, document: &DocumentRef) -> PathBuf {
        let uri = document.uri.strip_prefix("file://").unwrap_or(&document.uri);
        let path = Path::new(uri);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait]
impl DocumentAccessor for FsDocumentAccessor {
    async fn text(&self, document: &DocumentRef) -> Result<String> {
        let path = self.resolve(document);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| RetrievalError::document(path.display().to_string(), err))
    }
}
