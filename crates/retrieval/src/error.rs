use context_assembly::SourceId;
use context_similarity::SimilarityError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RetrievalError>;

#[derive(Error, Debug)]
pub enum RetrievalError {
    /// The request was superseded before retrieval finished
    #[error("Retrieval cancelled")]
    Cancelled,

    #[error("Similarity error: {0}")]
    Similarity(#[from] SimilarityError),

    #[error("Document '{path}' unavailable: {message}")]
    Document { path: String, message: String },

    #[error("Source '{source_id}' failed: {message}")]
    Source { source_id: SourceId, message: String },

    #[error("Retriever task failed: {0}")]
    Join(String),
}

impl RetrievalError {
    pub fn document(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Document {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn source_failed(source_id: SourceId, message: impl ToString) -> Self {
        Self::Source {
            source_id,
            message: message.to_string(),
        }
    }
}
