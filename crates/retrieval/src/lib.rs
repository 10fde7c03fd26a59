//! # Context Retrieval
//!
//! Async boundary between completion requests and the sources that supply
//! context items.
//!
//! Retrievers run concurrently under one [`CancellationToken`]. A newer
//! request cancels the older one; each retriever checks the token between
//! units of work and [`retrieve_all`] stops waiting as soon as it fires.
//!
//! ```rust,no_run
//! use context_assembly::DocumentRef;
//! use context_retrieval::{
//!     retrieve_all, ContextRetriever, FsDocumentAccessor, RetrievalRequest, SimilarityRetriever,
//! };
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> context_retrieval::Result<()> {
//! let similar = SimilarityRetriever::new(
//!     FsDocumentAccessor::new("."),
//!     vec![DocumentRef::from_path("src/config.rs")],
//! );
//! let retrievers: Vec<Arc<dyn ContextRetriever>> = vec![Arc::new(similar)];
//! let request = RetrievalRequest::new(DocumentRef::from_path("src/main.rs"), "load config");
//! let items = retrieve_all(&retrievers, Arc::new(request), &CancellationToken::new()).await?;
//! # let _ = items;
//! # Ok(())
//! # }
//! ```

mod error;
mod fanout;
mod fs;
mod retriever;
mod similarity;

pub use error::{Result, RetrievalError};
pub use fanout::retrieve_all;
pub use fs::FsDocumentAccessor;
pub use retriever::{ContextRetriever, DocumentAccessor, RetrievalRequest, StaticRetriever};
pub use similarity::SimilarityRetriever;
pub use tokio_util::sync::CancellationToken;
