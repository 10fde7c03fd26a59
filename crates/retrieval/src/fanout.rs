use crate::error::{Result, RetrievalError};
use crate::retriever::{ContextRetriever, RetrievalRequest};
use context_assembly::{ContextItem, SourceId};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Run every retriever concurrently and collect their items
///
/// A retriever that fails or panics contributes nothing; the failure is
/// logged. Items come back grouped in canonical [`SourceId`] order, and in
/// registration order for retrievers sharing a source, whatever order the
/// tasks finish in. Cancelling `cancel` aborts outstanding retrievers and
/// yields [`RetrievalError::Cancelled`].
pub async fn retrieve_all(
    retrievers: &[Arc<dyn ContextRetriever>],
    request: Arc<RetrievalRequest>,
    cancel: &CancellationToken,
) -> Result<Vec<ContextItem>> {
    let mut join = JoinSet::new();
    for (slot, retriever) in retrievers.iter().enumerate() {
        let retriever = Arc::clone(retriever);
        let request = Arc::clone(&request);
        let token = cancel.child_token();
        join.spawn(async move {
            let source = retriever.source();
            let outcome = retriever.retrieve(&request, &token).await;
            (slot, source, outcome)
        });
    }

    let mut collected: Vec<(SourceId, usize, Vec<ContextItem>)> = Vec::new();
    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            next = join.join_next() => Some(next),
        };
        let Some(next) = next else {
            log::debug!("Retrieval cancelled with {} source(s) outstanding", join.len());
            join.abort_all();
            return Err(RetrievalError::Cancelled);
        };
        let Some(joined) = next else {
            break;
        };

        match joined {
            Ok((slot, source, Ok(items))) => collected.push((source, slot, items)),
            Ok((_, source, Err(RetrievalError::Cancelled))) => {
                log::debug!("Source '{source}' observed cancellation");
            }
            Ok((_, source, Err(err))) => {
                let failure = RetrievalError::source_failed(source, err);
                log::warn!("{failure}; continuing without it");
            }
            Err(err) => {
                log::warn!("{}; continuing without it", RetrievalError::Join(err.to_string()));
            }
        }
    }

    if cancel.is_cancelled() {
        return Err(RetrievalError::Cancelled);
    }

    collected.sort_by_key(|(source, slot, _)| (*source, *slot));
    Ok(collected
        .into_iter()
        .flat_map(|(_, _, items)| items)
        .collect())
}
