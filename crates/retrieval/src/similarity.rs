use crate::error::{Result, RetrievalError};
use crate::retriever::{ContextRetriever, DocumentAccessor, RetrievalRequest};
use async_trait::async_trait;
use context_assembly::{ContextItem, DocumentRef, SourceId};
use context_similarity::{Match, MatcherConfig};
use std::cmp::Ordering;
use tokio_util::sync::CancellationToken;

const DEFAULT_MAX_ITEMS: usize = 5;

/// Finds regions of other documents that resemble the text near the cursor
pub struct SimilarityRetriever<A> {
    accessor: A,
    candidates: Vec<DocumentRef>,
    matcher: MatcherConfig,
    max_items: usize,
}

impl<A: DocumentAccessor> SimilarityRetriever<A> {
    /// Search `candidates` with the default matcher settings
    pub fn new(accessor: A, candidates: Vec<DocumentRef>) -> Self {
        Self {
            accessor,
            candidates,
            matcher: MatcherConfig::default(),
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    /// Override window size and per-document match cap
    pub fn with_matcher(mut self, matcher: MatcherConfig) -> Result<Self> {
        matcher.validate()?;
        self.matcher = matcher;
        Ok(self)
    }

    /// Cap on items returned across all documents
    #[must_use]
    pub const fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    #[must_use]
    pub fn candidates(&self) -> &[DocumentRef] {
        &self.candidates
    }
}

#[async_trait]
impl<A: DocumentAccessor> ContextRetriever for SimilarityRetriever<A> {
    fn source(&self) -> SourceId {
        SourceId::SimilarSnippet
    }

    async fn retrieve(
        &self,
        request: &RetrievalRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<ContextItem>> {
        if request.target_text.trim().is_empty() || self.max_items == 0 {
            return Ok(Vec::new());
        }

        let mut found: Vec<(DocumentRef, Match)> = Vec::new();
        for (visited, candidate) in self.candidates.iter().enumerate() {
            if cancel.is_cancelled() {
                log::debug!("Similarity retrieval cancelled after {visited} document(s)");
                return Err(RetrievalError::Cancelled);
            }
            if candidate.same_document(&request.document) {
                continue;
            }

            let text = match self.accessor.text(candidate).await {
                Ok(text) => text,
                Err(err) => {
                    log::warn!("Skipping {}: {err}", candidate.display_path);
                    continue;
                }
            };
            let matches = self.matcher.best_matches(&request.target_text, &text)?;
            found.extend(
                matches
                    .into_iter()
                    .filter(|m| m.score > 0.0)
                    .map(|m| (candidate.clone(), m)),
            );
        }

        // Stable: equal scores keep candidate order, then line order.
        found.sort_by(|(_, a), (_, b)| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        found.truncate(self.max_items);

        log::debug!(
            "Similarity retrieval over {} candidate(s) kept {} match(es)",
            self.candidates.len(),
            found.len()
        );

        Ok(found
            .into_iter()
            .map(|(document, m)| {
                ContextItem::new(SourceId::SimilarSnippet, document, m.content)
                    .with_lines(m.start_line, m.end_line)
            })
            .collect())
    }
}
