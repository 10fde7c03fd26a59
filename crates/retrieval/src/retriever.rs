use crate::error::Result;
use async_trait::async_trait;
use context_assembly::{ContextItem, DocumentRef, SourceId};
use tokio_util::sync::CancellationToken;

/// What a completion request asks retrievers for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalRequest {
    /// Document being edited
    pub document: DocumentRef,
    /// Text near the cursor that retrieved context should resemble
    pub target_text: String,
}

impl RetrievalRequest {
    pub fn new(document: DocumentRef, target_text: impl Into<String>) -> Self {
        Self {
            document,
            target_text: target_text.into(),
        }
    }

    /// Use the lines within `radius` of `line` (0-indexed) in `text` as target
    ///
    /// A `line` past the end of `text` selects the trailing lines.
    pub fn around_line(document: DocumentRef, text: &str, line: usize, radius: usize) -> Self {
        let lines: Vec<&str> = text.split('\n').collect();
        let line = line.min(lines.len().saturating_sub(1));
        let start = line.saturating_sub(radius);
        let end = line.saturating_add(radius).saturating_add(1).min(lines.len());
        Self::new(document, lines[start..end].join("\n"))
    }
}

/// Read access to document text
#[async_trait]
pub trait DocumentAccessor: Send + Sync {
    async fn text(&self, document: &DocumentRef) -> Result<String>;
}

/// A source of context items for one request
///
/// Implementations should check `cancel` between units of work and return
/// [`RetrievalError::Cancelled`](crate::RetrievalError::Cancelled) once it fires.
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    fn source(&self) -> SourceId;

    /// Items for `request`, newest or best first
    async fn retrieve(
        &self,
        request: &RetrievalRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<ContextItem>>;
}

/// Serves items the host already collected (edit history, diagnostics, clipboard)
#[derive(Debug, Clone)]
pub struct StaticRetriever {
    source: SourceId,
    items: Vec<ContextItem>,
}

impl StaticRetriever {
    /// Keep only the items of `items` that belong to `source`
    #[must_use]
    pub fn new(source: SourceId, items: Vec<ContextItem>) -> Self {
        let items = items
            .into_iter()
            .filter(|item| item.source == source)
            .collect();
        Self { source, items }
    }
}

#[async_trait]
impl ContextRetriever for StaticRetriever {
    fn source(&self) -> SourceId {
        self.source
    }

    async fn retrieve(
        &self,
        _request: &RetrievalRequest,
        _cancel: &CancellationToken,
    ) -> Result<Vec<ContextItem>> {
        Ok(self.items.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn around_line_takes_radius_on_both_sides() {
        let text = "a\nb\nc\nd\ne";
        let doc = DocumentRef::from_path("x.rs");
        assert_eq!(
            RetrievalRequest::around_line(doc.clone(), text, 2, 1).target_text,
            "b\nc\nd"
        );
        assert_eq!(
            RetrievalRequest::around_line(doc.clone(), text, 0, 2).target_text,
            "a\nb\nc"
        );
        assert_eq!(
            RetrievalRequest::around_line(doc, text, 99, 1).target_text,
            "d\ne"
        );
    }

    #[tokio::test]
    async fn static_retriever_filters_foreign_sources() {
        let doc = DocumentRef::from_path("a.rs");
        let retriever = StaticRetriever::new(
            SourceId::RecentEdit,
            vec![
                ContextItem::new(SourceId::RecentEdit, doc.clone(), "+edit"),
                ContextItem::new(SourceId::RecentCopy, doc.clone(), "copied"),
            ],
        );
        let request = RetrievalRequest::new(doc, "");
        let items = retriever
            .retrieve(&request, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "+edit");
    }
}
