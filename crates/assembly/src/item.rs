use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Retrieval source that produced a context item
///
/// Declaration order is the canonical order used whenever items from several
/// sources are flattened into one list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// Snippets from files the user recently looked at
    RecentView,
    /// Diff hunks from the edit history
    RecentEdit,
    /// Per-line diagnostics
    Diagnostics,
    /// Recently copied text
    RecentCopy,
    /// Lexically similar regions found by the window matcher
    SimilarSnippet,
}

impl SourceId {
    pub const ALL: [Self; 5] = [
        Self::RecentView,
        Self::RecentEdit,
        Self::Diagnostics,
        Self::RecentCopy,
        Self::SimilarSnippet,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RecentView => "recent_view",
            Self::RecentEdit => "recent_edit",
            Self::Diagnostics => "diagnostics",
            Self::RecentCopy => "recent_copy",
            Self::SimilarSnippet => "similar_snippet",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| format!("unknown source id: {s}"))
    }
}

/// Locator of the document an item was taken from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Stable identity of the document (URI or absolute path)
    pub uri: String,

    /// Path shown to the model, usually relative to the workspace root
    pub display_path: String,
}

impl DocumentRef {
    pub fn new(uri: impl Into<String>, display_path: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            display_path: display_path.into(),
        }
    }

    /// Use the same string as identity and display path
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            uri: path.clone(),
            display_path: path,
        }
    }

    #[must_use]
    pub fn same_document(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

/// A retrieved snippet, immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextItem {
    /// Source that produced this item
    pub source: SourceId,

    /// Owning document
    pub document: DocumentRef,

    /// Raw text
    pub content: String,

    /// Milliseconds since the underlying action (view, edit, copy)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_ms: Option<u64>,

    /// First line of the snippet (0-indexed), when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<usize>,

    /// One past the last line of the snippet, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
}

impl ContextItem {
    pub fn new(source: SourceId, document: DocumentRef, content: impl Into<String>) -> Self {
        Self {
            source,
            document,
            content: content.into(),
            age_ms: None,
            start_line: None,
            end_line: None,
        }
    }

    /// Builder: set age
    #[must_use]
    pub const fn with_age_ms(mut self, age_ms: u64) -> Self {
        self.age_ms = Some(age_ms);
        self
    }

    /// Builder: set line range
    #[must_use]
    pub const fn with_lines(mut self, start_line: usize, end_line: usize) -> Self {
        self.start_line = Some(start_line);
        self.end_line = Some(end_line);
        self
    }

    /// Size charged against a budget, in characters
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.chars().count()
    }

    /// Copy of this item's metadata with different content
    #[must_use]
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }
}
