//! # Context Assembly
//!
//! Turns snippets retrieved from several sources into one bounded block of
//! completion context.
//!
//! ## Pipeline
//!
//! ```text
//! ContextItem[] (mixed sources, each newest-first)
//!     │
//!     ├──> select_by_source   per-source char budget + item cap, skip-not-stop
//!     │
//!     ├──> compact            merge consecutive edits to one document
//!     │
//!     ├──> partition          recent vs older, for views and for edits
//!     │
//!     ├──> render             one tagged body per section
//!     │
//!     └──> assemble           fixed order, stable sections first, empty ones dropped
//! ```
//!
//! ## Example
//!
//! ```rust
//! use context_assembly::{
//!     AggregationConfig, AggregationInput, ContextAggregator, ContextItem, DocumentRef, SourceId,
//! };
//!
//! let aggregator = ContextAggregator::new(AggregationConfig::default()).unwrap();
//! let input = AggregationInput {
//!     items: vec![ContextItem::new(
//!         SourceId::RecentEdit,
//!         DocumentRef::from_path("src/lib.rs"),
//!         "-let a = 1;\n+let a = 2;",
//!     )],
//!     cursor: None,
//! };
//! let prompt = aggregator.aggregate(input).unwrap();
//! assert!(prompt.text.contains("<diff_history>"));
//! ```

mod budget;
mod compact;
mod config;
mod error;
mod item;
mod pipeline;
mod recency;
pub mod render;
mod section;

pub use budget::{select, select_by_source, Budget, Selection, SelectionReport, SourceSelection};
pub use compact::{compact, RetrievalOrder, DEFAULT_RUN_SEPARATOR};
pub use config::{AggregationConfig, SourceBudget, DEFAULT_CHARS_PER_TOKEN};
pub use error::{AssemblyError, Result};
pub use item::{ContextItem, DocumentRef, SourceId};
pub use pipeline::{
    AggregationInput, AssembledPrompt, ContextAggregator, SectionKind, SectionSummary,
};
pub use recency::{partition, RecencySplit};
pub use render::CursorContext;
pub use section::{assemble, Section, SECTION_SEPARATOR};
