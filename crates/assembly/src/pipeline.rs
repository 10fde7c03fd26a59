use crate::budget::{select_by_source, SelectionReport};
use crate::compact::{compact, RetrievalOrder};
use crate::config::AggregationConfig;
use crate::error::{AssemblyError, Result};
use crate::item::{ContextItem, SourceId};
use crate::recency::partition;
use crate::render::{self, CursorContext};
use crate::section::{assemble, Section};
use serde::{Deserialize, Serialize};

/// Named slots of the assembled output, in emission order
///
/// Slots whose content rarely changes between consecutive requests come
/// first; the cursor area and the freshest edits come last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    OlderViews,
    EditHistory,
    SimilarSnippets,
    Diagnostics,
    RecentCopies,
    RecentViews,
    CursorArea,
    RecentEdits,
    Instruction,
}

/// Everything one aggregation pass consumes
///
/// Items of each source are expected newest-first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationInput {
    #[serde(default)]
    pub items: Vec<ContextItem>,
    #[serde(default)]
    pub cursor: Option<CursorContext>,
}

/// Size of one emitted section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub kind: SectionKind,
    pub chars: usize,
}

/// Result of an aggregation pass
#[derive(Debug, Clone, Serialize)]
pub struct AssembledPrompt {
    pub text: String,
    pub sections: Vec<SectionSummary>,
    pub selection: SelectionReport,
}

/// Turns per-source item lists into one bounded context block
#[derive(Debug, Clone)]
pub struct ContextAggregator {
    config: AggregationConfig,
}

impl ContextAggregator {
    pub fn new(config: AggregationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Select, compact, split and render `input` into the fixed section order
    pub fn aggregate(&self, input: AggregationInput) -> Result<AssembledPrompt> {
        for item in &input.items {
            validate_item(item)?;
        }

        let selection = select_by_source(input.items, |source| self.config.budget_for(source));
        let (mut groups, report) = selection.into_parts();
        let mut take = |source: SourceId| groups.remove(&source).unwrap_or_default();

        let views = partition(take(SourceId::RecentView), self.config.recent_view_threshold_ms);
        let edits = compact(
            take(SourceId::RecentEdit),
            RetrievalOrder::NewestFirst,
            &self.config.edit_run_separator,
        );
        let edits = partition(edits, self.config.recent_edit_threshold_ms);
        let similar = take(SourceId::SimilarSnippet);
        let diagnostics = take(SourceId::Diagnostics);
        let copies = take(SourceId::RecentCopy);

        let sections = [
            (
                SectionKind::OlderViews,
                Section::new(render::RECENT_VIEWS_HEADER, render::recent_views(&views.older)),
            ),
            (
                SectionKind::EditHistory,
                Section::new(render::EDIT_HISTORY_HEADER, render::edit_history(&edits.older)),
            ),
            (
                SectionKind::SimilarSnippets,
                Section::new(
                    render::SIMILAR_SNIPPETS_HEADER,
                    render::similar_snippets(&similar),
                ),
            ),
            (
                SectionKind::Diagnostics,
                Section::new(render::DIAGNOSTICS_HEADER, render::diagnostics(&diagnostics)),
            ),
            (
                SectionKind::RecentCopies,
                Section::new(render::RECENT_COPY_HEADER, render::recent_copies(&copies)),
            ),
            (
                SectionKind::RecentViews,
                Section::new(
                    render::RECENT_VIEWS_RECENT_HEADER,
                    render::recent_views(&views.recent),
                ),
            ),
            (
                SectionKind::CursorArea,
                Section::new(
                    render::CURSOR_AREA_HEADER,
                    input
                        .cursor
                        .as_ref()
                        .map(render::cursor_area)
                        .unwrap_or_default(),
                ),
            ),
            (
                SectionKind::RecentEdits,
                Section::new(render::RECENT_EDITS_HEADER, render::edit_history(&edits.recent)),
            ),
            (
                SectionKind::Instruction,
                Section::untitled(self.config.instruction.clone().unwrap_or_default()),
            ),
        ];

        let summaries: Vec<SectionSummary> = sections
            .iter()
            .filter(|(_, section)| !section.is_empty())
            .map(|(kind, section)| SectionSummary {
                kind: *kind,
                chars: section.body.chars().count(),
            })
            .collect();
        let ordered: Vec<Section> = sections.into_iter().map(|(_, section)| section).collect();
        let text = assemble(&ordered);

        log::debug!(
            "Assembled {} section(s), {} chars: {:?}",
            summaries.len(),
            text.chars().count(),
            summaries
        );

        Ok(AssembledPrompt {
            text,
            sections: summaries,
            selection: report,
        })
    }
}

fn validate_item(item: &ContextItem) -> Result<()> {
    match (item.start_line, item.end_line) {
        (Some(start), Some(end)) if end < start => Err(AssemblyError::invalid_argument(format!(
            "{} item for {} has end_line {end} before start_line {start}",
            item.source, item.document.display_path
        ))),
        (Some(_), None) | (None, Some(_)) => Err(AssemblyError::invalid_argument(format!(
            "{} item for {} has a partial line range",
            item.source, item.document.display_path
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceBudget;
    use crate::item::DocumentRef;
    use pretty_assertions::assert_eq;

    fn item(source: SourceId, path: &str, content: &str, age_ms: u64) -> ContextItem {
        ContextItem::new(source, DocumentRef::from_path(path), content).with_age_ms(age_ms)
    }

    fn aggregator() -> ContextAggregator {
        ContextAggregator::new(AggregationConfig::default()).unwrap()
    }

    fn kinds(prompt: &AssembledPrompt) -> Vec<SectionKind> {
        prompt.sections.iter().map(|summary| summary.kind).collect()
    }

    fn full_input() -> AggregationInput {
        AggregationInput {
            items: vec![
                item(SourceId::RecentEdit, "src/a.rs", "+fresh", 1_000),
                item(SourceId::RecentView, "src/b.rs", "fn viewed_recently() {}", 2_000),
                item(SourceId::Diagnostics, "src/a.rs", "line 2: unused import", 0),
                item(SourceId::RecentEdit, "src/c.rs", "+stale", 600_000),
                item(SourceId::RecentCopy, "src/d.rs", "copied()", 5_000),
                item(SourceId::RecentView, "src/e.rs", "fn viewed_long_ago() {}", 900_000),
                ContextItem::new(
                    SourceId::SimilarSnippet,
                    DocumentRef::from_path("src/f.rs"),
                    "fn similar() {}",
                )
                .with_lines(10, 12),
            ],
            cursor: Some(CursorContext {
                display_path: "src/a.rs".to_string(),
                prefix: "fn main() {".to_string(),
                code_to_rewrite: "    let x".to_string(),
                suffix: "}".to_string(),
            }),
        }
    }

    #[test]
    fn emits_sections_in_fixed_order() {
        let prompt = aggregator().aggregate(full_input()).unwrap();
        assert_eq!(
            kinds(&prompt),
            vec![
                SectionKind::OlderViews,
                SectionKind::EditHistory,
                SectionKind::SimilarSnippets,
                SectionKind::Diagnostics,
                SectionKind::RecentCopies,
                SectionKind::RecentViews,
                SectionKind::CursorArea,
                SectionKind::RecentEdits,
            ]
        );

        let long_ago = prompt.text.find("viewed_long_ago").unwrap();
        let stale = prompt.text.find("+stale").unwrap();
        let cursor = prompt.text.find("<code_to_rewrite>").unwrap();
        let fresh = prompt.text.find("+fresh").unwrap();
        assert!(long_ago < stale && stale < cursor && cursor < fresh);
    }

    #[test]
    fn output_is_independent_of_source_interleaving() {
        let input = full_input();
        // Stable sort: sources are regrouped, within-source order is kept.
        let mut regrouped = input.clone();
        regrouped
            .items
            .sort_by_key(|item| std::cmp::Reverse(item.source));

        let a = aggregator().aggregate(input).unwrap();
        let b = aggregator().aggregate(regrouped).unwrap();
        assert_eq!(a.text, b.text);
    }

    #[test]
    fn consecutive_edits_to_one_file_are_compacted() {
        let input = AggregationInput {
            items: vec![
                item(SourceId::RecentEdit, "src/a.rs", "+second", 900_000),
                item(SourceId::RecentEdit, "src/a.rs", "+first", 950_000),
            ],
            cursor: None,
        };
        let prompt = aggregator().aggregate(input).unwrap();
        assert!(prompt.text.contains("src/a.rs\n+first\nthen\n+second"));
        assert_eq!(kinds(&prompt), vec![SectionKind::EditHistory]);
    }

    #[test]
    fn unbudgeted_sources_are_dropped_not_fatal() {
        let config = AggregationConfig {
            budgets: [(SourceId::RecentCopy, SourceBudget::new(100, None))].into(),
            ..AggregationConfig::default()
        };
        let prompt = ContextAggregator::new(config)
            .unwrap()
            .aggregate(full_input())
            .unwrap();
        assert!(prompt.selection[&SourceId::RecentEdit].unbudgeted);
        assert!(!prompt.text.contains("+fresh"));
        assert!(prompt.text.contains("copied()"));
    }

    #[test]
    fn empty_input_yields_empty_text() {
        let prompt = aggregator().aggregate(AggregationInput::default()).unwrap();
        assert_eq!(prompt.text, "");
        assert!(prompt.sections.is_empty());
    }

    #[test]
    fn instruction_is_appended_last() {
        let config = AggregationConfig {
            instruction: Some("Rewrite the marked code.".to_string()),
            ..AggregationConfig::default()
        };
        let prompt = ContextAggregator::new(config)
            .unwrap()
            .aggregate(full_input())
            .unwrap();
        assert!(prompt.text.ends_with("\n\nRewrite the marked code."));
    }

    #[test]
    fn rejects_inverted_line_ranges() {
        let mut input = AggregationInput::default();
        input.items.push(
            ContextItem::new(SourceId::SimilarSnippet, DocumentRef::from_path("a.rs"), "x")
                .with_lines(5, 2),
        );
        let err = aggregator().aggregate(input).unwrap_err();
        assert!(matches!(err, AssemblyError::InvalidArgument(_)));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = AggregationConfig {
            chars_per_token: 0,
            ..AggregationConfig::default()
        };
        assert!(ContextAggregator::new(config).is_err());
    }
}
