use crate::item::{ContextItem, SourceId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Size ceiling (in characters) and optional item cap for one source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Budget {
    pub size_limit: usize,
    pub item_count_limit: Option<usize>,
}

impl Budget {
    #[must_use]
    pub const fn new(size_limit: usize, item_count_limit: Option<usize>) -> Self {
        Self {
            size_limit,
            item_count_limit,
        }
    }
}

/// Outcome of budget selection for a single source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceSelection {
    pub offered: usize,
    pub accepted: usize,
    pub skipped_for_size: usize,
    pub chars_used: usize,
    /// No budget entry existed; everything was dropped
    pub unbudgeted: bool,
}

/// Per-source selection outcomes, in canonical source order
pub type SelectionReport = BTreeMap<SourceId, SourceSelection>;

/// Select a prefix-ordered subsequence of `items` that fits the budget
///
/// Items that would overflow the remaining size are skipped and the scan goes
/// on, so a later smaller item can still be accepted. Reaching the item cap
/// stops the scan.
#[must_use]
pub fn select(items: Vec<ContextItem>, budget: &Budget) -> Vec<ContextItem> {
    select_with_stats(items, budget).0
}

fn select_with_stats(
    items: Vec<ContextItem>,
    budget: &Budget,
) -> (Vec<ContextItem>, SourceSelection) {
    let mut stats = SourceSelection {
        offered: items.len(),
        ..SourceSelection::default()
    };
    let mut accepted = Vec::new();

    if budget.item_count_limit == Some(0) {
        return (accepted, stats);
    }

    for item in items {
        let size = item.size();
        if stats.chars_used + size > budget.size_limit {
            stats.skipped_for_size += 1;
            continue;
        }
        stats.chars_used += size;
        accepted.push(item);
        if budget
            .item_count_limit
            .is_some_and(|limit| accepted.len() >= limit)
        {
            break;
        }
    }

    stats.accepted = accepted.len();
    (accepted, stats)
}

/// Items kept after per-source selection, grouped by source
#[derive(Debug, Clone, Default)]
pub struct Selection {
    groups: BTreeMap<SourceId, Vec<ContextItem>>,
    report: SelectionReport,
}

impl Selection {
    /// Items kept for `source`, in input order
    #[must_use]
    pub fn items(&self, source: SourceId) -> &[ContextItem] {
        self.groups.get(&source).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Move the items kept for `source` out of the selection
    pub fn take(&mut self, source: SourceId) -> Vec<ContextItem> {
        self.groups.remove(&source).unwrap_or_default()
    }

    #[must_use]
    pub const fn report(&self) -> &SelectionReport {
        &self.report
    }

    /// Flatten every group in canonical source order
    #[must_use]
    pub fn into_items(self) -> Vec<ContextItem> {
        self.groups.into_values().flatten().collect()
    }

    #[must_use]
    pub fn into_parts(self) -> (BTreeMap<SourceId, Vec<ContextItem>>, SelectionReport) {
        (self.groups, self.report)
    }
}

/// Group `items` by source and run [`select`] on each group independently
///
/// `budget_for` supplies each source's budget. A source without one keeps no
/// items; the gap is logged rather than raised.
pub fn select_by_source(
    items: Vec<ContextItem>,
    budget_for: impl Fn(SourceId) -> Option<Budget>,
) -> Selection {
    let mut grouped: BTreeMap<SourceId, Vec<ContextItem>> = BTreeMap::new();
    for item in items {
        grouped.entry(item.source).or_default().push(item);
    }

    let mut selection = Selection::default();
    for (source, group) in grouped {
        let Some(budget) = budget_for(source) else {
            log::warn!(
                "No budget configured for source '{source}'; dropping {} item(s)",
                group.len()
            );
            selection.report.insert(
                source,
                SourceSelection {
                    offered: group.len(),
                    unbudgeted: true,
                    ..SourceSelection::default()
                },
            );
            continue;
        };

        let (kept, stats) = select_with_stats(group, &budget);
        log::debug!(
            "Source '{source}': accepted {}/{} item(s), {} chars of {}",
            stats.accepted,
            stats.offered,
            stats.chars_used,
            budget.size_limit
        );
        selection.report.insert(source, stats);
        if !kept.is_empty() {
            selection.groups.insert(source, kept);
        }
    }
    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::DocumentRef;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn item(source: SourceId, content: &str) -> ContextItem {
        ContextItem::new(source, DocumentRef::from_path("src/lib.rs"), content)
    }

    fn sized(len: usize) -> ContextItem {
        item(SourceId::RecentView, &"x".repeat(len))
    }

    #[test]
    fn skips_oversized_items_and_keeps_scanning() {
        let items = vec![sized(50), sized(50), sized(5)];
        let kept = select(items, &Budget::new(10, None));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].size(), 5);
    }

    #[test]
    fn budget_is_cumulative() {
        let items = vec![sized(6), sized(6), sized(4)];
        let kept = select(items, &Budget::new(10, None));
        let sizes: Vec<usize> = kept.iter().map(ContextItem::size).collect();
        assert_eq!(sizes, vec![6, 4]);
    }

    #[test]
    fn count_limit_stops_the_scan() {
        let items = vec![sized(1), sized(1), sized(1)];
        assert_eq!(select(items.clone(), &Budget::new(100, Some(2))).len(), 2);
        assert!(select(items, &Budget::new(100, Some(0))).is_empty());
    }

    #[test]
    fn count_limit_applies_to_eligible_items_only() {
        let items = vec![sized(20), sized(3), sized(3), sized(3)];
        let kept = select(items, &Budget::new(10, Some(2)));
        let sizes: Vec<usize> = kept.iter().map(ContextItem::size).collect();
        assert_eq!(sizes, vec![3, 3]);
    }

    #[test]
    fn groups_are_budgeted_independently() {
        let items = vec![
            item(SourceId::RecentEdit, "edit-one"),
            item(SourceId::RecentView, "view"),
            item(SourceId::RecentEdit, "edit-two"),
        ];
        let selection = select_by_source(items, |source| match source {
            SourceId::RecentEdit => Some(Budget::new(8, None)),
            SourceId::RecentView => Some(Budget::new(100, None)),
            _ => None,
        });

        assert_eq!(selection.items(SourceId::RecentEdit).len(), 1);
        assert_eq!(selection.items(SourceId::RecentView).len(), 1);
        assert_eq!(selection.report()[&SourceId::RecentEdit].skipped_for_size, 1);

        let flattened = selection.into_items();
        assert_eq!(flattened[0].source, SourceId::RecentView);
        assert_eq!(flattened[1].content, "edit-one");
    }

    #[test]
    fn unbudgeted_source_is_dropped() {
        let items = vec![item(SourceId::Diagnostics, "error: boom")];
        let mut selection = select_by_source(items, |_| None);
        assert!(selection.report()[&SourceId::Diagnostics].unbudgeted);
        assert!(selection.take(SourceId::Diagnostics).is_empty());
    }

    #[test]
    fn later_small_items_can_outnumber_an_earlier_large_fit() {
        // First-fit with skipping trades count for order: a budget large
        // enough for the 8-char item leaves no room for the trailing ones.
        let items = vec![sized(3), sized(8), sized(1), sized(1)];
        assert_eq!(select(items.clone(), &Budget::new(10, None)).len(), 3);
        assert_eq!(select(items, &Budget::new(11, None)).len(), 2);
    }

    proptest! {
        #[test]
        fn proptest_selection_never_exceeds_limit(
            sizes in prop::collection::vec(0usize..40, 0..20),
            limit in 0usize..120,
        ) {
            let items: Vec<ContextItem> = sizes.iter().map(|len| sized(*len)).collect();
            let kept = select(items, &Budget::new(limit, None));
            let total: usize = kept.iter().map(ContextItem::size).sum();
            prop_assert!(total <= limit);
        }

        #[test]
        fn proptest_larger_budget_keeps_at_least_as_many_ascending_items(
            mut sizes in prop::collection::vec(0usize..40, 0..20),
            limit in 0usize..120,
            extra in 0usize..60,
        ) {
            sizes.sort_unstable();
            let items: Vec<ContextItem> = sizes.iter().map(|len| sized(*len)).collect();
            let kept = select(items.clone(), &Budget::new(limit, None));
            let larger = select(items, &Budget::new(limit + extra, None));
            prop_assert!(larger.len() >= kept.len());
        }
    }
}
