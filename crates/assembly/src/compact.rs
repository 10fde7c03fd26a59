use crate::item::ContextItem;

/// Separator placed between the merged contents of one edit run
pub const DEFAULT_RUN_SEPARATOR: &str = "\nthen\n";

/// Chronological order of a retrieved item list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalOrder {
    NewestFirst,
    OldestFirst,
}

/// Merge runs of consecutive items from the same document
///
/// Each run of two or more items becomes one item carrying the metadata of the
/// run's first element. Its content is the run's contents joined by
/// `separator` so that it always reads oldest to newest: a newest-first run is
/// joined in reverse, an oldest-first run as is. Single items and the relative
/// order of runs are unchanged.
#[must_use]
pub fn compact(
    items: Vec<ContextItem>,
    order: RetrievalOrder,
    separator: &str,
) -> Vec<ContextItem> {
    let mut compacted = Vec::with_capacity(items.len());
    let mut run: Vec<ContextItem> = Vec::new();

    for item in items {
        let continues_run = run
            .first()
            .is_some_and(|head| head.document.same_document(&item.document));
        if !continues_run && !run.is_empty() {
            compacted.push(merge_run(std::mem::take(&mut run), order, separator));
        }
        run.push(item);
    }
    if !run.is_empty() {
        compacted.push(merge_run(run, order, separator));
    }

    compacted
}

fn merge_run(mut run: Vec<ContextItem>, order: RetrievalOrder, separator: &str) -> ContextItem {
    if run.len() == 1 {
        return run.remove(0);
    }

    let contents: Vec<&str> = match order {
        RetrievalOrder::NewestFirst => run
            .iter()
            .rev()
            .map(|item| item.content.as_str())
            .collect(),
        RetrievalOrder::OldestFirst => run.iter().map(|item| item.content.as_str()).collect(),
    };
    let merged = contents.join(separator);
    log::debug!(
        "Compacted {} items for {} into one",
        run.len(),
        run[0].document.display_path
    );
    run[0].with_content(merged)
}
