use crate::item::ContextItem;

/// Items split by age
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecencySplit {
    /// Items younger than the threshold
    pub recent: Vec<ContextItem>,
    /// Items at or past the threshold, or of unknown age
    pub older: Vec<ContextItem>,
}

/// Stable split of `items` into recent and older buckets
///
/// An item is recent when `age_ms < threshold_ms`. Items without an age are
/// never assumed fresh.
#[must_use]
pub fn partition(items: Vec<ContextItem>, threshold_ms: u64) -> RecencySplit {
    let (recent, older): (Vec<_>, Vec<_>) = items
        .into_iter()
        .partition(|item| item.age_ms.is_some_and(|age| age < threshold_ms));
    RecencySplit { recent, older }
}
