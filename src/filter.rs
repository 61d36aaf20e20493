//! Search and category filtering over an aggregated mod list.

use crate::aggregator::{ALL_CATEGORY, ModSummary};

/// Returns the mods matching `search_term` and `category`, in input order.
///
/// The search term matches name or description case-insensitively; an empty
/// term matches everything. The category must match exactly unless it is
/// [`ALL_CATEGORY`].
pub fn filter<'a>(mods: &'a [ModSummary], search_term: &str, category: &str) -> Vec<&'a ModSummary> {
    let needle = search_term.to_lowercase();
    mods.iter()
        .filter(|m| matches_search(m, &needle) && matches_category(m, category))
        .collect()
}

fn matches_search(m: &ModSummary, needle: &str) -> bool {
    needle.is_empty()
        || m.name.to_lowercase().contains(needle)
        || m.description.to_lowercase().contains(needle)
}

fn matches_category(m: &ModSummary, category: &str) -> bool {
    category == ALL_CATEGORY || m.category == category
}
