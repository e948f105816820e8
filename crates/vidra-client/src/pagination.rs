//! Incremental pagination merge for the stream listing.
//!
//! The listing is one logical cache entry keyed by endpoint identity; each
//! fetched page is folded in with [`merge`]. The scroll driver only ever
//! requests `offset == items.len()`, so appending preserves the server's
//! order with no duplicates. The merge itself does not defend against
//! overlapping or out-of-order offsets.

use vidra_types::StreamPage;

/// Folds a newly fetched page into the current cache entry.
///
/// An `offset == 0` page is a fresh load (initial mount or a reset) and
/// replaces the cache verbatim. Any other page appends its items, taking
/// `total`, `limit` and `offset` from the new page.
pub fn merge(current: Option<StreamPage>, newest: StreamPage) -> StreamPage {
    if newest.offset == 0 {
        return newest;
    }

    match current {
        Some(mut cached) => {
            cached.items.extend(newest.items);
            StreamPage {
                items: cached.items,
                total: newest.total,
                limit: newest.limit,
                offset: newest.offset,
            }
        }
        None => newest,
    }
}
