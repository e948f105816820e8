//! Tag-based cache invalidation for query results.
//!
//! Tags are a typed enum rather than opaque strings: the listing provides
//! [`Tag::StreamList`] plus one [`Tag::Stream`] per item it contains, a
//! single-stream query provides its own [`Tag::Stream`]. Mutations report
//! the tags they invalidate; every entry whose provided tags intersect the
//! invalidated set is marked stale and must be refetched before its value
//! is next served.
//!
//! Entries are mutated only by completed query results and by
//! invalidation; readers get clones. Concurrent writers race
//! last-write-wins, which the caller discipline in [`crate::pagination`]
//! makes harmless.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;
use vidra_types::{Stream, StreamPage};

/// Cache-invalidation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Membership/ordering of the public listing.
    StreamList,
    /// One stream, by id.
    Stream(String),
}

/// Cached stream listing plus the bookkeeping for incremental pagination.
#[derive(Debug, Clone)]
struct ListEntry {
    page: StreamPage,
    /// Offset of the most recent fetch; a repeat of the same offset is
    /// served from cache, a new offset forces a fetch-and-merge.
    last_offset: u64,
    stale: bool,
}

#[derive(Debug, Clone)]
struct StreamEntry {
    stream: Stream,
    stale: bool,
}

#[derive(Debug, Default)]
struct CacheInner {
    list: Option<ListEntry>,
    streams: HashMap<String, StreamEntry>,
}

/// Process-wide tagged cache. Cheap to clone; clones share storage.
#[derive(Debug, Clone, Default)]
pub struct TagCache {
    inner: Arc<Mutex<CacheInner>>,
}

impl TagCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached listing for a same-offset repeat request.
    ///
    /// `None` when there is no entry, the entry is stale, or `offset`
    /// differs from the last requested offset (every distinct offset is a
    /// new page to fetch).
    pub fn list_for_offset(&self, offset: u64) -> Option<StreamPage> {
        let inner = self.inner.lock().expect("cache lock poisoned");
        inner
            .list
            .as_ref()
            .filter(|entry| !entry.stale && entry.last_offset == offset)
            .map(|entry| entry.page.clone())
    }

    /// Returns the current merge base: the cached listing if it is still
    /// trusted, `None` once its tags were invalidated.
    pub fn list_merge_base(&self) -> Option<StreamPage> {
        let inner = self.inner.lock().expect("cache lock poisoned");
        inner
            .list
            .as_ref()
            .filter(|entry| !entry.stale)
            .map(|entry| entry.page.clone())
    }

    /// Stores the merged listing produced by a fetch at `requested_offset`.
    pub fn store_list(&self, page: StreamPage, requested_offset: u64) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        inner.list = Some(ListEntry {
            page,
            last_offset: requested_offset,
            stale: false,
        });
    }

    /// Returns a cached stream unless its tag was invalidated.
    pub fn stream(&self, id: &str) -> Option<Stream> {
        let inner = self.inner.lock().expect("cache lock poisoned");
        inner
            .streams
            .get(id)
            .filter(|entry| !entry.stale)
            .map(|entry| entry.stream.clone())
    }

    /// Stores a fetched stream under its own tag.
    pub fn store_stream(&self, stream: Stream) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        inner.streams.insert(
            stream.id.clone(),
            StreamEntry {
                stream,
                stale: false,
            },
        );
    }

    /// Marks every entry whose provided tags intersect `tags` as stale.
    ///
    /// The listing provides `StreamList` plus one `Stream(id)` per cached
    /// item, so invalidating a single stream that appears in the listing
    /// also forces the listing to refetch.
    pub fn invalidate(&self, tags: &[Tag]) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");

        for tag in tags {
            match tag {
                Tag::StreamList => {
                    if let Some(entry) = inner.list.as_mut() {
                        entry.stale = true;
                    }
                }
                Tag::Stream(id) => {
                    if let Some(entry) = inner.streams.get_mut(id) {
                        entry.stale = true;
                    }
                    if let Some(entry) = inner.list.as_mut()
                        && entry.page.items.iter().any(|s| &s.id == id)
                    {
                        entry.stale = true;
                    }
                }
            }
        }
        debug!(?tags, "cache tags invalidated");
    }

    /// Drops everything. Used on logout.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        inner.list = None;
        inner.streams.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use vidra_types::{StreamStatus, Visibility};

    use super::*;

    fn stream(id: &str) -> Stream {
        Stream {
            id: id.to_string(),
            title: format!("Stream {id}"),
            description: String::new(),
            status: StreamStatus::Published,
            owner_id: "owner-1".to_string(),
            visibility: Visibility::Public,
            tags: None,
            metadata: HashMap::new(),
            storage: HashMap::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            published_at: None,
        }
    }

    fn page(ids: &[&str]) -> StreamPage {
        StreamPage {
            items: ids.iter().map(|id| stream(id)).collect(),
            total: ids.len() as u64,
            limit: 10,
            offset: 0,
        }
    }

    /// Test: a same-offset repeat is served from cache; a new offset is
    /// not.
    #[test]
    fn test_list_served_only_for_same_offset() {
        let cache = TagCache::new();
        cache.store_list(page(&["a", "b"]), 0);

        assert!(cache.list_for_offset(0).is_some());
        assert!(cache.list_for_offset(2).is_none());
    }

    /// Test: invalidating the list tag forces a refetch.
    #[test]
    fn test_list_tag_invalidation() {
        let cache = TagCache::new();
        cache.store_list(page(&["a", "b"]), 0);

        cache.invalidate(&[Tag::StreamList]);
        assert!(cache.list_for_offset(0).is_none());
        assert!(cache.list_merge_base().is_none());
    }

    /// Test: invalidating a stream that appears in the listing marks the
    /// listing stale too (fine-grained per-id tags on the list).
    #[test]
    fn test_member_invalidation_hits_list() {
        let cache = TagCache::new();
        cache.store_list(page(&["a", "b"]), 0);

        cache.invalidate(&[Tag::Stream("b".to_string())]);
        assert!(cache.list_for_offset(0).is_none());
    }

    /// Test: invalidating a stream absent from the listing leaves the
    /// listing alone.
    #[test]
    fn test_unrelated_invalidation_keeps_list() {
        let cache = TagCache::new();
        cache.store_list(page(&["a", "b"]), 0);

        cache.invalidate(&[Tag::Stream("zzz".to_string())]);
        assert!(cache.list_for_offset(0).is_some());
    }

    /// Test: per-stream entries honor their own tag.
    #[test]
    fn test_stream_entry_invalidation() {
        let cache = TagCache::new();
        cache.store_stream(stream("a"));
        assert!(cache.stream("a").is_some());

        cache.invalidate(&[Tag::Stream("a".to_string())]);
        assert!(cache.stream("a").is_none());

        // refetch repopulates
        cache.store_stream(stream("a"));
        assert!(cache.stream("a").is_some());
    }

    /// Test: clear drops everything.
    #[test]
    fn test_clear() {
        let cache = TagCache::new();
        cache.store_list(page(&["a"]), 0);
        cache.store_stream(stream("a"));

        cache.clear();
        assert!(cache.list_for_offset(0).is_none());
        assert!(cache.stream("a").is_none());
    }
}
