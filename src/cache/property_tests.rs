//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store's capacity, expiry, eviction and
//! persistence guarantees over generated operation sequences.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::cache::{ImageCacheStore, ManualClock, MemoryStorage, Storage, STORAGE_KEY};

// == Test Configuration ==
const TEST_CAPACITY: usize = 50;
const TEST_TTL: Duration = Duration::from_secs(24 * 60 * 60);

fn open_store(capacity: usize, ttl: Duration) -> (ImageCacheStore, Arc<ManualClock>, MemoryStorage) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let storage = MemoryStorage::new();
    let store = ImageCacheStore::open(capacity, ttl, Arc::new(storage.clone()), clock.clone());
    (store, clock, storage)
}

// == Strategies ==
/// Generates image URLs
fn url_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}\\.example/[a-z0-9]{1,12}\\.(jpg|png|webp)".prop_map(|s| format!("https://{}", s))
}

/// Generates small image bodies
fn content_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..128)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Insert { url: String, content: Vec<u8> },
    Get { url: String },
    Advance { ms: u64 },
    Purge,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (url_strategy(), content_strategy())
            .prop_map(|(url, content)| CacheOp::Insert { url, content }),
        2 => url_strategy().prop_map(|url| CacheOp::Get { url }),
        1 => (0u64..60_000).prop_map(|ms| CacheOp::Advance { ms }),
        1 => Just(CacheOp::Purge),
    ]
}

fn apply(store: &mut ImageCacheStore, clock: &ManualClock, op: CacheOp) {
    match op {
        CacheOp::Insert { url, content } => store.insert(&url, Bytes::from(content)),
        CacheOp::Get { url } => {
            store.get(&url);
        }
        CacheOp::Advance { ms } => clock.advance_ms(ms),
        CacheOp::Purge => {
            store.purge_expired();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Capacity: after every operation the store holds at most `capacity` entries.
    #[test]
    fn prop_capacity_enforcement(
        capacity in 1usize..20,
        ops in prop::collection::vec(cache_op_strategy(), 1..200)
    ) {
        let (mut store, clock, _) = open_store(capacity, Duration::from_secs(30));

        for op in ops {
            apply(&mut store, &clock, op);
            prop_assert!(
                store.len() <= capacity,
                "Cache size {} exceeds capacity {}",
                store.len(),
                capacity
            );
        }
    }

    // Storing content and reading it back before expiry returns the same bytes.
    #[test]
    fn prop_insert_then_get(url in url_strategy(), content in content_strategy()) {
        let (mut store, _, _) = open_store(TEST_CAPACITY, TEST_TTL);

        store.insert(&url, Bytes::from(content.clone()));

        prop_assert_eq!(store.get(&url), Some(Bytes::from(content)));
    }

    // Expiry: served while now < created + ttl, absent once now >= created + ttl.
    #[test]
    fn prop_expiry_boundary(
        url in url_strategy(),
        ttl_ms in 1u64..1_000_000,
        before in 0u64..1_000_000
    ) {
        let before = before % ttl_ms;
        let (mut store, clock, _) = open_store(TEST_CAPACITY, Duration::from_millis(ttl_ms));

        store.insert(&url, Bytes::from_static(b"img"));

        clock.advance_ms(before);
        prop_assert!(store.get(&url).is_some(), "Entry should be live at +{}ms of {}ms", before, ttl_ms);

        clock.advance_ms(ttl_ms - before);
        prop_assert!(store.get(&url).is_none(), "Entry should be gone at +{}ms", ttl_ms);
    }

    // Eviction order: with N+1 distinct insertions at increasing times,
    // the first one inserted is the one that goes.
    #[test]
    fn prop_oldest_created_is_evicted(
        urls in prop::collection::hash_set(url_strategy(), 2..40)
    ) {
        let urls: Vec<String> = urls.into_iter().collect();
        let capacity = urls.len() - 1;
        let (mut store, clock, _) = open_store(capacity, TEST_TTL);

        for url in &urls {
            store.insert(url, Bytes::from_static(b"img"));
            clock.advance_ms(1);
        }

        prop_assert_eq!(store.len(), capacity);
        prop_assert!(!store.contains(&urls[0]), "Oldest '{}' should have been evicted", urls[0]);
        for url in urls.iter().skip(1) {
            prop_assert!(store.contains(url), "'{}' should still be cached", url);
        }
    }

    // At most one entry per URL, however often a URL is inserted.
    #[test]
    fn prop_single_entry_per_url(
        urls in prop::collection::vec(prop::sample::select(vec![
            "https://a.example/1.jpg",
            "https://a.example/2.jpg",
            "https://b.example/3.jpg",
        ]), 1..50)
    ) {
        let (mut store, _, _) = open_store(TEST_CAPACITY, TEST_TTL);

        for url in &urls {
            store.insert(url, Bytes::from_static(b"img"));
        }

        let distinct: HashSet<&&str> = urls.iter().collect();
        prop_assert_eq!(store.len(), distinct.len());
        prop_assert_eq!(store.urls().len(), distinct.len());
    }

    // Persistence: a reopened store sees exactly the live entries, in order.
    #[test]
    fn prop_reopen_matches_live_entries(
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let ttl = Duration::from_secs(60);
        let (mut store, clock, storage) = open_store(10, ttl);

        for op in ops {
            apply(&mut store, &clock, op);
        }
        store.purge_expired();
        store.flush();

        let reopened = ImageCacheStore::open(10, ttl, Arc::new(storage), clock);
        prop_assert_eq!(reopened.urls(), store.urls());
    }

    // Corrupt persisted text never prevents the store from opening.
    #[test]
    fn prop_corrupt_snapshot_opens_empty(raw in ".{0,200}") {
        prop_assume!(!raw.contains("\"version\""));
        let storage = MemoryStorage::new();
        storage.write(STORAGE_KEY, &raw).unwrap();

        let mut store = ImageCacheStore::open(
            TEST_CAPACITY,
            TEST_TTL,
            Arc::new(storage),
            Arc::new(ManualClock::new(0)),
        );

        prop_assert!(store.is_empty());
        store.insert("https://ok.example/a.jpg", Bytes::from_static(b"img"));
        prop_assert!(store.contains("https://ok.example/a.jpg"));
    }
}

// == Additional Unit Tests for Edge Cases ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifty_one_inserts_evict_first() {
        let (mut store, clock, _) = open_store(TEST_CAPACITY, TEST_TTL);
        let urls: Vec<String> = (1..=51).map(|i| format!("https://ok.example/{i}.jpg")).collect();

        for url in &urls {
            store.insert(url, Bytes::from_static(b"img"));
            clock.advance_ms(1);
        }

        assert_eq!(store.len(), 50);
        assert!(!store.contains(&urls[0]));
        assert!(urls[1..].iter().all(|url| store.contains(url)));
    }

    #[test]
    fn test_snapshot_tracks_every_mutation() {
        let (mut store, clock, storage) = open_store(2, Duration::from_millis(10));

        store.insert("https://a.example/1.jpg", Bytes::from_static(b"1"));
        store.insert("https://a.example/2.jpg", Bytes::from_static(b"2"));
        store.insert("https://a.example/3.jpg", Bytes::from_static(b"3"));
        store.flush();

        let raw = storage.read(STORAGE_KEY).unwrap().unwrap();
        assert!(!raw.contains("a.example/1.jpg"));
        assert!(raw.contains("a.example/3.jpg"));

        clock.advance_ms(10);
        store.purge_expired();
        store.flush();
        // Nothing live is left, so the slot is emptied
        assert_eq!(storage.read(STORAGE_KEY).unwrap(), None);
    }
}
