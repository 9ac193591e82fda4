//! `ScoreArray` ordering and occupancy properties.

use covex::{ScoreArray, ScoreEntry};
use proptest::prelude::*;

fn entries() -> impl Strategy<Value = Vec<(i64, u16, u8)>> {
    prop::collection::vec((0i64..50, any::<u16>(), any::<u8>()), 0..60)
}

proptest! {
    #[test]
    fn get_all_is_descending_by_sort_key(items in entries()) {
        let mut store = ScoreArray::new();
        for (doc, score, tie) in &items {
            store.add(*doc, *score, *tie);
        }
        let all = store.get_all();
        prop_assert_eq!(all.len(), items.len());
        for pair in all.windows(2) {
            prop_assert!(pair[0].sort_key() >= pair[1].sort_key());
        }
    }

    #[test]
    fn top_k_is_a_prefix_of_get_all(items in entries(), k in 0usize..20) {
        let mut store = ScoreArray::new();
        for (doc, score, tie) in &items {
            store.add(*doc, *score, *tie);
        }
        let all = store.get_all();
        let top = store.get_top_k(k);
        prop_assert_eq!(top.len(), k.min(all.len()));
        // Same bucket and tiebreaker handling on both paths makes top_k an
        // exact prefix, not just an order-compatible one.
        let prefix: Vec<ScoreEntry> = all.into_iter().take(top.len()).collect();
        prop_assert_eq!(top, prefix);
    }

    #[test]
    fn count_tracks_adds(items in entries()) {
        let mut store = ScoreArray::new();
        for (i, (doc, score, tie)) in items.iter().enumerate() {
            store.add(*doc, *score, *tie);
            prop_assert_eq!(store.len(), i + 1);
        }
    }

    #[test]
    fn update_leaves_one_occurrence(items in entries(), target in 0i64..50) {
        let mut store = ScoreArray::new();
        for (doc, score, tie) in &items {
            store.add(*doc, *score, *tie);
        }
        store.update(target, 1234, 7);
        let occurrences = store
            .get_all()
            .into_iter()
            .filter(|e| e.doc_id == target)
            .count();
        prop_assert_eq!(occurrences, 1);
    }

    #[test]
    fn clear_then_reuse_behaves_like_fresh(items in entries()) {
        let mut store = ScoreArray::new();
        for (doc, score, tie) in &items {
            store.add(*doc, *score, *tie);
        }
        store.clear();
        prop_assert!(store.is_empty());
        prop_assert!(store.get_all().is_empty());

        store.add(99, 42, 1);
        let all = store.get_all();
        prop_assert_eq!(all.len(), 1);
        prop_assert_eq!(all[0].doc_id, 99);
    }
}
