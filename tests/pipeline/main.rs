//! Property-based tests for the query pipeline and the state store.

use std::sync::Arc;

use proptest::prelude::*;
use swapped_rust::state::{AesGcmProtector, LoadOutcome, StateStore};
use swapped_rust::table::{Column, InMemorySource, QueryPipeline, RangeFilter, SortDirection, TableState};

fn columns() -> Vec<Column<i64>> {
    vec![
        Column::new("Actions"),
        Column::new("Id").value(|n: &i64| *n).sortable().between_filter(),
    ]
}

/// Ids `1..=total`, inserted in reverse so sorting does real work.
fn source(total: i64) -> InMemorySource<i64> {
    InMemorySource::new((1..=total).rev().collect())
}

fn store() -> StateStore {
    StateStore::page(Arc::new(AesGcmProtector::new(&[3u8; 32]).unwrap()))
}

/// Generates a partition/key/value triple for the store.
fn arb_entry() -> impl Strategy<Value = (String, String, i64)> {
    (
        prop::sample::select(vec!["Table", "Prefs", "Wizard"]).prop_map(String::from),
        "[a-z]{1,8}",
        any::<i64>(),
    )
}

proptest! {
    #[test]
    fn requested_page_is_always_clamped(total in 0i64..120, size in 1usize..25, requested in 0usize..40) {
        let source = source(total);
        let columns = columns();
        let pipeline = QueryPipeline::new("numbers", &source, &columns);
        let mut state = TableState::new().with_page_size(size);
        state.set_page(requested);

        let page = pipeline.build(&mut state, |n| *n, false).unwrap();

        let pages = (total as usize).div_ceil(size);
        prop_assert_eq!(page.page_count, pages);
        prop_assert_eq!(page.total, total as usize);
        prop_assert!(state.page >= 1 && state.page <= pages.max(1));
        prop_assert_eq!(state.page, requested.max(1).min(pages.max(1)));

        let skip = (state.page - 1) * size;
        let expected = (total as usize).saturating_sub(skip).min(size);
        prop_assert_eq!(page.rows.len(), expected);
    }

    #[test]
    fn pages_partition_the_sorted_rows(total in 0i64..80, size in 1usize..15, descending in any::<bool>()) {
        let source = source(total);
        let columns = columns();
        let pipeline = QueryPipeline::new("numbers", &source, &columns);
        let mut state = TableState::new().with_page_size(size);
        let direction = if descending { SortDirection::Desc } else { SortDirection::Asc };
        state.set_sort(Some("Id".to_string()), direction);

        let pages = (total as usize).div_ceil(size).max(1);
        let mut seen = Vec::new();
        for number in 1..=pages {
            state.set_page(number);
            let page = pipeline.build(&mut state, |n| *n, false).unwrap();
            seen.extend(page.rows.into_iter().map(|row| row.item));
        }

        let mut expected: Vec<i64> = (1..=total).collect();
        if descending {
            expected.reverse();
        }
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn range_filter_is_inclusive(total in 1i64..80, lo in 0i64..90, width in 0i64..30) {
        let source = source(total);
        let columns = columns();
        let pipeline = QueryPipeline::new("numbers", &source, &columns);
        let hi = lo + width;
        let mut state = TableState::new();
        state.set_range_filter("Id", RangeFilter::new(lo.to_string(), hi.to_string()));

        let page = pipeline.build(&mut state, |n| *n, false).unwrap();

        let expected = (1..=total).filter(|n| *n >= lo && *n <= hi).count();
        prop_assert_eq!(page.total, expected);
        prop_assert!(page.rows.iter().all(|row| row.item >= lo && row.item <= hi));
    }

    #[test]
    fn every_write_bumps_the_version(entries in prop::collection::vec(arb_entry(), 1..12)) {
        let mut store = store();
        store.load(None);
        for (i, (partition, key, value)) in entries.iter().enumerate() {
            store.set(partition, key, value).unwrap();
            prop_assert_eq!(store.version(), i as u64 + 1);
        }
        prop_assert!(store.is_dirty());
    }

    #[test]
    fn tokens_restore_the_last_write(entries in prop::collection::vec(arb_entry(), 1..12)) {
        let mut store = store();
        store.load(None);
        for (partition, key, value) in &entries {
            store.set(partition, key, value).unwrap();
        }
        let token = store.encrypted().unwrap();

        let mut restored = self::store();
        prop_assert_eq!(restored.load(Some(token.as_str())), LoadOutcome::Restored);
        prop_assert!(!restored.is_dirty());
        prop_assert_eq!(restored.version(), entries.len() as u64);
        for (partition, key, _) in &entries {
            let last = entries
                .iter()
                .rev()
                .find(|(p, k, _)| p == partition && k == key)
                .map(|(_, _, v)| *v);
            prop_assert_eq!(restored.get::<i64>(partition, key).unwrap(), last);
        }
    }

    #[test]
    fn corrupted_tokens_reset(entries in prop::collection::vec(arb_entry(), 1..4), flip in any::<prop::sample::Index>()) {
        let mut store = store();
        store.load(None);
        for (partition, key, value) in &entries {
            store.set(partition, key, value).unwrap();
        }
        let mut token = store.encrypted().unwrap().into_bytes();
        let i = flip.index(token.len());
        token[i] = if token[i] == b'A' { b'B' } else { b'A' };
        let token = String::from_utf8(token).unwrap();

        let mut restored = self::store();
        prop_assert_eq!(restored.load(Some(token.as_str())), LoadOutcome::Reset);
        prop_assert_eq!(restored.version(), 0);
    }
}
