//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check capacity, recency and round-trip behaviour over
//! arbitrary operation sequences.

use proptest::prelude::*;
use serde_json::Value;
use std::collections::HashSet;

use crate::cache::{bytes, capacity, codec, CacheStore, Decoded, LEDGER_KEY};
use crate::store::{Backend, MemoryStore};

// == Test Configuration ==
const TEST_CAPACITY: usize = 512;

// == Strategies ==
/// Generates cache keys, including multibyte ones
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_é€]{1,12}"
}

/// Generates cache values small enough that several fit at once
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ü🦀]{0,64}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Remove { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Remove { key }),
    ]
}

fn apply(store: &mut CacheStore<MemoryStore>, op: CacheOp) {
    match op {
        CacheOp::Set { key, value } => store.set(&key, &value).unwrap(),
        CacheOp::Get { key } => {
            store.get::<Value>(&key).unwrap();
        }
        CacheOp::Remove { key } => store.remove(&key).unwrap(),
    }
}

/// Recomputes the occupied size independently of the cache code.
fn expected_size(backend: &MemoryStore) -> usize {
    backend
        .keys()
        .into_iter()
        .filter(|k| k != LEDGER_KEY)
        .map(|k| k.len() + backend.get_item(&k).map(|v| v.len()).unwrap_or(0))
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Estimates agree with the real UTF-8 length of any string
    #[test]
    fn prop_estimate_matches_utf8_len(s in any::<String>()) {
        prop_assert_eq!(bytes::estimate(&s).unwrap(), s.len());
    }

    // Round-trip law for JSON-serializable values
    #[test]
    fn prop_codec_roundtrip(key in key_strategy(), value in value_strategy(), n in any::<i64>()) {
        let doc = serde_json::json!({ "key": key, "value": value, "n": n });
        let decoded: Decoded<Value> = codec::decode(codec::encode(&doc).into_string());
        prop_assert_eq!(decoded, Decoded::Json(doc));
    }

    // Every value set while under capacity is retrievable unchanged
    #[test]
    fn prop_roundtrip_under_capacity(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..8)
    ) {
        let mut store = CacheStore::new(MemoryStore::new(), 100_000);
        let mut latest = std::collections::HashMap::new();

        for (key, value) in entries {
            store.set(&key, &value).unwrap();
            latest.insert(key, value);
        }

        for (key, value) in latest {
            let got = store.get::<String>(&key).unwrap();
            prop_assert_eq!(got, Some(Decoded::Json(value)));
        }
    }

    // size() is always the recomputed sum of stored keys and values
    #[test]
    fn prop_size_has_no_drift(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut store = CacheStore::new(MemoryStore::new(), TEST_CAPACITY);

        for op in ops {
            apply(&mut store, op);
            prop_assert_eq!(store.size().unwrap(), expected_size(store.backend()));
            prop_assert_eq!(
                capacity::used_bytes(store.backend()).unwrap(),
                store.size().unwrap()
            );
        }
    }

    // Occupied space never exceeds capacity
    #[test]
    fn prop_capacity_enforcement(ops in prop::collection::vec(cache_op_strategy(), 1..120)) {
        let mut store = CacheStore::new(MemoryStore::new(), TEST_CAPACITY);

        for op in ops {
            apply(&mut store, op);
            prop_assert!(
                store.size().unwrap() <= TEST_CAPACITY,
                "Cache size {} exceeds capacity {}",
                store.size().unwrap(),
                TEST_CAPACITY
            );
            prop_assert!(store.left().unwrap() >= 0);
        }
    }

    // The ledger holds exactly the stored keys, each once
    #[test]
    fn prop_ledger_matches_store(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let mut store = CacheStore::new(MemoryStore::new(), TEST_CAPACITY);

        for op in ops {
            apply(&mut store, op);

            let ledger = store.keys().unwrap();
            let unique: HashSet<_> = ledger.iter().cloned().collect();
            prop_assert_eq!(unique.len(), ledger.len(), "Duplicate ledger entry");

            let stored: HashSet<_> = store
                .backend()
                .keys()
                .into_iter()
                .filter(|k| k != LEDGER_KEY)
                .collect();
            prop_assert_eq!(unique, stored);
            prop_assert_eq!(store.len(), ledger.len());
        }
    }

    // A forced eviction always removes the least recently touched key
    #[test]
    fn prop_evicts_least_recently_touched(
        keys in prop::collection::hash_set("[a-z]{1,4}", 3..6),
        touched in any::<prop::sample::Index>()
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let value = "v".repeat(20);
        let entry = keys.iter().map(|k| k.len() + value.len() + 2).max().unwrap();
        // Room for every key but no spare entry
        let cap = keys.iter().map(|k| k.len() + value.len() + 2).sum::<usize>() + entry - 1;
        let mut store = CacheStore::new(MemoryStore::new(), cap);

        for key in &keys {
            store.set(key, &value).unwrap();
        }

        // Re-touch one key; the oldest other key becomes the victim
        let touched = touched.get(&keys).clone();
        store.get::<Value>(&touched).unwrap();
        let victim = store.keys().unwrap()[0].clone();
        prop_assert_ne!(&victim, &touched);

        store.set("zzzzz", &value).unwrap();

        prop_assert!(!store.contains(&victim).unwrap());
        prop_assert!(store.contains(&touched).unwrap());
    }
}
