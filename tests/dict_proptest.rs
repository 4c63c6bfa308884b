// Dict property tests.
//
// Property 1: Dict agrees with a HashMap model under inserts and lookups.
//  - Operations: insert (key from a small alphabet so overwrites happen),
//    lookup of an arbitrary key.
//  - Invariants after every insert: the returned previous value matches the
//    model, len() matches, len * 3 < capacity * 2, and capacity is a power of
//    two that either stayed put or doubled.
//  - Final: every model key maps to its last value.
//
// Property 2: destruction releases exactly the surviving values.
use std::cell::RefCell;
use std::collections::HashMap;

use proptest::prelude::*;
use strdict::Dict;
use strdict::PutError;

fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        proptest::collection::vec(0u8..4, 0..3),
        proptest::collection::vec(any::<u8>(), 0..6),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_dict_matches_model(ops in proptest::collection::vec((key_strategy(), any::<u32>(), any::<bool>()), 1..1200)) {
        let mut dict = Dict::new();
        let mut model: HashMap<Vec<u8>, u32> = HashMap::new();
        let mut capacity = dict.capacity();

        for (key, value, is_insert) in ops {
            if is_insert {
                let previous = dict.insert(&key, value);
                prop_assert_eq!(previous, Ok(model.insert(key.clone(), value)));
                prop_assert_eq!(dict.len(), model.len());
                prop_assert!(dict.len() * 3 < dict.capacity() * 2);
                prop_assert!(dict.capacity().is_power_of_two());
                prop_assert!(dict.capacity() == capacity || dict.capacity() == capacity * 2);
                capacity = dict.capacity();
            } else {
                prop_assert_eq!(dict.get(&key), model.get(&key));
            }
        }

        for (key, value) in &model {
            prop_assert_eq!(dict.get(key), Some(value));
        }
    }

    #[test]
    fn prop_absent_arguments_change_nothing(keys in proptest::collection::vec(key_strategy(), 0..50)) {
        let mut dict = Dict::new();
        for (i, key) in keys.iter().enumerate() {
            dict.insert(key, i).unwrap();
        }
        let len = dict.len();
        let capacity = dict.capacity();

        for key in &keys {
            prop_assert_eq!(dict.put(Some(key), None), Err(PutError::InvalidArgument));
        }
        prop_assert_eq!(dict.put(None::<&[u8]>, Some(0)), Err(PutError::InvalidArgument));
        prop_assert_eq!(dict.len(), len);
        prop_assert_eq!(dict.capacity(), capacity);
    }

    #[test]
    fn prop_drop_releases_survivors(ops in proptest::collection::vec((key_strategy(), any::<u32>()), 0..800)) {
        let released = RefCell::new(Vec::new());
        let mut model: HashMap<Vec<u8>, u32> = HashMap::new();
        {
            let mut dict = Dict::with_release(|v: u32| released.borrow_mut().push(v));
            for (key, value) in ops {
                dict.insert(&key, value).unwrap();
                model.insert(key, value);
            }
            prop_assert!(released.borrow().is_empty());
        }

        let mut released = released.into_inner();
        let mut expected: Vec<u32> = model.into_values().collect();
        released.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(released, expected);
    }
}
