//! Exercises the one-writer, many-readers contract: a single thread inserts a random
//! permutation of keys while several other threads concurrently scan the list from the
//! beginning, observing it only ever growing, never corrupted or out of order.

use std::thread;

use oorandom::Rand32;
use skipcore::{Arena, SkipList};

const KEYS: u32 = 2_000;
const READERS: usize = 4;

#[test]
fn concurrent_scans_observe_a_consistent_growing_prefix() {
    let arena = Arena::new();
    let list: SkipList<'_, u32> = SkipList::new(&arena);

    let mut permutation: Vec<u32> = (0..KEYS).collect();
    let mut rng = Rand32::new(42);
    for i in (1..permutation.len()).rev() {
        let j = (rng.rand_u32() as usize) % (i + 1);
        permutation.swap(i, j);
    }

    thread::scope(|scope| {
        for _ in 0..READERS {
            scope.spawn(|| {
                for _ in 0..200 {
                    let mut iter = list.iter();
                    iter.seek_first();

                    let mut previous = None;
                    let mut count = 0_u32;
                    while iter.valid() {
                        let key = *iter.key();
                        if let Some(prev) = previous {
                            assert!(prev < key, "scan observed out-of-order keys: {prev} then {key}");
                        }
                        previous = Some(key);
                        count += 1;
                        iter.next();
                    }
                    assert!(count <= KEYS, "scan observed more keys than were ever inserted");
                }
            });
        }

        scope.spawn(|| {
            for &key in &permutation {
                list.insert(key);
            }
        });
    });

    for key in 0..KEYS {
        assert!(list.contains(&key), "key {key} missing after all inserts completed");
    }

    let mut iter = list.iter();
    iter.seek_first();
    let mut count = 0_u32;
    while iter.valid() {
        count += 1;
        iter.next();
    }
    assert_eq!(count, KEYS);
}
