#![no_main]

use arena_avl::model::run_insert_equivalence;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|keys: Vec<u16>| {
    run_insert_equivalence(keys.into_iter().map(u32::from).collect())
});
