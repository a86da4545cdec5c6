#![no_main]

use arena_avl::model::{run_btree_equivalence, Op};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|ops: Vec<Op>| { run_btree_equivalence(ops) });
