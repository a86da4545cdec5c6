//! Model-based checks of [`AvlTree`] against [`BTreeMap`].
//!
//! Used by the crate's property tests and by the `cargo fuzz` targets in `fuzz/`.

use std::{
    collections::BTreeMap,
    ops::Bound::{Excluded, Unbounded},
};

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, Error};

/// A key chosen either from the keys currently in the tree or at random.
#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    InsertRecursive(ItemValue),
    Find(ItemValue),
    FindRecursive(ItemValue),
    Remove(ItemValue),
    Predecessor(ItemValue),
    Successor(ItemValue),
    Minimum,
    PopFirst,
    Maximum,
    PopLast,
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        fn get_key(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) if v.is_empty() => idx as u32,
                ItemValue::Index(idx) => v[idx % v.len()],
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_key(sorted, item)),
            Op::InsertRecursive(item) => FinalOp::InsertRecursive(get_key(sorted, item)),
            Op::Find(item) => FinalOp::Find(get_key(sorted, item)),
            Op::FindRecursive(item) => FinalOp::FindRecursive(get_key(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_key(sorted, item)),
            Op::Predecessor(item) => FinalOp::Predecessor(get_key(sorted, item)),
            Op::Successor(item) => FinalOp::Successor(get_key(sorted, item)),
            Op::Minimum => FinalOp::Minimum,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Maximum => FinalOp::Maximum,
            Op::PopLast => FinalOp::PopLast,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    InsertRecursive(u32),
    Find(u32),
    FindRecursive(u32),
    Remove(u32),
    Predecessor(u32),
    Successor(u32),
    Minimum,
    PopFirst,
    Maximum,
    PopLast,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::InsertRecursive),
        value_strategy().prop_map(Op::Find),
        value_strategy().prop_map(Op::FindRecursive),
        value_strategy().prop_map(Op::Remove),
        value_strategy().prop_map(Op::Predecessor),
        value_strategy().prop_map(Op::Successor),
        Just(Op::Minimum),
        Just(Op::PopFirst),
        Just(Op::Maximum),
        Just(Op::PopLast),
    ]
}

/// Worst-case height of an AVL tree holding `len` entries, `ceil(1.44 * log2(len + 2))`.
pub fn height_bound(len: usize) -> usize {
    (1.44 * ((len + 2) as f64).log2()).ceil() as usize
}

/// Runs `ops` against both an [`AvlTree`] and a [`BTreeMap`], asserting that every result
/// matches and that the tree's invariants hold after every step.
pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_keys = Vec::with_capacity(ops.len());
    let mut btree: BTreeMap<u32, usize> = BTreeMap::new();
    let mut avl: AvlTree<u32, usize> = AvlTree::new();

    fn insert_sorted(v: &mut Vec<u32>, key: u32) {
        if let Err(idx) = v.binary_search(&key) {
            v.insert(idx, key);
        }
    }

    fn remove_sorted(v: &mut Vec<u32>, key: u32) {
        if let Ok(idx) = v.binary_search(&key) {
            v.remove(idx);
        }
    }

    fn btree_insert(btree: &mut BTreeMap<u32, usize>, key: u32, value: usize) -> Result<(), Error> {
        if btree.contains_key(&key) {
            return Err(Error::DuplicateKey);
        }
        btree.insert(key, value);
        Ok(())
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_keys);

        match final_op {
            FinalOp::Insert(key) | FinalOp::InsertRecursive(key) => {
                insert_sorted(&mut sorted_keys, key);

                let from_btree = btree_insert(&mut btree, key, op_id);
                let from_avl = match final_op {
                    FinalOp::Insert(_) => avl.insert(key, op_id),
                    _ => avl.insert_recursive(key, op_id),
                };

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Find(key) => {
                assert_eq!(btree.get(&key), avl.find(&key), "FinalOp #{op_id}: {final_op:?}");
                assert_eq!(
                    btree.get_key_value(&key).map(|(k, _)| k),
                    avl.find_key(&key),
                    "FinalOp #{op_id}: {final_op:?}"
                );
            }

            FinalOp::FindRecursive(key) => {
                assert_eq!(
                    btree.get(&key),
                    avl.find_recursive(&key),
                    "FinalOp #{op_id}: {final_op:?}"
                );
                assert_eq!(
                    btree.get_key_value(&key).map(|(k, _)| k),
                    avl.find_key_recursive(&key),
                    "FinalOp #{op_id}: {final_op:?}"
                );
            }

            FinalOp::Remove(key) => {
                remove_sorted(&mut sorted_keys, key);

                let from_btree = btree.remove(&key);
                let from_avl = avl.remove(&key);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Predecessor(key) => {
                let from_btree = btree
                    .contains_key(&key)
                    .then(|| btree.range(..key).next_back())
                    .flatten();

                assert_eq!(from_btree, avl.predecessor(&key), "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Successor(key) => {
                let from_btree = btree
                    .contains_key(&key)
                    .then(|| btree.range((Excluded(key), Unbounded)).next())
                    .flatten();

                assert_eq!(from_btree, avl.successor(&key), "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Minimum => {
                assert_eq!(btree.first_key_value(), avl.minimum(), "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopFirst => {
                let from_btree = btree.pop_first();
                if let Some((key, _)) = from_btree {
                    remove_sorted(&mut sorted_keys, key);
                }

                assert_eq!(from_btree, avl.pop_first(), "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Maximum => {
                assert_eq!(btree.last_key_value(), avl.maximum(), "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopLast => {
                let from_btree = btree.pop_last();
                if let Some((key, _)) = from_btree {
                    remove_sorted(&mut sorted_keys, key);
                }

                assert_eq!(from_btree, avl.pop_last(), "FinalOp #{op_id}: {final_op:?}");
            }
        }

        let height = avl.assert_invariants();
        assert_eq!(height, avl.height());
        assert!(height <= height_bound(avl.len()), "height {height} with {} entries", avl.len());
        assert_eq!(btree.len(), avl.len());

        let mut entries = Vec::with_capacity(avl.len());
        avl.inorder(|&k, &v| entries.push((k, v)));
        assert!(btree.iter().map(|(&k, &v)| (k, v)).eq(entries));
    }
}

/// Inserts `keys` into two trees, one with [`AvlTree::insert`] and one with
/// [`AvlTree::insert_recursive`], asserting that both report the same results and end up with
/// the same shape after every insertion.
pub fn run_insert_equivalence(keys: Vec<u32>) {
    let mut iterative: AvlTree<u32, ()> = AvlTree::new();
    let mut recursive: AvlTree<u32, ()> = AvlTree::new();

    for key in keys {
        assert_eq!(iterative.insert(key, ()), recursive.insert_recursive(key, ()));

        iterative.assert_invariants();
        recursive.assert_invariants();

        let mut iterative_shape = String::new();
        let mut recursive_shape = String::new();
        iterative
            .dotgraph("shape", &mut iterative_shape)
            .expect("writing to a String cannot fail");
        recursive
            .dotgraph("shape", &mut recursive_shape)
            .expect("writing to a String cannot fail");

        assert_eq!(iterative_shape, recursive_shape, "after inserting {key}");
    }
}

/// Random key sequences for [`run_insert_equivalence`].
pub fn keys_strategy(max_len: usize) -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::vec(0u32..500, 0..max_len)
}
