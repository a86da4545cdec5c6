//! An AVL tree whose nodes live in an index arena.
//!
//! [`AvlTree`] is an ordered key/value container ordered by a caller-supplied comparator, any
//! [`Compare`] implementation from the [`compare`] crate (closures included).
//! Lookup, insertion, removal, predecessor/successor navigation and min/max all take
//! _O(log(n))_ time.
//!
//! ```
//! use arena_avl::{AvlTree, Error};
//!
//! let mut tree = AvlTree::new();
//! tree.insert(4, "four")?;
//! tree.insert(2, "two")?;
//! tree.insert(8, "eight")?;
//!
//! assert_eq!(tree.find(&2), Some(&"two"));
//! assert_eq!(tree.successor(&4), Some((&8, &"eight")));
//! assert_eq!(tree.insert(2, "deux"), Err(Error::DuplicateKey));
//!
//! // Keys can be ordered by any three-way comparison.
//! let mut reversed = AvlTree::with_comparator(|a: &i32, b: &i32| b.cmp(a));
//! reversed.insert(1, ())?;
//! reversed.insert(2, ())?;
//! assert_eq!(reversed.minimum(), Some((&2, &())));
//! # Ok::<(), Error>(())
//! ```

// Conventions used in comments:
// - `hl(x)` and `hr(x)` are the cached heights of the left and right subtrees of `x`.
// - An empty subtree has height 0 and a leaf has height 1.
// - The balance factor of `x` is `hl(x) - hr(x)`.
// - `x` leans left (right) if its balance factor is positive (negative).
//
// The invariants of the tree are:
// 1. Every balance factor is -1, 0 or 1.
// 2. `hl(x)` and `hr(x)` are exactly the heights of the subtrees below `x`.
// 3. Every child's parent link points at the node holding its child link.
//
// Every mutation restores (1) and (2) by walking from the lowest changed node to the root and
// calling `rebalance_at` on each node along the way. Rotations never change the in-order
// sequence, so the search order only depends on where nodes are attached.

use core::{cmp::Ordering, fmt, mem, ops::Not};

use compare::Compare;
use log::{debug, trace};

mod arena;
mod debug;
mod error;
mod handle;

#[cfg(any(test, feature = "model"))]
pub mod model;


pub use compare::{natural, Natural};
pub use error::{Error, Result};

use arena::Arena;
use handle::Handle;

type Link = Option<Handle>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

struct Node<K, V> {
    key: K,
    value: V,
    parent: Link,
    children: [Link; 2],
    // `[hl, hr]`. AVL height grows with ~1.44 * log2(n), so a `u8` covers any arena.
    heights: [u8; 2],
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V, parent: Link) -> Self {
        Node {
            key,
            value,
            parent,
            children: [None; 2],
            heights: [0; 2],
        }
    }

    #[inline]
    fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    fn left(&self) -> Link {
        self.child(Dir::Left)
    }

    #[inline]
    fn right(&self) -> Link {
        self.child(Dir::Right)
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }

    #[inline]
    fn height(&self) -> u8 {
        1 + self.heights[0].max(self.heights[1])
    }

    #[inline]
    fn balance(&self) -> i16 {
        i16::from(self.heights[0]) - i16::from(self.heights[1])
    }

    fn leans(&self) -> Option<Dir> {
        match self.heights[0].cmp(&self.heights[1]) {
            Ordering::Greater => Some(Dir::Left),
            Ordering::Equal => None,
            Ordering::Less => Some(Dir::Right),
        }
    }
}

/// An ordered map implemented as an AVL tree.
///
/// Keys are ordered by `C`, which defaults to the keys' [`Ord`] implementation. Keys are unique:
/// inserting a key that compares equal to an existing one fails with [`Error::DuplicateKey`].
///
/// The tree is not internally synchronized; share it between threads behind a lock.
pub struct AvlTree<K, V, C = Natural<K>> {
    nodes: Arena<Node<K, V>>,
    root: Link,
    cmp: C,
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Returns a new empty tree ordered by `K`'s [`Ord`] implementation.
    pub fn new() -> Self {
        AvlTree::with_comparator(natural())
    }
}

impl<K: Ord, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        AvlTree::new()
    }
}

impl<K, V, C> AvlTree<K, V, C> {
    /// Returns a new empty tree ordered by `cmp`.
    ///
    /// `cmp` must be a total order over every key inserted into the tree: antisymmetric,
    /// transitive, and consistent between calls. Violations are not detected: the tree stays
    /// memory safe, but lookups and navigation may then return arbitrary results.
    pub const fn with_comparator(cmp: C) -> Self {
        AvlTree {
            nodes: Arena::new(),
            root: None,
            cmp,
        }
    }

    /// Returns the number of entries in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree contains no entries.
    pub fn is_empty(&self) -> bool {
        let empty = self.root.is_none();
        debug_assert_eq!(empty, self.len() == 0);
        empty
    }

    /// Returns the height of the tree: 0 when empty, 1 for a single entry.
    pub fn height(&self) -> usize {
        usize::from(self.height_of(self.root))
    }

    /// Returns the key stored at the root of the tree.
    pub fn root(&self) -> Option<&K> {
        self.root.map(|root| &self.node(root).key)
    }

    /// Returns the entry with the minimum key.
    pub fn minimum(&self) -> Option<(&K, &V)> {
        let root = self.root?;
        Some(self.entry(self.extreme(root, Dir::Left)))
    }

    /// Returns the entry with the maximum key.
    pub fn maximum(&self) -> Option<(&K, &V)> {
        let root = self.root?;
        Some(self.entry(self.extreme(root, Dir::Right)))
    }

    /// Removes and returns the entry with the minimum key.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let root = self.root?;
        let first = self.extreme(root, Dir::Left);
        Some(self.remove_at(first))
    }

    /// Removes and returns the entry with the maximum key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let root = self.root?;
        let last = self.extreme(root, Dir::Right);
        Some(self.remove_at(last))
    }

    /// Calls `visit` on every entry in ascending key order.
    pub fn inorder<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        self.inorder_from(self.root, &mut visit);
    }

    fn inorder_from<F>(&self, link: Link, visit: &mut F)
    where
        F: FnMut(&K, &V),
    {
        let Some(handle) = link else {
            return;
        };

        let node = self.node(handle);
        self.inorder_from(node.left(), visit);
        visit(&node.key, &node.value);
        self.inorder_from(node.right(), visit);
    }

    /// Removes every entry from the tree.
    pub fn clear(&mut self) {
        if let Some(root) = self.root.take() {
            debug!("clearing {} entries", self.len());
            self.release(root);
        }

        debug_assert_eq!(self.len(), 0);
        self.nodes.reset();
    }

    // Frees the subtree rooted at `node`, children before their parent.
    fn release(&mut self, node: Handle) {
        let children = self.node(node).children;
        for child in children.into_iter().flatten() {
            self.release(child);
        }

        drop(self.nodes.remove(node));
    }

    // Support methods ========================================================

    #[inline]
    fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    #[inline]
    fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    fn entry(&self, handle: Handle) -> (&K, &V) {
        let node = self.node(handle);
        (&node.key, &node.value)
    }

    #[inline]
    fn height_of(&self, link: Link) -> u8 {
        link.map_or(0, |handle| self.node(handle).height())
    }

    fn which_child(&self, parent: Handle, child: Handle) -> Dir {
        let parent = self.node(parent);
        if parent.left() == Some(child) {
            Dir::Left
        } else {
            debug_assert_eq!(
                parent.right(),
                Some(child),
                "`child` must be a child of `parent`"
            );
            Dir::Right
        }
    }

    // Follows `dir` links from `node` until they run out.
    fn extreme(&self, mut node: Handle, dir: Dir) -> Handle {
        while let Some(next) = self.node(node).child(dir) {
            node = next;
        }

        node
    }

    // Returns the in-order neighbor of `node` in direction `dir`.
    fn neighbor(&self, node: Handle, dir: Dir) -> Link {
        if let Some(child) = self.node(node).child(dir) {
            return Some(self.extreme(child, !dir));
        }

        // Ascend until `cur` is reached from the opposite side.
        let mut cur = node;
        while let Some(parent) = self.node(cur).parent {
            if self.which_child(parent, cur) == !dir {
                return Some(parent);
            }
            cur = parent;
        }

        None
    }

    // Points the link in `parent` that refers to `old_child` at `new_child`, or makes `new_child`
    // the root if there is no parent. `new_child`'s parent link is updated to match.
    fn replace_child_or_set_root(&mut self, parent: Link, old_child: Handle, new_child: Link) {
        match parent {
            Some(parent) => {
                let dir = self.which_child(parent, old_child);
                self.node_mut(parent).set_child(dir, new_child);
            }
            None => self.root = new_child,
        }

        if let Some(new_child) = new_child {
            self.node_mut(new_child).parent = parent;
        }
    }

    fn refresh_heights(&mut self, node: Handle) {
        let [left, right] = self.node(node).children;
        let heights = [self.height_of(left), self.height_of(right)];
        self.node_mut(node).heights = heights;
    }

    // Rotates the subtree rooted at `down` in direction `dir`: the `!dir` child of `down` takes
    // its place and `down` becomes that child's `dir` child. Returns the new subtree root.
    //
    // Only the heights of `down` and the pivot are refreshed; nothing else changed children.
    fn rotate(&mut self, down: Handle, dir: Dir) -> Handle {
        let up = self
            .node(down)
            .child(!dir)
            .expect("rotation pivot must exist");
        let across = self.node(up).child(dir);
        let parent = self.node(down).parent;

        trace!(
            "rotating {dir:?} at slot {}, pivot slot {}",
            down.to_index(),
            up.to_index()
        );

        // `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
        self.node_mut(down).set_child(!dir, across);
        if let Some(across) = across {
            self.node_mut(across).parent = Some(down);
        }

        self.replace_child_or_set_root(parent, down, Some(up));
        self.node_mut(up).set_child(dir, Some(down));
        self.node_mut(down).parent = Some(up);

        self.refresh_heights(down);
        self.refresh_heights(up);

        up
    }

    // Restores the balance of `node`, assuming both of its subtrees are valid AVL trees whose
    // heights differ by at most 2. Returns the root of the subtree `node` was the root of.
    fn rebalance_at(&mut self, node: Handle) -> Handle {
        self.refresh_heights(node);

        let balance = self.node(node).balance();
        if (-1..=1).contains(&balance) {
            return node;
        }

        let heavy = if balance > 0 { Dir::Left } else { Dir::Right };
        let child = self
            .node(node)
            .child(heavy)
            .expect("the taller side of a node is never empty");

        // If the taller child leans inward, straighten it first (the LR and RL cases).
        if self.node(child).leans() == Some(!heavy) {
            self.rotate(child, heavy);
        }

        self.rotate(node, !heavy)
    }

    // Rebalances every node from `start` up to and including the root.
    //
    // Removals may need a rotation at every level, so this never stops early.
    fn rebalance_upward(&mut self, start: Link) {
        let mut cur = start;

        while let Some(node) = cur {
            let top = self.rebalance_at(node);
            cur = self.node(top).parent;
        }
    }

    // Links a new leaf as the `dir` child of `parent`. Heights above it are left stale.
    fn attach(&mut self, parent: Handle, dir: Dir, key: K, value: V) -> Handle {
        let child = self.nodes.insert(Node::new(key, value, Some(parent)));
        let prev = self.node_mut(parent).set_child(dir, Some(child));
        debug_assert!(prev.is_none(), "attached over an existing child");
        child
    }

    fn insert_as_root(&mut self, key: K, value: V) {
        debug_assert!(self.root.is_none());
        let root = self.nodes.insert(Node::new(key, value, None));
        self.root = Some(root);
    }

    // Unlinks `node`, which has at most one child, moving that child into its place.
    //
    // Returns the former parent of `node`, the lowest node whose subtree changed.
    fn splice(&mut self, node: Handle) -> Link {
        let n = self.node(node);
        debug_assert!(
            n.left().is_none() || n.right().is_none(),
            "only nodes with at most one child can be spliced"
        );

        let child = n.left().or(n.right());
        let parent = n.parent;
        self.replace_child_or_set_root(parent, node, child);

        parent
    }

    // Removes the entry stored at `node` and returns it.
    fn remove_at(&mut self, node: Handle) -> (K, V) {
        let Node {
            children, heights, ..
        } = *self.node(node);

        match children {
            [Some(left), Some(right)] => {
                // Take the donor from the taller side, preferring the predecessor on a tie.
                let donor = if heights[Dir::Right as usize] > heights[Dir::Left as usize] {
                    self.extreme(right, Dir::Left)
                } else {
                    self.extreme(left, Dir::Right)
                };

                trace!(
                    "replacing slot {} with donor slot {}",
                    node.to_index(),
                    donor.to_index()
                );

                let donor_parent = self.splice(donor);
                let Node { key, value, .. } = self.nodes.remove(donor);

                let slot = self.node_mut(node);
                let key = mem::replace(&mut slot.key, key);
                let value = mem::replace(&mut slot.value, value);

                self.rebalance_upward(donor_parent);
                (key, value)
            }

            _ => {
                let parent = self.splice(node);
                let Node { key, value, .. } = self.nodes.remove(node);

                self.rebalance_upward(parent);
                (key, value)
            }
        }
    }
}

impl<K, V, C> AvlTree<K, V, C>
where
    C: Compare<K>,
{
    /// Returns a reference to the value stored under `key`.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn find(&self, key: &K) -> Option<&V> {
        self.locate(key).map(|node| &self.node(node).value)
    }

    /// Returns the stored key that compares equal to `key`.
    pub fn find_key(&self, key: &K) -> Option<&K> {
        self.locate(key).map(|node| &self.node(node).key)
    }

    /// Same as [`find`](Self::find), descending by recursion instead of a loop.
    pub fn find_recursive(&self, key: &K) -> Option<&V> {
        self.locate_recursive(key, self.root)
            .map(|node| &self.node(node).value)
    }

    /// Same as [`find_key`](Self::find_key), descending by recursion instead of a loop.
    pub fn find_key_recursive(&self, key: &K) -> Option<&K> {
        self.locate_recursive(key, self.root)
            .map(|node| &self.node(node).key)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn find_mut(&mut self, key: &K) -> Option<&mut V> {
        let node = self.locate(key)?;
        Some(&mut self.node_mut(node).value)
    }

    /// Returns `true` if the tree contains an entry for `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.locate(key).is_some()
    }

    /// Returns the entry immediately before `key` in key order.
    ///
    /// Returns `None` if `key` is not in the tree or is its minimum.
    pub fn predecessor(&self, key: &K) -> Option<(&K, &V)> {
        let node = self.locate(key)?;
        self.neighbor(node, Dir::Left).map(|pred| self.entry(pred))
    }

    /// Returns the entry immediately after `key` in key order.
    ///
    /// Returns `None` if `key` is not in the tree or is its maximum.
    pub fn successor(&self, key: &K) -> Option<(&K, &V)> {
        let node = self.locate(key)?;
        self.neighbor(node, Dir::Right).map(|succ| self.entry(succ))
    }

    /// Inserts an entry into the tree.
    ///
    /// Fails with [`Error::DuplicateKey`], leaving the tree untouched, if an entry with an equal
    /// key is present. This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        let Some(mut parent) = self.root else {
            self.insert_as_root(key, value);
            return Ok(());
        };

        // Descend the tree, looking for a free child link.
        let dir = loop {
            let node = self.node(parent);
            let dir = match self.cmp.compare(&key, &node.key) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Err(Error::DuplicateKey),
                Ordering::Greater => Dir::Right,
            };

            match node.child(dir) {
                Some(child) => parent = child,
                None => break dir,
            }
        };

        self.attach(parent, dir, key, value);
        self.rebalance_upward(Some(parent));

        Ok(())
    }

    /// Same as [`insert`](Self::insert), descending by recursion and rebalancing each ancestor
    /// as the recursion unwinds.
    ///
    /// For the same sequence of insertions both methods build identically shaped trees.
    pub fn insert_recursive(&mut self, key: K, value: V) -> Result<()> {
        match self.root {
            Some(root) => self.insert_below(root, key, value),
            None => {
                self.insert_as_root(key, value);
                Ok(())
            }
        }
    }

    fn insert_below(&mut self, at: Handle, key: K, value: V) -> Result<()> {
        let node = self.node(at);
        let dir = match self.cmp.compare(&key, &node.key) {
            Ordering::Less => Dir::Left,
            Ordering::Equal => return Err(Error::DuplicateKey),
            Ordering::Greater => Dir::Right,
        };

        match node.child(dir) {
            Some(child) => self.insert_below(child, key, value)?,
            None => {
                self.attach(at, dir, key, value);
            }
        }

        self.rebalance_at(at);
        Ok(())
    }

    /// Removes the entry for `key` and returns its value.
    ///
    /// Does nothing and returns `None` if `key` is not in the tree. This operation completes in
    /// _O(log(n))_ time.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let node = self.locate(key)?;
        let (_, value) = self.remove_at(node);
        Some(value)
    }

    fn locate(&self, key: &K) -> Link {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;
            let node = self.node(cur);

            opt_cur = match self.cmp.compare(key, &node.key) {
                Ordering::Less => node.left(),
                Ordering::Equal => return Some(cur),
                Ordering::Greater => node.right(),
            };
        }
    }

    fn locate_recursive(&self, key: &K, link: Link) -> Link {
        let cur = link?;
        let node = self.node(cur);

        match self.cmp.compare(key, &node.key) {
            Ordering::Less => self.locate_recursive(key, node.left()),
            Ordering::Equal => Some(cur),
            Ordering::Greater => self.locate_recursive(key, node.right()),
        }
    }

    /// Checks every structural invariant of the tree, panicking on the first violation.
    ///
    /// Returns the height of the tree.
    #[doc(hidden)]
    pub fn assert_invariants(&self) -> usize {
        let Some(root) = self.root else {
            assert_eq!(self.len(), 0, "empty tree owns nodes");
            return 0;
        };

        assert_eq!(self.node(root).parent, None, "root has a parent link");

        let mut reachable = 0;
        let height = self.assert_invariants_at(root, None, None, &mut reachable);
        assert_eq!(reachable, self.len(), "tree owns unreachable nodes");

        usize::from(height)
    }

    fn assert_invariants_at(
        &self,
        node: Handle,
        lower: Option<&K>,
        upper: Option<&K>,
        reachable: &mut usize,
    ) -> u8 {
        *reachable += 1;
        let n = self.node(node);

        if let Some(lower) = lower {
            assert_eq!(
                self.cmp.compare(lower, &n.key),
                Ordering::Less,
                "key out of order with an ancestor"
            );
        }

        if let Some(upper) = upper {
            assert_eq!(
                self.cmp.compare(&n.key, upper),
                Ordering::Less,
                "key out of order with an ancestor"
            );
        }

        if n.left().is_some() {
            assert_ne!(n.left(), n.right(), "both child links point at one node");
        }

        let mut heights = [0; 2];
        for dir in [Dir::Left, Dir::Right] {
            let Some(child) = n.child(dir) else {
                continue;
            };

            assert_eq!(
                self.node(child).parent,
                Some(node),
                "child's parent link does not point back"
            );

            let (lower, upper) = match dir {
                Dir::Left => (lower, Some(&n.key)),
                Dir::Right => (Some(&n.key), upper),
            };
            heights[dir as usize] = self.assert_invariants_at(child, lower, upper, reachable);
        }

        assert_eq!(n.heights, heights, "stale height cache");
        assert!(n.balance().abs() <= 1, "balance factor out of range");

        n.height()
    }
}

impl<K, V, C> Drop for AvlTree<K, V, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V, C> fmt::Debug for AvlTree<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        self.inorder(|key, value| {
            map.entry(key, value);
        });
        map.finish()
    }
}
