use std::{
    collections::VecDeque,
    fmt::{self, Write},
};

use crate::{AvlTree, Handle};

impl<K, V, C> AvlTree<K, V, C>
where
    K: fmt::Display,
{
    /// Renders the keys in ascending order, separated by single spaces.
    pub fn inorder_string(&self) -> String {
        let mut out = String::new();

        self.inorder(|key, _| {
            if !out.is_empty() {
                out.push(' ');
            }
            write!(out, "{key}").expect("writing to a String cannot fail");
        });

        out
    }

    /// Writes the tree as a Graphviz digraph, one rank per tree level.
    ///
    /// Nodes are labelled `key (hl:hr)`. Missing children are drawn as points so that the left
    /// and right positions stay distinguishable.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let root = match self.root {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item {
            Node(Handle),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut edges = String::new();

        while !queue.is_empty() {
            write!(w, "{{rank=same; ")?;

            for _ in 0..queue.len() {
                let node = match queue.pop_front() {
                    Some(Item::Node(node)) => self.node(node),
                    Some(Item::Missing(id)) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                    None => break,
                };

                let key = &node.key;
                let [hl, hr] = node.heights;
                write!(w, "\"graph{name}-{key}\" [label=\"{key} ({hl}:{hr})\"]; ")?;

                for child in node.children {
                    match child {
                        Some(child) => {
                            let child_key = &self.node(child).key;
                            queue.push_back(Item::Node(child));
                            writeln!(
                                edges,
                                "\"graph{name}-{key}\" -> \"graph{name}-{child_key}\";"
                            )?;
                        }
                        None => {
                            queue.push_back(Item::Missing(missing));
                            writeln!(
                                edges,
                                "\"graph{name}-{key}\" -> \"graph{name}-missing{missing}\";"
                            )?;
                            missing += 1;
                        }
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&edges)?;

        w.write_str(" }\n}")
    }
}

#[cfg(test)]
mod tests {
    use crate::AvlTree;

    #[test]
    fn inorder_string_is_space_separated() {
        let mut tree = AvlTree::new();
        assert_eq!(tree.inorder_string(), "");

        for key in [3, 1, 2] {
            tree.insert(key, ()).unwrap();
        }
        assert_eq!(tree.inorder_string(), "1 2 3");
    }

    #[test]
    fn dotgraph_labels_heights() {
        let mut tree = AvlTree::new();
        for key in [1, 2, 3] {
            tree.insert(key, ()).unwrap();
        }

        let mut out = String::new();
        tree.dotgraph("t", &mut out).unwrap();

        assert!(out.starts_with("digraph \"graph-t\""));
        assert!(out.contains("\"grapht-2\" [label=\"2 (1:1)\"];"));
        assert!(out.contains("\"grapht-2\" -> \"grapht-1\";"));
        assert!(out.contains("\"grapht-1\" [label=\"1 (0:0)\"];"));
        assert!(out.ends_with(" }\n}"));
    }

    #[test]
    fn empty_dotgraph() {
        let tree: AvlTree<u8, ()> = AvlTree::new();
        let mut out = String::new();
        tree.dotgraph("e", &mut out).unwrap();
        assert_eq!(out, "digraph \"graph-e\" {}");
    }
}
