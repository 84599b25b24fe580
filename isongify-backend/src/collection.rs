//! Sorted multiset backed by a red-black tree
//!
//! Nodes live in a `Vec` arena and link to each other by index, so the tree
//! owns every value it holds and needs no `unsafe`. Values are ordered by
//! [`Keyed::key`]; equal keys are allowed and are kept in insertion order.
//!
//! Traversal is lazy: [`OrderedCollection::iter_from`] positions itself in
//! O(log n) and then yields one value per step, so a range scan touching k
//! values costs O(log n + k).

use std::fmt::Debug;
use std::iter::FusedIterator;

/// A value that carries its own ordering key
pub trait Keyed {
    type Key: Ord + Copy + Debug;

    /// Key this value is ordered by
    fn key(&self) -> Self::Key;
}

macro_rules! keyed_by_self {
    ($($t:ty),*) => {
        $(
            impl Keyed for $t {
                type Key = $t;

                fn key(&self) -> $t {
                    *self
                }
            }
        )*
    };
}

keyed_by_self!(i32, i64, u32, u64, usize);

type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    color: Color,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// Sorted container keyed by [`Keyed::key`], duplicates permitted
#[derive(Debug, Clone)]
pub struct OrderedCollection<T: Keyed> {
    nodes: Vec<Node<T>>,
    root: Option<NodeId>,
    /// Where `for x in &collection` starts (None = minimum)
    start: Option<T::Key>,
}

impl<T: Keyed> Default for OrderedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed> OrderedCollection<T> {
    /// Create an empty collection
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            start: None,
        }
    }

    /// Number of values held
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Remove every value; the iteration start point is kept
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// True if some value has exactly this key
    pub fn contains(&self, key: &T::Key) -> bool {
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            let node_key = node.value.key();
            if *key == node_key {
                return true;
            }
            cur = if *key < node_key { node.left } else { node.right };
        }
        false
    }

    /// Insert a value in O(log n)
    ///
    /// A value whose key ties an existing one is placed after it.
    pub fn insert(&mut self, value: T) {
        let key = value.key();

        let mut parent = None;
        let mut go_left = false;
        let mut cur = self.root;
        while let Some(id) = cur {
            parent = Some(id);
            go_left = key < self.nodes[id].value.key();
            cur = if go_left {
                self.nodes[id].left
            } else {
                self.nodes[id].right
            };
        }

        let id = self.nodes.len();
        self.nodes.push(Node {
            value,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        });

        match parent {
            None => self.root = Some(id),
            Some(p) if go_left => self.nodes[p].left = Some(id),
            Some(p) => self.nodes[p].right = Some(id),
        }

        self.insert_fixup(id);
    }

    /// Ordered traversal from the smallest key
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            nodes: &self.nodes,
            stack: Vec::new(),
        };
        iter.push_left_spine(self.root);
        iter
    }

    /// Ordered traversal starting at the first value with key >= `start`
    ///
    /// # Examples
    ///
    /// ```
    /// use isongify_backend::OrderedCollection;
    ///
    /// let c: OrderedCollection<i32> = [5, 1, 9, 3].into_iter().collect();
    /// assert_eq!(c.iter_from(&3).copied().collect::<Vec<_>>(), vec![3, 5, 9]);
    /// assert_eq!(c.iter_from(&10).next(), None);
    /// ```
    pub fn iter_from(&self, start: &T::Key) -> Iter<'_, T> {
        let mut stack = Vec::new();
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            if node.value.key() >= *start {
                stack.push(id);
                cur = node.left;
            } else {
                cur = node.right;
            }
        }
        Iter {
            nodes: &self.nodes,
            stack,
        }
    }

    /// Reposition where borrowed iteration (`for x in &collection`) begins
    ///
    /// `None` restores iteration from the smallest key.
    pub fn set_iteration_start(&mut self, start: Option<T::Key>) {
        self.start = start;
    }

    /// Current iteration start point
    pub fn iteration_start(&self) -> Option<T::Key> {
        self.start
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while let Some(p) = self.nodes[z].parent {
            if self.nodes[p].color == Color::Black {
                break;
            }
            // A red parent is never the root, so the grandparent exists
            let Some(g) = self.nodes[p].parent else {
                break;
            };
            let parent_is_left = self.nodes[g].left == Some(p);
            let uncle = if parent_is_left {
                self.nodes[g].right
            } else {
                self.nodes[g].left
            };

            match uncle {
                Some(u) if self.nodes[u].color == Color::Red => {
                    self.nodes[p].color = Color::Black;
                    self.nodes[u].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    z = g;
                }
                _ if parent_is_left => {
                    // Inner child: rotate it to the outside first
                    let top = if self.nodes[p].right == Some(z) {
                        self.rotate_left(p);
                        z
                    } else {
                        p
                    };
                    self.nodes[top].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    self.rotate_right(g);
                    break;
                }
                _ => {
                    let top = if self.nodes[p].left == Some(z) {
                        self.rotate_right(p);
                        z
                    } else {
                        p
                    };
                    self.nodes[top].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    self.rotate_left(g);
                    break;
                }
            }
        }

        if let Some(root) = self.root {
            self.nodes[root].color = Color::Black;
        }
    }

    fn rotate_left(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].right else {
            return;
        };

        let inner = self.nodes[y].left;
        self.nodes[x].right = inner;
        if let Some(b) = inner {
            self.nodes[b].parent = Some(x);
        }

        self.replace_child(x, y);
        self.nodes[y].left = Some(x);
        self.nodes[x].parent = Some(y);
    }

    fn rotate_right(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].left else {
            return;
        };

        let inner = self.nodes[y].right;
        self.nodes[x].left = inner;
        if let Some(b) = inner {
            self.nodes[b].parent = Some(x);
        }

        self.replace_child(x, y);
        self.nodes[y].right = Some(x);
        self.nodes[x].parent = Some(y);
    }

    /// Hang `new` where `old` used to be under `old`'s parent
    fn replace_child(&mut self, old: NodeId, new: NodeId) {
        let parent = self.nodes[old].parent;
        self.nodes[new].parent = parent;
        match parent {
            None => self.root = Some(new),
            Some(p) if self.nodes[p].left == Some(old) => self.nodes[p].left = Some(new),
            Some(p) => self.nodes[p].right = Some(new),
        }
    }
}

impl<T: Keyed> FromIterator<T> for OrderedCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = Self::new();
        collection.extend(iter);
        collection
    }
}

impl<T: Keyed> Extend<T> for OrderedCollection<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: Keyed> IntoIterator for &'a OrderedCollection<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        match &self.start {
            Some(start) => self.iter_from(start),
            None => self.iter(),
        }
    }
}

/// Lazy in-order traversal of an [`OrderedCollection`]
///
/// Holds the path of pending ancestors, at most O(log n) entries.
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    nodes: &'a [Node<T>],
    stack: Vec<NodeId>,
}

impl<T> Iter<'_, T> {
    fn push_left_spine(&mut self, mut cur: Option<NodeId>) {
        while let Some(id) = cur {
            self.stack.push(id);
            cur = self.nodes[id].left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let id = self.stack.pop()?;
        let node = &self.nodes[id];
        self.push_left_spine(node.right);
        Some(&node.value)
    }
}

impl<T> FusedIterator for Iter<'_, T> {}
