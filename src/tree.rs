use std::{borrow::Borrow, cmp::Ordering::*, fmt::Debug};

use log::debug;

use crate::{
    AvlgTree, Error, Link, Node,
    node::{rebalance_after_delete, rebalance_after_insert, take_first, take_last},
};

impl<T> Drop for AvlgTree<T> {
    fn drop(&mut self) {
        release(self.root.take());
    }
}

// Drops a subtree without recursing; a tall tree with a large bound would
// otherwise overflow the stack through Box's drop glue.
fn release<T>(root: Link<T>) {
    let mut pending: Vec<Box<Node<T>>> = root.into_iter().collect();
    while let Some(mut node) = pending.pop() {
        pending.extend(node.left.take());
        pending.extend(node.right.take());
    }
}

impl<T: Clone> Clone for AvlgTree<T> {
    /// Copies the tree node for node, cached heights included, with an
    /// explicit stack instead of recursion.
    fn clone(&self) -> Self {
        // Post-order walk: a node is rebuilt once both children are on
        // `built`, left below right.
        let mut pending: Vec<(Option<&Node<T>>, bool)> = vec![(self.root.as_deref(), false)];
        let mut built: Vec<Link<T>> = Vec::new();
        while let Some((node, children_done)) = pending.pop() {
            let Some(node) = node else {
                built.push(None);
                continue;
            };
            if !children_done {
                pending.push((Some(node), true));
                pending.push((node.right.as_deref(), false));
                pending.push((node.left.as_deref(), false));
                continue;
            }
            let right = built.pop().flatten();
            let left = built.pop().flatten();
            built.push(Some(Box::new(Node {
                key: node.key.clone(),
                left,
                right,
                height: node.height,
                balance: node.balance,
            })));
        }
        AvlgTree {
            root: built.pop().flatten(),
            len: self.len,
            max_imbalance: self.max_imbalance,
        }
    }
}

impl<T> Default for AvlgTree<T> {
    /// A classic AVL tree (`G = 1`).
    fn default() -> Self {
        AvlgTree {
            root: None,
            len: 0,
            max_imbalance: 1,
        }
    }
}

// Public
impl<T> AvlgTree<T> {
    /// Creates an empty tree tolerating up to `max_imbalance` levels of
    /// height difference between the subtrees of any node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBalance`] if `max_imbalance` is 0.
    pub fn new(max_imbalance: u32) -> Result<Self, Error> {
        if max_imbalance < 1 {
            return Err(Error::InvalidBalance(max_imbalance));
        }
        debug!("new AVL-{max_imbalance} tree");
        Ok(AvlgTree {
            root: None,
            len: 0,
            max_imbalance,
        })
    }

    pub const fn max_imbalance(&self) -> u32 {
        self.max_imbalance
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length of the longest root-to-leaf path: 0 for a single key, -1 for
    /// an empty tree.
    pub fn height(&self) -> i32 {
        Node::height_of(&self.root)
    }

    /// Peeks at the key stored at the root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTree`] if the tree holds no keys.
    pub fn root(&self) -> Result<&T, Error> {
        self.root
            .as_deref()
            .map(|n| &n.key)
            .ok_or(Error::EmptyTree)
    }

    pub fn first(&self) -> Option<&T> {
        self.root.as_deref().map(Node::first)
    }

    pub fn last(&self) -> Option<&T> {
        self.root.as_deref().map(Node::last)
    }

    pub fn clear(&mut self) {
        debug!("clearing {} keys", self.len);
        release(self.root.take());
        self.len = 0;
    }

    pub fn pop_first(&mut self) -> Option<T> {
        let root = self.root.take()?;
        let (rest, first) = take_first(root, self.max_imbalance);
        self.root = rest;
        self.len -= 1;
        Some(first)
    }

    pub fn pop_last(&mut self) -> Option<T> {
        let root = self.root.take()?;
        let (rest, last) = take_last(root, self.max_imbalance);
        self.root = rest;
        self.len -= 1;
        Some(last)
    }

    /// Checks that no node's subtree heights differ by more than the bound.
    /// Heights are measured from the structure, not from the cached values.
    pub fn is_avlg_balanced(&self) -> bool {
        fn measure<T>(link: &Link<T>, max_imbalance: u32) -> Option<i32> {
            let Some(node) = link else {
                return Some(-1);
            };
            let left = measure(&node.left, max_imbalance)?;
            let right = measure(&node.right, max_imbalance)?;
            if (left - right).unsigned_abs() > max_imbalance {
                return None;
            }
            Some(left.max(right) + 1)
        }
        measure(&self.root, self.max_imbalance).is_some()
    }
}

impl<T: Ord> AvlgTree<T> {
    /// Inserts `key`, rotating where a node would exceed the bound.
    ///
    /// Returns `false` and leaves the tree untouched if an equal key is
    /// already stored.
    pub fn insert(&mut self, key: T) -> bool {
        let (root, inserted) = insert(self.root.take(), key, self.max_imbalance);
        self.root = Some(root);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Removes `key` and hands back the stored key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTree`] if the tree holds no keys. A missing key
    /// in a non-empty tree is `Ok(None)`.
    pub fn delete<Q>(&mut self, key: &Q) -> Result<Option<T>, Error>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.is_empty() {
            return Err(Error::EmptyTree);
        }
        let (root, removed) = delete(self.root.take(), key, self.max_imbalance);
        self.root = root;
        if removed.is_some() {
            self.len -= 1;
        }
        Ok(removed)
    }

    /// Looks `key` up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTree`] if the tree holds no keys. A missing key
    /// in a non-empty tree is `Ok(None)`.
    pub fn search<Q>(&self, key: &Q) -> Result<Option<&T>, Error>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.is_empty() {
            return Err(Error::EmptyTree);
        }
        Ok(self.get(key))
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Checks the search-tree ordering over whole subtrees: every key on the
    /// left of a node is smaller than it, every key on the right larger.
    pub fn is_bst(&self) -> bool {
        fn within<T: Ord>(link: &Link<T>, low: Option<&T>, high: Option<&T>) -> bool {
            let Some(node) = link else {
                return true;
            };
            if low.is_some_and(|low| node.key <= *low) || high.is_some_and(|high| node.key >= *high) {
                return false;
            }
            within(&node.left, low, Some(&node.key)) && within(&node.right, Some(&node.key), high)
        }
        within(&self.root, None, None)
    }

    fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root.as_deref();
        while let Some(candidate) = node {
            match key.cmp(candidate.key.borrow()) {
                Equal => return Some(&candidate.key),
                Greater => node = candidate.right.as_deref(),
                Less => node = candidate.left.as_deref(),
            }
        }
        None
    }
}

// Private

fn insert<T: Ord>(link: Link<T>, key: T, max_imbalance: u32) -> (Box<Node<T>>, bool) {
    let Some(mut node) = link else {
        return (Node::leaf(key), true);
    };
    // Whether the key lands on the outer side of the child it descends into
    // is decided before the key moves down.
    let (inserted, outer) = match key.cmp(&node.key) {
        Equal => return (node, false),
        Less => {
            let outer = node.left.as_ref().is_none_or(|l| key < l.key);
            let (child, inserted) = insert(node.left.take(), key, max_imbalance);
            node.left = Some(child);
            (inserted, outer)
        }
        Greater => {
            let outer = node.right.as_ref().is_none_or(|r| key > r.key);
            let (child, inserted) = insert(node.right.take(), key, max_imbalance);
            node.right = Some(child);
            (inserted, outer)
        }
    };
    if !inserted {
        return (node, false);
    }
    (rebalance_after_insert(node, max_imbalance, outer), true)
}

fn delete<T, Q>(link: Link<T>, key: &Q, max_imbalance: u32) -> (Link<T>, Option<T>)
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let Some(mut node) = link else {
        return (None, None);
    };
    let removed = match key.cmp(node.key.borrow()) {
        Less => {
            let (child, removed) = delete(node.left.take(), key, max_imbalance);
            node.left = child;
            removed
        }
        Greater => {
            let (child, removed) = delete(node.right.take(), key, max_imbalance);
            node.right = child;
            removed
        }
        Equal => match (node.left.take(), node.right.take()) {
            (None, None) => return (None, Some(node.key)),
            (Some(child), None) | (None, Some(child)) => return (Some(child), Some(node.key)),
            (Some(left), Some(right)) => {
                // The successor's key takes this node's place; its own node
                // is the one unlinked.
                let (rest, successor) = take_first(right, max_imbalance);
                node.left = Some(left);
                node.right = rest;
                Some(std::mem::replace(&mut node.key, successor))
            }
        },
    };
    if removed.is_none() {
        return (Some(node), None);
    }
    (Some(rebalance_after_delete(node, max_imbalance)), removed)
}

impl<T: Debug> Debug for AvlgTree<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for AvlgTree<T> {
    /// Trees are equal when they hold the same keys, whatever their shape or
    /// bound.
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for AvlgTree<T> {}

impl<T: Ord> FromIterator<T> for AvlgTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = AvlgTree::default();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for AvlgTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

#[cfg(test)]
impl<T> AvlgTree<T> {
    /// Checks that every cached height and balance matches the structure.
    pub(crate) fn caches_are_fresh(&self) -> bool {
        fn fresh<T>(link: &Link<T>) -> Option<i32> {
            let Some(node) = link else {
                return Some(-1);
            };
            let left = fresh(&node.left)?;
            let right = fresh(&node.right)?;
            let height = left.max(right) + 1;
            (node.height == height && node.balance == left - right).then_some(height)
        }
        fresh(&self.root).is_some()
    }

    pub(crate) fn count_nodes(&self) -> usize {
        fn count<T>(link: &Link<T>) -> usize {
            link.as_ref()
                .map_or(0, |n| 1 + count(&n.left) + count(&n.right))
        }
        count(&self.root)
    }
}
