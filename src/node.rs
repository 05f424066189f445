use log::trace;

use super::{Link, Node};

impl<T> Node<T> {
    pub fn new(key: T) -> Self {
        Node {
            key,
            left: None,
            right: None,
            height: 0,
            balance: 0,
        }
    }

    #[inline(always)]
    pub fn leaf(key: T) -> Box<Self> {
        Box::new(Self::new(key))
    }

    /// Cached height of an optional subtree; -1 when absent.
    #[inline(always)]
    pub fn height_of(link: &Link<T>) -> i32 {
        link.as_ref().map_or(-1, |n| n.height)
    }

    /// Balance factor of an optional subtree; 0 when absent.
    #[inline(always)]
    pub fn balance_of(link: &Link<T>) -> i32 {
        link.as_ref().map_or(0, |n| n.balance)
    }

    /// Recomputes height and balance from the children's cached heights.
    #[inline(always)]
    pub fn update(&mut self) {
        let left = Self::height_of(&self.left);
        let right = Self::height_of(&self.right);
        self.height = left.max(right) + 1;
        self.balance = left - right;
    }

    #[inline(always)]
    pub fn exceeds(&self, max_imbalance: u32) -> bool {
        self.balance.unsigned_abs() > max_imbalance
    }

    pub fn first(&self) -> &T {
        let mut node = self;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        &node.key
    }

    pub fn last(&self) -> &T {
        let mut node = self;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        &node.key
    }
}

/*
 * Rotations. Each one returns the new subtree root, which the caller links
 * back in place of `target`. A rotation whose pivot is missing is a no-op.
 *
 * Left rotation at t:
 *
 *      t                p
 *     / \              / \
 *    a   p    -->     t   c
 *       / \          / \
 *      b   c        a   b
 */

pub(crate) fn rotate_left<T>(mut target: Box<Node<T>>) -> Box<Node<T>> {
    let Some(mut pivot) = target.right.take() else {
        return target;
    };
    target.right = pivot.left.take();
    target.update();
    pivot.left = Some(target);
    pivot.update();
    pivot
}

pub(crate) fn rotate_right<T>(mut target: Box<Node<T>>) -> Box<Node<T>> {
    let Some(mut pivot) = target.left.take() else {
        return target;
    };
    target.left = pivot.right.take();
    target.update();
    pivot.right = Some(target);
    pivot.update();
    pivot
}

/*
 * Left-right rotation at t: left rotation at t's left child, then right
 * rotation at t.
 *
 *        t              t              q
 *       / \            / \            / \
 *      p   d   -->    q   d   -->    p   t
 *     / \            / \            / \ / \
 *    a   q          p   c          a  b c  d
 *       / \        / \
 *      b   c      a   b
 */

pub(crate) fn rotate_left_right<T>(mut target: Box<Node<T>>) -> Box<Node<T>> {
    if let Some(left) = target.left.take() {
        target.left = Some(rotate_left(left));
    }
    rotate_right(target)
}

pub(crate) fn rotate_right_left<T>(mut target: Box<Node<T>>) -> Box<Node<T>> {
    if let Some(right) = target.right.take() {
        target.right = Some(rotate_right(right));
    }
    rotate_left(target)
}

/// Restores the bound at `node` after one of its subtrees grew by one level.
/// `outer` tells whether the growth happened on the outer side of the taller
/// child (left-left or right-right), which a single rotation fixes.
pub(crate) fn rebalance_after_insert<T>(
    mut node: Box<Node<T>>,
    max_imbalance: u32,
    outer: bool,
) -> Box<Node<T>> {
    node.update();
    if !node.exceeds(max_imbalance) {
        return node;
    }
    trace!(
        "insert: rebalancing node of height {} with balance {}",
        node.height, node.balance
    );
    match (node.balance > 0, outer) {
        (true, true) => rotate_right(node),
        (true, false) => rotate_left_right(node),
        (false, true) => rotate_left(node),
        (false, false) => rotate_right_left(node),
    }
}

/// Restores the bound at `node` after one of its subtrees shrank by one
/// level. The taller child's own balance picks the rotation; a zero balance
/// there takes the single rotation.
pub(crate) fn rebalance_after_delete<T>(mut node: Box<Node<T>>, max_imbalance: u32) -> Box<Node<T>> {
    node.update();
    if !node.exceeds(max_imbalance) {
        return node;
    }
    trace!(
        "delete: rebalancing node of height {} with balance {}",
        node.height, node.balance
    );
    if node.balance < 0 {
        if Node::balance_of(&node.right) <= 0 {
            rotate_left(node)
        } else {
            rotate_right_left(node)
        }
    } else if Node::balance_of(&node.left) >= 0 {
        rotate_right(node)
    } else {
        rotate_left_right(node)
    }
}

/// Unlinks the leftmost node under `node`, rebalancing on the way back up.
/// Returns the remaining subtree and the removed key.
pub(crate) fn take_first<T>(mut node: Box<Node<T>>, max_imbalance: u32) -> (Link<T>, T) {
    match node.left.take() {
        None => {
            let Node { key, right, .. } = *node;
            (right, key)
        }
        Some(left) => {
            let (rest, first) = take_first(left, max_imbalance);
            node.left = rest;
            (Some(rebalance_after_delete(node, max_imbalance)), first)
        }
    }
}

/// Mirror of [`take_first`].
pub(crate) fn take_last<T>(mut node: Box<Node<T>>, max_imbalance: u32) -> (Link<T>, T) {
    match node.right.take() {
        None => {
            let Node { key, left, .. } = *node;
            (left, key)
        }
        Some(right) => {
            let (rest, last) = take_last(right, max_imbalance);
            node.right = rest;
            (Some(rebalance_after_delete(node, max_imbalance)), last)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    // Builds a node and its subtree heights bottom-up.
    fn node(key: usize, left: Link<usize>, right: Link<usize>) -> Link<usize> {
        let mut n = Node::leaf(key);
        n.left = left;
        n.right = right;
        n.update();
        Some(n)
    }

    fn shape(link: &Link<usize>) -> String {
        match link {
            None => ".".to_string(),
            Some(n) if n.left.is_none() && n.right.is_none() => format!("{}", n.key),
            Some(n) => format!("({} {} {})", shape(&n.left), n.key, shape(&n.right)),
        }
    }

    #[test]
    fn leaf_heights() {
        let leaf = Node::leaf(1);
        assert_eq!(0, leaf.height);
        assert_eq!(0, leaf.balance);
        assert_eq!(-1, Node::<usize>::height_of(&None));
        assert_eq!(0, Node::<usize>::balance_of(&None));
    }

    #[test]
    fn update_recomputes_from_children() {
        let n = node(2, node(1, node(0, None, None), None), None).unwrap();
        assert_eq!(2, n.height);
        assert_eq!(2, n.balance);
        assert!(n.exceeds(1));
        assert!(!n.exceeds(2));
    }

    #[test]
    fn rotate_left_promotes_right_child() {
        let t = node(1, node(0, None, None), node(3, node(2, None, None), node(4, None, None)));
        let root = rotate_left(t.unwrap());
        assert_eq!(3, root.key);
        assert_eq!(2, root.height);
        assert_eq!(1, root.balance);
        let root = Some(root);
        assert_eq!("((0 1 2) 3 4)", shape(&root));
    }

    #[test]
    fn rotate_right_promotes_left_child() {
        let t = node(3, node(1, node(0, None, None), node(2, None, None)), node(4, None, None));
        let root = Some(rotate_right(t.unwrap()));
        assert_eq!("(0 1 (2 3 4))", shape(&root));
        assert_eq!(-1, Node::balance_of(&root));
    }

    #[test]
    fn double_rotations() {
        let zig_zag = node(20, node(10, None, node(15, None, None)), None);
        let root = Some(rotate_left_right(zig_zag.unwrap()));
        assert_eq!("(10 15 20)", shape(&root));
        assert_eq!(1, Node::height_of(&root));

        let zag_zig = node(10, None, node(20, node(15, None, None), None));
        let root = Some(rotate_right_left(zag_zig.unwrap()));
        assert_eq!("(10 15 20)", shape(&root));
        assert_eq!(0, Node::balance_of(&root));
    }

    #[test]
    fn rotation_without_pivot_is_noop() {
        let root = Some(rotate_left(Node::leaf(7)));
        assert_eq!("7", shape(&root));
        let root = Some(rotate_right(Node::leaf(7)));
        assert_eq!("7", shape(&root));
    }

    #[test]
    fn delete_prefers_single_rotation() {
        // 5 lost its left child: right-heavy, right child balanced.
        let t = node(5, None, node(7, node(6, None, None), node(8, None, None)));
        let root = Some(rebalance_after_delete(t.unwrap(), 1));
        assert_eq!("((. 5 6) 7 8)", shape(&root));
    }

    #[test]
    fn take_first_and_last() {
        let t = node(2, node(1, None, None), node(3, None, node(4, None, None)));
        let (rest, first) = take_first(t.unwrap(), 1);
        assert_eq!(1, first);
        assert_eq!("(2 3 4)", shape(&rest));

        let (rest, last) = take_last(rest.unwrap(), 1);
        assert_eq!(4, last);
        assert_eq!("(2 3 .)", shape(&rest));
        assert_eq!(&2, rest.as_ref().unwrap().first());
        assert_eq!(&3, rest.as_ref().unwrap().last());
    }
}
