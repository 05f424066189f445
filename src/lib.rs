//! An AVL tree whose per-node imbalance bound is configurable.
//!
//! A classic AVL tree keeps the heights of every node's subtrees within 1 of
//! each other. An AVL-G tree relaxes that bound to any `G >= 1`: larger values
//! rotate less often at the price of taller trees. `G = 1` is a textbook AVL
//! tree.
//!
//! ```
//! use avlg::AvlgTree;
//!
//! let mut tree = AvlgTree::new(2).unwrap();
//! for key in [20, 10, 5] {
//!     tree.insert(key);
//! }
//! // Within the bound, no rotation happened.
//! assert_eq!(Ok(&20), tree.root());
//! assert_eq!(2, tree.height());
//!
//! tree.insert(1);
//! assert_eq!(Ok(&10), tree.root());
//! assert!(tree.is_avlg_balanced());
//! ```
mod iter;
mod node;
mod tree;

pub use iter::{IntoIter, Iter};

use thiserror::Error;

pub(crate) type Link<T> = Option<Box<Node<T>>>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("the tree is empty")]
    EmptyTree,
    #[error("invalid maximum imbalance {0}, it must be at least 1")]
    InvalidBalance(u32),
}

pub(crate) struct Node<T> {
    pub(crate) key: T,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
    // Length of the longest downward path; a leaf is 0.
    pub(crate) height: i32,
    // height(left) - height(right), an absent child counting as -1.
    pub(crate) balance: i32,
}

/// An ordered set of keys balanced so that no node's subtrees differ in
/// height by more than `max_imbalance`.
///
/// T is the type of the keys stored in the tree.
pub struct AvlgTree<T> {
    root: Link<T>,
    len: usize,
    max_imbalance: u32,
}
