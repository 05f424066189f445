use std::iter::FusedIterator;

use crate::{AvlgTree, Node};

impl<T> AvlgTree<T> {
    /// Gets an iterator over the keys of the tree, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlg::AvlgTree;
    ///
    /// let mut a = AvlgTree::new(2).unwrap();
    /// a.insert(2);
    /// a.insert(1);
    /// a.insert(3);
    ///
    /// let keys: Vec<_> = a.iter().copied().collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// assert_eq!(Some(&3), a.iter().next_back());
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            front: Vec::new(),
            back: Vec::new(),
            len: self.len,
        };
        iter.push_left_spine(self.root.as_deref());
        iter.push_right_spine(self.root.as_deref());
        iter
    }
}

/// Borrowing in-order iterator, walking the tree from both ends with an
/// explicit stack per end.
pub struct Iter<'a, T> {
    front: Vec<&'a Node<T>>,
    back: Vec<&'a Node<T>>,
    // Both ends walk the same sequence; the remaining count keeps them from
    // crossing.
    len: usize,
}

impl<'a, T> Iter<'a, T> {
    fn push_left_spine(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(n) = node {
            self.front.push(n);
            node = n.left.as_deref();
        }
    }

    fn push_right_spine(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(n) = node {
            self.back.push(n);
            node = n.right.as_deref();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        let n = self.front.pop()?;
        self.push_left_spine(n.right.as_deref());
        self.len -= 1;
        Some(&n.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }

    fn min(mut self) -> Option<&'a T>
    where
        &'a T: Ord,
    {
        self.next()
    }

    fn max(mut self) -> Option<&'a T>
    where
        &'a T: Ord,
    {
        self.next_back()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        let n = self.back.pop()?;
        self.push_right_spine(n.left.as_deref());
        self.len -= 1;
        Some(&n.key)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            front: self.front.clone(),
            back: self.back.clone(),
            len: self.len,
        }
    }
}

impl<'a, T> IntoIterator for &'a AvlgTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Owning in-order iterator; every step unlinks the smallest or largest
/// remaining key.
pub struct IntoIter<T>(AvlgTree<T>);

impl<T> IntoIterator for AvlgTree<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an owning iterator over the keys of the tree, in sorted order.
    fn into_iter(self) -> IntoIter<T> {
        IntoIter(self)
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.pop_first()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }

    fn last(mut self) -> Option<T> {
        self.next_back()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.0.pop_last()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}
