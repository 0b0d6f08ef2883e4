//! # cluster_list
//!
//! `cluster_list` implements an **unrolled linked list** of fixed-capacity clusters
//! augmented with a hash index and cached cursors, so that both positional access
//! and value lookups stay fast on large collections.
//!
//! ## Features
//! - Ordered sequence with index based access, insertion and removal at any position.
//! - `contains`, `index_of` and `remove_item` answered through layered hash tables
//!   mapping each element to the cluster holding it, instead of a linear scan.
//! - "Rails": cursors remembering a recently visited cluster and its starting index,
//!   which make localized and sequential `get` calls cheap.
//! - Chunked storage kept in an arena, linked by stable handles.
//!
//! ## Ownership
//! A `ClusterList` has a single owner. Every mutation takes `&mut self`, and the
//! position cache uses interior mutability, so the list is `Send` but not `Sync`:
//! wrap it in a `Mutex` to share it between threads.
//!
//! ## Example
//! ```rust
//! use cluster_list::ClusterList;
//!
//! let mut list: ClusterList<i64> = ClusterList::new();
//! list.push_back(2);
//! list.push_front(0);
//! list.insert(1, 1).unwrap();
//!
//! assert_eq!(list.front(), Some(&0));
//! assert_eq!(list.get(1), Some(&1));
//! assert_eq!(list.back(), Some(&2));
//!
//! assert!(list.contains(&2));
//! assert_eq!(list.index_of(&2), Some(2));
//!
//! assert!(list.remove_item(&1));
//! assert_eq!(list.pop_back(), Some(2));
//! assert_eq!(list.pop_front(), Some(0));
//! ```

mod chain;
mod cluster;
mod error;
mod into_iter;
mod iter;
mod lookup;
mod rails;
mod sailed;

pub use error::{Error, Result};
pub use into_iter::IntoIter;
pub use iter::Iter;
pub use rails::RAIL_SPACING;

use std::cell::RefCell;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::Index;

use crate::chain::Chain;
use crate::cluster::{Cluster, ClusterId};
use crate::lookup::{LookupIndex, hash_of};
use crate::rails::PositionCache;

/// Cluster capacity used when none is specified.
pub const DEFAULT_CLUSTER_CAPACITY: usize = 20;

pub enum Usize<const N: usize> {}

pub trait ClusterCapacity: crate::sailed::Sailed {}

/// An ordered list of fixed-capacity clusters with hash lookup and cached
/// positional access.
///
/// # Type Parameters
/// - `T`: The type of elements stored in the list.
/// - `N`: The maximum number of elements that each cluster can hold, 20 by default.
///
/// # Example
/// ```rust
/// use cluster_list::ClusterList;
///
/// let mut list: ClusterList<&str, 4> = ClusterList::new();
/// list.extend(["a", "b", "c", "d", "e"]);
///
/// assert_eq!(list.len(), 5);
/// assert_eq!(list.clusters().count(), 2);
/// assert_eq!(list.index_of(&"e"), Some(4));
/// ```
pub struct ClusterList<T, const N: usize = DEFAULT_CLUSTER_CAPACITY>
where
    Usize<N>: ClusterCapacity,
{
    chain: Chain<T, N>,
    index: LookupIndex,
    cache: RefCell<PositionCache>,
    len: usize,
}

impl<T, const N: usize> ClusterList<T, N>
where
    Usize<N>: ClusterCapacity,
{
    /// Creates a new, empty `ClusterList` with no elements and no allocated clusters.
    ///
    /// # Example
    /// ```rust
    /// use cluster_list::ClusterList;
    ///
    /// let list: ClusterList<i64> = ClusterList::new();
    ///
    /// assert!(list.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            chain: Chain::new(),
            index: LookupIndex::new(),
            cache: RefCell::new(PositionCache::default()),
            len: 0,
        }
    }

    /// Returns the number of elements currently stored in the `ClusterList`.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the `ClusterList` is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes all elements, releasing every cluster and lookup table.
    ///
    /// # Example
    /// ```rust
    /// use cluster_list::ClusterList;
    ///
    /// let mut list: ClusterList<i32, 4> = ClusterList::from([1, 2, 3]);
    /// list.clear();
    ///
    /// assert!(list.is_empty());
    /// assert!(!list.contains(&1));
    /// assert_eq!(list.front(), None);
    /// ```
    pub fn clear(&mut self) {
        self.chain.clear();
        self.index.clear();
        self.len = 0;
        self.invalidate();
    }

    /// Returns a reference to the element at the specified index, if any.
    ///
    /// Lookups landing in the first or last cluster are answered directly;
    /// anything else moves the closest rail.
    ///
    /// # Examples
    /// ```
    /// use cluster_list::ClusterList;
    ///
    /// let list: ClusterList<i64, 4> = ClusterList::from([10, 20, 30, 40, 50, 60, 70, 80, 90]);
    ///
    /// assert_eq!(list.get(0), Some(&10));
    /// assert_eq!(list.get(5), Some(&60));
    /// assert_eq!(list.get(9), None); // Out of bounds
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }

        let (id, start) = self.locate(index);
        self.chain.cluster(id).get(index - start)
    }

    /// Returns a reference to the first element, if any.
    pub fn front(&self) -> Option<&T> {
        self.chain
            .first()
            .and_then(|id| self.chain.cluster(id).get(0))
    }

    /// Returns a reference to the last element, if any.
    pub fn back(&self) -> Option<&T> {
        self.chain
            .last()
            .and_then(|id| self.chain.cluster(id).as_slice().last())
    }

    /// Provides an iterator over list's elements.
    ///
    /// Every call starts a fresh walk from the first cluster.
    ///
    /// # Examples
    /// ```
    /// use cluster_list::ClusterList;
    ///
    /// let list: ClusterList<_, 2> = ClusterList::from([0, 1, 2]);
    ///
    /// let mut iter = list.iter();
    /// assert_eq!(iter.next(), Some(&0));
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, N> {
        Iter::from_list(self)
    }

    /// Provides the clusters' contents, first to last.
    ///
    /// # Examples
    /// ```
    /// use cluster_list::ClusterList;
    ///
    /// let list: ClusterList<_, 2> = ClusterList::from([0, 1, 2]);
    /// let clusters = list.clusters().collect::<Vec<_>>();
    ///
    /// assert_eq!(clusters, [&[0, 1][..], &[2][..]]);
    /// ```
    pub fn clusters(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.chain
            .ids()
            .map(|id| self.chain.cluster(id).as_slice())
    }

    /// Clones the elements into a `Vec`, in list order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Clones every element into the front of `target`.
    ///
    /// # Errors
    /// - [`Error::DestinationTooShort`] if `target` cannot hold all elements.
    ///
    /// # Examples
    /// ```
    /// use cluster_list::ClusterList;
    ///
    /// let list: ClusterList<i32, 2> = ClusterList::from([1, 2, 3]);
    /// let mut target = [0; 5];
    ///
    /// list.copy_to(&mut target[1..]).unwrap();
    /// assert_eq!(target, [0, 1, 2, 3, 0]);
    ///
    /// assert!(list.copy_to(&mut [0; 2]).is_err());
    /// ```
    pub fn copy_to(&self, target: &mut [T]) -> Result<()>
    where
        T: Clone,
    {
        if target.len() < self.len {
            return Err(Error::DestinationTooShort {
                needed: self.len,
                available: target.len(),
            });
        }

        for (slot, value) in target.iter_mut().zip(self.iter()) {
            slot.clone_from(value);
        }

        Ok(())
    }

    /// Returns the cluster covering `index` and the index of its first element.
    fn locate(&self, index: usize) -> (ClusterId, usize) {
        debug_assert!(index < self.len);

        let first = self.chain.first().expect("non-empty list has a first cluster");
        if index < self.chain.cluster(first).len() {
            return (first, 0);
        }

        let last = self.chain.last().expect("non-empty list has a last cluster");
        let last_start = self.len - self.chain.cluster(last).len();
        if index >= last_start {
            return (last, last_start);
        }

        self.cache.borrow_mut().locate(&self.chain, self.len, index)
    }

    /// Drops all derived positional state; required after any change of
    /// cluster boundaries.
    #[inline]
    fn invalidate(&mut self) {
        *self.cache.get_mut() = PositionCache::default();
    }

    fn out_of_bounds(&self, index: usize) -> Error {
        Error::IndexOutOfBounds {
            index,
            len: self.len,
        }
    }
}

impl<T, const N: usize> ClusterList<T, N>
where
    T: Hash + Eq,
    Usize<N>: ClusterCapacity,
{
    /// Adds an element to the back of the `ClusterList`.
    ///
    /// If the last cluster is full, a new one will be allocated to
    /// accommodate the element.
    ///
    /// # Example
    /// ```rust
    /// use cluster_list::ClusterList;
    ///
    /// let mut list: ClusterList<i64, 6> = ClusterList::new();
    /// list.push_back(10);
    /// list.push_back(20);
    ///
    /// assert_eq!(list.len(), 2);
    ///
    /// assert_eq!(list.pop_back(), Some(20));
    /// assert_eq!(list.pop_back(), Some(10));
    /// ```
    pub fn push_back(&mut self, value: T) {
        let hash = hash_of(&value);
        let id = match self.chain.last() {
            Some(last) if !self.chain.cluster(last).is_full() => last,
            _ => self.chain.push_back(Cluster::new()),
        };

        self.chain.cluster_mut(id).push_back(value);
        self.index.register(hash, id);
        self.len += 1;
        self.invalidate();
    }

    /// Adds an element to the front of the `ClusterList`.
    ///
    /// # Example
    /// ```rust
    /// use cluster_list::ClusterList;
    ///
    /// let mut list: ClusterList<i64, 6> = ClusterList::new();
    /// list.push_front(10);
    /// list.push_front(20);
    ///
    /// assert_eq!(list.pop_front(), Some(20));
    /// assert_eq!(list.pop_front(), Some(10));
    /// ```
    pub fn push_front(&mut self, value: T) {
        if self.is_empty() {
            self.push_back(value);
            return;
        }

        self.insert_within(0, value);
    }

    /// Inserts an element at the specified index, shifting subsequent elements to the right.
    ///
    /// Inserting at the first position of a cluster whose predecessor has room
    /// appends to the predecessor. Inserting into a full cluster splits it at the
    /// insertion point: the new element closes the left half and the trailing
    /// elements move to a freshly linked cluster.
    ///
    /// # Errors
    /// - [`Error::IndexOutOfBounds`] if `index` is greater than the list's length.
    ///
    /// # Examples
    /// ```
    /// use cluster_list::ClusterList;
    ///
    /// let mut list: ClusterList<i64, 3> = ClusterList::from([10, 30]);
    /// list.insert(1, 20).unwrap();
    /// list.insert(3, 40).unwrap();
    ///
    /// assert_eq!(list, [10, 20, 30, 40]);
    /// assert!(list.insert(9, 90).is_err());
    /// ```
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.len {
            return Err(self.out_of_bounds(index));
        }

        if index == self.len {
            self.push_back(value);
        } else {
            self.insert_within(index, value);
        }

        Ok(())
    }

    /// Moves all elements from `other` to the end of this list, leaving `other` empty.
    pub fn append(&mut self, other: &mut Self) {
        self.extend(std::mem::take(other));
    }

    /// Removes and returns the element at the specified index, shifting subsequent elements left.
    ///
    /// # Errors
    /// - [`Error::IndexOutOfBounds`] if `index` is not lower than the list's length.
    ///
    /// # Examples
    /// ```
    /// use cluster_list::ClusterList;
    ///
    /// let mut list: ClusterList<i64, 4> = ClusterList::from([10, 20, 30, 40, 50]);
    ///
    /// assert_eq!(list.remove(1), Ok(20));
    /// assert_eq!(list.get(1), Some(&30));
    /// assert_eq!(list.len(), 4);
    ///
    /// assert!(list.remove(10).is_err());
    /// ```
    pub fn remove(&mut self, index: usize) -> Result<T> {
        if index >= self.len {
            return Err(self.out_of_bounds(index));
        }

        let (id, start) = self.locate(index);
        Ok(self.remove_within(id, index - start))
    }

    /// Removes the first element equal to `value`.
    ///
    /// Returns `false`, leaving the list untouched, when no such element exists.
    ///
    /// # Examples
    /// ```
    /// use cluster_list::ClusterList;
    ///
    /// let mut list: ClusterList<&str, 2> = ClusterList::from(["a", "b", "a"]);
    ///
    /// assert!(list.remove_item(&"a"));
    /// assert_eq!(list, ["b", "a"]);
    /// assert!(!list.remove_item(&"z"));
    /// ```
    pub fn remove_item(&mut self, value: &T) -> bool {
        let Some((id, offset)) = self.position_of(value) else {
            return false;
        };

        self.remove_within(id, offset);
        true
    }

    /// Removes and returns the first element, if any.
    pub fn pop_front(&mut self) -> Option<T> {
        self.remove(0).ok()
    }

    /// Removes and returns the last element, if any.
    pub fn pop_back(&mut self) -> Option<T> {
        self.remove(self.len.checked_sub(1)?).ok()
    }

    /// Replaces the element at `index`, returning the previous one.
    ///
    /// Cluster boundaries do not move, so rails stay valid.
    ///
    /// # Errors
    /// - [`Error::IndexOutOfBounds`] if `index` is not lower than the list's length.
    ///
    /// # Examples
    /// ```
    /// use cluster_list::ClusterList;
    ///
    /// let mut list: ClusterList<i64, 2> = ClusterList::from([1, 2, 3]);
    ///
    /// assert_eq!(list.set(1, 20), Ok(2));
    /// assert!(list.contains(&20));
    /// assert!(!list.contains(&2));
    /// ```
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        if index >= self.len {
            return Err(self.out_of_bounds(index));
        }

        let (id, start) = self.locate(index);
        let hash = hash_of(&value);
        let old = self.chain.cluster_mut(id).replace(index - start, value);

        let registered = self.index.deregister(hash_of(&old), id);
        debug_assert!(registered, "replaced element was not indexed");
        self.index.register(hash, id);

        Ok(old)
    }

    /// Returns `true` if the list holds an element equal to `value`.
    ///
    /// # Examples
    /// ```
    /// use cluster_list::ClusterList;
    ///
    /// let list: ClusterList<i64> = (0..1000).collect();
    ///
    /// assert!(list.contains(&999));
    /// assert!(!list.contains(&1000));
    /// ```
    pub fn contains(&self, value: &T) -> bool {
        self.index
            .lookup(hash_of(value), |id| self.chain.cluster(id).contains(value))
            .is_some()
    }

    /// Returns the position of the first element equal to `value`, if any.
    ///
    /// # Examples
    /// ```
    /// use cluster_list::ClusterList;
    ///
    /// let list: ClusterList<i64, 4> = ClusterList::from([5, 6, 7, 6, 5]);
    ///
    /// assert_eq!(list.index_of(&6), Some(1));
    /// assert_eq!(list.index_of(&5), Some(0));
    /// assert_eq!(list.index_of(&8), None);
    /// ```
    pub fn index_of(&self, value: &T) -> Option<usize> {
        let (id, offset) = self.position_of(value)?;
        let start = self.cache.borrow_mut().start_of(&self.chain, id);
        Some(start + offset)
    }

    /// Checks the structural invariants of the list.
    ///
    /// Verifies chain links and endpoints, the absence of empty clusters, the
    /// element count, and that the lookup tables hold exactly one entry per
    /// element, pointing at the cluster that stores it. Meant for tests and
    /// debugging; no operation calls it.
    pub fn validate(&self) -> Result<()> {
        self.chain.validate().map_err(Error::Corrupted)?;

        let mut expected = rustc_hash::FxHashMap::<(u64, ClusterId), isize>::default();
        let mut len = 0;

        for id in self.chain.ids() {
            for value in self.chain.cluster(id).as_slice() {
                *expected.entry((hash_of(value), id)).or_default() += 1;
                len += 1;
            }
        }

        if len != self.len {
            return Err(Error::Corrupted("element count does not match the chain"));
        }

        for entry in self.index.entries() {
            *expected.entry(entry).or_default() -= 1;
        }

        if expected.values().any(|&count| count != 0) {
            return Err(Error::Corrupted("lookup tables disagree with the chain"));
        }

        Ok(())
    }

    /// Inserts at `index`, which must be lower than the list's length.
    fn insert_within(&mut self, index: usize, value: T) {
        let (mut id, mut start) = self.locate(index);

        if index == start {
            if let Some(prev) = self.chain.cluster(id).prev() {
                let prev_len = self.chain.cluster(prev).len();
                if prev_len < N {
                    id = prev;
                    start -= prev_len;
                }
            }
        }

        let offset = index - start;
        let hash = hash_of(&value);

        if self.chain.cluster(id).is_full() {
            self.split_insert(id, offset, value);
        } else {
            self.chain.cluster_mut(id).insert(offset, value);
        }

        self.index.register(hash, id);
        self.len += 1;
        self.invalidate();
    }

    /// Splits the full cluster `id` at `offset` and appends `value` to its left half.
    fn split_insert(&mut self, id: ClusterId, offset: usize, value: T) {
        let tail = self.chain.cluster_mut(id).split_off(offset);
        let right = self.chain.insert_after(id, Cluster::from_items(tail));

        for moved in self.chain.cluster(right).as_slice() {
            self.index.reassign(hash_of(moved), id, right);
        }

        self.chain.cluster_mut(id).push_back(value);

        tracing::trace!(left = id.0, right = right.0, offset, "split full cluster");
    }

    /// Removes the element at `offset` inside cluster `id`.
    fn remove_within(&mut self, id: ClusterId, offset: usize) -> T {
        let cluster = self.chain.cluster_mut(id);
        let value = cluster.remove(offset);

        if cluster.is_empty() {
            self.chain.unlink(id);
        }

        let registered = self.index.deregister(hash_of(&value), id);
        debug_assert!(registered, "removed element was not indexed");

        self.len -= 1;
        self.invalidate();
        value
    }

    /// Cluster and in-cluster offset of the first element equal to `value`.
    fn position_of(&self, value: &T) -> Option<(ClusterId, usize)> {
        let mut found = self.index.candidates(hash_of(value)).filter_map(|id| {
            self.chain
                .cluster(id)
                .position(value)
                .map(|offset| (id, offset))
        });

        let first = found.next()?;
        let Some(second) = found.next() else {
            return Some(first);
        };

        // Duplicates may live in several clusters: pick the earliest one.
        let mut cache = self.cache.borrow_mut();
        [first, second]
            .into_iter()
            .chain(found)
            .min_by_key(|&(id, offset)| cache.start_of(&self.chain, id) + offset)
    }
}

impl<T, const N: usize, const M: usize> From<[T; M]> for ClusterList<T, N>
where
    T: Hash + Eq,
    Usize<N>: ClusterCapacity,
{
    fn from(values: [T; M]) -> Self {
        values.into_iter().collect()
    }
}

impl<T, const N: usize> FromIterator<T> for ClusterList<T, N>
where
    T: Hash + Eq,
    Usize<N>: ClusterCapacity,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut this = Self::new();
        this.extend(iter);
        this
    }
}

impl<T, const N: usize> Extend<T> for ClusterList<T, N>
where
    T: Hash + Eq,
    Usize<N>: ClusterCapacity,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|value| self.push_back(value));
    }
}

impl<'a, T, const N: usize> Extend<&'a T> for ClusterList<T, N>
where
    T: Clone + Hash + Eq,
    Usize<N>: ClusterCapacity,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().cloned());
    }
}

impl<T, const N: usize> Default for ClusterList<T, N>
where
    Usize<N>: ClusterCapacity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const N: usize> Clone for ClusterList<T, N>
where
    Usize<N>: ClusterCapacity,
{
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            index: self.index.clone(),
            cache: RefCell::new(PositionCache::default()),
            len: self.len,
        }
    }
}

impl<T, const N: usize> Index<usize> for ClusterList<T, N>
where
    Usize<N>: ClusterCapacity,
{
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Some(value) => value,
            None => panic!("{}", self.out_of_bounds(index)),
        }
    }
}

impl<T, const N: usize, const M: usize> PartialEq<[T; M]> for ClusterList<T, N>
where
    T: PartialEq,
    Usize<N>: ClusterCapacity,
{
    fn eq(&self, other: &[T; M]) -> bool {
        self.len() == other.len() && self.iter().eq(other)
    }
}

impl<T, const N: usize> PartialEq<&[T]> for ClusterList<T, N>
where
    T: PartialEq,
    Usize<N>: ClusterCapacity,
{
    fn eq(&self, other: &&[T]) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T, const N: usize> PartialEq<[T]> for ClusterList<T, N>
where
    T: PartialEq,
    Usize<N>: ClusterCapacity,
{
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len() && self.iter().eq(other)
    }
}

impl<T, const N: usize> PartialEq for ClusterList<T, N>
where
    T: PartialEq,
    Usize<N>: ClusterCapacity,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other)
    }
}

impl<T, const N: usize> Eq for ClusterList<T, N>
where
    T: Eq,
    Usize<N>: ClusterCapacity,
{
}

impl<T, const N: usize> PartialOrd for ClusterList<T, N>
where
    T: PartialOrd,
    Usize<N>: ClusterCapacity,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other)
    }
}

impl<T, const N: usize> Ord for ClusterList<T, N>
where
    T: Ord,
    Usize<N>: ClusterCapacity,
{
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other)
    }
}

impl<T, const N: usize> Hash for ClusterList<T, N>
where
    T: Hash,
    Usize<N>: ClusterCapacity,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        self.iter().for_each(|v| v.hash(state));
    }
}

impl<T, const N: usize> std::fmt::Debug for ClusterList<T, N>
where
    T: std::fmt::Debug,
    Usize<N>: ClusterCapacity,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.clusters()).finish()
    }
}

impl<T, const N: usize> IntoIterator for ClusterList<T, N>
where
    Usize<N>: ClusterCapacity,
{
    type Item = T;
    type IntoIter = IntoIter<T, N>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::from_list(self)
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a ClusterList<T, N>
where
    Usize<N>: ClusterCapacity,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        Iter::from_list(self)
    }
}
