/// Stable handle of a cluster inside the chain's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ClusterId(pub(crate) usize);

/// A fixed-capacity run of consecutive elements, linked to its neighbours.
#[derive(Clone)]
pub struct Cluster<T, const N: usize> {
    items: Vec<T>,
    prev: Option<ClusterId>,
    next: Option<ClusterId>,
}

impl<T, const N: usize> Cluster<T, N> {
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(N),
            prev: None,
            next: None,
        }
    }

    pub fn from_items(items: Vec<T>) -> Self {
        assert!(items.len() <= N, "Cluster overflow: {} > {}", items.len(), N);

        let mut this = Self::new();
        this.items.extend(items);
        this
    }

    #[inline]
    pub fn push_back(&mut self, value: T) {
        self.insert(self.len(), value);
    }

    pub fn insert(&mut self, index: usize, value: T) {
        if index > self.len() {
            panic!("Index out of bounds: cannot insert at index {}", index);
        }

        if self.is_full() {
            panic!("Cluster is full: cannot insert more elements");
        }

        self.items.insert(index, value);
    }

    pub fn remove(&mut self, index: usize) -> T {
        if index >= self.len() {
            panic!("Index out of bounds: cannot remove at index {}", index);
        }

        self.items.remove(index)
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn replace(&mut self, index: usize, value: T) -> T {
        std::mem::replace(&mut self.items[index], value)
    }

    /// Splits off the elements from `at` onwards, leaving `[0, at)` in place.
    pub fn split_off(&mut self, at: usize) -> Vec<T> {
        let mut tail = self.items.split_off(at);
        tail.reserve_exact(N.saturating_sub(tail.len()));
        tail
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn position(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.items.iter().position(|item| item == value)
    }

    #[inline]
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.items.contains(value)
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= N
    }

    #[inline]
    pub const fn prev(&self) -> Option<ClusterId> {
        self.prev
    }

    #[inline]
    pub const fn next(&self) -> Option<ClusterId> {
        self.next
    }

    #[inline]
    pub fn prev_mut(&mut self) -> &mut Option<ClusterId> {
        &mut self.prev
    }

    #[inline]
    pub fn next_mut(&mut self) -> &mut Option<ClusterId> {
        &mut self.next
    }
}

impl<T: std::fmt::Debug, const N: usize> std::fmt::Debug for Cluster<T, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Cluster;

    #[test]
    fn cluster_insert_puts_elements_in_the_correct_positions() {
        let mut sut: Cluster<i64, 6> = Cluster::new();
        assert_eq!(sut.len(), 0);
        assert!(sut.is_empty());

        sut.insert(0, 10);
        assert_eq!(sut.as_slice(), &[10]);

        sut.insert(1, 15);
        assert_eq!(sut.as_slice(), &[10, 15]);

        sut.insert(0, 5);
        assert_eq!(sut.as_slice(), &[5, 10, 15]);

        sut.insert(3, 20);
        sut.insert(2, 13);
        sut.insert(4, 17);
        assert_eq!(sut.as_slice(), &[5, 10, 13, 15, 17, 20]);
        assert!(sut.is_full());

        let result = std::panic::catch_unwind(move || sut.insert(6, 100));
        assert!(result.is_err());
    }

    #[test]
    fn cluster_insert_panics_on_index_out_of_bounds() {
        let mut sut: Cluster<i64, 6> = Cluster::new();

        let result = std::panic::catch_unwind(move || sut.insert(usize::MAX, 100));
        assert!(result.is_err());
    }

    #[test]
    fn cluster_remove_shifts_trailing_elements_left() {
        let mut sut: Cluster<i64, 6> = Cluster::from_items(vec![0, 1, 2, 3, 4, 5]);

        assert_eq!(sut.remove(2), 2);
        assert_eq!(sut.as_slice(), &[0, 1, 3, 4, 5]);

        assert_eq!(sut.remove(4), 5);
        assert_eq!(sut.as_slice(), &[0, 1, 3, 4]);

        assert_eq!(sut.remove(0), 0);
        assert_eq!(sut.as_slice(), &[1, 3, 4]);
        assert!(!sut.is_full());

        let result = std::panic::catch_unwind(move || sut.remove(3));
        assert!(result.is_err());
    }

    #[test]
    fn cluster_split_off_keeps_the_leading_half() {
        let mut sut: Cluster<i64, 4> = Cluster::from_items(vec![0, 1, 2, 3]);

        let tail = sut.split_off(1);
        assert_eq!(sut.as_slice(), &[0]);
        assert_eq!(tail, vec![1, 2, 3]);
        assert!(tail.capacity() >= 4);
    }

    #[test]
    fn cluster_position_finds_first_match() {
        let sut: Cluster<i64, 6> = Cluster::from_items(vec![7, 8, 7]);
        assert_eq!(sut.position(&7), Some(0));
        assert_eq!(sut.position(&8), Some(1));
        assert_eq!(sut.position(&9), None);
        assert!(sut.contains(&8));
        assert!(!sut.contains(&9));
    }

    #[test]
    fn cluster_replace_returns_previous_value() {
        let mut sut: Cluster<i64, 3> = Cluster::from_items(vec![1, 2, 3]);
        assert_eq!(sut.replace(1, 20), 2);
        assert_eq!(sut.as_slice(), &[1, 20, 3]);
    }

    #[test]
    fn cluster_get_with_empty_cluster_returns_none() {
        let sut: Cluster<i64, 6> = Cluster::new();
        assert_eq!(sut.get(0), None);
    }
}
