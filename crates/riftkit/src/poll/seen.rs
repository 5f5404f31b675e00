use std::collections::{HashSet, VecDeque};

use super::Identified;

/// Identifiers seen so far, capped at `capacity`.
///
/// Once the set grows past its capacity the oldest identifiers are evicted.
/// Re-inserting an identifier that is still present does not move it.
#[derive(Debug, Clone)]
pub struct SeenSet {
    ids: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl SeenSet {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ids: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Rebuild from identifiers in insertion order, e.g. loaded from disk.
    pub fn from_ids<I>(capacity: usize, ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut set = Self::new(capacity);
        for id in ids {
            set.insert(id);
        }
        set
    }

    /// Returns `true` if `id` was not present.
    pub fn insert(&mut self, id: String) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.insert(id.clone());
        self.order.push_back(id);

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Record every identifier without reporting anything.
    pub fn prime<T: Identified>(&mut self, items: &[T]) {
        for item in items {
            self.insert(item.identifier());
        }
    }

    /// Identifiers from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raise the bound to at least `n`. Returns whether it grew.
    pub fn ensure_capacity(&mut self, n: usize) -> bool {
        if n > self.capacity {
            self.capacity = n;
            true
        } else {
            false
        }
    }
}

/// Items of `items` whose identifier was not in `seen`, in input order.
///
/// All identifiers are recorded, so the same item is reported once.
pub fn diff_new<'a, T: Identified>(items: &'a [T], seen: &mut SeenSet) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| seen.insert(item.identifier()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item(&'static str);

    impl Identified for Item {
        fn identifier(&self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn test_insert_reports_new_once() {
        let mut seen = SeenSet::new(10);
        assert!(seen.insert("a".into()));
        assert!(!seen.insert("a".into()));
        assert!(seen.contains("a"));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_evicts_oldest_past_capacity() {
        let mut seen = SeenSet::new(3);
        for id in ["a", "b", "c", "d"] {
            seen.insert(id.into());
        }
        assert_eq!(seen.len(), 3);
        assert!(!seen.contains("a"));
        assert_eq!(seen.iter().cloned().collect::<Vec<_>>(), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_reinsert_does_not_refresh_position() {
        let mut seen = SeenSet::new(2);
        seen.insert("a".into());
        seen.insert("b".into());
        seen.insert("a".into());
        seen.insert("c".into());
        assert!(!seen.contains("a"));
        assert!(seen.contains("b"));
        assert!(seen.contains("c"));
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut seen = SeenSet::new(0);
        seen.insert("a".into());
        assert_eq!(seen.capacity(), 1);
        assert!(seen.contains("a"));
    }

    #[test]
    fn test_diff_new_preserves_order_and_dedups_batch() {
        let mut seen = SeenSet::new(10);
        seen.insert("b".into());

        let items = [Item("c"), Item("b"), Item("a"), Item("c")];
        let fresh: Vec<&str> = diff_new(&items, &mut seen).iter().map(|i| i.0).collect();
        assert_eq!(fresh, vec!["c", "a"]);

        let fresh = diff_new(&items, &mut seen);
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_prime_reports_nothing_afterwards() {
        let mut seen = SeenSet::new(10);
        let items = [Item("x"), Item("y")];
        seen.prime(&items);
        assert!(diff_new(&items, &mut seen).is_empty());
    }

    #[test]
    fn test_from_ids_respects_capacity() {
        let seen = SeenSet::from_ids(2, ["1", "2", "3"].map(String::from));
        assert_eq!(seen.iter().cloned().collect::<Vec<_>>(), vec!["2", "3"]);
    }

    #[test]
    fn test_ensure_capacity_only_grows() {
        let mut seen = SeenSet::new(2);
        assert!(!seen.ensure_capacity(1));
        assert_eq!(seen.capacity(), 2);
        assert!(seen.ensure_capacity(4));
        for id in ["a", "b", "c", "d"] {
            seen.insert(id.into());
        }
        assert!(seen.contains("a"));
        assert_eq!(seen.len(), 4);
    }
}
