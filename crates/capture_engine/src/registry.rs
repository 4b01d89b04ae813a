//! Subscriber registry - a tombstoned slot arena
//!
//! Removal empties a slot instead of compacting, so an index captured by a
//! delivery pass running without the engine lock stays meaningful. Freed
//! indices go to a min-heap and the lowest one is reused first.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::subscriber::{Subscriber, WeakSubscriber};

#[derive(Default)]
pub(crate) struct Registry {
    slots: Vec<Option<WeakSubscriber>>,
    free: BinaryHeap<Reverse<usize>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber, returning its slot
    pub(crate) fn insert(&mut self, subscriber: &Subscriber) -> usize {
        self.reap();
        let weak = subscriber.downgrade();
        match self.free.pop() {
            Some(Reverse(index)) => {
                self.slots[index] = Some(weak);
                index
            }
            None => {
                self.slots.push(Some(weak));
                self.slots.len() - 1
            }
        }
    }

    /// Remove one registration of `subscriber` (the lowest slot)
    pub(crate) fn remove(&mut self, subscriber: &Subscriber) -> bool {
        let found = self
            .slots
            .iter()
            .position(|slot| matches!(slot, Some(weak) if weak.refers_to(subscriber)));
        match found {
            Some(index) => {
                self.vacate(index);
                true
            }
            None => false,
        }
    }

    /// Live subscriber at `index`, if any
    pub(crate) fn get(&self, index: usize) -> Option<Subscriber> {
        self.slots.get(index)?.as_ref()?.upgrade()
    }

    /// Exclusive upper bound of slot indices
    pub(crate) fn upper_bound(&self) -> usize {
        self.slots.len()
    }

    /// Number of registrations whose subscriber is still alive
    pub(crate) fn live_count(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|weak| weak.is_alive())
            .count()
    }

    pub(crate) fn is_occupied(&self) -> bool {
        self.slots.iter().flatten().any(WeakSubscriber::is_alive)
    }

    /// Live subscribers in slot order
    pub(crate) fn snapshot(&self) -> Vec<Subscriber> {
        self.slots
            .iter()
            .flatten()
            .filter_map(WeakSubscriber::upgrade)
            .collect()
    }

    /// Tombstone slots whose subscriber has been dropped
    fn reap(&mut self) {
        for index in 0..self.slots.len() {
            if matches!(&self.slots[index], Some(weak) if !weak.is_alive()) {
                self.vacate(index);
            }
        }
    }

    fn vacate(&mut self, index: usize) {
        self.slots[index] = None;
        self.free.push(Reverse(index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(name: &str) -> Subscriber {
        Subscriber::new(name, |_| Ok(()))
    }

    #[test]
    fn test_removal_keeps_indices() {
        let (a, b, c) = (sub("a"), sub("b"), sub("c"));
        let mut registry = Registry::new();
        assert_eq!(registry.insert(&a), 0);
        assert_eq!(registry.insert(&b), 1);
        assert_eq!(registry.insert(&c), 2);

        assert!(registry.remove(&b));
        assert_eq!(registry.upper_bound(), 3);
        assert!(registry.get(1).is_none());
        assert_eq!(registry.get(2), Some(c.clone()));
        assert_eq!(registry.snapshot(), vec![a, c]);
    }

    #[test]
    fn test_lowest_free_slot_reused() {
        let subs: Vec<_> = (0..4).map(|i| sub(&format!("s{i}"))).collect();
        let mut registry = Registry::new();
        for s in &subs {
            registry.insert(s);
        }
        registry.remove(&subs[3]);
        registry.remove(&subs[1]);

        let late = sub("late");
        assert_eq!(registry.insert(&late), 1);
        assert_eq!(registry.insert(&late), 3);
        assert_eq!(registry.upper_bound(), 4);
    }

    #[test]
    fn test_duplicate_registration_removed_one_at_a_time() {
        let a = sub("a");
        let mut registry = Registry::new();
        registry.insert(&a);
        registry.insert(&a);
        assert_eq!(registry.live_count(), 2);

        assert!(registry.remove(&a));
        assert_eq!(registry.live_count(), 1);
        assert!(registry.get(0).is_none());
        assert!(registry.remove(&a));
        assert!(!registry.remove(&a));
        assert!(!registry.is_occupied());
    }

    #[test]
    fn test_dropped_subscriber_not_counted() {
        let keep = sub("keep");
        let gone = sub("gone");
        let mut registry = Registry::new();
        registry.insert(&gone);
        registry.insert(&keep);
        drop(gone);

        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.snapshot(), vec![keep]);

        // dead slot is reclaimed on the next insert
        let next = sub("next");
        assert_eq!(registry.insert(&next), 0);
    }
}
