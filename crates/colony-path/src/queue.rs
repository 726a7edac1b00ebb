//! `IndexedPriorityQueue` — binary min-heap with an item → slot index.
//!
//! # Why the index
//!
//! A* re-prioritises a node every time it finds a cheaper route to it.  With
//! a plain `BinaryHeap` that means pushing duplicates and skipping stale
//! entries on pop.  Keeping an item → slot map makes `contains` O(1) and lets
//! `update_priority` sift the existing entry in O(log n) instead.
//!
//! The map is rewritten on every swap, so each item appears at most once.
//!
//! # Ties
//!
//! The heap is not stable: among equal priorities the dequeue order depends
//! on the heap's internal layout, not on insertion order.

use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Min-priority queue of unique items.
#[derive(Debug, Clone)]
pub struct IndexedPriorityQueue<T> {
    heap:  Vec<(T, u32)>,
    index: FxHashMap<T, usize>,
}

impl<T: Hash + Eq + Clone> Default for IndexedPriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq + Clone> IndexedPriorityQueue<T> {
    pub fn new() -> Self {
        Self { heap: Vec::new(), index: FxHashMap::default() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut index = FxHashMap::default();
        index.reserve(capacity);
        Self { heap: Vec::with_capacity(capacity), index }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// O(1).
    pub fn contains(&self, item: &T) -> bool {
        self.index.contains_key(item)
    }

    /// Current priority of `item`, if queued.
    pub fn priority(&self, item: &T) -> Option<u32> {
        self.index.get(item).map(|&slot| self.heap[slot].1)
    }

    /// Insert `item`, or re-prioritise it if it is already queued.
    pub fn enqueue(&mut self, item: T, priority: u32) {
        if let Some(&slot) = self.index.get(&item) {
            self.set_priority_at(slot, priority);
            return;
        }
        let slot = self.heap.len();
        self.index.insert(item.clone(), slot);
        self.heap.push((item, priority));
        self.bubble_up(slot);
    }

    /// Change the priority of a queued item.  Returns `false` if absent.
    pub fn update_priority(&mut self, item: &T, priority: u32) -> bool {
        match self.index.get(item) {
            Some(&slot) => {
                self.set_priority_at(slot, priority);
                true
            }
            None => false,
        }
    }

    /// Remove and return the minimum-priority item.
    pub fn dequeue(&mut self) -> Option<(T, u32)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let (item, priority) = self.heap.pop()?;
        self.index.remove(&item);
        if !self.heap.is_empty() {
            self.bubble_down(0);
        }
        Some((item, priority))
    }

    pub fn peek(&self) -> Option<(&T, u32)> {
        self.heap.first().map(|(item, p)| (item, *p))
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.index.clear();
    }

    // ── Heap internals ────────────────────────────────────────────────────

    fn set_priority_at(&mut self, slot: usize, priority: u32) {
        let old = std::mem::replace(&mut self.heap[slot].1, priority);
        if priority < old {
            self.bubble_up(slot);
        } else if priority > old {
            self.bubble_down(slot);
        }
    }

    fn bubble_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.heap[slot].1 >= self.heap[parent].1 {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn bubble_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < len && self.heap[left].1 < self.heap[smallest].1 {
                smallest = left;
            }
            if right < len && self.heap[right].1 < self.heap[smallest].1 {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        if let Some(s) = self.index.get_mut(&self.heap[a].0) {
            *s = a;
        }
        if let Some(s) = self.index.get_mut(&self.heap[b].0) {
            *s = b;
        }
    }
}
