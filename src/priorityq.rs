// Copyright 2025 Lars Brubaker
// License: MIT
//
// Open set for the pathfinder: an indexed binary min-heap of half-edges.
//
//   nodes[1..=size] are active; nodes[0] is unused.
//   slot[edge] is the heap position of `edge`, or 0 when it is not queued,
//   which makes decrease-key O(log n).
//
// Keys compare as (f, h, edge), a total order, so the pop sequence is fully
// determined by the inserted keys.

use crate::geom::Real;
use crate::mesh::EdgeIdx;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct OpenKey {
    pub f: Real,
    pub h: Real,
    pub edge: EdgeIdx,
}

#[derive(Clone, Debug)]
pub struct OpenSet {
    nodes: Vec<OpenKey>,
    slot: Vec<u32>,
}

impl OpenSet {
    /// An empty set able to hold any half-edge below `edge_capacity`.
    pub fn new(edge_capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(edge_capacity + 1);
        nodes.push(OpenKey {
            f: Real::MIN,
            h: Real::MIN,
            edge: 0,
        });
        Self {
            nodes,
            slot: vec![0; edge_capacity],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(&self, edge: EdgeIdx) -> bool {
        self.slot.get(edge as usize).is_some_and(|&s| s != 0)
    }

    pub fn clear(&mut self) {
        for key in self.nodes.drain(1..) {
            self.slot[key.edge as usize] = 0;
        }
    }

    pub fn peek(&self) -> Option<OpenKey> {
        self.nodes.get(1).copied()
    }

    /// Queue `edge`, or lower its key if it is already queued with a larger
    /// one. Returns false when the existing key was not larger.
    pub fn push_or_decrease(&mut self, edge: EdgeIdx, f: Real, h: Real) -> bool {
        let key = OpenKey { f, h, edge };
        if edge as usize >= self.slot.len() {
            self.slot.resize(edge as usize + 1, 0);
        }
        let curr = self.slot[edge as usize] as usize;
        if curr != 0 {
            if key >= self.nodes[curr] {
                return false;
            }
            self.nodes[curr] = key;
            self.float_up(curr);
            return true;
        }
        self.nodes.push(key);
        let curr = self.nodes.len() - 1;
        self.slot[edge as usize] = curr as u32;
        self.float_up(curr);
        true
    }

    /// Remove and return the smallest key.
    pub fn pop(&mut self) -> Option<OpenKey> {
        if self.is_empty() {
            return None;
        }
        let min = self.nodes.swap_remove(1);
        self.slot[min.edge as usize] = 0;
        if self.len() > 0 {
            let moved = self.nodes[1].edge;
            self.slot[moved as usize] = 1;
            self.float_down(1);
        }
        Some(min)
    }

    fn float_up(&mut self, mut curr: usize) {
        let key = self.nodes[curr];
        while curr > 1 {
            let parent = curr >> 1;
            if self.nodes[parent] <= key {
                break;
            }
            self.nodes[curr] = self.nodes[parent];
            self.slot[self.nodes[curr].edge as usize] = curr as u32;
            curr = parent;
        }
        self.nodes[curr] = key;
        self.slot[key.edge as usize] = curr as u32;
    }

    fn float_down(&mut self, mut curr: usize) {
        let key = self.nodes[curr];
        let size = self.len();
        loop {
            let mut child = curr << 1;
            if child > size {
                break;
            }
            if child < size && self.nodes[child + 1] < self.nodes[child] {
                child += 1;
            }
            if key <= self.nodes[child] {
                break;
            }
            self.nodes[curr] = self.nodes[child];
            self.slot[self.nodes[curr].edge as usize] = curr as u32;
            curr = child;
        }
        self.nodes[curr] = key;
        self.slot[key.edge as usize] = curr as u32;
    }
}
