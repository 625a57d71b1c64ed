// Copyright 2025 Lars Brubaker
// License: MIT
//
// Fixed-capacity arenas backing the mesh.
//
// Storage is reserved once at construction and never grows: an allocation
// that would exceed the capacity returns INVALID instead. Items are never
// freed individually; `clear` drops everything at once.

use core::ops::{Index, IndexMut};

pub const INVALID: u32 = u32::MAX;

/// A Vec-backed arena with a hard capacity.
#[derive(Clone, Debug)]
pub struct Arena<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> Arena<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Store `item`, returning its index, or INVALID if the arena is full.
    pub fn alloc(&mut self, item: T) -> u32 {
        if self.items.len() >= self.capacity {
            return INVALID;
        }
        let idx = self.items.len() as u32;
        self.items.push(item);
        idx
    }

    /// Number of free slots.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.items.len()
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
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every item; the reserved storage is kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, idx: u32) -> Option<&T> {
        self.items.get(idx as usize)
    }

    pub fn get_mut(&mut self, idx: u32) -> Option<&mut T> {
        self.items.get_mut(idx as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.items.iter().enumerate().map(|(i, t)| (i as u32, t))
    }
}

impl<T> Index<u32> for Arena<T> {
    type Output = T;

    #[inline]
    fn index(&self, idx: u32) -> &T {
        debug_assert!((idx as usize) < self.items.len(), "stale arena index {}", idx);
        &self.items[idx as usize]
    }
}

impl<T> IndexMut<u32> for Arena<T> {
    #[inline]
    fn index_mut(&mut self, idx: u32) -> &mut T {
        debug_assert!((idx as usize) < self.items.len(), "stale arena index {}", idx);
        &mut self.items[idx as usize]
    }
}
