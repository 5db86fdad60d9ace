//! Cursors over a `HashTable`.
//!
//! `Position` is the traversal engine: a bucket index plus the slot of the
//! current entry in that bucket's chain. `Cursor` and `CursorMut` are thin
//! wrappers pairing a position with a shared or exclusive table borrow.

use crate::table::{HashTable, Node};
use core::fmt;
use core::iter::FusedIterator;
use slotmap::DefaultKey;
use std::collections::hash_map::RandomState;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Position {
    bucket: usize,
    slot: Option<DefaultKey>,
}

impl Position {
    pub(crate) const END: Position = Position {
        bucket: 0,
        slot: None,
    };

    pub(crate) fn at(bucket: usize, slot: DefaultKey) -> Self {
        Position {
            bucket,
            slot: Some(slot),
        }
    }

    pub(crate) fn slot(&self) -> Option<DefaultKey> {
        self.slot
    }

    pub(crate) fn good(&self) -> bool {
        self.slot.is_some()
    }

    pub(crate) fn begin<K, V, S>(table: &HashTable<K, V, S>) -> Self {
        Self::first_from(table, 0)
    }

    /// Head of the first non-empty bucket at or after `bucket`.
    fn first_from<K, V, S>(table: &HashTable<K, V, S>, bucket: usize) -> Self {
        if table.slots.is_empty() {
            return Self::END;
        }
        table
            .buckets
            .iter()
            .enumerate()
            .skip(bucket)
            .find_map(|(b, head)| head.map(|k| Position::at(b, k)))
            .unwrap_or(Self::END)
    }

    /// Step to the next entry: along the chain, then across buckets.
    pub(crate) fn advance<K, V, S>(&mut self, table: &HashTable<K, V, S>) {
        let Some(k) = self.slot else {
            return;
        };
        match table.slots.get(k).and_then(|n| n.next) {
            Some(next) => self.slot = Some(next),
            None => *self = Self::first_from(table, self.bucket + 1),
        }
    }
}

/// Shared cursor. Yields `(&K, &V)` from its current position onward.
pub struct Cursor<'a, K, V, S = RandomState> {
    table: &'a HashTable<K, V, S>,
    pos: Position,
}

impl<'a, K, V, S> Cursor<'a, K, V, S> {
    pub(crate) fn new(table: &'a HashTable<K, V, S>, pos: Position) -> Self {
        Self { table, pos }
    }

    fn node(&self) -> Option<&'a Node<K, V>> {
        let table = self.table;
        table.slots.get(self.pos.slot()?)
    }

    /// True when the cursor denotes a live entry.
    pub fn good(&self) -> bool {
        self.pos.good()
    }

    pub fn key(&self) -> Option<&'a K> {
        self.node().map(|n| &n.key)
    }

    pub fn val(&self) -> Option<&'a V> {
        self.node().map(|n| &n.value)
    }

    pub fn get(&self) -> Option<(&'a K, &'a V)> {
        self.node().map(|n| (&n.key, &n.value))
    }

    pub fn advance(&mut self) {
        self.pos.advance(self.table);
    }
}

impl<K, V, S> Clone for Cursor<'_, K, V, S> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            pos: self.pos,
        }
    }
}

/// Cursors are equal when they refer to the same table and position; all
/// invalid cursors on a table compare equal.
impl<K, V, S> PartialEq for Cursor<'_, K, V, S> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.table, other.table) && self.pos == other.pos
    }
}

impl<K, V, S> Eq for Cursor<'_, K, V, S> {}

impl<'a, K, V, S> Iterator for Cursor<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.get()?;
        self.advance();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.good() {
            (1, Some(self.table.len()))
        } else {
            (0, Some(0))
        }
    }
}

impl<K, V, S> FusedIterator for Cursor<'_, K, V, S> {}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for Cursor<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("entry", &self.get())
            .finish()
    }
}

/// Exclusive cursor. Allows updating values and erasing the current entry
/// without invalidating the traversal.
pub struct CursorMut<'a, K, V, S = RandomState> {
    table: &'a mut HashTable<K, V, S>,
    pos: Position,
}

impl<'a, K, V, S> CursorMut<'a, K, V, S> {
    pub(crate) fn new(table: &'a mut HashTable<K, V, S>, pos: Position) -> Self {
        Self { table, pos }
    }

    pub fn good(&self) -> bool {
        self.pos.good()
    }

    pub fn key(&self) -> Option<&K> {
        self.table.slots.get(self.pos.slot()?).map(|n| &n.key)
    }

    pub fn val(&self) -> Option<&V> {
        self.table.slots.get(self.pos.slot()?).map(|n| &n.value)
    }

    pub fn val_mut(&mut self) -> Option<&mut V> {
        self.table
            .slots
            .get_mut(self.pos.slot()?)
            .map(|n| &mut n.value)
    }

    pub fn entry_mut(&mut self) -> Option<(&K, &mut V)> {
        let node = self.table.slots.get_mut(self.pos.slot()?)?;
        Some((&node.key, &mut node.value))
    }

    /// Consume the cursor, keeping the value borrowed for the table's lifetime.
    pub fn into_val_mut(self) -> Option<&'a mut V> {
        let slot = self.pos.slot()?;
        let table = self.table;
        table.slots.get_mut(slot).map(|n| &mut n.value)
    }

    pub fn advance(&mut self) {
        self.pos.advance(self.table);
    }

    /// Remove the current entry and move to the one after it.
    pub fn take(&mut self) -> Option<(K, V)> {
        let slot = self.pos.slot()?;
        let mut next = self.pos;
        next.advance(self.table);
        let removed = self.table.unlink(slot);
        self.pos = next;
        removed
    }

    /// Like [`take`](Self::take), dropping the entry. Returns false on an
    /// invalid cursor.
    pub fn erase(&mut self) -> bool {
        self.take().is_some()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for CursorMut<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("key", &self.key())
            .field("val", &self.val())
            .finish()
    }
}

/// Mutable iterator in storage order.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Node<K, V>>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(it: slotmap::basic::IterMut<'a, DefaultKey, Node<K, V>>) -> Self {
        Self { it }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, n)| (&n.key, &mut n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Owning iterator in storage order.
pub struct IntoIter<K, V> {
    it: slotmap::basic::IntoIter<DefaultKey, Node<K, V>>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(it: slotmap::basic::IntoIter<DefaultKey, Node<K, V>>) -> Self {
        Self { it }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, n)| (n.key, n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}
