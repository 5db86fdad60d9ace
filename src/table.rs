//! HashTable: power-of-two bucket array whose chains are linked through a
//! generational slot arena.

use crate::capacity::{
    bucket_index, canonical_size, capacity_for, needs_grow, DEFAULT_CAPACITY, MIN_CAPACITY,
};
use crate::cursor::{Cursor, CursorMut, IterMut, Position};
use crate::error::{Result, TableError};
use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::{BuildHasher, Hash};
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;
use tracing::{debug, trace, warn};

#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
    pub(crate) next: Option<DefaultKey>,
}

/// Keyed container with unique keys, chained buckets and a power-of-two
/// bucket count.
///
/// Two lookup policies coexist: [`at`](Self::at) and `table[key]` panic when
/// the key is absent, while [`find`](Self::find), [`get`](Self::get),
/// [`lookup`](Self::lookup) and [`get_or_default`](Self::get_or_default)
/// never fail. Indexing does not insert; use `get_or_default` or
/// `get_or_insert` to create missing entries.
///
/// Cursors borrow the table, so structural mutation while one is alive is
/// only possible through [`CursorMut`].
#[derive(Clone)]
pub struct HashTable<K, V, S = RandomState> {
    hasher: S,
    pub(crate) buckets: Vec<Option<DefaultKey>>, // chain heads
    pub(crate) slots: SlotMap<DefaultKey, Node<K, V>>,
}

/// What `set_entry` did with the key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SetOutcome {
    Inserted(DefaultKey),
    Overwritten(DefaultKey),
    Rejected(DefaultKey),
}

impl SetOutcome {
    fn slot(self) -> DefaultKey {
        match self {
            SetOutcome::Inserted(k) | SetOutcome::Overwritten(k) | SetOutcome::Rejected(k) => k,
        }
    }

    fn inserted(self) -> bool {
        matches!(self, SetOutcome::Inserted(_))
    }
}

impl<K, V> HashTable<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    /// Create a table with `canonical_size(capacity)` buckets.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V, S> HashTable<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            buckets: vec![None; canonical_size(capacity)],
            slots: SlotMap::with_key(),
        }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of buckets. Always zero or a power of two.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Cursor at the first entry in bucket order; iterating it visits every
    /// entry exactly once.
    pub fn iter(&self) -> Cursor<'_, K, V, S> {
        Cursor::new(self, Position::begin(self))
    }

    /// Exclusive cursor at the first entry, for in-place updates and erasure
    /// during traversal.
    pub fn cursor_mut(&mut self) -> CursorMut<'_, K, V, S> {
        let pos = Position::begin(self);
        CursorMut::new(self, pos)
    }

    /// Mutable iteration in storage order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.slots.iter_mut())
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// Remove all entries, keeping the bucket array.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.buckets.fill(None);
    }

    /// Remove all entries and release the bucket array.
    pub fn clear_storage(&mut self) {
        trace!(target: "hashtable", capacity = self.buckets.len(), size = self.slots.len(), "releasing storage");
        self.slots = SlotMap::with_key();
        self.buckets = Vec::new();
    }

    /// Unlink and remove the entry stored in `slot`.
    pub(crate) fn unlink(&mut self, slot: DefaultKey) -> Option<(K, V)> {
        let (hash, next) = {
            let node = self.slots.get(slot)?;
            (node.hash, node.next)
        };
        let bucket = bucket_index(hash, self.buckets.len());
        if self.buckets[bucket] == Some(slot) {
            self.buckets[bucket] = next;
        } else {
            let mut cur = self.buckets[bucket];
            while let Some(k) = cur {
                let node = &mut self.slots[k];
                if node.next == Some(slot) {
                    node.next = next;
                    break;
                }
                cur = node.next;
            }
        }
        let node = self.slots.remove(slot)?;
        Some((node.key, node.value))
    }

    /// Rebuild every chain for `canonical_size(requested)` buckets. Uses the
    /// stored hashes only, so no user code runs while chains are relinked.
    fn rehash(&mut self, requested: usize) {
        let new_capacity = canonical_size(requested);
        let old_capacity = self.buckets.len();
        if new_capacity == old_capacity {
            return;
        }
        if new_capacity == 0 && !self.slots.is_empty() {
            warn!(target: "hashtable", size = self.slots.len(), "cannot release buckets of a non-empty table");
            return;
        }

        let mut buckets = vec![None; new_capacity];
        for (k, node) in self.slots.iter_mut() {
            let b = bucket_index(node.hash, new_capacity);
            node.next = buckets[b];
            buckets[b] = Some(k);
        }
        self.buckets = buckets;
        debug!(target: "hashtable", old_capacity, new_capacity, size = self.slots.len(), "rehashed");
    }

    /// Set the bucket count to `canonical_size(capacity)`, relinking every
    /// entry. Outstanding cursors cannot survive this since it takes
    /// `&mut self`.
    pub fn resize(&mut self, capacity: usize) {
        self.rehash(capacity);
    }

    /// Grow so that `additional` more entries fit below the load threshold.
    pub fn reserve(&mut self, additional: usize) {
        let wanted = capacity_for(self.slots.len().saturating_add(additional));
        if wanted > self.buckets.len() {
            self.rehash(wanted);
        }
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Bucket that `key` maps to, or `None` when no buckets are allocated.
    pub fn hash_key_index<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        if self.buckets.is_empty() {
            return None;
        }
        Some(bucket_index(self.make_hash(key), self.buckets.len()))
    }

    /// Scan the chain of the bucket `q` maps to. An empty table never touches
    /// the bucket array.
    fn locate<Q>(&self, q: &Q) -> Position
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.slots.is_empty() {
            return Position::END;
        }
        let hash = self.make_hash(q);
        let bucket = bucket_index(hash, self.buckets.len());
        let mut cur = self.buckets[bucket];
        while let Some(k) = cur {
            let node = &self.slots[k];
            if node.hash == hash && node.key.borrow() == q {
                return Position::at(bucket, k);
            }
            cur = node.next;
        }
        Position::END
    }

    /// The single insertion primitive. With `overwrite` false an existing
    /// entry is left untouched and `make` is not called.
    fn set_entry<F>(&mut self, overwrite: bool, key: K, make: F) -> SetOutcome
    where
        F: FnOnce() -> V,
    {
        if self.buckets.is_empty() {
            self.rehash(MIN_CAPACITY);
        }
        let hash = self.make_hash(&key);
        let bucket = bucket_index(hash, self.buckets.len());

        let mut cur = self.buckets[bucket];
        while let Some(k) = cur {
            let node = &mut self.slots[k];
            if node.hash == hash && node.key == key {
                if !overwrite {
                    return SetOutcome::Rejected(k);
                }
                node.value = make();
                return SetOutcome::Overwritten(k);
            }
            cur = node.next;
        }

        let next = self.buckets[bucket];
        let k = self.slots.insert(Node {
            key,
            value: make(),
            hash,
            next,
        });
        self.buckets[bucket] = Some(k);

        if needs_grow(self.slots.len(), self.buckets.len()) {
            self.rehash(self.buckets.len() * 2);
        }
        SetOutcome::Inserted(k)
    }

    /// Cursor at `q`, or an invalid cursor when absent.
    pub fn find<Q>(&self, q: &Q) -> Cursor<'_, K, V, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        Cursor::new(self, self.locate(q))
    }

    /// Same as [`find`](Self::find); spelled out for call sites holding a
    /// mutable table that only want to read.
    pub fn cfind<Q>(&self, q: &Q) -> Cursor<'_, K, V, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q)
    }

    pub fn find_mut<Q>(&mut self, q: &Q) -> CursorMut<'_, K, V, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let pos = self.locate(q);
        CursorMut::new(self, pos)
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locate(q).good()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.locate(q).slot()?;
        Some(&self.slots[k].value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.locate(q).slot()?;
        Some(&mut self.slots[k].value)
    }

    /// Value for `q`, or `default` when absent.
    pub fn lookup<Q>(&self, q: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.get(q).cloned().unwrap_or(default)
    }

    fn key_not_found<Q>(&self, q: &Q) -> TableError
    where
        K: Debug,
        Q: ?Sized + Debug,
    {
        let valid: Vec<&K> = self.keys().collect();
        TableError::KeyNotFound {
            key: format!("{q:?}"),
            valid: format!("{valid:?}"),
        }
    }

    pub fn try_at<Q>(&self, q: &Q) -> Result<&V>
    where
        K: Borrow<Q> + Debug,
        Q: ?Sized + Hash + Eq + Debug,
    {
        match self.locate(q).slot() {
            Some(k) => Ok(&self.slots[k].value),
            None => Err(self.key_not_found(q)),
        }
    }

    pub fn try_at_mut<Q>(&mut self, q: &Q) -> Result<&mut V>
    where
        K: Borrow<Q> + Debug,
        Q: ?Sized + Hash + Eq + Debug,
    {
        match self.locate(q).slot() {
            Some(k) => Ok(&mut self.slots[k].value),
            None => Err(self.key_not_found(q)),
        }
    }

    /// Value for `q`.
    ///
    /// # Panics
    /// When `q` is absent. The message names the key and lists the valid keys.
    pub fn at<Q>(&self, q: &Q) -> &V
    where
        K: Borrow<Q> + Debug,
        Q: ?Sized + Hash + Eq + Debug,
    {
        match self.try_at(q) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }

    /// Mutable value for `q`.
    ///
    /// # Panics
    /// When `q` is absent, like [`at`](Self::at).
    pub fn at_mut<Q>(&mut self, q: &Q) -> &mut V
    where
        K: Borrow<Q> + Debug,
        Q: ?Sized + Hash + Eq + Debug,
    {
        match self.try_at_mut(q) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }

    /// Value for `key`, inserting `V::default()` first when absent.
    pub fn get_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let k = self.set_entry(false, key, V::default).slot();
        &mut self.slots[k].value
    }

    /// Value for `key`, inserting `default` first when absent.
    pub fn get_or_insert(&mut self, key: K, default: V) -> &mut V {
        let k = self.set_entry(false, key, || default).slot();
        &mut self.slots[k].value
    }

    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let k = self.set_entry(false, key, make).slot();
        &mut self.slots[k].value
    }

    /// Insert unless `key` is present. Returns false and leaves the existing
    /// value unchanged on a duplicate.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.set_entry(false, key, || value).inserted()
    }

    /// Insert or overwrite. Returns true when a new entry was created and
    /// false when an existing value was replaced.
    pub fn set(&mut self, key: K, value: V) -> bool {
        self.set_entry(true, key, || value).inserted()
    }

    /// Like [`insert`](Self::insert), but `make` only runs when inserting.
    pub fn emplace<F>(&mut self, key: K, make: F) -> bool
    where
        F: FnOnce() -> V,
    {
        self.set_entry(false, key, make).inserted()
    }

    /// Like [`set`](Self::set); `make` always runs.
    pub fn emplace_set<F>(&mut self, key: K, make: F) -> bool
    where
        F: FnOnce() -> V,
    {
        self.set_entry(true, key, make).inserted()
    }

    /// Insert unless present, returning the new value or `DuplicateKey`.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<&mut V>
    where
        K: Debug,
    {
        match self.set_entry(false, key, || value) {
            SetOutcome::Rejected(k) => Err(TableError::DuplicateKey {
                key: format!("{:?}", self.slots[k].key),
            }),
            outcome => Ok(&mut self.slots[outcome.slot()].value),
        }
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.locate(q).slot()?;
        self.unlink(k)
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Returns true when an entry was removed.
    pub fn erase<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).is_some()
    }

    /// Erase each listed key, returning how many were present.
    pub fn erase_keys<'q, Q, I>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = &'q Q>,
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + 'q,
    {
        let mut removed = 0;
        for q in keys {
            if self.slots.is_empty() {
                break;
            }
            if self.erase(q) {
                removed += 1;
            }
        }
        removed
    }

    /// Keep only the entries for which `keep` returns true. Returns the
    /// number of entries removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut removed = 0;
        let mut cur = self.cursor_mut();
        while let Some((k, v)) = cur.entry_mut() {
            if keep(k, v) {
                cur.advance();
            } else {
                cur.erase();
                removed += 1;
            }
        }
        removed
    }

    /// Move every entry of `other` whose key is absent here. Entries with
    /// keys already present stay in `other`. Returns the number moved.
    pub fn merge<S2>(&mut self, other: &mut HashTable<K, V, S2>) -> usize
    where
        S2: BuildHasher,
    {
        let mut moved = 0;
        let mut cur = other.cursor_mut();
        while let Some(key) = cur.key() {
            if self.contains(key) {
                cur.advance();
            } else if let Some((k, v)) = cur.take() {
                self.set_entry(false, k, || v);
                moved += 1;
            }
        }
        moved
    }

    /// Keys in traversal order.
    pub fn toc(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.keys().cloned().collect()
    }

    /// Keys in ascending order.
    pub fn sorted_toc(&self) -> Vec<K>
    where
        K: Clone + Ord,
    {
        let mut keys = self.toc();
        keys.sort();
        keys
    }

    /// Sorted keys accepted by `pred`.
    pub fn toc_keys<P>(&self, mut pred: P) -> Vec<K>
    where
        K: Clone + Ord,
        P: FnMut(&K) -> bool,
    {
        let mut keys: Vec<K> = self.keys().filter(|k| pred(*k)).cloned().collect();
        keys.sort();
        keys
    }

    /// Sorted keys whose values are accepted by `pred`.
    pub fn toc_values<P>(&self, mut pred: P) -> Vec<K>
    where
        K: Clone + Ord,
        P: FnMut(&V) -> bool,
    {
        let mut keys: Vec<K> = self
            .iter()
            .filter(|(_, v)| pred(*v))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn count_keys<P>(&self, mut pred: P) -> usize
    where
        P: FnMut(&K) -> bool,
    {
        self.keys().filter(|k| pred(*k)).count()
    }

    pub fn count_values<P>(&self, mut pred: P) -> usize
    where
        P: FnMut(&V) -> bool,
    {
        self.values().filter(|v| pred(*v)).count()
    }
}

/// Check the structural invariants: power-of-two capacity, every entry
/// reachable exactly once from the bucket its hash maps to.
#[cfg(test)]
pub(crate) fn assert_consistent<K, V, S>(t: &HashTable<K, V, S>) {
    use std::collections::HashSet;

    let cap = t.buckets.len();
    assert!(cap == 0 || cap.is_power_of_two(), "capacity {cap} not a power of two");
    if cap == 0 {
        assert!(t.slots.is_empty(), "entries without buckets");
        return;
    }
    let mut seen = HashSet::new();
    for (b, head) in t.buckets.iter().enumerate() {
        let mut cur = *head;
        while let Some(k) = cur {
            let node = t.slots.get(k).expect("chain links a live slot");
            assert_eq!(bucket_index(node.hash, cap), b, "entry chained in wrong bucket");
            assert!(seen.insert(k), "slot chained twice");
            cur = node.next;
        }
    }
    assert_eq!(seen.len(), t.slots.len(), "unreachable entries");
}
