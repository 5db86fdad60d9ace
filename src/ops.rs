//! Standard trait impls for `HashTable`.

use crate::cursor::{Cursor, IntoIter, IterMut};
use crate::table::HashTable;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::{Index, IndexMut};

impl<K, V, S> Default for HashTable<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

/// `table[key]` never inserts; a missing key panics like [`HashTable::at`].
impl<K, Q, V, S> Index<&Q> for HashTable<K, V, S>
where
    K: Eq + Hash + Borrow<Q> + fmt::Debug,
    Q: ?Sized + Eq + Hash + fmt::Debug,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.at(key)
    }
}

impl<K, Q, V, S> IndexMut<&Q> for HashTable<K, V, S>
where
    K: Eq + Hash + Borrow<Q> + fmt::Debug,
    Q: ?Sized + Eq + Hash + fmt::Debug,
    S: BuildHasher,
{
    fn index_mut(&mut self, key: &Q) -> &mut V {
        self.at_mut(key)
    }
}

/// Equal when both hold the same keys mapped to equal values.
impl<K, V, S> PartialEq for HashTable<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| v == ov))
    }
}

impl<K, V, S> Eq for HashTable<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

/// Inserts with overwrite, so later pairs win.
impl<K, V, S> Extend<(K, V)> for HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::with_capacity_and_hasher(0, S::default());
        table.extend(iter);
        table
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Cursor<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashTable<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for HashTable<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.slots.into_iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashTable<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Stream form: the entry count, then one `key value` line per entry in
/// traversal order between parentheses. An empty table prints `0()`.
impl<K: fmt::Display, V: fmt::Display, S> fmt::Display for HashTable<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "0()");
        }
        writeln!(f, "{}", self.len())?;
        writeln!(f, "(")?;
        for (k, v) in self {
            writeln!(f, "{k} {v}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use crate::table::{assert_consistent, HashTable};

    #[test]
    fn index_reads_and_writes_existing() {
        let mut t: HashTable<String, i32> = HashTable::new();
        t.insert("a".to_string(), 1);
        t["a"] += 4;
        assert_eq!(t["a"], 5);
    }

    #[test]
    #[should_panic(expected = "not found")]
    fn index_missing_key_panics() {
        let mut t: HashTable<String, i32> = HashTable::new();
        t.insert("a".to_string(), 1);
        let _v = t["b"];
    }

    #[test]
    #[should_panic(expected = "not found")]
    fn index_mut_missing_key_does_not_insert() {
        let mut t: HashTable<u32, i32> = HashTable::new();
        t[&1] = 3;
    }

    #[test]
    fn from_iter_last_pair_wins() {
        let t: HashTable<&str, i32> = [("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
        assert_eq!(t.len(), 2);
        assert_eq!(t["a"], 3);
        assert_consistent(&t);
    }

    #[test]
    fn equality_ignores_insertion_order_and_capacity() {
        let a: HashTable<u32, u32> = (0..100).map(|i| (i, i)).collect();
        let mut b: HashTable<u32, u32> = HashTable::with_capacity(4);
        for i in (0..100).rev() {
            b.insert(i, i);
        }
        assert!(a == b);
        b.set(50, 0);
        assert!(a != b);
        b.erase(&50);
        assert!(a != b);
    }

    #[test]
    fn display_and_debug() {
        let mut t: HashTable<&str, i32> = HashTable::new();
        assert_eq!(t.to_string(), "0()");
        assert_eq!(format!("{t:?}"), "{}");
        t.insert("k", 7);
        assert_eq!(t.to_string(), "1\n(\nk 7\n)");
        assert_eq!(format!("{t:?}"), "{\"k\": 7}");
    }

    #[test]
    fn borrowed_iteration() {
        let mut t: HashTable<u32, u32> = (0..5).map(|i| (i, 0)).collect();
        for (_, v) in &mut t {
            *v += 1;
        }
        let total: u32 = (&t).into_iter().map(|(_, v)| *v).sum();
        assert_eq!(total, 5);
    }
}
