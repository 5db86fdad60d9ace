//! chain-hashtable: a single-threaded keyed container with a power-of-two
//! bucket array, chained collision resolution and cursor-based iteration.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a general keyed table whose structural invariants are small and
//!   checkable, with explicit "must exist" and "create if missing" access.
//! - Layers:
//!   - `capacity`: canonical power-of-two sizes, the bucket mask and the
//!     0.8 load-factor growth rule.
//!   - `HashTable<K, V, S>`: bucket heads plus a `SlotMap` arena of nodes;
//!     each node links to the next node of its chain by arena key.
//!   - `Position`: the traversal engine (bucket index + current slot),
//!     wrapped by `Cursor` (shared) and `CursorMut` (exclusive).
//!
//! Constraints
//! - Keys are unique by `Eq`; equal hashes alone never merge entries.
//! - `capacity()` is zero or a power of two after every operation.
//! - All insertion paths go through one primitive that either rejects,
//!   overwrites in place, or links a new node and then checks growth.
//! - Lookups on an empty table return before touching the bucket array.
//!
//! Lookup policies
//! - Hard-fail: `at`, `at_mut` and `table[key]` panic with a message naming
//!   the key and the valid keys. `try_at`/`try_at_mut` return the same
//!   failure as `TableError::KeyNotFound`.
//! - Soft: `find`, `get`, `contains` and `lookup(key, default)` never fail.
//! - Auto-vivifying: `get_or_default` and `get_or_insert` create the entry
//!   when missing. Indexing never inserts.
//!
//! Hasher and rehashing invariants
//! - Each node stores its `u64` hash; rehash relinks chains from the stored
//!   hash and never calls `K: Hash`, so it cannot fail halfway.
//! - Node arena keys are stable across rehash; only chain links change.
//!
//! Cursors and invalidation
//! - A `Cursor` holds `&HashTable`, so the borrow checker rules out
//!   structural mutation while it lives. `CursorMut` erases the current
//!   entry and steps to its successor in one move.
//! - Iteration order is bucket order and changes after any rehash; use
//!   `sorted_toc` for deterministic listings.
//!
//! Notes and non-goals
//! - Single-threaded; no internal synchronization.
//! - Logging uses `tracing` under the `hashtable` target (rehash at debug).

mod capacity;
mod cursor;
mod error;
mod ops;
mod table;
mod table_proptest;

// Public surface
pub use capacity::{canonical_size, DEFAULT_CAPACITY, MAX_CAPACITY, MIN_CAPACITY};
pub use cursor::{Cursor, CursorMut, IntoIter, IterMut};
pub use error::{Result, TableError};
pub use table::HashTable;
