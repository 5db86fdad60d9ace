//! Capacity policy: power-of-two bucket counts and the growth threshold.

/// Bucket count used by `HashTable::new()`.
pub const DEFAULT_CAPACITY: usize = 128;

/// Bucket count allocated on first insertion into a table without buckets.
pub const MIN_CAPACITY: usize = 2;

/// Largest bucket count the table will grow to.
pub const MAX_CAPACITY: usize = 1 << 30;

/// Round a requested bucket count up to the next power of two.
///
/// Zero stays zero (no storage). Requests above [`MAX_CAPACITY`] are clamped.
pub fn canonical_size(requested: usize) -> usize {
    if requested == 0 {
        0
    } else if requested >= MAX_CAPACITY {
        MAX_CAPACITY
    } else {
        requested.next_power_of_two()
    }
}

/// Map a stored hash onto a bucket. `capacity` must be a non-zero power of two.
#[inline]
pub(crate) fn bucket_index(hash: u64, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    (hash as usize) & (capacity - 1)
}

/// True once `len / capacity` exceeds 0.8 and there is still room to double.
#[inline]
pub(crate) fn needs_grow(len: usize, capacity: usize) -> bool {
    capacity < MAX_CAPACITY && len.saturating_mul(5) > capacity.saturating_mul(4)
}

/// Smallest canonical capacity that holds `len` entries without crossing
/// the growth threshold.
pub(crate) fn capacity_for(len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    // ceil(len * 5 / 4)
    let buckets = len.saturating_mul(5).div_ceil(4);
    canonical_size(buckets)
}
