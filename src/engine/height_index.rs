//! Prefix sums over per-item heights.
//!
//! [`HeightIndex`] is a segment tree stored in a flat `Vec<u64>`. The leaf
//! row is padded with zeros to a power of two (`leaves`), so leaves live at
//! `leaves..leaves + capacity`, every internal node `i` holds
//! `tree[2i] + tree[2i + 1]` over a contiguous run of positions, and
//! `tree[1]` is the sum of all leaves.
//!
//! | Operation | Time |
//! |-----------|------|
//! | `new(n)` | O(n) |
//! | `from_heights(h)` | O(n) |
//! | `update(i, h)` | O(log n) |
//! | `query(lo, hi)` | O(log n) |
//! | `position_at(offset)` | O(log n) |
//! | `total_height()` | O(1) |

/// Segment tree answering "total height of items `[lo, hi)`".
///
/// The index is addressed by *filtered position*, not by record id, and is
/// rebuilt from scratch whenever the filtered view changes length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeightIndex {
    tree: Vec<u64>,
    capacity: usize,
    leaves: usize,
}

impl HeightIndex {
    /// Allocate a zero-filled tree for `capacity` leaves.
    pub fn new(capacity: usize) -> Self {
        let leaves = capacity.next_power_of_two();
        Self {
            tree: vec![0; leaves * 2],
            capacity,
            leaves,
        }
    }

    /// Build a tree from a full set of heights in O(n).
    pub fn from_heights(heights: &[u64]) -> Self {
        let mut index = Self::new(heights.len());
        let leaves = index.leaves;
        index.tree[leaves..leaves + heights.len()].copy_from_slice(heights);
        for i in (1..leaves).rev() {
            index.tree[i] = index.tree[i << 1] + index.tree[(i << 1) | 1];
        }
        index
    }

    /// Number of leaves.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub const fn is_empty(&self) -> bool {
        self.capacity == 0
    }

    /// Set leaf `index` to `height` and refresh its ancestors.
    ///
    /// An out-of-range index is a caller bug: it panics in debug builds and
    /// is ignored in release builds.
    pub fn update(&mut self, index: usize, height: u64) {
        debug_assert!(
            index < self.capacity,
            "height index {index} out of bounds (capacity={})",
            self.capacity
        );
        if index >= self.capacity {
            return;
        }
        let mut node = index + self.leaves;
        self.tree[node] = height;
        while node > 1 {
            node >>= 1;
            self.tree[node] = self.tree[node << 1] + self.tree[(node << 1) | 1];
        }
    }

    /// Height of a single leaf, or 0 when out of range.
    pub fn get(&self, index: usize) -> u64 {
        if index < self.capacity {
            self.tree[index + self.leaves]
        } else {
            0
        }
    }

    /// Sum of heights over the half-open range `[lo, hi)`.
    ///
    /// `hi` is clamped to the capacity; empty ranges sum to 0.
    pub fn query(&self, lo: usize, hi: usize) -> u64 {
        let hi = hi.min(self.capacity);
        if lo >= hi {
            return 0;
        }
        let mut left = lo + self.leaves;
        let mut right = hi + self.leaves;
        let mut sum = 0;
        while left < right {
            if left & 1 == 1 {
                sum += self.tree[left];
                left += 1;
            }
            if right & 1 == 1 {
                right -= 1;
                sum += self.tree[right];
            }
            left >>= 1;
            right >>= 1;
        }
        sum
    }

    /// Top edge of the item at `index` (sum of everything before it).
    pub fn offset_of(&self, index: usize) -> u64 {
        self.query(0, index)
    }

    /// Position of the item covering `offset`: the smallest `i` with
    /// `query(0, i + 1) > offset`. Returns `capacity` when `offset` is at or
    /// past the total height.
    ///
    /// Walks down from the root, stepping right past each left subtree
    /// that ends at or before `offset`.
    pub fn position_at(&self, offset: u64) -> usize {
        if offset >= self.total_height() {
            return self.capacity;
        }
        let mut node = 1;
        let mut rest = offset;
        while node < self.leaves {
            let left = node << 1;
            if self.tree[left] > rest {
                node = left;
            } else {
                rest -= self.tree[left];
                node = left | 1;
            }
        }
        node - self.leaves
    }

    /// Sum of all leaves.
    pub fn total_height(&self) -> u64 {
        match self.capacity {
            0 => 0,
            _ => self.tree[1],
        }
    }
}
