//! Arena-style memory pool for variable-length tuple data
//!
//! Tuples never hold raw pointers into the pool; they hold handles
//! (offset + length) that stay valid for the life of the pool.

use crate::error::{Error, Result};

/// Handle into a [`MemoryPool`] allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolHandle {
    /// Byte offset of the allocation within the pool
    pub offset: usize,
    /// Length of the allocation in bytes
    pub len: usize,
}

/// Bump-allocated byte arena shared by tuples built in sequence.
///
/// Single-threaded, non-reentrant use. Allocations are never freed
/// individually; the pool is dropped as a whole once every tuple built
/// against it has been consumed.
#[derive(Debug, Default)]
pub struct MemoryPool {
    data: Vec<u8>,
}

impl MemoryPool {
    /// Create a new empty pool
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Create a pool with a pre-sized backing buffer
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Copy `bytes` into the pool and return a handle to the copy
    pub fn allocate(&mut self, bytes: &[u8]) -> PoolHandle {
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);
        PoolHandle {
            offset,
            len: bytes.len(),
        }
    }

    /// Read back the bytes behind a handle. A handle that does not fit
    /// this pool (built against another pool, or corrupted) is an error,
    /// not a panic.
    pub fn slice(&self, handle: PoolHandle) -> Result<&[u8]> {
        handle
            .offset
            .checked_add(handle.len)
            .and_then(|end| self.data.get(handle.offset..end))
            .ok_or_else(|| {
                Error::Internal(format!(
                    "pool handle at offset {} with length {} exceeds {} allocated bytes",
                    handle.offset,
                    handle.len,
                    self.data.len()
                ))
            })
    }

    /// Total bytes allocated so far
    pub fn allocated(&self) -> usize {
        self.data.len()
    }
}
