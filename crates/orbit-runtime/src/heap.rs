// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! Per-object heap: an array of value cells with bump/free allocation.
//!
//! Grounded on the original runtime's `heap.c`: an initial size of 16
//! cells, doubling on overflow, bounded by a hard ceiling to catch
//! runaway growth. The allocation cursor scans forward from where it left
//! off and wraps around before paying for a resize, amortising the cost
//! of repeated alloc/free churn.

use crate::error::{FatalError, FatalResult};
use orbit_core::Value;

#[cfg(test)]
mod tests;

/// A heap address: a stable index into a `Heap`'s cell array.
pub type HeapAddress = usize;

const INITIAL_SIZE: usize = 16;
/// Hard ceiling on heap growth (10M cells), matching the reference
/// implementation's runaway-growth guard.
const DEFAULT_CEILING: usize = 10 * 1024 * 1024;

/// An object's private store of member variables.
pub struct Heap {
    cells: Vec<Option<Value>>,
    /// Allocation cursor; advances past satisfied requests and wraps
    /// around the array instead of always rescanning from zero.
    ptr: usize,
    ceiling: usize,
}

impl Heap {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ceiling(DEFAULT_CEILING)
    }

    #[must_use]
    pub fn with_ceiling(ceiling: usize) -> Self {
        Self { cells: (0..INITIAL_SIZE).map(|_| None).collect(), ptr: 0, ceiling }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Allocate one cell, initialised to `Value::Null`, returning its
    /// address. The address is stable until the cell is explicitly
    /// freed.
    pub fn alloc(&mut self) -> FatalResult<HeapAddress> {
        let size = self.cells.len();
        let start = self.ptr;

        for _ in 0..size {
            if self.cells[self.ptr].is_none() {
                let addr = self.ptr;
                self.cells[addr] = Some(Value::Null);
                self.ptr = (self.ptr + 1) % size;
                return Ok(addr);
            }
            self.ptr = (self.ptr + 1) % size;
        }
        debug_assert_eq!(self.ptr, start, "full scan must return to its starting cursor");

        self.grow()?;
        self.alloc()
    }

    fn grow(&mut self) -> FatalResult<()> {
        let new_size = self.cells.len() * 2;
        if new_size > self.ceiling {
            return Err(FatalError::HeapCeilingExceeded { ceiling: self.ceiling });
        }
        tracing::debug!(new_size, "resizing heap");
        let old_size = self.cells.len();
        self.cells.resize_with(new_size, || None);
        self.ptr = old_size;
        Ok(())
    }

    /// Mark a cell empty and destroy its value. Double-free is tolerated
    /// silently.
    pub fn free(&mut self, addr: HeapAddress) {
        if let Some(slot) = self.cells.get_mut(addr) {
            *slot = None;
        }
    }

    /// Read-only access to a cell. Out-of-range or empty-cell access is
    /// a fatal error (null-pointer semantics).
    pub fn at(&self, addr: HeapAddress) -> FatalResult<&Value> {
        self.cells
            .get(addr)
            .and_then(Option::as_ref)
            .ok_or(FatalError::HeapOutOfRange { addr })
    }

    /// Mutable access to a cell. Same fatality contract as [`Heap::at`].
    pub fn at_mut(&mut self, addr: HeapAddress) -> FatalResult<&mut Value> {
        self.cells
            .get_mut(addr)
            .and_then(Option::as_mut)
            .ok_or(FatalError::HeapOutOfRange { addr })
    }

    /// Invoke `callback` for every cell currently holding an object
    /// handle. Used by the garbage collector's marking phase.
    pub fn scan_objects(&self, mut callback: impl FnMut(u32)) {
        for cell in self.cells.iter().flatten() {
            if let Some(handle) = cell.as_object_handle() {
                callback(handle);
            }
        }
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
