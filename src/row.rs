//! Stable synthetic identifiers for draft lines.

use std::fmt;

/// Identifier of a single line within one draft.
///
/// Allocated monotonically by [`RowAllocator`] and never reused within a
/// draft, so field errors keyed by `RowId` stay attached to the right line
/// when other lines are appended or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(u64);

impl RowId {
    pub fn new(raw: u64) -> Self {
        RowId(raw)
    }

    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic `RowId` source owned by a line collection.
#[derive(Debug, Clone, Default)]
pub struct RowAllocator {
    next: u64,
}

impl RowAllocator {
    pub fn new() -> Self {
        RowAllocator { next: 0 }
    }

    /// Hand out the next unused identifier.
    pub fn allocate(&mut self) -> RowId {
        let id = RowId(self.next);
        self.next += 1;
        id
    }

    /// Number of identifiers handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next
    }
}
