//! Leaf level of the two-level page table.

use crate::{PageEntry, PageNumber, arch::NR_PTES_PER_PAGE};

/// A PTE directory: the leaf table addressed by one slot of the outer page table.
///
/// Directories are allocated on first use and live as long as the page table that
/// owns them.
#[derive(Debug, Clone)]
pub struct PteDirectory {
    /// The outer page table slot this directory is installed in.
    index: usize,
    /// The entries in this directory.
    entries: [PageEntry; NR_PTES_PER_PAGE],
}

impl PteDirectory {
    /// Creates a new, empty directory for the given outer slot.
    ///
    /// All entries are initialized to zero (not present).
    pub fn new(index: usize) -> Self {
        assert!(index < NR_PTES_PER_PAGE, "outer page table index out of bounds");
        Self {
            index,
            entries: [PageEntry::default(); NR_PTES_PER_PAGE],
        }
    }

    /// Returns the outer page table slot this directory is installed in.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the entry at the given index.
    ///
    /// # Panics
    /// Panics if index >= 16.
    pub fn entry(&self, index: usize) -> PageEntry {
        assert!(index < NR_PTES_PER_PAGE, "directory index out of bounds");
        self.entries[index]
    }

    /// Returns a mutable reference to the entry at the given index.
    ///
    /// # Panics
    /// Panics if index >= 16.
    pub fn entry_mut(&mut self, index: usize) -> &mut PageEntry {
        assert!(index < NR_PTES_PER_PAGE, "directory index out of bounds");
        &mut self.entries[index]
    }

    /// Returns the number of entries in this directory.
    pub const fn len(&self) -> usize {
        NR_PTES_PER_PAGE
    }

    /// Iterates over the present entries together with the pages they translate.
    pub fn present(&self) -> impl Iterator<Item = (PageNumber, PageEntry)> + '_ {
        let directory = self.index;
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_present())
            .map(move |(index, entry)| (PageNumber::from_indexes(directory, index), *entry))
    }

    /// Iterates mutably over the present entries together with the pages they translate.
    pub fn present_mut(&mut self) -> impl Iterator<Item = (PageNumber, &mut PageEntry)> + '_ {
        let directory = self.index;
        self.entries
            .iter_mut()
            .enumerate()
            .filter(|(_, entry)| entry.is_present())
            .map(move |(index, entry)| (PageNumber::from_indexes(directory, index), entry))
    }
}
