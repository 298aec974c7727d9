//! Two-level page table management.
//!
//! This module provides the `PageTable` type, which owns the outer table of a process
//! together with every PTE directory hanging off it. Directories are kept in an arena
//! owned by the page table and the outer slots hold indexes into it, so a page table
//! can be duplicated or dropped without any pointer fix-ups.

use alloc::vec::Vec;

use crate::{
    FrameNumber, MmuError, PageEntry, PageNumber, arch::NR_PTES_PER_PAGE, table::PteDirectory,
};

/// The page table of one process.
///
/// Page tables are never shared by reference between processes; only the frames their
/// entries point to may be.
#[derive(Debug, Clone, Default)]
pub struct PageTable {
    /// Outer level: the arena index of the directory installed in each slot.
    outer: [Option<usize>; NR_PTES_PER_PAGE],
    /// Arena of allocated directories.
    directories: Vec<PteDirectory>,
}

impl PageTable {
    /// Creates a new page table with no directories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates every missing PTE directory.
    ///
    /// Returns the number of directories that were allocated; calling this again is a
    /// no-op that returns zero.
    pub fn ensure_directories(&mut self) -> usize {
        let mut allocated = 0;
        for index in 0..NR_PTES_PER_PAGE {
            if self.outer[index].is_none() {
                self.directory_or_create(index);
                allocated += 1;
            }
        }
        allocated
    }

    /// Returns whether the directory for the given outer slot has been allocated.
    pub fn has_directory(&self, index: usize) -> bool {
        self.outer.get(index).is_some_and(Option::is_some)
    }

    /// Returns the number of allocated directories.
    pub fn directory_count(&self) -> usize {
        self.directories.len()
    }

    /// Returns a copy of the entry for a virtual page.
    pub fn entry(&self, vpn: PageNumber) -> Result<PageEntry, MmuError> {
        Self::check(vpn)?;
        let directory = self
            .directory(vpn.directory_index())
            .ok_or(MmuError::StructuralMiss)?;
        Ok(directory.entry(vpn.entry_index()))
    }

    /// Returns the entry for a virtual page so that it can be updated in place.
    ///
    /// Fails with `StructuralMiss` if the directory covering the page has not been
    /// allocated yet.
    pub fn lookup(&mut self, vpn: PageNumber) -> Result<&mut PageEntry, MmuError> {
        Self::check(vpn)?;
        let directory = self
            .directory_mut(vpn.directory_index())
            .ok_or(MmuError::StructuralMiss)?;
        Ok(directory.entry_mut(vpn.entry_index()))
    }

    /// Walks the table and returns the frame mapped at a virtual page, if any.
    pub fn walk(&self, vpn: PageNumber) -> Option<FrameNumber> {
        self.entry(vpn).ok()?.frame()
    }

    /// Writes an entry, allocating the directory that covers the page if needed.
    pub(crate) fn install(&mut self, vpn: PageNumber, entry: PageEntry) -> Result<(), MmuError> {
        Self::check(vpn)?;
        *self
            .directory_or_create(vpn.directory_index())
            .entry_mut(vpn.entry_index()) = entry;
        Ok(())
    }

    /// Iterates over every present entry in ascending page order.
    pub fn mappings(&self) -> impl Iterator<Item = (PageNumber, PageEntry)> + '_ {
        self.outer
            .iter()
            .filter_map(|slot| slot.map(|arena| &self.directories[arena]))
            .flat_map(PteDirectory::present)
    }

    /// Iterates mutably over every present entry.
    ///
    /// Entries are visited directory by directory in allocation order.
    pub fn mappings_mut(&mut self) -> impl Iterator<Item = (PageNumber, &mut PageEntry)> + '_ {
        self.directories.iter_mut().flat_map(PteDirectory::present_mut)
    }

    fn check(vpn: PageNumber) -> Result<(), MmuError> {
        if vpn.is_valid() {
            Ok(())
        } else {
            Err(MmuError::AddressOutOfRange(vpn))
        }
    }

    fn directory(&self, index: usize) -> Option<&PteDirectory> {
        let arena = self.outer[index]?;
        Some(&self.directories[arena])
    }

    fn directory_mut(&mut self, index: usize) -> Option<&mut PteDirectory> {
        let arena = self.outer[index]?;
        Some(&mut self.directories[arena])
    }

    fn directory_or_create(&mut self, index: usize) -> &mut PteDirectory {
        let arena = match self.outer[index] {
            Some(arena) => arena,
            None => {
                self.directories.push(PteDirectory::new(index));
                let arena = self.directories.len() - 1;
                self.outer[index] = Some(arena);
                arena
            }
        };
        &mut self.directories[arena]
    }
}
