//! Processes as seen by the MMU.

use core::fmt;

use crate::PageTable;

/// A process identifier.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Pid(u32);

impl Pid {
    #[inline]
    pub const fn new(pid: u32) -> Self {
        Self(pid)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pid({})", self.0)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u32> for Pid {
    #[inline]
    fn from(pid: u32) -> Self {
        Self(pid)
    }
}

/// A simulated process.
///
/// The MMU only cares about the identity of a process and its page table; ages,
/// lifespans and scheduling state belong to the driving framework.
#[derive(Debug, Clone)]
pub struct Process {
    pid: Pid,
    page_table: PageTable,
}

impl Process {
    /// Creates a process with an empty page table.
    pub fn new(pid: Pid) -> Self {
        Self::with_page_table(pid, PageTable::new())
    }

    pub fn with_page_table(pid: Pid, page_table: PageTable) -> Self {
        Self { pid, page_table }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn page_table_mut(&mut self) -> &mut PageTable {
        &mut self.page_table
    }
}
