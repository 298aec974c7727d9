use core::fmt;

use crate::PageNumber;

/// Errors reported by the MMU for a single request.
///
/// None of these are fatal to the simulation; the framework decides what happens to the
/// requesting process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmuError {
    /// No physical frame has a mapcount of zero.
    OutOfMemory,
    /// The fault handler found no copy-on-write case that applies.
    UnresolvedFault,
    /// There is no valid mapping for the page at all.
    StructuralMiss,
    /// The page number lies outside the simulated address space.
    AddressOutOfRange(PageNumber),
    /// The page is already mapped in the current process.
    AlreadyMapped(PageNumber),
}

impl fmt::Display for MmuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "out of physical frames"),
            Self::UnresolvedFault => write!(f, "unresolved page fault"),
            Self::StructuralMiss => write!(f, "page is not mapped"),
            Self::AddressOutOfRange(vpn) => {
                write!(f, "page {} is outside the address space", vpn)
            }
            Self::AlreadyMapped(vpn) => write!(f, "page {} is already mapped", vpn),
        }
    }
}

impl core::error::Error for MmuError {}
