//! Geometry of the simulated machine.
//!
//! The simulated MMU is a two-level scale model:
//! - 4-bit indexes at each level (16 entries per table)
//! - 8-bit virtual page numbers (256 pages per address space)
//! - 4 KiB pages, which only matter when reporting byte addresses
//!
//! Virtual page number layout:
//! - Bits 0-3: Level 0 index (entry within a PTE directory)
//! - Bits 4-7: Level 1 index (slot in the outer page table)

/// Page offset width in bits.
pub const PAGE_SHIFT: usize = 12;

/// Page size in bytes (4 KiB).
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;

/// Number of bits in the index at each page table level.
pub const PTES_PER_PAGE_SHIFT: usize = 4;

/// Number of entries in a PTE directory, and of directory slots in the outer table.
pub const NR_PTES_PER_PAGE: usize = 1 << PTES_PER_PAGE_SHIFT;

/// Number of page table levels (level 1 = outer, level 0 = leaf).
pub const PAGE_TABLE_LEVELS: usize = 2;

/// Number of virtual pages in an address space.
pub const NR_VPNS: usize = 1 << (PTES_PER_PAGE_SHIFT * PAGE_TABLE_LEVELS);

/// Default number of physical page frames.
pub const NR_PAGEFRAMES: usize = 128;

/// Default number of TLB slots.
pub const NR_TLB_ENTRIES: usize = 1 << (PTES_PER_PAGE_SHIFT * 2);

/// Returns the page table index for a virtual page number at the specified level.
///
/// - Level 0: Bits 0-3 (entry within the PTE directory)
/// - Level 1: Bits 4-7 (outer page table slot)
#[inline]
pub const fn page_index(vpn: usize, level: usize) -> usize {
    let shift = match level {
        0 | 1 => level * PTES_PER_PAGE_SHIFT,
        _ => panic!("level out of range for the simulated MMU (0-1)"),
    };
    (vpn >> shift) & (NR_PTES_PER_PAGE - 1)
}

/// Validates a virtual page number.
///
/// Page numbers past the end of the address space would otherwise wrap around
/// when split into table indexes.
#[inline]
pub const fn validate_vpn(vpn: usize) -> bool {
    vpn < NR_VPNS
}
