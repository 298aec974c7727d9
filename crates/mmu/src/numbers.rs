//! Page and frame number types for the simulated MMU.
//!
//! This module provides newtypes for physical frame numbers and virtual page numbers,
//! which are the unit of every translation the simulator performs.

use crate::arch;
use core::{
    fmt,
    ops::{Add, Sub},
};

/// Macro to define common page/frame number functionality.
///
/// This macro generates the basic structure and methods common to both frame
/// and page number types, reducing code duplication.
macro_rules! impl_page_number_common {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Creates a new page/frame number.
            #[inline]
            pub const fn new(number: usize) -> Self {
                Self(number)
            }

            /// Returns the raw page/frame number.
            #[inline]
            pub const fn as_usize(self) -> usize {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(number: usize) -> Self {
                Self(number)
            }
        }

        impl Add<usize> for $name {
            type Output = Self;

            #[inline]
            fn add(self, rhs: usize) -> Self::Output {
                Self(self.0 + rhs)
            }
        }

        impl Sub<usize> for $name {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: usize) -> Self::Output {
                Self(self.0 - rhs)
            }
        }
    };
}

impl_page_number_common!(
    FrameNumber,
    "A physical page frame number.\n\n\
     Frame numbers are zero-indexed positions in the frame table. Only mapping\n\
     metadata is simulated, so a frame has no backing storage."
);

impl FrameNumber {
    /// Returns the byte address at the start of this frame.
    #[inline]
    pub const fn start(self) -> usize {
        self.0 * arch::PAGE_SIZE
    }
}

impl_page_number_common!(
    PageNumber,
    "A virtual page number.\n\n\
     Page numbers are split into an outer (directory) index and a leaf (entry)\n\
     index when walking a page table."
);

impl PageNumber {
    /// Builds a page number from its outer and leaf table indexes.
    #[inline]
    pub const fn from_indexes(directory: usize, entry: usize) -> Self {
        Self((directory << arch::PTES_PER_PAGE_SHIFT) | entry)
    }

    /// Returns the index of the PTE directory in the outer page table.
    #[inline]
    pub const fn directory_index(self) -> usize {
        arch::page_index(self.0, 1)
    }

    /// Returns the index of the entry within its PTE directory.
    #[inline]
    pub const fn entry_index(self) -> usize {
        arch::page_index(self.0, 0)
    }

    /// Returns whether this page lies inside the simulated address space.
    #[inline]
    pub const fn is_valid(self) -> bool {
        arch::validate_vpn(self.0)
    }

    /// Returns the byte address at the start of this page.
    #[inline]
    pub const fn start(self) -> usize {
        self.0 * arch::PAGE_SIZE
    }
}
