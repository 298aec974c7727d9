//! Page table entry flags.

/// Page table entry flags.
///
/// Flags are stored as a raw usize with specific bits representing the state of the
/// mapping. Only the low four bits are ever used, which leaves the rest of a packed
/// [`PageEntry`](crate::PageEntry) for the frame number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFlags(usize);

impl PageFlags {
    /// Present (valid) bit (bit 0).
    const PRESENT: usize = 1 << 0;

    /// Writable bit (bit 1).
    const WRITABLE: usize = 1 << 1;

    /// Private bit (bit 2). Set on entries that were write-protected by a fork and
    /// must be copied (or reclaimed) on the next write.
    const PRIVATE: usize = 1 << 2;

    /// Creates empty page flags (page not present).
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Creates flags for a freshly mapped, unshared page.
    pub const fn mapped(writable: bool) -> Self {
        if writable {
            Self(Self::PRESENT | Self::WRITABLE)
        } else {
            Self(Self::PRESENT)
        }
    }

    /// Creates page flags from a raw usize value.
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the raw usize value of these flags.
    pub const fn to_raw(self) -> usize {
        self.0
    }

    /// Returns whether the present bit is set.
    pub fn is_present(self) -> bool {
        (self.0 & Self::PRESENT) != 0
    }

    /// Sets or clears the present bit.
    pub fn set_present(&mut self, present: bool) {
        self.set(Self::PRESENT, present);
    }

    /// Returns whether the writable bit is set.
    pub fn is_writable(self) -> bool {
        (self.0 & Self::WRITABLE) != 0
    }

    /// Sets or clears the writable bit.
    pub fn set_writable(&mut self, writable: bool) {
        self.set(Self::WRITABLE, writable);
    }

    /// Returns whether the private (copy-on-write armed) bit is set.
    pub fn is_private(self) -> bool {
        (self.0 & Self::PRIVATE) != 0
    }

    /// Sets or clears the private bit.
    pub fn set_private(&mut self, private: bool) {
        self.set(Self::PRIVATE, private);
    }

    fn set(&mut self, mask: usize, value: bool) {
        if value {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }
}

impl Default for PageFlags {
    fn default() -> Self {
        Self::empty()
    }
}
