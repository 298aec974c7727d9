//! Page table entry.

use crate::{FrameNumber, PageFlags};

/// A single page table entry.
///
/// The entry is packed into one word so that two entries are "bit-for-bit identical"
/// exactly when they compare equal:
/// - Bits 0-3: Flags (present, writable, private)
/// - Bits 4-63: Physical frame number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct PageEntry(usize);

impl PageEntry {
    /// Flag bits mask (bits 0-3).
    const FLAGS_MASK: usize = 0xF;

    /// Shift of the frame number above the flag bits.
    const FRAME_SHIFT: usize = 4;

    /// Creates a new page table entry.
    pub fn new(frame: FrameNumber, flags: PageFlags) -> Self {
        let frame_bits = frame.as_usize() << Self::FRAME_SHIFT;
        let flag_bits = flags.to_raw() & Self::FLAGS_MASK;
        Self(frame_bits | flag_bits)
    }

    /// Returns the frame mapped by this entry.
    ///
    /// Returns None if the entry is not present.
    pub fn frame(self) -> Option<FrameNumber> {
        if self.is_present() {
            Some(FrameNumber::new(self.0 >> Self::FRAME_SHIFT))
        } else {
            None
        }
    }

    /// Returns the flags for this entry.
    pub fn flags(self) -> PageFlags {
        PageFlags::from_raw(self.0 & Self::FLAGS_MASK)
    }

    /// Sets the flags for this entry, preserving the frame.
    pub fn set_flags(&mut self, flags: PageFlags) {
        let frame_bits = self.0 & !Self::FLAGS_MASK;
        let flag_bits = flags.to_raw() & Self::FLAGS_MASK;
        self.0 = frame_bits | flag_bits;
    }

    /// Returns whether this entry is present (valid).
    pub fn is_present(self) -> bool {
        self.flags().is_present()
    }

    /// Returns whether writes through this entry are allowed.
    pub fn is_writable(self) -> bool {
        self.is_present() && self.flags().is_writable()
    }

    /// Returns whether this entry is armed for copy-on-write.
    pub fn is_private(self) -> bool {
        self.is_present() && self.flags().is_private()
    }

    /// Drops write permission and arms copy-on-write.
    ///
    /// Entries that are not writable are left alone: a page mapped read-only stays
    /// read-only for good and must not become writable through a later fault.
    pub fn write_protect(&mut self) {
        if !self.is_writable() {
            return;
        }
        let mut flags = self.flags();
        flags.set_writable(false);
        flags.set_private(true);
        self.set_flags(flags);
    }

    /// Restores write permission and disarms copy-on-write, keeping the frame.
    pub fn make_exclusive(&mut self) {
        let mut flags = self.flags();
        flags.set_writable(true);
        flags.set_private(false);
        self.set_flags(flags);
    }

    /// Clears this entry (sets it to zero).
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Returns the raw usize value of this entry.
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Creates an entry from a raw usize value.
    pub const fn from_usize(value: usize) -> Self {
        Self(value)
    }
}

impl Default for PageEntry {
    fn default() -> Self {
        Self(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_entry_is_not_present() {
        let entry = PageEntry::default();
        assert!(!entry.is_present());
        assert_eq!(entry.frame(), None);
        assert_eq!(entry.as_usize(), 0);
    }

    #[test]
    fn packs_frame_and_flags() {
        let entry = PageEntry::new(FrameNumber::new(5), PageFlags::mapped(true));
        assert_eq!(entry.frame(), Some(FrameNumber::new(5)));
        assert!(entry.is_writable());
        assert!(!entry.is_private());
        assert_eq!(entry.as_usize(), (5 << 4) | 0b011);
        assert_eq!(PageEntry::from_usize(entry.as_usize()), entry);
    }

    #[test]
    fn frame_is_hidden_when_not_present() {
        let mut entry = PageEntry::new(FrameNumber::new(9), PageFlags::mapped(false));
        let mut flags = entry.flags();
        flags.set_present(false);
        entry.set_flags(flags);
        assert_eq!(entry.frame(), None);
    }

    #[test]
    fn write_protect_arms_cow() {
        let mut entry = PageEntry::new(FrameNumber::new(2), PageFlags::mapped(true));
        entry.write_protect();
        assert!(!entry.is_writable());
        assert!(entry.is_private());
        assert_eq!(entry.frame(), Some(FrameNumber::new(2)));
    }

    #[test]
    fn write_protect_leaves_read_only_pages_unarmed() {
        let mut entry = PageEntry::new(FrameNumber::new(2), PageFlags::mapped(false));
        entry.write_protect();
        assert!(!entry.is_writable());
        assert!(!entry.is_private());
    }

    #[test]
    fn make_exclusive_restores_write() {
        let mut entry = PageEntry::new(FrameNumber::new(4), PageFlags::mapped(true));
        entry.write_protect();
        entry.make_exclusive();
        assert!(entry.is_writable());
        assert!(!entry.is_private());
        assert_eq!(entry.frame(), Some(FrameNumber::new(4)));
    }

    #[test]
    fn clear_resets_everything() {
        let mut entry = PageEntry::new(FrameNumber::new(4), PageFlags::mapped(true));
        entry.clear();
        assert_eq!(entry, PageEntry::default());
    }
}
