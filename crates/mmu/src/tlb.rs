//! Translation lookaside buffer.
//!
//! The TLB is a small, fully associative cache of recent VPN to PFN translations. It
//! carries no address space tag, so every entry belongs to whichever process was current
//! when it was inserted; the whole cache must be flushed whenever that changes.

use alloc::vec::Vec;

use crate::{FrameNumber, PageNumber};

/// A single TLB slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TlbEntry {
    pub vpn: PageNumber,
    pub pfn: FrameNumber,
    pub valid: bool,
}

/// Fixed-capacity translation cache with linear lookup and no replacement policy.
#[derive(Debug, Clone)]
pub struct Tlb {
    entries: Vec<TlbEntry>,
}

impl Tlb {
    /// Creates an empty TLB with the given number of slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: alloc::vec![TlbEntry::default(); capacity],
        }
    }

    /// Returns the cached frame for a page, or None on a miss.
    ///
    /// The first valid slot whose page matches wins.
    pub fn lookup(&self, vpn: PageNumber) -> Option<FrameNumber> {
        self.entries
            .iter()
            .find(|entry| entry.valid && entry.vpn == vpn)
            .map(|entry| entry.pfn)
    }

    /// Caches a translation.
    ///
    /// An existing valid slot for the same page is updated in place. Otherwise the first
    /// invalid slot is filled; when the TLB is full the translation is dropped.
    pub fn insert(&mut self, vpn: PageNumber, pfn: FrameNumber) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.valid && entry.vpn == vpn)
        {
            entry.pfn = pfn;
            return;
        }

        match self.entries.iter_mut().find(|entry| !entry.valid) {
            Some(entry) => {
                *entry = TlbEntry {
                    vpn,
                    pfn,
                    valid: true,
                };
            }
            None => log::trace!("tlb full, dropping {} -> {}", vpn, pfn),
        }
    }

    /// Drops the cached translation for a page, if any.
    ///
    /// Returns whether a slot was cleared.
    pub fn invalidate(&mut self, vpn: PageNumber) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.valid && entry.vpn == vpn)
        {
            Some(entry) => {
                *entry = TlbEntry::default();
                true
            }
            None => false,
        }
    }

    /// Clears every slot.
    pub fn flush_all(&mut self) {
        self.entries.fill(TlbEntry::default());
    }

    /// Returns the number of valid slots.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.valid).count()
    }

    /// Returns true if no slot is valid.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the total number of slots.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over the valid slots.
    pub fn iter(&self) -> impl Iterator<Item = &TlbEntry> {
        self.entries.iter().filter(|entry| entry.valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vpn(n: usize) -> PageNumber {
        PageNumber::new(n)
    }

    fn pfn(n: usize) -> FrameNumber {
        FrameNumber::new(n)
    }

    #[test]
    fn lookup_misses_on_empty_tlb() {
        let tlb = Tlb::new(4);
        assert_eq!(tlb.lookup(vpn(0)), None);
        assert!(tlb.is_empty());
        assert_eq!(tlb.capacity(), 4);
    }

    #[test]
    fn insert_then_lookup() {
        let mut tlb = Tlb::new(4);
        tlb.insert(vpn(3), pfn(7));
        assert_eq!(tlb.lookup(vpn(3)), Some(pfn(7)));
        assert_eq!(tlb.lookup(vpn(4)), None);
        assert_eq!(tlb.len(), 1);
    }

    #[test]
    fn insert_updates_existing_entry() {
        let mut tlb = Tlb::new(4);
        tlb.insert(vpn(3), pfn(7));
        tlb.insert(vpn(3), pfn(8));
        assert_eq!(tlb.lookup(vpn(3)), Some(pfn(8)));
        assert_eq!(tlb.len(), 1);
    }

    #[test]
    fn insert_is_dropped_when_full() {
        let mut tlb = Tlb::new(2);
        tlb.insert(vpn(0), pfn(0));
        tlb.insert(vpn(1), pfn(1));
        tlb.insert(vpn(2), pfn(2));
        assert_eq!(tlb.len(), 2);
        assert_eq!(tlb.lookup(vpn(0)), Some(pfn(0)));
        assert_eq!(tlb.lookup(vpn(2)), None);
    }

    #[test]
    fn insert_reuses_invalidated_slot() {
        let mut tlb = Tlb::new(2);
        tlb.insert(vpn(0), pfn(0));
        tlb.insert(vpn(1), pfn(1));
        assert!(tlb.invalidate(vpn(0)));
        tlb.insert(vpn(2), pfn(2));
        assert_eq!(tlb.lookup(vpn(2)), Some(pfn(2)));
        assert_eq!(tlb.lookup(vpn(0)), None);
    }

    #[test]
    fn invalidate_unknown_page() {
        let mut tlb = Tlb::new(2);
        tlb.insert(vpn(0), pfn(0));
        assert!(!tlb.invalidate(vpn(1)));
        assert_eq!(tlb.len(), 1);
    }

    #[test]
    fn flush_all_clears_everything() {
        let mut tlb = Tlb::new(8);
        for n in 0..8 {
            tlb.insert(vpn(n), pfn(n));
        }
        tlb.flush_all();
        assert!(tlb.is_empty());
        assert!((0..8).all(|n| tlb.lookup(vpn(n)).is_none()));
        assert_eq!(tlb.capacity(), 8);
    }

    #[test]
    fn zero_capacity_never_caches() {
        let mut tlb = Tlb::new(0);
        tlb.insert(vpn(1), pfn(1));
        assert_eq!(tlb.lookup(vpn(1)), None);
    }
}
