//! Runtime configuration of the simulated machine.

use crate::arch;

/// Sizes of the simulated physical memory and TLB.
///
/// The page table geometry is fixed at compile time (see [`arch`]); only the amount of
/// physical memory and the number of TLB slots vary between simulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmuConfig {
    /// Number of physical page frames.
    pub frames: usize,
    /// Number of TLB slots.
    pub tlb_entries: usize,
}

impl MmuConfig {
    pub const fn new() -> Self {
        Self {
            frames: arch::NR_PAGEFRAMES,
            tlb_entries: arch::NR_TLB_ENTRIES,
        }
    }

    pub const fn with_frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }

    pub const fn with_tlb_entries(mut self, tlb_entries: usize) -> Self {
        self.tlb_entries = tlb_entries;
        self
    }
}

impl Default for MmuConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_machine_geometry() {
        let config = MmuConfig::default();
        assert_eq!(config.frames, 128);
        assert_eq!(config.tlb_entries, 256);
    }

    #[test]
    fn builders_override_sizes() {
        let config = MmuConfig::new().with_frames(4).with_tlb_entries(2);
        assert_eq!(config, MmuConfig { frames: 4, tlb_entries: 2 });
    }
}
