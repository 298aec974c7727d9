//! The simulated memory-management unit.
//!
//! `Mmu` holds everything the simulation shares between processes: the frame table,
//! the TLB, the running process and the list of suspended ones. Every operation runs to
//! completion and leaves these invariants intact before returning:
//!
//! - a frame is free exactly when its mapcount is zero;
//! - a frame mapped more than once has no writable mapping;
//! - the TLB only holds translations of the current process.

use alloc::vec::Vec;

use crate::{
    Access, FrameNumber, FrameTable, MmuConfig, MmuError, PageEntry, PageFlags, PageNumber,
    PageTable, Pid, Process, Tlb,
};

/// Counters describing what the MMU has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MmuStats {
    pub tlb_hits: u64,
    pub tlb_misses: u64,
    pub page_faults: u64,
    pub cow_copies: u64,
    pub cow_reclaims: u64,
    pub allocations: u64,
    pub frees: u64,
    pub switches: u64,
    pub forks: u64,
}

/// The state of one simulated machine.
pub struct Mmu {
    config: MmuConfig,
    pub(crate) frames: FrameTable,
    pub(crate) tlb: Tlb,
    /// The running process; its page table is what the ptbr points at.
    pub(crate) current: Process,
    /// Suspended processes, in the order they were switched out.
    pub(crate) processes: Vec<Process>,
    pub(crate) stats: MmuStats,
}

impl Mmu {
    /// Creates a machine with all frames free, running an initial process with pid 0.
    pub fn new(config: MmuConfig) -> Self {
        Self::with_initial_process(config, Pid::new(0))
    }

    /// Creates a machine running an initial process with the given pid.
    pub fn with_initial_process(config: MmuConfig, pid: Pid) -> Self {
        Self {
            config,
            frames: FrameTable::new(config.frames),
            tlb: Tlb::new(config.tlb_entries),
            current: Process::new(pid),
            processes: Vec::new(),
            stats: MmuStats::default(),
        }
    }

    /// Probes the TLB for a page of the current process.
    pub fn translate_lookup(&self, vpn: PageNumber) -> Option<FrameNumber> {
        self.tlb.lookup(vpn)
    }

    /// Caches a translation for the current process.
    pub fn translate_insert(&mut self, vpn: PageNumber, pfn: FrameNumber) {
        log::trace!("tlb insert {} -> {}", vpn, pfn);
        self.tlb.insert(vpn, pfn);
    }

    /// Maps the lowest free frame at `vpn` in the current process.
    ///
    /// The page is writable when `access` is a write access. The new mapping is not
    /// shared, so it is never armed for copy-on-write.
    pub fn allocate(&mut self, vpn: PageNumber, access: Access) -> Result<FrameNumber, MmuError> {
        if !vpn.is_valid() {
            return Err(MmuError::AddressOutOfRange(vpn));
        }

        let page_table = self.current.page_table_mut();
        page_table.ensure_directories();
        let entry = page_table.lookup(vpn)?;
        if entry.is_present() {
            return Err(MmuError::AlreadyMapped(vpn));
        }

        let frame = self.frames.find_free().ok_or(MmuError::OutOfMemory)?;
        *entry = PageEntry::new(frame, PageFlags::mapped(access.is_write()));
        self.frames.increment(frame);
        self.stats.allocations += 1;

        log::debug!(
            "pid {}: allocated page {} -> frame {} ({})",
            self.current.pid(),
            vpn,
            frame,
            access
        );
        Ok(frame)
    }

    /// Unmaps `vpn` from the current process.
    ///
    /// Returns the frame that was mapped, or None if the page was not mapped. The frame
    /// only becomes free once no other process maps it.
    pub fn deallocate(&mut self, vpn: PageNumber) -> Option<FrameNumber> {
        let entry = match self.current.page_table_mut().lookup(vpn) {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("pid {}: cannot free page {}: {}", self.current.pid(), vpn, err);
                return None;
            }
        };
        let Some(frame) = entry.frame() else {
            log::warn!("pid {}: page {} is not mapped", self.current.pid(), vpn);
            return None;
        };

        entry.clear();
        let remaining = self.frames.decrement(frame);
        self.tlb.invalidate(vpn);
        self.stats.frees += 1;

        log::debug!(
            "pid {}: freed page {} (frame {} now mapped {} times)",
            self.current.pid(),
            vpn,
            frame,
            remaining
        );
        Some(frame)
    }

    /// Translates `vpn` of the current process for `access`, the way the framework does
    /// for every memory reference.
    ///
    /// The TLB is probed first, then the page table. A miss or a protection violation
    /// runs the fault handler and retries the walk. Successful walks fill the TLB.
    pub fn translate(&mut self, vpn: PageNumber, access: Access) -> Result<FrameNumber, MmuError> {
        if !vpn.is_valid() {
            return Err(MmuError::AddressOutOfRange(vpn));
        }

        // The TLB carries no permission bits, so a write hit still has to be allowed
        // by the page table entry.
        if let Some(frame) = self.translate_lookup(vpn) {
            if !access.is_write() || self.current_entry(vpn).is_writable() {
                self.stats.tlb_hits += 1;
                return Ok(frame);
            }
        }
        self.stats.tlb_misses += 1;

        let frame = match self.walk(vpn, access) {
            Some(frame) => frame,
            None => {
                self.stats.page_faults += 1;
                self.handle_fault(vpn, access)?;
                self.walk(vpn, access).ok_or(MmuError::UnresolvedFault)?
            }
        };

        self.translate_insert(vpn, frame);
        Ok(frame)
    }

    /// Walks the current page table, honoring write protection.
    fn walk(&self, vpn: PageNumber, access: Access) -> Option<FrameNumber> {
        let entry = self.current_entry(vpn);
        if access.is_write() && !entry.is_writable() {
            return None;
        }
        entry.frame()
    }

    fn current_entry(&self, vpn: PageNumber) -> PageEntry {
        self.current
            .page_table()
            .entry(vpn)
            .unwrap_or_default()
    }

    pub fn config(&self) -> &MmuConfig {
        &self.config
    }

    /// Returns the running process.
    pub fn current(&self) -> &Process {
        &self.current
    }

    /// Returns the page table the page-table base register points at.
    pub fn ptbr(&self) -> &PageTable {
        self.current.page_table()
    }

    /// Returns the suspended processes, oldest switch first.
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Finds a process by pid, running or suspended.
    pub fn process(&self, pid: Pid) -> Option<&Process> {
        core::iter::once(&self.current)
            .chain(self.processes.iter())
            .find(|process| process.pid() == pid)
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn mapcount(&self, frame: FrameNumber) -> u32 {
        self.frames.mapcount(frame)
    }

    pub fn free_frames(&self) -> usize {
        self.frames.free_frames()
    }

    pub fn tlb(&self) -> &Tlb {
        &self.tlb
    }

    pub fn stats(&self) -> &MmuStats {
        &self.stats
    }
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new(MmuConfig::default())
    }
}
