//! Context switch and fork-on-switch.

use core::mem;

use crate::{Mmu, PageTable, Pid, Process};

/// What a call to [`Mmu::switch`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The requested process was already running.
    AlreadyCurrent,
    /// A suspended process was resumed.
    Resumed,
    /// No process had the pid, so the running process was forked.
    Forked { parent: Pid },
}

impl Mmu {
    /// Makes `pid` the running process.
    ///
    /// A suspended process with that pid is resumed. Otherwise the running process is
    /// forked: the child gets a copy of every page table entry, every shared frame gains
    /// a mapping, and writable pages become read-only and armed for copy-on-write in both
    /// parent and child. The process that stops running is appended to the process list.
    ///
    /// The TLB is flushed in every case, since its entries carry no process tag.
    pub fn switch(&mut self, pid: Pid) -> SwitchOutcome {
        let previous = self.current.pid();
        let outcome = if pid == previous {
            SwitchOutcome::AlreadyCurrent
        } else if let Some(index) = self.processes.iter().position(|p| p.pid() == pid) {
            let next = self.processes.remove(index);
            let suspended = mem::replace(&mut self.current, next);
            self.processes.push(suspended);
            SwitchOutcome::Resumed
        } else {
            let child = self.fork_current(pid);
            let parent = mem::replace(&mut self.current, child);
            self.processes.push(parent);
            self.stats.forks += 1;
            SwitchOutcome::Forked { parent: previous }
        };

        self.tlb.flush_all();
        self.stats.switches += 1;
        log::debug!("switched from pid {} to pid {}: {:?}", previous, pid, outcome);
        outcome
    }

    /// Builds a copy-on-write child of the running process.
    fn fork_current(&mut self, pid: Pid) -> Process {
        let mut page_table = PageTable::new();
        page_table.ensure_directories();

        let mut shared = 0usize;
        for (vpn, entry) in self.current.page_table_mut().mappings_mut() {
            if let Some(frame) = entry.frame() {
                self.frames.increment(frame);
                shared += 1;
            }
            entry.write_protect();
            if let Err(err) = page_table.install(vpn, *entry) {
                log::warn!("fork of pid {}: page {}: {}", pid, vpn, err);
            }
        }

        log::debug!("forked pid {} sharing {} frames", pid, shared);
        Process::with_page_table(pid, page_table)
    }
}
