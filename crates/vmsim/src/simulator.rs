//! Runs trace commands against an MMU and reports the results.
//!
//! This plays the part of the simulation framework: it owns the machine, issues one
//! request at a time, and prints what happened. A failed request is reported and the
//! trace carries on.

use std::io::{self, Write};

use mmu::{Access, Mmu, MmuConfig, MmuError, PageNumber, SwitchOutcome};

use crate::command::Command;

pub struct Simulator<W> {
    mmu: Mmu,
    out: W,
}

impl<W: Write> Simulator<W> {
    pub fn new(config: MmuConfig, out: W) -> Self {
        Self {
            mmu: Mmu::new(config),
            out,
        }
    }

    pub fn mmu(&self) -> &Mmu {
        &self.mmu
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn execute(&mut self, command: Command) -> io::Result<()> {
        match command {
            Command::Alloc { vpn, access } => self.alloc(vpn, access),
            Command::Free { vpn } => self.free(vpn),
            Command::Access { vpn, access } => self.access(vpn, access),
            Command::Switch { pid } => {
                let outcome = self.mmu.switch(pid);
                match outcome {
                    SwitchOutcome::AlreadyCurrent => {
                        writeln!(self.out, "switch {}: already running", pid)
                    }
                    SwitchOutcome::Resumed => writeln!(self.out, "switch {}: resumed", pid),
                    SwitchOutcome::Forked { parent } => {
                        writeln!(self.out, "switch {}: forked from pid {}", pid, parent)
                    }
                }
            }
            Command::Show => self.show(),
            Command::Pages => self.pages(),
            Command::Tlb => self.tlb(),
            Command::Stats => self.stats(),
        }
    }

    fn alloc(&mut self, vpn: PageNumber, access: Access) -> io::Result<()> {
        match self.mmu.allocate(vpn, access) {
            Ok(frame) => writeln!(self.out, "alloc {} {}: frame {}", vpn, access, frame),
            Err(err) => writeln!(self.out, "alloc {} {}: {}", vpn, access, err),
        }
    }

    fn free(&mut self, vpn: PageNumber) -> io::Result<()> {
        match self.mmu.deallocate(vpn) {
            Some(frame) => writeln!(self.out, "free {}: frame {}", vpn, frame),
            None => writeln!(self.out, "free {}: not mapped", vpn),
        }
    }

    fn access(&mut self, vpn: PageNumber, access: Access) -> io::Result<()> {
        let verb = if access.is_write() { "write" } else { "read" };
        let copies = self.mmu.stats().cow_copies;
        match self.mmu.translate(vpn, access) {
            Ok(frame) if self.mmu.stats().cow_copies > copies => {
                writeln!(self.out, "{} {}: frame {} (copied)", verb, vpn, frame)
            }
            Ok(frame) => writeln!(self.out, "{} {}: frame {}", verb, vpn, frame),
            Err(MmuError::StructuralMiss) => {
                writeln!(self.out, "{} {}: page fault, page not mapped", verb, vpn)
            }
            Err(err) => writeln!(self.out, "{} {}: page fault, {}", verb, vpn, err),
        }
    }

    fn show(&mut self) -> io::Result<()> {
        let process = self.mmu.current();
        writeln!(self.out, "pid {}:", process.pid())?;
        for (vpn, entry) in process.page_table().mappings() {
            let Some(frame) = entry.frame() else {
                continue;
            };
            writeln!(
                self.out,
                "  {:>3} -> {:>3}  r{}{}  mapcount {}",
                vpn,
                frame,
                if entry.is_writable() { 'w' } else { '-' },
                if entry.is_private() { 'p' } else { '-' },
                self.mmu.mapcount(frame)
            )?;
        }
        Ok(())
    }

    fn pages(&mut self) -> io::Result<()> {
        let frames = self.mmu.frames();
        writeln!(
            self.out,
            "frames: {} of {} in use",
            frames.allocated_frames(),
            frames.total_frames()
        )?;
        for (frame, count) in frames.in_use() {
            writeln!(self.out, "  {:>3}: {}", frame, count)?;
        }
        Ok(())
    }

    fn tlb(&mut self) -> io::Result<()> {
        let tlb = self.mmu.tlb();
        writeln!(self.out, "tlb: {} of {} slots", tlb.len(), tlb.capacity())?;
        for entry in tlb.iter() {
            writeln!(self.out, "  {:>3} -> {:>3}", entry.vpn, entry.pfn)?;
        }
        Ok(())
    }

    fn stats(&mut self) -> io::Result<()> {
        let stats = *self.mmu.stats();
        let rows = [
            ("tlb hits", stats.tlb_hits),
            ("tlb misses", stats.tlb_misses),
            ("page faults", stats.page_faults),
            ("cow copies", stats.cow_copies),
            ("cow reclaims", stats.cow_reclaims),
            ("allocations", stats.allocations),
            ("frees", stats.frees),
            ("switches", stats.switches),
            ("forks", stats.forks),
        ];
        for (name, value) in rows {
            writeln!(self.out, "{:<12} {}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(frames: usize, trace: &str) -> String {
        let mut sim = Simulator::new(MmuConfig::new().with_frames(frames), Vec::new());
        for line in trace.lines() {
            if let Some(command) = Command::parse_line(line).unwrap() {
                sim.execute(command).unwrap();
            }
        }
        String::from_utf8(sim.into_output()).unwrap()
    }

    #[test]
    fn reports_allocation_and_access() {
        let out = run(
            4,
            "alloc 1 rw\n\
             read 1\n\
             write 2\n\
             free 1\n\
             free 1\n",
        );
        assert_eq!(
            out,
            "alloc 1 rw: frame 0\n\
             read 1: frame 0\n\
             write 2: page fault, page not mapped\n\
             free 1: frame 0\n\
             free 1: not mapped\n"
        );
    }

    #[test]
    fn reports_fork_and_copy() {
        let out = run(
            4,
            "alloc 0 rw\n\
             switch 1\n\
             write 0\n\
             switch 0\n\
             switch 0\n",
        );
        assert_eq!(
            out,
            "alloc 0 rw: frame 0\n\
             switch 1: forked from pid 0\n\
             write 0: frame 1 (copied)\n\
             switch 0: resumed\n\
             switch 0: already running\n"
        );
    }

    #[test]
    fn reports_exhaustion_under_cow() {
        let out = run(
            1,
            "alloc 0 rw\n\
             alloc 1 rw\n\
             switch 2\n\
             write 0\n",
        );
        assert_eq!(
            out,
            "alloc 0 rw: frame 0\n\
             alloc 1 rw: out of physical frames\n\
             switch 2: forked from pid 0\n\
             write 0: page fault, out of physical frames\n"
        );
    }

    #[test]
    fn show_lists_current_mappings() {
        let out = run(4, "alloc 3 rw\nalloc 17 r\nswitch 1\nshow\n");
        assert!(out.contains("pid 1:\n"));
        assert!(out.contains("    3 ->   0  r-p  mapcount 2\n"));
        assert!(out.contains("   17 ->   1  r--  mapcount 2\n"));
    }

    #[test]
    fn pages_and_tlb_reports() {
        let out = run(4, "alloc 0 rw\nread 0\npages\ntlb\n");
        assert!(out.contains("frames: 1 of 4 in use\n"));
        assert!(out.contains("    0: 1\n"));
        assert!(out.contains("tlb: 1 of 256 slots\n"));
        assert!(out.contains("    0 ->   0\n"));
    }

    #[test]
    fn stats_report() {
        let out = run(4, "alloc 0 rw\nread 0\nread 0\nstats\n");
        assert!(out.contains("tlb hits     1\n"));
        assert!(out.contains("tlb misses   1\n"));
        assert!(out.contains("allocations  1\n"));
    }
}
