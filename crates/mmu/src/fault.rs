//! Copy-on-write fault handling.

use crate::{Access, FrameNumber, Mmu, MmuError, PageEntry, PageFlags, PageNumber};

/// How a page fault was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultResolution {
    /// The faulting process was the last one mapping the frame, so it got write access
    /// back without a copy.
    Reclaimed(FrameNumber),
    /// The frame was still shared; the faulting process now maps a private copy.
    Copied { from: FrameNumber, to: FrameNumber },
}

impl Mmu {
    /// Resolves a fault on `vpn` of the current process.
    ///
    /// Only writes to a read-only page that a fork armed for copy-on-write can be
    /// resolved here. Everything else is reported back to the framework:
    /// - no valid entry: `StructuralMiss`, the framework allocates on first touch;
    /// - entry not armed, already writable, or a read access: `UnresolvedFault`;
    /// - no frame left for the copy: `OutOfMemory`, with the mapping left as it was.
    pub fn handle_fault(
        &mut self,
        vpn: PageNumber,
        access: Access,
    ) -> Result<FaultResolution, MmuError> {
        let pid = self.current.pid();
        let entry = self.current.page_table_mut().lookup(vpn)?;
        let Some(frame) = entry.frame() else {
            return Err(MmuError::StructuralMiss);
        };

        if !entry.is_private() || entry.is_writable() || !access.is_write() {
            log::debug!(
                "pid {}: unresolved {} fault on page {} (entry {:#x})",
                pid,
                access,
                vpn,
                entry.as_usize()
            );
            return Err(MmuError::UnresolvedFault);
        }

        match self.frames.mapcount(frame) {
            0 => {
                log::warn!("pid {}: page {} maps free frame {}", pid, vpn, frame);
                Err(MmuError::UnresolvedFault)
            }
            1 => {
                entry.make_exclusive();
                self.stats.cow_reclaims += 1;
                log::debug!("pid {}: reclaimed frame {} for page {}", pid, frame, vpn);
                Ok(FaultResolution::Reclaimed(frame))
            }
            _ => {
                let copy = self.frames.find_free().ok_or(MmuError::OutOfMemory)?;
                *entry = PageEntry::new(copy, PageFlags::mapped(true));
                self.frames.increment(copy);
                self.frames.decrement(frame);
                self.tlb.invalidate(vpn);
                self.stats.cow_copies += 1;
                log::debug!(
                    "pid {}: copied page {} from frame {} to frame {}",
                    pid,
                    vpn,
                    frame,
                    copy
                );
                Ok(FaultResolution::Copied {
                    from: frame,
                    to: copy,
                })
            }
        }
    }

    /// Boolean form of [`Mmu::handle_fault`]: true when the fault was resolved.
    pub fn resolve_fault(&mut self, vpn: PageNumber, access: Access) -> bool {
        self.handle_fault(vpn, access).is_ok()
    }
}
