use alloc::vec::Vec;

use crate::FrameNumber;

/// Per-frame mapping counts for all of physical memory.
///
/// Modeled after the `_mapcount` field of Linux's `struct page`: each counter records how
/// many page table entries, across every process, currently map the frame. A frame is
/// free exactly when its count is zero.
#[derive(Debug, Clone)]
pub struct FrameTable {
    mapcounts: Vec<u32>,
}

impl FrameTable {
    /// Creates a frame table with every frame free.
    pub fn new(frames: usize) -> Self {
        Self {
            mapcounts: alloc::vec![0; frames],
        }
    }

    /// Returns the lowest-numbered free frame.
    pub fn find_free(&self) -> Option<FrameNumber> {
        self.mapcounts
            .iter()
            .position(|&count| count == 0)
            .map(FrameNumber::new)
    }

    /// Returns the number of mappings of a frame. Unknown frames report zero.
    pub fn mapcount(&self, frame: FrameNumber) -> u32 {
        self.mapcounts.get(frame.as_usize()).copied().unwrap_or(0)
    }

    /// Returns whether no entry maps the frame.
    pub fn is_free(&self, frame: FrameNumber) -> bool {
        self.mapcount(frame) == 0
    }

    /// Records one more mapping of a frame, returning the new count.
    ///
    /// # Panics
    /// Panics if the frame is outside the table.
    pub fn increment(&mut self, frame: FrameNumber) -> u32 {
        let count = &mut self.mapcounts[frame.as_usize()];
        *count += 1;
        *count
    }

    /// Records one fewer mapping of a frame, returning the new count.
    ///
    /// The count never drops below zero; releasing a free frame is logged and ignored.
    pub fn decrement(&mut self, frame: FrameNumber) -> u32 {
        match self.mapcounts.get_mut(frame.as_usize()) {
            Some(count) if *count > 0 => {
                *count -= 1;
                *count
            }
            Some(_) => {
                log::warn!("frame {} released while already free", frame);
                0
            }
            None => {
                log::warn!("frame {} is outside physical memory", frame);
                0
            }
        }
    }

    /// Returns the total number of frames.
    pub fn total_frames(&self) -> usize {
        self.mapcounts.len()
    }

    /// Returns the number of free frames.
    pub fn free_frames(&self) -> usize {
        self.mapcounts.iter().filter(|&&count| count == 0).count()
    }

    /// Returns the number of frames mapped at least once.
    pub fn allocated_frames(&self) -> usize {
        self.total_frames() - self.free_frames()
    }

    /// Iterates over the frames in use together with their mapcounts.
    pub fn in_use(&self) -> impl Iterator<Item = (FrameNumber, u32)> + '_ {
        self.mapcounts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(frame, &count)| (FrameNumber::new(frame), count))
    }
}
