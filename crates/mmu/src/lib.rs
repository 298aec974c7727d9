#![cfg_attr(not(test), no_std)]

//! # Copy-on-write MMU simulator
//!
//! The memory-management core of a multi-process OS simulator. It provides:
//!
//! - Two-level page tables, one per process, with lazily allocated directories.
//! - A small untagged TLB that is flushed on every context switch.
//! - Lowest-index-first frame allocation with per-frame mapcounts shared by all processes.
//! - Fork-on-switch with copy-on-write sharing, resolved by the page fault handler.
//!
//! Only mapping metadata is simulated; frames have no contents.

extern crate alloc;

mod access;
pub mod arch;
mod config;
mod entry;
mod error;
mod fault;
mod flags;
mod frame;
mod mmu;
mod numbers;
mod page_table;
mod process;
mod switch;
mod table;
mod tlb;

pub use access::{Access, ParseAccessError};
pub use config::MmuConfig;
pub use entry::PageEntry;
pub use error::MmuError;
pub use fault::FaultResolution;
pub use flags::PageFlags;
pub use frame::FrameTable;
pub use mmu::{Mmu, MmuStats};
pub use numbers::{FrameNumber, PageNumber};
pub use page_table::PageTable;
pub use process::{Pid, Process};
pub use switch::SwitchOutcome;
pub use table::PteDirectory;
pub use tlb::{Tlb, TlbEntry};

pub use arch::PAGE_SIZE;
