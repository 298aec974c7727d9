use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use mmu::MmuConfig;

mod command;
mod console;
mod simulator;

use command::Command;
use console::Console;
use simulator::Simulator;

#[derive(Parser)]
#[command(name = "vmsim")]
#[command(about = "Copy-on-write MMU simulator driven by a trace of memory requests")]
struct Args {
    /// Trace file to run (reads stdin when omitted)
    trace: Option<PathBuf>,

    /// Number of physical page frames
    #[arg(short, long, default_value_t = mmu::arch::NR_PAGEFRAMES)]
    frames: usize,

    /// Number of TLB slots
    #[arg(short, long, default_value_t = mmu::arch::NR_TLB_ENTRIES)]
    tlb_entries: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn read_trace(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut trace = String::new();
            io::stdin().read_to_string(&mut trace)?;
            Ok(trace)
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    Console::init(console::level_for_verbosity(args.verbose));

    let config = MmuConfig::new()
        .with_frames(args.frames)
        .with_tlb_entries(args.tlb_entries);
    log::info!(
        "{} frames, {} TLB slots, {} pages per address space",
        config.frames,
        config.tlb_entries,
        mmu::arch::NR_VPNS
    );

    let trace = read_trace(args.trace.as_ref())?;
    let mut sim = Simulator::new(config, io::stdout().lock());
    for (index, line) in trace.lines().enumerate() {
        let command =
            Command::parse_line(line).map_err(|e| format!("line {}: {}", index + 1, e))?;
        if let Some(command) = command {
            sim.execute(command)?;
        }
    }

    log::info!(
        "done: {} of {} frames free",
        sim.mmu().free_frames(),
        config.frames
    );
    Ok(())
}
