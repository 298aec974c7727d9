use mmu::{
    Access, FaultResolution, FrameNumber, Mmu, MmuConfig, MmuError, PageNumber, Pid,
    SwitchOutcome, arch,
};

fn vpn(n: usize) -> PageNumber {
    PageNumber::new(n)
}

fn pfn(n: usize) -> FrameNumber {
    FrameNumber::new(n)
}

fn machine(frames: usize) -> Mmu {
    Mmu::new(MmuConfig::new().with_frames(frames))
}

/// No frame with a zero mapcount is mapped, and no shared frame is writable.
fn assert_invariants(mmu: &Mmu) {
    let mut mappings = vec![0u32; mmu.frames().total_frames()];
    let mut writable = vec![false; mmu.frames().total_frames()];
    let tables = std::iter::once(mmu.current()).chain(mmu.processes().iter());
    for process in tables {
        for (_, entry) in process.page_table().mappings() {
            let frame = entry.frame().unwrap().as_usize();
            mappings[frame] += 1;
            writable[frame] |= entry.is_writable();
        }
    }
    for (frame, &count) in mappings.iter().enumerate() {
        assert_eq!(mmu.mapcount(pfn(frame)), count, "mapcount of frame {frame}");
        if count >= 2 {
            assert!(!writable[frame], "shared frame {frame} is writable");
        }
    }
}

#[test]
fn allocation_is_visible_to_page_walk() {
    let mut mmu = machine(16);
    for n in [0, 7, 16, 100, arch::NR_VPNS - 1] {
        let frame = mmu.allocate(vpn(n), Access::ReadWrite).unwrap();
        assert_eq!(mmu.ptbr().walk(vpn(n)), Some(frame));
        assert_eq!(mmu.mapcount(frame), 1);
    }
    assert_invariants(&mmu);
}

#[test]
fn sequential_allocations_use_lowest_frames() {
    let mut mmu = machine(32);
    let frames: Vec<_> = (0..32)
        .map(|n| mmu.allocate(vpn(n * 3), Access::Read).unwrap())
        .collect();
    let expected: Vec<_> = (0..32).map(pfn).collect();
    assert_eq!(frames, expected);
    assert_eq!(mmu.free_frames(), 0);
}

#[test]
fn freed_frame_is_not_handed_out_while_shared() {
    let mut mmu = machine(4);
    mmu.allocate(vpn(0), Access::ReadWrite).unwrap();
    mmu.switch(Pid::new(1));

    // The child drops its mapping; the parent still maps frame 0.
    assert_eq!(mmu.deallocate(vpn(0)), Some(pfn(0)));
    assert_eq!(mmu.mapcount(pfn(0)), 1);
    assert_eq!(mmu.allocate(vpn(1), Access::ReadWrite), Ok(pfn(1)));
    assert_invariants(&mmu);

    mmu.switch(Pid::new(0));
    assert_eq!(mmu.deallocate(vpn(0)), Some(pfn(0)));
    assert_eq!(mmu.allocate(vpn(2), Access::ReadWrite), Ok(pfn(0)));
    assert_invariants(&mmu);
}

#[test]
fn fork_increments_each_shared_frame_once() {
    let mut mmu = machine(16);
    let pages = [0, 1, 33, 250];
    for (i, &n) in pages.iter().enumerate() {
        let access = if i % 2 == 0 { Access::ReadWrite } else { Access::Read };
        mmu.allocate(vpn(n), access).unwrap();
    }
    let before: Vec<_> = (0..pages.len()).map(|n| mmu.mapcount(pfn(n))).collect();

    assert_eq!(
        mmu.switch(Pid::new(2)),
        SwitchOutcome::Forked { parent: Pid::new(0) }
    );

    for (n, count) in before.into_iter().enumerate() {
        assert_eq!(mmu.mapcount(pfn(n)), count + 1);
    }
    let parent = mmu.process(Pid::new(0)).unwrap().page_table();
    for &n in &pages {
        let entry = parent.entry(vpn(n)).unwrap();
        assert!(!entry.is_writable());
        assert_eq!(mmu.ptbr().entry(vpn(n)).unwrap(), entry);
    }
    assert_invariants(&mmu);
}

#[test]
fn cow_write_splits_shared_frame() {
    let mut mmu = machine(8);
    mmu.allocate(vpn(4), Access::ReadWrite).unwrap();
    mmu.switch(Pid::new(1));

    assert_eq!(mmu.translate(vpn(4), Access::Write), Ok(pfn(1)));
    assert_eq!(mmu.mapcount(pfn(0)), 1);
    assert_eq!(mmu.mapcount(pfn(1)), 1);
    let parent = mmu.process(Pid::new(0)).unwrap().page_table();
    assert_eq!(parent.walk(vpn(4)), Some(pfn(0)));
    assert_invariants(&mmu);

    // The parent is now the sole owner; its write keeps the frame.
    mmu.switch(Pid::new(0));
    assert_eq!(
        mmu.handle_fault(vpn(4), Access::Write),
        Ok(FaultResolution::Reclaimed(pfn(0)))
    );
    let entry = mmu.ptbr().entry(vpn(4)).unwrap();
    assert!(entry.is_writable());
    assert!(!entry.is_private());
    assert_invariants(&mmu);
}

#[test]
fn every_switch_flushes_the_tlb() {
    let mut mmu = machine(8);
    for n in 0..4 {
        mmu.allocate(vpn(n), Access::ReadWrite).unwrap();
        mmu.translate(vpn(n), Access::Read).unwrap();
    }

    for pid in [1, 0, 2, 2, 1] {
        mmu.switch(Pid::new(pid));
        for n in 0..arch::NR_VPNS {
            assert_eq!(mmu.translate_lookup(vpn(n)), None);
        }
        for n in 0..4 {
            mmu.translate(vpn(n), Access::Read).unwrap();
        }
    }
}

#[test]
fn cow_under_memory_pressure() {
    let mut mmu = machine(4);
    for n in 0..4 {
        assert_eq!(mmu.allocate(vpn(n), Access::ReadWrite), Ok(pfn(n)));
    }
    assert_eq!(
        mmu.allocate(vpn(4), Access::ReadWrite),
        Err(MmuError::OutOfMemory)
    );

    mmu.switch(Pid::new(2));
    let parent = mmu.process(Pid::new(0)).unwrap().page_table();
    for n in 0..4 {
        assert_eq!(mmu.mapcount(pfn(n)), 2);
        let entry = parent.entry(vpn(n)).unwrap();
        assert!(!entry.is_writable());
        assert!(entry.is_private());
    }

    assert!(!mmu.resolve_fault(vpn(0), Access::Write));
    assert_eq!(
        mmu.translate(vpn(0), Access::Write),
        Err(MmuError::OutOfMemory)
    );
    for n in 0..4 {
        assert_eq!(mmu.mapcount(pfn(n)), 2);
    }
    assert_invariants(&mmu);

    // Reads still work through the shared frames.
    assert_eq!(mmu.translate(vpn(0), Access::Read), Ok(pfn(0)));
}

#[test]
fn independent_machines_do_not_interfere() {
    let mut a = machine(4);
    let mut b = machine(4);
    a.allocate(vpn(0), Access::ReadWrite).unwrap();
    a.switch(Pid::new(1));

    assert_eq!(b.allocate(vpn(0), Access::ReadWrite), Ok(pfn(0)));
    assert_eq!(b.mapcount(pfn(0)), 1);
    assert_eq!(a.mapcount(pfn(0)), 2);
    assert!(b.processes().is_empty());
}
