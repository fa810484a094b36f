#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use ringcache::segment::Segment;
use ringcache::time::ManualClock;

// Fuzz arbitrary operation sequences on Segment
//
// Random put/get/delete interleavings under eviction pressure, validating
// the segment's structural invariants after every operation.
fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let buf_size = 64 + data[0] as usize * 8;
    let max_evac = (data[1] as usize % 8) + 1;
    let clock = Arc::new(ManualClock::new(1));
    let segment = Segment::with_options(buf_size, max_evac, clock.clone());

    let mut idx = 2;
    while idx + 2 < data.len() {
        let op = data[idx] % 4;
        let fp = data[idx + 1];
        let len = data[idx + 2] as usize % 40;
        let key = [fp, fp ^ 0x33];
        clock.advance(1);

        match op {
            0 | 1 => {
                segment.put(u32::from(fp), &key, &vec![fp; len]);
            }
            2 => {
                let mut out = [0u8; 64];
                let (n, hit) = segment.get(u32::from(fp), &key, &mut out);
                if hit {
                    assert!(out[..n].iter().all(|&b| b == fp));
                }
            }
            3 => {
                segment.delete(u32::from(fp), &key);
            }
            _ => unreachable!(),
        }

        segment
            .check_invariants()
            .expect("segment invariants violated");

        idx += 3;
    }
});
