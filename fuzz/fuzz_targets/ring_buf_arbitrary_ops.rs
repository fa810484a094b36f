#![no_main]

use libfuzzer_sys::fuzz_target;
use ringcache::ds::RingBuf;

// Fuzz arbitrary operation sequences on RingBuf
//
// Drives random append/skip/evacuate sequences against a flat byte-vector
// model, checking window contents, the evacuate round-trip, and
// bytes_equal along the way.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = (data[0] as usize % 64).max(1);
    let mut rb = RingBuf::new(capacity);
    let mut model: Vec<u8> = Vec::new();

    let mut idx = 1;
    while idx + 1 < data.len() {
        let op = data[idx] % 4;
        let arg = data[idx + 1] as usize;

        match op {
            0 => {
                let n = arg % (rb.available() + 1);
                let bytes: Vec<u8> = (0..n).map(|i| (arg + i) as u8).collect();
                rb.append(&bytes);
                model.extend_from_slice(&bytes);
            }
            1 => {
                let n = arg % (rb.len() + 1);
                rb.skip(n);
                model.drain(..n);
            }
            2 => {
                let n = arg % (rb.len() + 1);
                let prev_end = rb.evacuate(n);
                let front: Vec<u8> = model.drain(..n).collect();

                let mut moved = vec![0u8; n];
                rb.read_at(&mut moved, prev_end);
                assert_eq!(moved, front);

                model.extend_from_slice(&front);
            }
            3 => {
                let mut window = vec![0u8; rb.len()];
                rb.read_at(&mut window, rb.begin());
                assert_eq!(window, model);
                assert!(rb.bytes_equal(rb.begin(), &window));
            }
            _ => unreachable!(),
        }

        assert!(rb.len() <= rb.capacity());
        assert!(rb.begin() < rb.capacity());
        assert_eq!(rb.available(), rb.capacity() - rb.len());

        idx += 2;
    }
});
