#![allow(dead_code)]

// Spin until the calling thread has been dispatched `quantums` more
// times. Two consecutive reads differ by at most one, so the equality
// check cannot be skipped over.
pub fn quantum_sleep(quantums: u64) {
    let me = clotho::current_tid().unwrap();
    let target = clotho::quantums(me).unwrap() + quantums;

    while clotho::quantums(me).unwrap() != target {
        // burn user time between polls; the virtual-time countdown only
        // advances while this process runs in user space
        for _ in 0..10_000 {
            std::hint::spin_loop();
        }
    }
}

pub const MILLISECOND: u64 = 1000;
