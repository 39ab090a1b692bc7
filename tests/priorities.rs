//! Per-priority quantum lengths and priority-change latency. A worker
//! demotes itself out of the main thread's band, starves there, and is
//! promoted back by the main thread.

mod common;

fn elapsed_near(actual: std::time::Duration, expected_ms: u64) {
    let expected = std::time::Duration::from_millis(expected_ms);
    // the countdown runs on process CPU time, so wall measurements only
    // ever land late
    let lo = expected.saturating_sub(std::time::Duration::from_millis(50));
    let hi = expected + std::time::Duration::from_millis(150);
    assert!(
        actual >= lo && actual <= hi,
        "expected about {expected:?}, measured {actual:?}"
    );
}

fn main() {
    clotho::init(&[
        300 * common::MILLISECOND,
        600 * common::MILLISECOND,
        1000 * common::MILLISECOND,
    ])
    .unwrap();

    // demotes itself on first dispatch, then spins forever
    let tid = clotho::spawn(
        || {
            clotho::change_priority(1, 1).unwrap();
            loop {
                std::hint::spin_loop();
            }
        },
        0,
    )
    .unwrap();
    assert_eq!(tid, 1);

    let start = std::time::Instant::now();

    // rest of the main quantum, then one full 300ms quantum for the
    // worker: its demotion only lands at its next dispatch
    common::quantum_sleep(1);
    let first = start.elapsed();

    // the worker now sits in band 1 and the band-0 main thread starves it
    common::quantum_sleep(1);
    let second = start.elapsed() - first;

    assert_eq!(clotho::quantums(1).unwrap(), 1);
    assert_eq!(clotho::info(1).unwrap().state, clotho::ThreadState::Ready);
    assert_eq!(clotho::info(1).unwrap().priority, 1);

    // promoting a READY thread re-queues it immediately; it then runs one
    // 300ms quantum in band 0 ahead of the main thread
    clotho::change_priority(1, 0).unwrap();
    common::quantum_sleep(1);
    let third = start.elapsed() - first - second;

    assert_eq!(clotho::quantums(1).unwrap(), 2);

    elapsed_near(first, 600);
    elapsed_near(second, 300);
    elapsed_near(third, 600);

    clotho::terminate(0).unwrap();
    unreachable!("terminate(0) must exit the process");
}
