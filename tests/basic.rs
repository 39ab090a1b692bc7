//! A single spawned thread runs for one quantum and terminates itself
//! while the main thread waits out its own quantum.

mod common;

static RAN: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

fn main() {
    clotho::init(&[100 * common::MILLISECOND]).unwrap();

    // the main thread is mid-way through the only quantum so far
    assert_eq!(clotho::total_quantums().unwrap(), 1);
    assert_eq!(clotho::quantums(0).unwrap(), 1);

    let tid = clotho::spawn(
        || {
            assert_eq!(clotho::current_tid().unwrap(), 1);

            // every thread begins with one quantum of its own
            assert_eq!(clotho::quantums(1).unwrap(), 1);

            // the main thread's count is unchanged
            assert_eq!(clotho::quantums(0).unwrap(), 1);

            // and this is the second dispatch of the whole run
            assert_eq!(clotho::total_quantums().unwrap(), 2);

            RAN.store(true, std::sync::atomic::Ordering::SeqCst);
            clotho::terminate(1).unwrap();
        },
        0,
    )
    .unwrap();
    assert_eq!(tid, 1);

    // spawning alone must not switch or account anything
    assert_eq!(clotho::total_quantums().unwrap(), 1);
    assert_eq!(clotho::quantums(0).unwrap(), 1);

    common::quantum_sleep(1);

    assert!(RAN.load(std::sync::atomic::Ordering::SeqCst));
    assert_eq!(clotho::quantums(0).unwrap(), 2);
    assert_eq!(clotho::total_quantums().unwrap(), 3);

    clotho::terminate(0).unwrap();
    unreachable!("terminate(0) must exit the process");
}
