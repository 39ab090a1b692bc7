//! Self-blocking suspends exactly at the block call and resumes right
//! after it; self-termination never returns; the usual misuse attempts
//! are rejected.

mod common;

static REACHED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);
static DONE: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

fn main() {
    clotho::init(&[100 * common::MILLISECOND]).unwrap();

    let tid = clotho::spawn(
        || {
            let me = clotho::current_tid().unwrap();
            REACHED.store(true, std::sync::atomic::Ordering::SeqCst);

            clotho::block(me).unwrap();

            // execution continues here, one dispatch later
            assert_eq!(clotho::quantums(me).unwrap(), 2);
            DONE.store(true, std::sync::atomic::Ordering::SeqCst);
            clotho::terminate(me).unwrap();
            unreachable!("self-terminate returned");
        },
        0,
    )
    .unwrap();
    assert_eq!(tid, 1);

    // let the worker run and block itself
    common::quantum_sleep(1);
    assert!(REACHED.load(std::sync::atomic::Ordering::SeqCst));
    assert!(!DONE.load(std::sync::atomic::Ordering::SeqCst));
    assert_eq!(clotho::info(1).unwrap().state, clotho::ThreadState::Blocked);

    // blocking an already blocked thread is a no-op, not an error
    clotho::block(1).unwrap();

    clotho::resume(1).unwrap();
    assert_eq!(clotho::info(1).unwrap().state, clotho::ThreadState::Ready);

    // resuming a ready thread is a no-op too
    clotho::resume(1).unwrap();

    // let the worker finish and retire itself
    common::quantum_sleep(1);
    assert!(DONE.load(std::sync::atomic::Ordering::SeqCst));

    assert_eq!(clotho::quantums(1), Err(clotho::Error::NoSuchThread(1)));
    assert_eq!(clotho::resume(1), Err(clotho::Error::NoSuchThread(1)));
    assert_eq!(clotho::terminate(7), Err(clotho::Error::NoSuchThread(7)));
    assert_eq!(clotho::block(0), Err(clotho::Error::MainThread));
    assert_eq!(
        clotho::spawn(|| {}, 9),
        Err(clotho::Error::PriorityOutOfRange(9))
    );
    assert_eq!(clotho::init(&[1]), Err(clotho::Error::AlreadyInitialized));

    clotho::terminate(0).unwrap();
    unreachable!("terminate(0) must exit the process");
}
