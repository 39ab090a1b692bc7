fn spin_a_while(iters: u64) {
    for i in 0..iters {
        std::hint::black_box(i);
    }
}

fn worker(rounds: u32) {
    let me = match clotho::current_tid() {
        Ok(tid) => tid,
        Err(_) => return,
    };

    for round in 0..rounds {
        println!("worker {}: round {}", me, round);
        spin_a_while(2_000_000);
        let _ = clotho::yield_now();
    }

    println!("worker {} finished", me);
    let _ = clotho::terminate(me);
}

fn waiter() {
    let me = match clotho::current_tid() {
        Ok(tid) => tid,
        Err(_) => return,
    };

    println!("helper {}: waiting to be resumed", me);
    let _ = clotho::block(me);
    println!("helper {}: resumed, finishing", me);
    let _ = clotho::terminate(me);
}

fn main() {
    // 50ms quanta for the workers' band, 100ms for the background band
    if let Err(e) = clotho::init(&[50 * 1000, 100 * 1000]) {
        eprintln!("failed to initialize: {e}");
        return;
    }

    let helper = clotho::spawn(waiter, 0);
    for _ in 0..2 {
        if let Err(e) = clotho::spawn(|| worker(3), 0) {
            eprintln!("spawn failed: {e}");
        }
    }

    // drop below the workers so their band drains first
    if let Err(e) = clotho::change_priority(0, 1) {
        eprintln!("priority change failed: {e}");
    }

    // we only get the CPU back here once both workers are gone
    while clotho::info(2).is_ok() || clotho::info(3).is_ok() {
        spin_a_while(100_000);
    }

    if let Ok(tid) = helper {
        println!("main: resuming helper {}", tid);
        let _ = clotho::resume(tid);
        while clotho::info(tid).is_ok() {
            spin_a_while(100_000);
        }
    }

    println!("main: all done");
    let _ = clotho::terminate(0);
}
