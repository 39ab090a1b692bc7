// All mutable state lives in module statics owned by the one OS thread the
// library runs on. Every entry point raises the tick mask before touching
// them, so the tick handler can never observe a half-applied mutation.

pub(crate) static mut TABLE: std::option::Option<crate::table::ThreadTable> =
    std::option::Option::None;
pub(crate) static mut READY: std::option::Option<crate::queue::ReadyQueues> =
    std::option::Option::None;
pub(crate) static mut QUANTUM_USECS: std::option::Option<std::boxed::Box<[u64]>> =
    std::option::Option::None;
pub(crate) static mut CURRENT_TID: crate::types::Tid = 0;
pub(crate) static mut TOTAL_QUANTUMS: u64 = 0;
// A self-terminated thread executes on its own stack until the final
// switch, so the stack is parked here and freed from the next thread.
pub(crate) static mut DEAD_STACK: std::option::Option<crate::context::Stack> =
    std::option::Option::None;

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum DispatchReason {
    Yield,
    BlockedSelf,
    TerminatedSelf,
    Preempted,
}

unsafe fn is_initialized() -> bool {
    unsafe {
        let table_ptr = &raw const TABLE;
        (*table_ptr).is_some()
    }
}

pub(crate) unsafe fn current() -> crate::types::Tid {
    unsafe {
        let current_ptr = &raw const CURRENT_TID;
        *current_ptr
    }
}

unsafe fn table() -> &'static mut crate::table::ThreadTable {
    unsafe {
        let table_ptr = &raw mut TABLE;
        match &mut *table_ptr {
            Some(table) => table,
            None => crate::error::fatal("thread table missing"),
        }
    }
}

unsafe fn ready() -> &'static mut crate::queue::ReadyQueues {
    unsafe {
        let ready_ptr = &raw mut READY;
        match &mut *ready_ptr {
            Some(ready) => ready,
            None => crate::error::fatal("ready queues missing"),
        }
    }
}

unsafe fn quantum_usecs() -> &'static [u64] {
    unsafe {
        let quantum_ptr = &raw const QUANTUM_USECS;
        match &*quantum_ptr {
            Some(lengths) => lengths,
            None => crate::error::fatal("quantum table missing"),
        }
    }
}

unsafe fn reclaim_dead_stack() {
    unsafe {
        let dead_ptr = &raw mut DEAD_STACK;
        *dead_ptr = std::option::Option::None;
    }
}

// Hand the CPU to the next ready thread; runs with the tick masked.
// Returns a second time, into `cur`, when some later dispatch restores the
// snapshot saved below.
pub(crate) unsafe fn dispatch(reason: DispatchReason) {
    unsafe {
        let cur = current();

        match reason {
            DispatchReason::Yield | DispatchReason::Preempted => {
                reclaim_dead_stack();
                let tcb = match table().get_mut(cur) {
                    Some(tcb) => tcb,
                    None => crate::error::fatal("running thread has no control block"),
                };
                tcb.state = crate::types::ThreadState::Ready;
                let priority = tcb.priority;
                ready().push_back(priority, cur);
            }
            // the caller already took the thread out of the running state
            DispatchReason::BlockedSelf => reclaim_dead_stack(),
            // the caller already tore the control block down
            DispatchReason::TerminatedSelf => {}
        }

        if reason != DispatchReason::TerminatedSelf {
            let regs = match table().get_mut(cur) {
                Some(tcb) => tcb.regs_mut(),
                None => crate::error::fatal("running thread has no control block"),
            };
            if crate::context::set_context(regs) != 0 {
                // the snapshot was resumed: we are `cur` again
                return;
            }
        }

        // the main thread is ready or running unless it is mid-exit, so
        // an empty queue set is unreachable
        let (_, next) = match ready().pop_highest() {
            Some(popped) => popped,
            None => crate::error::fatal("no runnable thread"),
        };

        let current_ptr = &raw mut CURRENT_TID;
        *current_ptr = next;

        let tcb = match table().get_mut(next) {
            Some(tcb) => tcb,
            None => crate::error::fatal("ready thread has no control block"),
        };
        tcb.state = crate::types::ThreadState::Running;
        tcb.quantums += 1;

        let total_ptr = &raw mut TOTAL_QUANTUMS;
        *total_ptr += 1;

        crate::timer::arm(quantum_usecs()[tcb.priority]);
        crate::context::switch_context(tcb.regs());
    }
}

pub(crate) fn on_tick() {
    unsafe {
        if !is_initialized() {
            return;
        }

        wake_sleepers();
        dispatch(DispatchReason::Preempted);
    }
}

// Tick every sleeping countdown; a sleeper that hits zero re-enters
// circulation ahead of the thread this tick preempts, unless an explicit
// block was layered on top while it slept.
unsafe fn wake_sleepers() {
    unsafe {
        for tid in 0..table().capacity() {
            let tcb = match table().get_mut(tid) {
                Some(tcb) => tcb,
                None => continue,
            };

            if let crate::types::ThreadState::Sleeping { remaining, blocked } = tcb.state {
                let remaining = remaining - 1;
                if remaining > 0 {
                    tcb.state = crate::types::ThreadState::Sleeping { remaining, blocked };
                } else if blocked {
                    tcb.state = crate::types::ThreadState::Blocked;
                } else {
                    tcb.state = crate::types::ThreadState::Ready;
                    let priority = tcb.priority;
                    ready().push_back(priority, tid);
                }
            }
        }
    }
}

// entry point for spawned threads; arrives from a dispatch with the tick
// mask still raised
#[unsafe(no_mangle)]
pub extern "C" fn thread_start() -> ! {
    let entry = unsafe {
        let tid = current();
        table().get_mut(tid).and_then(|tcb| tcb.entry.take())
    };

    crate::critical::lower();

    if let Some(entry) = entry {
        entry.execute();
    }

    // running off the end of the entry retires the thread
    let tid = unsafe { current() };
    let _ = terminate(tid);
    unreachable!("terminated thread resumed");
}

// quantum_usecs[p] is the quantum length, in microseconds of process CPU
// time, granted to a thread of priority p at each dispatch
pub fn init(quantum_usecs: &[u64]) -> crate::error::Result<()> {
    let _guard = crate::critical::Guard::enter();

    unsafe {
        if is_initialized() {
            return crate::error::fail(crate::error::Error::AlreadyInitialized);
        }
    }
    if quantum_usecs.is_empty() {
        return crate::error::fail(crate::error::Error::NoQuantumLengths);
    }
    if quantum_usecs.contains(&0) {
        return crate::error::fail(crate::error::Error::ZeroQuantum);
    }

    unsafe {
        let mut table = crate::table::ThreadTable::new(crate::types::MAX_THREADS);
        table.insert(std::boxed::Box::new(crate::table::Tcb::main()));

        let table_ptr = &raw mut TABLE;
        *table_ptr = std::option::Option::Some(table);

        let ready_ptr = &raw mut READY;
        *ready_ptr = std::option::Option::Some(crate::queue::ReadyQueues::new(
            quantum_usecs.len(),
            crate::types::MAX_THREADS,
        ));

        let quantum_ptr = &raw mut QUANTUM_USECS;
        *quantum_ptr = std::option::Option::Some(quantum_usecs.to_vec().into_boxed_slice());

        let current_ptr = &raw mut CURRENT_TID;
        *current_ptr = 0;

        // the adopting thread is already inside its first quantum
        let total_ptr = &raw mut TOTAL_QUANTUMS;
        *total_ptr = 1;
    }

    crate::timer::install();
    crate::timer::arm(quantum_usecs[0]);

    Ok(())
}

pub fn spawn<F>(f: F, priority: usize) -> crate::error::Result<crate::types::Tid>
where
    F: FnOnce() + Send + 'static,
{
    let _guard = crate::critical::Guard::enter();

    unsafe {
        if !is_initialized() {
            return crate::error::fail(crate::error::Error::NotInitialized);
        }
        reclaim_dead_stack();

        if priority >= quantum_usecs().len() {
            return crate::error::fail(crate::error::Error::PriorityOutOfRange(priority));
        }
        let tid = match table().allocate_tid() {
            Some(tid) => tid,
            None => return crate::error::fail(crate::error::Error::TableFull),
        };

        let stack = crate::context::Stack::new(crate::types::STACK_SIZE);
        table().insert(std::boxed::Box::new(crate::table::Tcb::spawned(
            tid,
            priority,
            stack,
            std::boxed::Box::new(f),
        )));
        ready().push_back(priority, tid);

        Ok(tid)
    }
}

// terminating thread 0 tears the whole library down and exits the process;
// terminating the calling thread never returns
pub fn terminate(tid: crate::types::Tid) -> crate::error::Result<()> {
    let _guard = crate::critical::Guard::enter();

    unsafe {
        if !is_initialized() {
            return crate::error::fail(crate::error::Error::NotInitialized);
        }
        if tid == 0 {
            shutdown();
        }
        if table().get(tid).is_none() {
            return crate::error::fail(crate::error::Error::NoSuchThread(tid));
        }

        reclaim_dead_stack();
        ready().remove(tid);
        let mut victim = match table().remove(tid) {
            Some(victim) => victim,
            None => crate::error::fatal("thread vanished mid-terminate"),
        };

        if tid == current() {
            // keep the stack we are executing on alive until the switch
            let dead_ptr = &raw mut DEAD_STACK;
            *dead_ptr = victim.stack.take();
            drop(victim);

            dispatch(DispatchReason::TerminatedSelf);
            unreachable!("terminated thread resumed");
        }

        Ok(())
    }
}

// terminate(0): tear everything down and leave with status 0
unsafe fn shutdown() -> ! {
    crate::timer::disarm();
    crate::timer::uninstall();

    unsafe {
        reclaim_dead_stack();

        // drops every remaining control block and spawned stack
        let table_ptr = &raw mut TABLE;
        *table_ptr = std::option::Option::None;

        let ready_ptr = &raw mut READY;
        *ready_ptr = std::option::Option::None;

        let quantum_ptr = &raw mut QUANTUM_USECS;
        *quantum_ptr = std::option::Option::None;
    }

    std::process::exit(0)
}

pub fn block(tid: crate::types::Tid) -> crate::error::Result<()> {
    let _guard = crate::critical::Guard::enter();

    unsafe {
        if !is_initialized() {
            return crate::error::fail(crate::error::Error::NotInitialized);
        }
        if tid == 0 {
            return crate::error::fail(crate::error::Error::MainThread);
        }
        let tcb = match table().get_mut(tid) {
            Some(tcb) => tcb,
            None => return crate::error::fail(crate::error::Error::NoSuchThread(tid)),
        };

        match tcb.state {
            // already where the caller wants it
            crate::types::ThreadState::Blocked => Ok(()),
            crate::types::ThreadState::Sleeping { remaining, .. } => {
                tcb.state = crate::types::ThreadState::Sleeping {
                    remaining,
                    blocked: true,
                };
                Ok(())
            }
            crate::types::ThreadState::Ready => {
                tcb.state = crate::types::ThreadState::Blocked;
                ready().remove(tid);
                Ok(())
            }
            crate::types::ThreadState::Running => {
                tcb.state = crate::types::ThreadState::Blocked;
                dispatch(DispatchReason::BlockedSelf);
                // back after a resume and a later dispatch
                Ok(())
            }
        }
    }
}

// never preempts the caller; a woken thread joins the tail of its
// priority's queue
pub fn resume(tid: crate::types::Tid) -> crate::error::Result<()> {
    let _guard = crate::critical::Guard::enter();

    unsafe {
        if !is_initialized() {
            return crate::error::fail(crate::error::Error::NotInitialized);
        }
        let tcb = match table().get_mut(tid) {
            Some(tcb) => tcb,
            None => return crate::error::fail(crate::error::Error::NoSuchThread(tid)),
        };

        match tcb.state {
            crate::types::ThreadState::Running | crate::types::ThreadState::Ready => Ok(()),
            // only clears the explicit block, the countdown still has to
            // run out
            crate::types::ThreadState::Sleeping { remaining, .. } => {
                tcb.state = crate::types::ThreadState::Sleeping {
                    remaining,
                    blocked: false,
                };
                Ok(())
            }
            crate::types::ThreadState::Blocked => {
                tcb.state = crate::types::ThreadState::Ready;
                let priority = tcb.priority;
                ready().push_back(priority, tid);
                Ok(())
            }
        }
    }
}

// puts the calling thread to sleep for `quantums` ticks
pub fn sleep(quantums: u64) -> crate::error::Result<()> {
    let _guard = crate::critical::Guard::enter();

    unsafe {
        if !is_initialized() {
            return crate::error::fail(crate::error::Error::NotInitialized);
        }
        let tid = current();
        if tid == 0 {
            return crate::error::fail(crate::error::Error::MainThread);
        }
        if quantums == 0 {
            return crate::error::fail(crate::error::Error::ZeroSleep);
        }

        match table().get_mut(tid) {
            Some(tcb) => {
                tcb.state = crate::types::ThreadState::Sleeping {
                    remaining: quantums,
                    blocked: false,
                };
            }
            None => crate::error::fatal("running thread has no control block"),
        }

        dispatch(DispatchReason::BlockedSelf);
        Ok(())
    }
}

pub fn yield_now() -> crate::error::Result<()> {
    let _guard = crate::critical::Guard::enter();

    unsafe {
        if !is_initialized() {
            return crate::error::fail(crate::error::Error::NotInitialized);
        }
        dispatch(DispatchReason::Yield);
        Ok(())
    }
}

// a ready thread is re-queued at the new priority's tail at once; the
// running thread keeps its current quantum and picks the new length up at
// its next dispatch; blocked and sleeping threads carry the new priority
// into their next wake-up
pub fn change_priority(tid: crate::types::Tid, priority: usize) -> crate::error::Result<()> {
    let _guard = crate::critical::Guard::enter();

    unsafe {
        if !is_initialized() {
            return crate::error::fail(crate::error::Error::NotInitialized);
        }
        if priority >= quantum_usecs().len() {
            return crate::error::fail(crate::error::Error::PriorityOutOfRange(priority));
        }
        let tcb = match table().get_mut(tid) {
            Some(tcb) => tcb,
            None => return crate::error::fail(crate::error::Error::NoSuchThread(tid)),
        };

        let was_ready = tcb.state == crate::types::ThreadState::Ready;
        tcb.priority = priority;

        if was_ready {
            ready().remove(tid);
            ready().push_back(priority, tid);
        }

        Ok(())
    }
}

pub fn current_tid() -> crate::error::Result<crate::types::Tid> {
    let _guard = crate::critical::Guard::enter();

    unsafe {
        if !is_initialized() {
            return crate::error::fail(crate::error::Error::NotInitialized);
        }
        Ok(current())
    }
}

pub fn total_quantums() -> crate::error::Result<u64> {
    let _guard = crate::critical::Guard::enter();

    unsafe {
        if !is_initialized() {
            return crate::error::fail(crate::error::Error::NotInitialized);
        }
        let total_ptr = &raw const TOTAL_QUANTUMS;
        Ok(*total_ptr)
    }
}

pub fn quantums(tid: crate::types::Tid) -> crate::error::Result<u64> {
    let _guard = crate::critical::Guard::enter();

    unsafe {
        if !is_initialized() {
            return crate::error::fail(crate::error::Error::NotInitialized);
        }
        match table().get(tid) {
            Some(tcb) => Ok(tcb.quantums),
            None => crate::error::fail(crate::error::Error::NoSuchThread(tid)),
        }
    }
}

pub fn info(tid: crate::types::Tid) -> crate::error::Result<crate::types::ThreadInfo> {
    let _guard = crate::critical::Guard::enter();

    unsafe {
        if !is_initialized() {
            return crate::error::fail(crate::error::Error::NotInitialized);
        }
        match table().get(tid) {
            Some(tcb) => Ok(crate::types::ThreadInfo {
                id: tcb.id,
                state: tcb.state,
                priority: tcb.priority,
                quantums: tcb.quantums,
            }),
            None => crate::error::fail(crate::error::Error::NoSuchThread(tid)),
        }
    }
}
