// One virtual-time countdown over this process's CPU time, delivered as
// SIGVTALRM; the scheduler re-arms it with the quantum length of every
// thread it dispatches.

extern "C" fn tick(_: nix::libc::c_int) {
    // delivered with SIGVTALRM already masked; the mask is lowered when the
    // preempted thread eventually unwinds its own critical section
    crate::runtime::on_tick();
}

pub fn install() {
    let action = nix::sys::signal::SigAction::new(
        nix::sys::signal::SigHandler::Handler(tick),
        nix::sys::signal::SaFlags::SA_RESTART,
        nix::sys::signal::SigSet::empty(),
    );

    unsafe {
        if let Err(e) = nix::sys::signal::sigaction(nix::sys::signal::Signal::SIGVTALRM, &action) {
            crate::error::fatal(format!("sigaction failed: {e}"));
        }
    }
}

pub fn uninstall() {
    let action = nix::sys::signal::SigAction::new(
        nix::sys::signal::SigHandler::SigDfl,
        nix::sys::signal::SaFlags::empty(),
        nix::sys::signal::SigSet::empty(),
    );

    unsafe {
        let _ = nix::sys::signal::sigaction(nix::sys::signal::Signal::SIGVTALRM, &action);
    }
}

pub fn arm(usec: u64) {
    set_countdown(usec);
}

pub fn disarm() {
    set_countdown(0);
}

fn set_countdown(usec: u64) {
    let timer = nix::libc::itimerval {
        it_interval: nix::libc::timeval {
            tv_sec: 0,
            tv_usec: 0,
        },
        it_value: split(usec),
    };

    let rc =
        unsafe { nix::libc::setitimer(nix::libc::ITIMER_VIRTUAL, &timer, std::ptr::null_mut()) };
    if rc != 0 {
        crate::error::fatal("setitimer failed");
    }
}

pub(crate) fn split(usec: u64) -> nix::libc::timeval {
    nix::libc::timeval {
        tv_sec: (usec / 1_000_000) as nix::libc::time_t,
        tv_usec: (usec % 1_000_000) as nix::libc::suseconds_t,
    }
}
