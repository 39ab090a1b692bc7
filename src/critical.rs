// Every entry point holds a `Guard` while it touches scheduler state. A
// thread switched out mid-call is switched back in with the mask still
// raised; the guard frozen on its stack lowers it as the interrupted call
// unwinds, so the mask hands itself off across context switches.

fn tick_set() -> nix::sys::signal::SigSet {
    let mut set = nix::sys::signal::SigSet::empty();
    set.add(nix::sys::signal::Signal::SIGVTALRM);
    set
}

pub struct Guard;

impl Guard {
    pub fn enter() -> Guard {
        raise();
        Guard
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        lower();
    }
}

pub fn raise() {
    if let Err(e) = nix::sys::signal::sigprocmask(
        nix::sys::signal::SigmaskHow::SIG_BLOCK,
        Some(&tick_set()),
        None,
    ) {
        crate::error::fatal(format!("sigprocmask failed: {e}"));
    }
}

// unblocking an already unblocked signal is a no-op, so a fresh thread can
// lower the mask it inherited from the dispatch that first ran it
pub fn lower() {
    if let Err(e) = nix::sys::signal::sigprocmask(
        nix::sys::signal::SigmaskHow::SIG_UNBLOCK,
        Some(&tick_set()),
        None,
    ) {
        crate::error::fatal(format!("sigprocmask failed: {e}"));
    }
}
