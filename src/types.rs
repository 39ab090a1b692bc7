pub const MAX_THREADS: usize = 100;
pub const STACK_SIZE: usize = 64 * 1024;

pub type Tid = usize;

pub trait Executable: Send + 'static {
    fn execute(self: Box<Self>);
}

impl<F> Executable for F
where
    F: FnOnce() + Send + 'static,
{
    fn execute(self: Box<Self>) {
        self();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    Running,
    Ready,
    Blocked,
    // `blocked` records an explicit block layered onto the sleep, honored
    // once the countdown runs out
    Sleeping { remaining: u64, blocked: bool },
}

#[derive(Debug, Clone)]
pub struct ThreadInfo {
    pub id: Tid,
    pub state: ThreadState,
    pub priority: usize,
    pub quantums: u64,
}
