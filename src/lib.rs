pub mod runtime;

mod context;
mod critical;
mod error;
mod queue;
mod table;
mod timer;
mod types;

pub use error::{Error, Result};
pub use runtime::{
    block, change_priority, current_tid, info, init, quantums, resume, sleep, spawn, terminate,
    total_quantums, yield_now,
};
pub use types::{Executable, MAX_THREADS, STACK_SIZE, ThreadInfo, ThreadState, Tid};
