#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Thread library already initialized")]
    AlreadyInitialized,

    #[error("Thread library not initialized")]
    NotInitialized,

    #[error("At least one quantum length is required")]
    NoQuantumLengths,

    #[error("Quantum lengths must be positive")]
    ZeroQuantum,

    #[error("Priority out of range: {0}")]
    PriorityOutOfRange(usize),

    #[error("Thread not found: {0}")]
    NoSuchThread(crate::types::Tid),

    #[error("Thread table is full")]
    TableFull,

    #[error("Operation not permitted on the main thread")]
    MainThread,

    #[error("Sleep length must be positive")]
    ZeroSleep,
}

pub type Result<T> = std::result::Result<T, Error>;

// Usage errors are reported as one stderr line plus the returned value.
pub(crate) fn fail<T>(err: Error) -> Result<T> {
    eprintln!("thread library error: {err}");
    std::result::Result::Err(err)
}

// Platform failures are unrecoverable: one stderr line, nonzero exit.
pub(crate) fn fatal(msg: impl std::fmt::Display) -> ! {
    eprintln!("system error: {msg}");
    std::process::exit(1)
}
