use thiserror::Error;

/// Errors surfaced by the probing core.
///
/// Every place the design describes a raw `-1` return is represented here as
/// an `Err` variant instead; see `DESIGN.md` for the mapping.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tag store is full (at most {0} entries)")]
    CapacityExceeded(usize),
}

pub type ProbeResult<T> = Result<T, ProbeError>;
