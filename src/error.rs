use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CounterError {
    /// Frame size differs from the size the session started with.
    #[error("frame is {actual:?} but the session was started with {expected:?}")]
    GeometryMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("frame has zero width or height")]
    EmptyFrame,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CounterError>;
