/*!
    Error types shared by the pipeline crates.
*/

use thiserror::Error;

use crate::StreamId;

/**
    Error type shared by every pipeline stage.
*/
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid data: {message}")]
    InvalidData { message: String },
    #[error("unsupported format: {message}")]
    UnsupportedFormat { message: String },
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
    /// The component's state does not allow this operation.
    #[error("cannot {operation} while {state}")]
    InvalidStateTransition {
        state: &'static str,
        operation: &'static str,
    },
    /// A stream-level request was made in a state that forbids it.
    #[error("stream is {state}")]
    WrongState { state: &'static str },
    #[error("not initialized")]
    NotInitialized,
    #[error("component has been shut down")]
    Shutdown,
    #[error("unknown stream {0}")]
    UnknownStream(StreamId),
    /// A transform already holds output and must be drained first.
    #[error("transform is not accepting input")]
    NotAccepting,
    #[error("queue for stream {0} is full")]
    QueueFull(StreamId),
    /// End of stream (part of control flow rather than a failure).
    #[error("end of stream")]
    EndOfStream,
}

impl Error {
    /**
        Create an invalid data error with the given message.
    */
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /**
        Create an unsupported format error with the given message.
    */
    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn invalid_transition(state: &'static str, operation: &'static str) -> Self {
        Self::InvalidStateTransition { state, operation }
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }

    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Shutdown)
    }
}

/**
    Result type alias for the pipeline crates.
*/
pub type Result<T> = std::result::Result<T, Error>;
