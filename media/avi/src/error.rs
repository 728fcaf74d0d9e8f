use media_types::{Error, FourCc};
use thiserror::Error;

/**
    Errors produced while reading or writing AVI files.
*/
#[derive(Debug, Error)]
pub enum AviError {
    #[error("unexpected end of data: need {needed} bytes, have {have}")]
    Truncated { needed: usize, have: usize },
    #[error("not a RIFF file (found {found})")]
    NotRiff { found: FourCc },
    #[error("RIFF form is {found}, expected AVI")]
    NotAvi { found: FourCc },
    #[error("missing required chunk: {0}")]
    MissingChunk(&'static str),
    #[error("invalid {chunk} header: {message}")]
    InvalidHeader {
        chunk: &'static str,
        message: String,
    },
    #[error("file has no video or audio stream")]
    NoStreams,
    #[error("no stream with index {0}")]
    UnknownStream(u32),
    #[error("writer: {0}")]
    Writer(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AviError {
    pub(crate) fn invalid_header(chunk: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            chunk,
            message: message.into(),
        }
    }
}

impl From<AviError> for Error {
    fn from(e: AviError) -> Self {
        match e {
            AviError::Io(io) => Error::Io(io),
            AviError::NoStreams => Error::unsupported_format("file has no video or audio stream"),
            other => Error::invalid_data(other.to_string()),
        }
    }
}

pub type AviResult<T> = std::result::Result<T, AviError>;
