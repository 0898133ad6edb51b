use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The stream ran out of bytes in the middle of a field or payload.
    #[error("unexpected end of data")]
    UnexpectedEndOfData,
    #[error("{0} is not supported")]
    NotSupported(&'static str),
    #[error("file {0} has not been found")]
    NotFound(String),
    #[error("index {index} is out of range (0..={len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("IO error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEndOfData
        } else {
            Error::Io(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
