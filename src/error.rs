//! Error types for session management and buffered writes.
use bson;
use mongodb;

use std::{error, fmt, io, result, sync};

use classify;

/// A type for results generated by this crate.
pub type Result<T> = result::Result<T, Error>;

/// The error type for session and bulk-insertion operations.
#[derive(Debug)]
pub enum Error {
    /// A configuration value was invalid or unsupported.
    ArgumentError(String),
    /// The client could not be configured from the provided options.
    ConfigurationError(Box<Error>),
    /// A mutator that cannot be applied to an open session was called.
    UnsupportedOperation(String),
    /// The session provider was used after being closed.
    SessionClosed,
    /// The underlying client library reported a failure.
    DriverError(mongodb::error::Error),
    /// A document could not be encoded to BSON.
    EncoderError(bson::ser::Error),
    /// A standard IO error occurred.
    IoError(io::Error),
    /// A lock guarding shared state was poisoned.
    LockError,
    /// A generic operational failure.
    OperationError(String),
}

impl Error {
    /// Returns true if this error is due to a failure in the underlying
    /// connection rather than a problem with the data being written.
    pub fn is_connection_error(&self) -> bool {
        classify::is_connection_error(Some(self as &(dyn error::Error + 'static)))
    }
}

impl<'a> From<&'a str> for Error {
    fn from(s: &str) -> Error {
        Error::OperationError(s.to_owned())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::OperationError(s)
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(err: mongodb::error::Error) -> Error {
        Error::DriverError(err)
    }
}

impl From<bson::ser::Error> for Error {
    fn from(err: bson::ser::Error) -> Error {
        Error::EncoderError(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

impl<T> From<sync::PoisonError<T>> for Error {
    fn from(_: sync::PoisonError<T>) -> Error {
        Error::LockError
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::ArgumentError(ref inner) => fmt.write_str(inner),
            Error::ConfigurationError(ref inner) => {
                write!(fmt, "error configuring the connector: {}", inner)
            }
            Error::UnsupportedOperation(ref inner) => write!(fmt, "unsupported: {}", inner),
            Error::SessionClosed => fmt.write_str("SessionProvider already closed"),
            Error::DriverError(ref inner) => fmt::Display::fmt(inner, fmt),
            Error::EncoderError(ref inner) => fmt::Display::fmt(inner, fmt),
            Error::IoError(ref inner) => fmt::Display::fmt(inner, fmt),
            Error::LockError => fmt.write_str("Session lock poisoned."),
            Error::OperationError(ref inner) => fmt.write_str(inner),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::ConfigurationError(ref inner) => Some(inner.as_ref()),
            Error::DriverError(ref inner) => Some(inner),
            Error::EncoderError(ref inner) => Some(inner),
            Error::IoError(ref inner) => Some(inner),
            _ => None,
        }
    }
}
