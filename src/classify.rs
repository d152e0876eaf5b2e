//! Classification of connectivity failures.
//!
//! The client library reports most failures as plain text by the time they
//! reach tooling code, so transient connection problems are recognized by a
//! fixed table of known server and driver phrasings. Transport failures and
//! server selection timeouts reported by the `mongodb` client are recognized
//! by their error kind. Everything else, such as duplicate key or validation
//! errors, is treated as a data problem.
use mongodb::error::{Error as DriverError, ErrorKind};

use std::error;
use std::io;

pub const ERR_LOST_CONNECTION: &'static str = "lost connection to server";
pub const ERR_NO_REACHABLE_SERVERS: &'static str = "no reachable servers";
pub const ERR_NS_NOT_FOUND: &'static str = "ns not found";
pub const ERR_EOF: &'static str = "eof";
pub const ERR_UNEXPECTED_EOF: &'static str = "unexpected end of file";
// Replication errors name the replica set when talking to a mongos, so only
// the common prefix can be matched.
pub const ERR_REPL_TIMEOUT_PREFIX: &'static str = "waiting for replication timed out";
pub const ERR_COULD_NOT_CONTACT_PRIMARY_PREFIX: &'static str =
    "could not contact primary for replica set";
pub const ERR_WRITE_RESULTS_UNAVAILABLE: &'static str = "write results unavailable from";
pub const ERR_COULD_NOT_FIND_PRIMARY_PREFIX: &'static str =
    "could not find host matching read preference { mode: \"primary\"";
pub const ERR_UNABLE_TO_TARGET_PREFIX: &'static str = "unable to target";
pub const ERR_NOT_MASTER: &'static str = "not master";
pub const ERR_CONNECTION_REFUSED_SUFFIX: &'static str = "connection refused";

/// Decides whether an error represents a transient connectivity failure.
///
/// Callers that need a different policy, for example one based on server
/// error codes, can supply their own implementation.
pub trait ErrorClassifier {
    fn is_connection_error(&self, err: &(dyn error::Error + 'static)) -> bool;
}

/// The default classifier, matching error messages against the known table.
#[derive(Clone, Copy, Debug, Default)]
pub struct MessageClassifier;

impl ErrorClassifier for MessageClassifier {
    fn is_connection_error(&self, err: &(dyn error::Error + 'static)) -> bool {
        let mut current = Some(err);
        while let Some(err) = current {
            if is_io_disconnect(err) || is_driver_disconnect(err)
                || matches_connection_message(&err.to_string())
            {
                return true;
            }
            current = err.source();
        }
        false
    }
}

/// Returns whether the given error is due to a failure in the underlying
/// database connection, as opposed to some other write failure such as a
/// duplicate key error.
///
/// The error and each of its sources are checked in turn.
pub fn is_connection_error(err: Option<&(dyn error::Error + 'static)>) -> bool {
    match err {
        Some(err) => MessageClassifier.is_connection_error(err),
        None => false,
    }
}

/// Matches a single error message against the connection error table.
pub fn matches_connection_message(message: &str) -> bool {
    let lower = message.to_lowercase();

    lower == ERR_NO_REACHABLE_SERVERS
        || lower == ERR_EOF
        || lower == ERR_UNEXPECTED_EOF
        || lower.contains(ERR_REPL_TIMEOUT_PREFIX)
        || lower.contains(ERR_COULD_NOT_CONTACT_PRIMARY_PREFIX)
        || lower.contains(ERR_WRITE_RESULTS_UNAVAILABLE)
        || lower.contains(ERR_COULD_NOT_FIND_PRIMARY_PREFIX)
        || lower.contains(ERR_UNABLE_TO_TARGET_PREFIX)
        || lower == ERR_NOT_MASTER
        || lower.ends_with(ERR_CONNECTION_REFUSED_SUFFIX)
}

// End-of-stream and refused connections also surface as typed IO errors.
fn is_io_disconnect(err: &(dyn error::Error + 'static)) -> bool {
    err.downcast_ref::<io::Error>().map_or(false, is_disconnect_kind)
}

fn is_disconnect_kind(err: &io::Error) -> bool {
    match err.kind() {
        io::ErrorKind::UnexpectedEof | io::ErrorKind::ConnectionRefused => true,
        _ => false,
    }
}

// The client library's own error decorates the message with its kind and
// labels, and its source chain stops short of the wrapped IO error.
fn is_driver_disconnect(err: &(dyn error::Error + 'static)) -> bool {
    let err = match err.downcast_ref::<DriverError>() {
        Some(err) => err,
        None => return false,
    };

    match *err.kind {
        ErrorKind::ServerSelection { .. } => true,
        ErrorKind::Io(ref io_err) => {
            is_disconnect_kind(io_err)
                || matches_connection_message(without_os_error(&io_err.to_string()))
        }
        _ => false,
    }
}

// Strips the " (os error N)" tail the standard library appends to OS errors.
fn without_os_error(message: &str) -> &str {
    match message.rfind(" (os error ") {
        Some(idx) => &message[..idx],
        None => message,
    }
}
