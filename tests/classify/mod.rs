use mongo_tools_db::classify::{self, ErrorClassifier, MessageClassifier};
use mongo_tools_db::Error;
use mongodb::error::Error as DriverError;

use std::error;
use std::io;

fn classify(message: &str) -> bool {
    Error::OperationError(message.to_owned()).is_connection_error()
}

#[test]
fn connection_messages() {
    let messages = vec!(
        "no reachable servers",
        "EOF",
        "unexpected end of file",
        "waiting for replication timed out",
        "waiting for replication timed out at shard-a",
        "could not contact primary for replica set rs0",
        "write results unavailable from localhost:33333 :: caused by :: socket exception",
        "could not find host matching read preference { mode: \"primary\" } for set rs0",
        "unable to target write op for collection test.coll",
        "not master",
        "dial tcp 127.0.0.1:33333: connection refused",
    );

    for message in messages {
        assert!(classify(message), "'{}' should be a connection error", message);
    }
}

#[test]
fn data_errors() {
    let messages = vec!(
        "E11000 duplicate key error collection: test.c index: _id_ dup key: { _id: 1 }",
        "Document failed validation",
        "ns not found",
        "",
    );

    for message in messages {
        assert!(!classify(message), "'{}' should not be a connection error", message);
    }
}

#[test]
fn exact_entries_must_match_whole_message() {
    assert!(!classify("no reachable servers found"));
    assert!(!classify("premature eof"));
    assert!(!classify("not master or secondary"));
    assert!(!classify("connection refused by peer"));
}

#[test]
fn matching_ignores_case() {
    assert!(classify("No Reachable Servers"));
    assert!(classify("Connection Refused"));
    assert!(classify("NOT MASTER"));
}

#[test]
fn absent_error() {
    assert!(!classify::is_connection_error(None));
}

#[test]
fn io_errors() {
    let eof = Error::from(io::Error::new(io::ErrorKind::UnexpectedEof, "stream closed"));
    assert!(eof.is_connection_error());

    let refused = Error::from(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
    assert!(refused.is_connection_error());

    let denied = Error::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
    assert!(!denied.is_connection_error());
}

fn driver_io_error(kind: io::ErrorKind, message: &str) -> Error {
    Error::from(DriverError::from(io::Error::new(kind, message)))
}

#[test]
fn driver_io_errors() {
    assert!(driver_io_error(io::ErrorKind::ConnectionRefused, "Connection refused").is_connection_error());
    assert!(driver_io_error(io::ErrorKind::UnexpectedEof, "early eof").is_connection_error());

    // Only the message identifies this one; the OS error suffix is ignored.
    let refused = driver_io_error(io::ErrorKind::Other, "Connection refused (os error 111)");
    assert!(refused.is_connection_error());

    assert!(!driver_io_error(io::ErrorKind::PermissionDenied, "Permission denied").is_connection_error());
}

#[cfg(target_os = "linux")]
#[test]
fn driver_os_errors() {
    let refused = Error::from(DriverError::from(io::Error::from_raw_os_error(111)));
    assert!(refused.is_connection_error(), "{}", refused);
}

#[test]
fn driver_errors_behind_configuration() {
    let inner = driver_io_error(io::ErrorKind::UnexpectedEof, "unexpected end of file");
    assert!(Error::ConfigurationError(Box::new(inner)).is_connection_error());
}

#[test]
fn wrapped_errors_are_inspected() {
    let inner = Error::OperationError(String::from("no reachable servers"));
    let outer = Error::ConfigurationError(Box::new(inner));
    assert!(outer.is_connection_error());

    let inner = Error::ArgumentError(String::from("FIPS mode not supported"));
    let outer = Error::ConfigurationError(Box::new(inner));
    assert!(!outer.is_connection_error());
}

#[test]
fn foreign_errors() {
    let err = io::Error::new(io::ErrorKind::Other, "not master");
    assert!(classify::is_connection_error(Some(&err as &(dyn error::Error + 'static))));
}

struct TimeoutClassifier;

impl ErrorClassifier for TimeoutClassifier {
    fn is_connection_error(&self, err: &(dyn error::Error + 'static)) -> bool {
        err.to_string().contains("timed out")
    }
}

#[test]
fn custom_classifier() {
    let err = Error::OperationError(String::from("operation timed out"));
    assert!(TimeoutClassifier.is_connection_error(&err));
    assert!(!MessageClassifier.is_connection_error(&err));
}
