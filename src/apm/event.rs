use std::fmt::{Display, Error, Formatter};
use std::time::Duration;

use error::Error as ToolsError;

/// Describes a batch that is about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushStarted {
    pub namespace: String,
    pub doc_count: usize,
    pub byte_count: usize,
    pub ordered: bool,
}

impl Display for FlushStarted {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), Error> {
        fmt.write_fmt(format_args!("FLUSH {} STARTED: {} documents, {} bytes ({})",
                                   self.namespace,
                                   self.doc_count,
                                   self.byte_count,
                                   if self.ordered { "ordered" } else { "unordered" }))
    }
}

/// The outcome of a batch write.
#[derive(Debug)]
pub enum FlushResult<'a> {
    Success {
        duration: Duration,
        namespace: String,
        doc_count: usize,
        inserted_count: u64,
    },
    Failure {
        duration: Duration,
        namespace: String,
        doc_count: usize,
        failure: &'a ToolsError,
    },
}

impl<'a> FlushResult<'a> {
    pub fn duration(&self) -> Duration {
        match *self {
            FlushResult::Success { duration, .. } |
            FlushResult::Failure { duration, .. } => duration,
        }
    }

    pub fn doc_count(&self) -> usize {
        match *self {
            FlushResult::Success { doc_count, .. } |
            FlushResult::Failure { doc_count, .. } => doc_count,
        }
    }

    pub fn is_success(&self) -> bool {
        match *self {
            FlushResult::Success { .. } => true,
            FlushResult::Failure { .. } => false,
        }
    }
}

impl<'a> Display for FlushResult<'a> {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), Error> {
        match *self {
            FlushResult::Success { duration, ref namespace, doc_count, inserted_count } => {
                fmt.write_fmt(format_args!("FLUSH {} COMPLETED: {} of {} documents inserted ({} ms)",
                                           namespace,
                                           inserted_count,
                                           doc_count,
                                           duration.as_millis()))
            }
            FlushResult::Failure { duration, ref namespace, doc_count, failure } => {
                fmt.write_fmt(format_args!("FLUSH {} FAILURE: {} documents: {} ({} ms)",
                                           namespace,
                                           doc_count,
                                           failure,
                                           duration.as_millis()))
            }
        }
    }
}
