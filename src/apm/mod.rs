//! Flush Monitoring
//!
//! The APM module provides an interface for observing the bulk writes issued by a
//! `BufferedBulkInserter`. Every non-empty flush triggers the start hooks before the
//! write is sent and the completion hooks once it returns, whether it succeeded or not.
mod event;
mod listener;

pub use self::event::{FlushResult, FlushStarted};
pub use self::listener::{CompletionHook, Listener, StartHook};
