//! Buffered bulk insertion.
//!
//! A `BufferedBulkInserter` collects documents in memory and sends them to its
//! target as a single bulk write once either the document limit or the byte limit
//! is reached. Callers must `flush` after their last insert; dropping an inserter
//! with buffered documents discards them.
use bson::{self, Document};
use serde::Serialize;

use apm::{FlushResult, FlushStarted, Listener};
use error::Error::ArgumentError;
use error::Result;

use std::mem;
use std::sync::Arc;
use std::time::Instant;

/// Maximum size of a single BSON document accepted by the server.
pub const MAX_BSON_SIZE: usize = 16 * 1024 * 1024;

/// Headroom left under `MAX_BSON_SIZE` for the command envelope wrapped around
/// buffered documents.
pub const MAX_MESSAGE_OVERHEAD: usize = 16 * 1024;

/// A collection handle able to execute a bulk write of insert operations.
pub trait BulkInsert {
    /// Inserts every document as one bulk write and returns the number of
    /// documents inserted.
    ///
    /// An ordered write stops at the first failure. An unordered write attempts
    /// every document and reports all failures together.
    fn bulk_insert(&self, documents: Vec<Document>, ordered: bool) -> Result<u64>;

    /// The `db.collection` namespace written to.
    fn namespace(&self) -> String;
}

/// Accumulates inserts and flushes them in batches bounded by document count
/// and serialized size.
///
/// An inserter is meant for a single writer at a time. Independent inserters
/// may share a target.
pub struct BufferedBulkInserter<'a, T: BulkInsert + ?Sized + 'a> {
    target: &'a T,
    ordered: bool,
    doc_limit: usize,
    byte_limit: usize,
    pending: Vec<Document>,
    byte_count: usize,
    scratch: Vec<u8>,
    listener: Option<Arc<Listener>>,
}

impl<'a, T: BulkInsert + ?Sized + 'a> BufferedBulkInserter<'a, T> {
    /// Creates an inserter that flushes every `doc_limit` documents, or sooner
    /// if the buffered documents approach the maximum message size.
    pub fn new(target: &'a T, doc_limit: usize, ordered: bool) -> Result<BufferedBulkInserter<'a, T>> {
        if doc_limit == 0 {
            return Err(ArgumentError(String::from("document limit must be at least 1")));
        }

        Ok(BufferedBulkInserter {
            target: target,
            ordered: ordered,
            doc_limit: doc_limit,
            byte_limit: MAX_BSON_SIZE - MAX_MESSAGE_OVERHEAD,
            pending: Vec::new(),
            byte_count: 0,
            scratch: Vec::new(),
            listener: None,
        })
    }

    /// Reports every flush to the given listener.
    pub fn with_listener(mut self, listener: Arc<Listener>) -> BufferedBulkInserter<'a, T> {
        self.listener = Some(listener);
        self
    }

    pub fn doc_count(&self) -> usize {
        self.pending.len()
    }

    pub fn byte_count(&self) -> usize {
        self.byte_count
    }

    pub fn doc_limit(&self) -> usize {
        self.doc_limit
    }

    pub fn byte_limit(&self) -> usize {
        self.byte_limit
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Buffers a document, flushing if a limit is reached.
    ///
    /// A non-empty buffer that could not take the document without passing the
    /// byte limit is flushed first. If that flush fails its error is returned
    /// at once, with the new document buffered for the next flush. A document
    /// that alone exceeds the byte limit is still buffered and then sent on its
    /// own. A document that cannot be encoded at all, such as one holding a
    /// binary value larger than `MAX_BSON_SIZE`, is rejected with an
    /// `EncoderError` and nothing is buffered.
    pub fn insert(&mut self, doc: Document) -> Result<()> {
        self.scratch.clear();
        doc.to_writer(&mut self.scratch)?;
        let size = self.scratch.len();

        let flush_first = !self.pending.is_empty() && self.byte_count + size > self.byte_limit;
        let flushed = if flush_first { self.flush() } else { Ok(()) };

        self.pending.push(doc);
        self.byte_count += size;
        flushed?;

        if self.pending.len() >= self.doc_limit || self.byte_count >= self.byte_limit {
            self.flush()?;
        }

        Ok(())
    }

    /// Serializes a value to a document and buffers it.
    pub fn insert_value<V: Serialize + ?Sized>(&mut self, value: &V) -> Result<()> {
        let doc = bson::to_document(value)?;
        self.insert(doc)
    }

    /// Sends all buffered documents as one bulk write.
    ///
    /// The buffer is emptied before the write is attempted, so a failed batch is
    /// never resent by this inserter. Deciding whether to retry is left to the
    /// caller; see `Error::is_connection_error`.
    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let documents = mem::replace(&mut self.pending, Vec::new());
        let byte_count = mem::replace(&mut self.byte_count, 0);
        let doc_count = documents.len();
        let namespace = self.target.namespace();

        debug!("flushing {} documents ({} bytes) to {}", doc_count, byte_count, namespace);

        if let Some(ref listener) = self.listener {
            let started = FlushStarted {
                namespace: namespace.clone(),
                doc_count: doc_count,
                byte_count: byte_count,
                ordered: self.ordered,
            };
            if let Err(err) = listener.run_start_hooks(&started) {
                warn!("failed to run flush start hooks: {}", err);
            }
        }

        let start = Instant::now();
        let result = self.target.bulk_insert(documents, self.ordered);
        let duration = start.elapsed();

        if let Err(ref err) = result {
            warn!("bulk write of {} documents to {} failed: {}", doc_count, namespace, err);
        }

        if let Some(ref listener) = self.listener {
            let flush_result = match result {
                Ok(inserted_count) => FlushResult::Success {
                    duration: duration,
                    namespace: namespace,
                    doc_count: doc_count,
                    inserted_count: inserted_count,
                },
                Err(ref failure) => FlushResult::Failure {
                    duration: duration,
                    namespace: namespace,
                    doc_count: doc_count,
                    failure: failure,
                },
            };
            if let Err(err) = listener.run_completion_hooks(&flush_result) {
                warn!("failed to run flush completion hooks: {}", err);
            }
        }

        result.map(|_| ())
    }
}
