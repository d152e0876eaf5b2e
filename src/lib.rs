//! Session management and buffered bulk insertion for MongoDB tools.
//!
//! Tools that load or restore large amounts of data share two needs: a single
//! client handle that every operation goes through, and a way to turn a long
//! stream of single-document inserts into a few large bulk writes. This crate
//! provides both on top of the `mongodb` driver, along with a classifier that
//! tells transient connection failures apart from data errors so callers can
//! decide what to retry.
//!
//! ## Connecting
//!
//! A `SessionProvider` is created from a resolved `ToolOptions`. No network
//! traffic happens until the first call to `get_session`, which connects once
//! and hands back the shared client.
//!
//! ```no_run
//! # extern crate mongo_tools_db;
//! use mongo_tools_db::{SessionProvider, ToolOptions};
//!
//! # fn main() -> mongo_tools_db::Result<()> {
//! let mut options = ToolOptions::default();
//! options.connection.port = Some(27017);
//!
//! let provider = SessionProvider::new(options)?;
//! let client = provider.get_session()?;
//! # let _ = client;
//! provider.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Inserting in bulk
//!
//! A `BufferedBulkInserter` borrows a collection and flushes whenever its
//! document limit is reached or the buffered documents approach the maximum
//! message size. The final partial batch must be flushed explicitly.
//!
//! ```no_run
//! # #[macro_use] extern crate bson;
//! # extern crate mongo_tools_db;
//! use bson::Document;
//! use mongo_tools_db::{BufferedBulkInserter, SessionProvider, ToolOptions};
//!
//! # fn main() -> mongo_tools_db::Result<()> {
//! let provider = SessionProvider::new(ToolOptions::default())?;
//! let coll = provider.db("test")?.collection::<Document>("people");
//!
//! let mut inserter = BufferedBulkInserter::new(&coll, 1000, false)?;
//! for i in 0..10_000 {
//!     if let Err(err) = inserter.insert(doc! { "_id": i }) {
//!         if err.is_connection_error() {
//!             // The batch was lost in transit; the caller may retry it.
//!         }
//!         return Err(err);
//!     }
//! }
//! inserter.flush()?;
//! # Ok(())
//! # }
//! ```
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate bson;
#[macro_use]
extern crate log;
extern crate mongodb;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;

pub mod apm;
pub mod bulk;
pub mod classify;
pub mod common;
pub mod connstring;
pub mod driver;
pub mod error;
pub mod options;
pub mod session;

pub use apm::{FlushResult, FlushStarted, Listener};
pub use bulk::{BufferedBulkInserter, BulkInsert, MAX_BSON_SIZE};
pub use classify::is_connection_error;
pub use common::{Acknowledgment, ReadMode, ReadPreference, WriteConcern};
pub use driver::{MongoConnector, SOCKET_TIMEOUT};
pub use error::{Error, Result};
pub use options::ToolOptions;
pub use session::{Connector, SessionFlags, SessionProvider};

/// Port used by the integration test deployment.
pub const DEFAULT_TEST_PORT: u16 = 33333;
