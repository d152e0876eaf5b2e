//! Shared session management.
//!
//! A `SessionProvider` owns the one client handle a tool uses for all of its
//! operations. The handle is connected on first use and handed out to any number
//! of callers until the provider is closed.
use common::ReadPreference;
use driver::MongoConnector;
use error::{Error, Result};
use options::ToolOptions;

use mongodb::sync::Database;

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

bitflags! {
    /// Modifications that could once be made to an open session.
    pub struct SessionFlags: u32 {
        const MONOTONIC              = 0b00000010;
        const DISABLE_SOCKET_TIMEOUT = 0b00000100;
    }
}

/// The connect and disconnect primitives of a client library.
pub trait Connector {
    /// The shared handle operations are issued through.
    type Handle: Clone;

    /// Establishes the network connection and returns a handle to it.
    fn connect(&mut self) -> Result<Self::Handle>;

    /// Tears down the network connection behind the handle.
    fn disconnect(&mut self, handle: Self::Handle) -> Result<()>;
}

struct SessionState<C: Connector> {
    // None once the provider has been closed.
    connector: Option<C>,
    // Set by the first successful connect.
    client: Option<C::Handle>,
}

/// Owns the client handle shared by every operation of a tool.
pub struct SessionProvider<C: Connector = MongoConnector> {
    state: Mutex<SessionState<C>>,
}

impl SessionProvider<MongoConnector> {
    /// Creates a provider for the configured deployment, prompting on the
    /// terminal for a password if one is needed. No connection is made yet.
    pub fn new(options: ToolOptions) -> Result<SessionProvider> {
        SessionProvider::with_password_prompt(options, prompt_password)
    }

    /// Creates a provider, calling `prompt` for a password if one is needed.
    pub fn with_password_prompt<F>(mut options: ToolOptions, prompt: F) -> Result<SessionProvider>
        where F: FnOnce() -> Result<String>
    {
        if let Some(ref mut auth) = options.auth {
            if auth.should_ask_for_password() {
                auth.password = prompt()?;
            }
        }

        let connector = MongoConnector::new(&options)
            .map_err(|err| Error::ConfigurationError(Box::new(err)))?;

        Ok(SessionProvider::from_connector(connector))
    }

    /// Returns a handle to the named database.
    pub fn db(&self, name: &str) -> Result<Database> {
        Ok(self.get_session()?.database(name))
    }

    /// Drops the named database.
    pub fn drop_database(&self, name: &str) -> Result<()> {
        self.db(name)?.drop().run()?;
        Ok(())
    }
}

impl<C: Connector> SessionProvider<C> {
    /// Creates a provider over any client library connector.
    pub fn from_connector(connector: C) -> SessionProvider<C> {
        SessionProvider {
            state: Mutex::new(SessionState {
                connector: Some(connector),
                client: None,
            }),
        }
    }

    /// Returns the shared client handle, connecting it first if this is the
    /// first request.
    ///
    /// Concurrent first requests wait for a single connect attempt. If that
    /// attempt fails the error is returned and the next request tries again.
    pub fn get_session(&self) -> Result<C::Handle> {
        let mut guard = self.state.lock()?;
        let state = &mut *guard;

        let connector = match state.connector {
            Some(ref mut connector) => connector,
            None => return Err(Error::SessionClosed),
        };

        if let Some(ref client) = state.client {
            return Ok(client.clone());
        }

        let client = connector.connect()?;
        info!("connected to server");
        state.client = Some(client.clone());
        Ok(client)
    }

    /// Returns whether the lazy connect has happened.
    pub fn is_connected(&self) -> Result<bool> {
        Ok(self.state.lock()?.client.is_some())
    }

    /// Disconnects and releases the client handle. Closing an already closed
    /// provider does nothing.
    pub fn close(&self) -> Result<()> {
        let mut guard = self.state.lock()?;
        let state = &mut *guard;

        let mut connector = match state.connector.take() {
            Some(connector) => connector,
            None => return Ok(()),
        };

        if let Some(client) = state.client.take() {
            if let Err(err) = connector.disconnect(client) {
                warn!("failed to disconnect from server: {}", err);
                return Err(err);
            }
        }

        info!("session closed");
        Ok(())
    }

    /// Session flags cannot be changed once the provider exists.
    pub fn set_flags(&self, _flags: SessionFlags) -> Result<()> {
        Err(unsupported("session flags"))
    }

    /// The read preference is fixed when the provider is created.
    pub fn set_read_preference(&self, _read_preference: ReadPreference) -> Result<()> {
        Err(unsupported("read preference"))
    }

    /// Document validation bypass is fixed when the provider is created.
    pub fn set_bypass_document_validation(&self, _bypass: bool) -> Result<()> {
        Err(unsupported("document validation bypass"))
    }

    /// Server selection tags are fixed when the provider is created.
    pub fn set_tags(&self, _tags: BTreeMap<String, String>) -> Result<()> {
        Err(unsupported("server selection tags"))
    }
}

fn unsupported(setting: &str) -> Error {
    Error::UnsupportedOperation(format!("cannot change {} of an open session", setting))
}

// Reads a password from the terminal. Input is echoed.
fn prompt_password() -> Result<String> {
    let stderr = io::stderr();
    let mut stderr = stderr.lock();
    write!(stderr, "Enter password:")?;
    stderr.flush()?;

    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    writeln!(stderr)?;

    Ok(line.trim_end_matches(|c| c == '\r' || c == '\n').to_owned())
}
