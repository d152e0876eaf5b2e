//! Tool configuration consumed by the session provider.
//!
//! `ToolOptions` is assembled by the surrounding tool (usually from command
//! line flags) and handed to `SessionProvider::new` already validated. It can
//! also be loaded from JSON, which is how tests build their fixtures.
use common::{ReadPreference, WriteConcern};
use connstring::{self, URI_SCHEME};
use error::Error::ArgumentError;
use error::Result;

use serde_json;

/// Default connect timeout, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 3;

pub const MECHANISM_GSSAPI: &'static str = "GSSAPI";
pub const MECHANISM_PLAIN: &'static str = "PLAIN";
pub const MECHANISM_X509: &'static str = "MONGODB-X509";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Connection {
    /// A host list, optionally prefixed by a replica set name: `set/h1,h2`.
    pub host: String,
    pub port: Option<u16>,
    /// Connect timeout in seconds.
    pub timeout: u64,
}

impl Default for Connection {
    fn default() -> Connection {
        Connection {
            host: String::from("localhost"),
            port: None,
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Uri {
    pub connection_string: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Ssl {
    pub use_ssl: bool,
    pub ca_file: String,
    pub pem_key_file: String,
    pub pem_key_password: String,
    pub crl_file: String,
    pub allow_invalid_cert: bool,
    pub allow_invalid_host: bool,
    pub fips_mode: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Auth {
    pub username: String,
    pub password: String,
    pub source: String,
    pub mechanism: String,
}

impl Auth {
    /// Returns true if a username was given without a password, for a
    /// mechanism that authenticates with one.
    pub fn should_ask_for_password(&self) -> bool {
        !self.username.is_empty()
            && self.password.is_empty()
            && self.mechanism != MECHANISM_X509
            && self.mechanism != MECHANISM_GSSAPI
    }

    /// Returns true if the mechanism authenticates against `$external`.
    pub fn requires_external_db(&self) -> bool {
        self.mechanism == MECHANISM_GSSAPI
            || self.mechanism == MECHANISM_PLAIN
            || self.mechanism == MECHANISM_X509
    }

    /// Returns true if any credential information was supplied.
    pub fn is_set(&self) -> bool {
        !self.username.is_empty() || !self.mechanism.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Kerberos {
    pub service: String,
    pub service_host: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Namespace {
    pub db: String,
    pub collection: String,
}

/// The fully-resolved configuration of a tool's connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolOptions {
    pub connection: Connection,
    pub uri: Option<Uri>,
    pub ssl: Option<Ssl>,
    pub auth: Option<Auth>,
    pub kerberos: Option<Kerberos>,
    pub namespace: Option<Namespace>,
    pub replica_set_name: String,
    pub direct: bool,
    pub read_preference: Option<ReadPreference>,
    pub write_concern: Option<WriteConcern>,
}

impl ToolOptions {
    /// Loads options from a JSON document.
    pub fn from_json(json: &str) -> Result<ToolOptions> {
        serde_json::from_str(json).map_err(|err| ArgumentError(format!("invalid options: {}", err)))
    }

    /// Returns the connection string, if one has been set or normalized.
    pub fn connection_string(&self) -> Option<&str> {
        match self.uri {
            Some(ref uri) if !uri.connection_string.is_empty() => Some(&uri.connection_string),
            _ => None,
        }
    }

    /// Returns the database to authenticate against, or `None` to let the
    /// client pick its default.
    pub fn authentication_database(&self) -> Option<String> {
        let auth = match self.auth {
            Some(ref auth) => auth,
            None => return None,
        };

        if !auth.source.is_empty() {
            return Some(auth.source.clone());
        }

        if auth.requires_external_db() {
            return Some(String::from("$external"));
        }

        match self.namespace {
            Some(ref ns) if !ns.db.is_empty() => Some(ns.db.clone()),
            _ => None,
        }
    }

    /// Builds a connection string from the host and port settings.
    ///
    /// A host of the form `set/h1,h2` also supplies the replica set name
    /// unless one was configured explicitly. A separately given port is
    /// appended to every host that lacks one.
    pub fn normalize_host_port_uri(&mut self) -> Result<()> {
        let host = match self.connection.host.trim() {
            "" => "localhost",
            host => host,
        }.to_owned();

        let host_list = match host.find('/') {
            Some(idx) => {
                if self.replica_set_name.is_empty() {
                    self.replica_set_name = host[..idx].to_owned();
                }
                &host[idx + 1..]
            }
            None => &host[..],
        };

        let mut hosts = Vec::new();
        for mut entry in connstring::parse_hosts(host_list)? {
            if entry.port.is_none() {
                entry.port = self.connection.port;
            }
            hosts.push(entry.to_string());
        }

        self.uri = Some(Uri { connection_string: format!("{}{}/", URI_SCHEME, hosts.join(",")) });
        Ok(())
    }
}
