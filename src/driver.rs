//! Bindings to the `mongodb` client library.
//!
//! `MongoConnector` turns `ToolOptions` into client options and creates the
//! client only when the session provider first asks for it. Collections of
//! documents serve directly as bulk insertion targets.
use bson::Document;
use mongodb::options::{AuthMechanism, ClientOptions, Credential, Tls, TlsOptions};
use mongodb::sync::{Client, Collection};

use bulk::BulkInsert;
use common::WriteConcern;
use error::Error::ArgumentError;
use error::Result;
use options::{Ssl, ToolOptions, MECHANISM_GSSAPI};
use session::Connector;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Idle timeout applied to every pooled connection, in seconds.
pub const SOCKET_TIMEOUT: u64 = 600;

/// Creates `mongodb` clients from a resolved configuration.
pub struct MongoConnector {
    options: ClientOptions,
}

impl MongoConnector {
    /// Resolves the client options for the configured deployment. Unsupported
    /// settings are rejected here rather than ignored.
    pub fn new(options: &ToolOptions) -> Result<MongoConnector> {
        Ok(MongoConnector { options: configure_client(options)? })
    }

    pub fn client_options(&self) -> &ClientOptions {
        &self.options
    }
}

impl Connector for MongoConnector {
    type Handle = Client;

    fn connect(&mut self) -> Result<Client> {
        let client = Client::with_options(self.options.clone())?;
        client.database("admin").run_command(doc! { "ping": 1 }).run()?;
        Ok(client)
    }

    // Clones handed out earlier fail their next operation once this returns.
    fn disconnect(&mut self, client: Client) -> Result<()> {
        client.shutdown().run();
        Ok(())
    }
}

impl BulkInsert for Collection<Document> {
    fn bulk_insert(&self, documents: Vec<Document>, ordered: bool) -> Result<u64> {
        let result = self.insert_many(documents).ordered(ordered).run()?;
        Ok(result.inserted_ids.len() as u64)
    }

    fn namespace(&self) -> String {
        let ns = Collection::namespace(self);
        format!("{}.{}", ns.db, ns.coll)
    }
}

/// Builds client options from tool options.
///
/// Read preference and write concern override anything the connection string
/// carries; a missing write concern defaults to majority acknowledgment.
pub fn configure_client(options: &ToolOptions) -> Result<ClientOptions> {
    let mut options = options.clone();
    if options.connection_string().is_none() {
        options.normalize_host_port_uri()?;
    }

    let uri = match options.connection_string() {
        Some(uri) => uri.to_owned(),
        None => return Err(ArgumentError(String::from("no connection string configured"))),
    };

    let mut client_options = ClientOptions::parse(uri.as_str()).run()?;

    if let Some(ref read_preference) = options.read_preference {
        client_options.selection_criteria = Some(read_preference.to_selection_criteria()?);
    }
    client_options.write_concern = Some(match options.write_concern {
        Some(ref write_concern) => write_concern.to_driver(),
        None => WriteConcern::majority().to_driver(),
    });

    if options.connection.timeout > 0 {
        client_options.connect_timeout = Some(Duration::from_secs(options.connection.timeout));
    }
    client_options.max_idle_time = Some(Duration::from_secs(SOCKET_TIMEOUT));

    if !options.replica_set_name.is_empty() {
        client_options.repl_set_name = Some(options.replica_set_name.clone());
    }
    if options.direct {
        client_options.direct_connection = Some(true);
    }

    if let Some(credential) = configure_credential(&options)? {
        client_options.credential = Some(credential);
    }

    if let Some(ref ssl) = options.ssl {
        client_options.tls = Some(configure_tls(ssl)?);
    }

    Ok(client_options)
}

fn configure_credential(options: &ToolOptions) -> Result<Option<Credential>> {
    let auth = match options.auth {
        Some(ref auth) if auth.is_set() => auth,
        _ => return Ok(None),
    };

    let mut credential = Credential::default();
    if !auth.username.is_empty() {
        credential.username = Some(auth.username.clone());
    }
    if !auth.password.is_empty() {
        credential.password = Some(auth.password.clone());
    }
    credential.source = options.authentication_database();

    if !auth.mechanism.is_empty() {
        credential.mechanism = Some(AuthMechanism::from_str(&auth.mechanism)?);
    }

    if auth.mechanism == MECHANISM_GSSAPI {
        if let Some(ref kerberos) = options.kerberos {
            if !kerberos.service.is_empty() {
                credential.mechanism_properties =
                    Some(doc! { "SERVICE_NAME": kerberos.service.clone() });
            }
        }
    }

    Ok(Some(credential))
}

fn configure_tls(ssl: &Ssl) -> Result<Tls> {
    if ssl.fips_mode {
        return Err(ArgumentError(String::from("FIPS mode not supported")));
    }
    if !ssl.crl_file.is_empty() {
        return Err(ArgumentError(String::from("CRL files are not supported on this platform")));
    }
    if !ssl.pem_key_password.is_empty() {
        return Err(ArgumentError(String::from("encrypted PEM key files are not supported")));
    }

    if !ssl.use_ssl {
        return Ok(Tls::Disabled);
    }

    let mut tls = TlsOptions::default();
    if ssl.allow_invalid_cert || ssl.allow_invalid_host {
        tls.allow_invalid_certificates = Some(true);
    }
    if !ssl.ca_file.is_empty() {
        tls.ca_file_path = Some(PathBuf::from(&ssl.ca_file));
    }
    if !ssl.pem_key_file.is_empty() {
        tls.cert_key_file_path = Some(PathBuf::from(&ssl.pem_key_file));
    }

    Ok(Tls::Enabled(tls))
}
