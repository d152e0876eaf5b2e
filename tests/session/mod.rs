use mongo_tools_db::options::{Auth, Ssl, Uri, MECHANISM_X509};
use mongo_tools_db::{Error, ReadMode, ReadPreference, SessionFlags, SessionProvider, ToolOptions};

use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use mock::{MockClient, MockConnector};

#[test]
fn connects_lazily() {
    let connector = MockConnector::new();
    let provider = SessionProvider::from_connector(connector.clone());
    assert_eq!(0, connector.connect_count());
    assert!(!provider.is_connected().unwrap());

    let client = provider.get_session().unwrap();
    assert_eq!(MockClient { generation: 1 }, client);
    assert_eq!(1, connector.connect_count());
    assert!(provider.is_connected().unwrap());
}

#[test]
fn connects_once() {
    let connector = MockConnector::new();
    let provider = SessionProvider::from_connector(connector.clone());

    let first = provider.get_session().unwrap();
    for _ in 0..10 {
        assert_eq!(first, provider.get_session().unwrap());
    }
    assert_eq!(1, connector.connect_count());
}

#[test]
fn concurrent_first_use_connects_once() {
    let connector = MockConnector::slow(Duration::from_millis(50));
    let provider = Arc::new(SessionProvider::from_connector(connector.clone()));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let provider = provider.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                provider.get_session().unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(MockClient { generation: 1 }, handle.join().unwrap());
    }
    assert_eq!(1, connector.connect_count());
}

#[test]
fn closed_provider_rejects_requests() {
    let connector = MockConnector::new();
    let provider = SessionProvider::from_connector(connector.clone());
    provider.get_session().unwrap();

    provider.close().unwrap();
    assert_eq!(1, connector.disconnect_count());
    assert!(!provider.is_connected().unwrap());

    match provider.get_session() {
        Err(err @ Error::SessionClosed) => {
            assert_eq!("SessionProvider already closed", err.to_string())
        }
        Err(err) => panic!("unexpected error: {}", err),
        Ok(_) => panic!("a closed provider should not hand out sessions"),
    }
    assert_eq!(1, connector.connect_count());
}

#[test]
fn close_twice() {
    let connector = MockConnector::new();
    let provider = SessionProvider::from_connector(connector.clone());
    provider.get_session().unwrap();

    provider.close().unwrap();
    provider.close().unwrap();
    assert_eq!(1, connector.disconnect_count());
}

#[test]
fn close_without_connecting() {
    let connector = MockConnector::new();
    let provider = SessionProvider::from_connector(connector.clone());

    provider.close().unwrap();
    assert_eq!(0, connector.connect_count());
    assert_eq!(0, connector.disconnect_count());
    assert!(provider.get_session().is_err());
}

#[test]
fn failed_connect_is_retried() {
    let connector = MockConnector::failing_first(1);
    let provider = SessionProvider::from_connector(connector.clone());

    let err = provider.get_session().unwrap_err();
    assert!(err.is_connection_error());
    assert!(!provider.is_connected().unwrap());

    assert_eq!(MockClient { generation: 2 }, provider.get_session().unwrap());
    assert_eq!(2, connector.connect_count());
}

fn assert_unsupported(result: Result<(), Error>) {
    match result {
        Err(Error::UnsupportedOperation(ref message)) => {
            assert!(message.contains("open session"), "{}", message)
        }
        Err(err) => panic!("unexpected error: {}", err),
        Ok(()) => panic!("mutator should be unsupported"),
    }
}

#[test]
fn session_mutators_are_unsupported() {
    let provider = SessionProvider::from_connector(MockConnector::new());
    provider.get_session().unwrap();

    assert_unsupported(provider.set_flags(SessionFlags::MONOTONIC));
    assert_unsupported(provider.set_read_preference(ReadPreference::new(ReadMode::Nearest, None)));
    assert_unsupported(provider.set_bypass_document_validation(true));

    let mut tags = BTreeMap::new();
    tags.insert(String::from("dc"), String::from("ny"));
    assert_unsupported(provider.set_tags(tags));
}

#[test]
fn session_flags() {
    let flags = SessionFlags::MONOTONIC | SessionFlags::DISABLE_SOCKET_TIMEOUT;
    assert_eq!(0b110, flags.bits());
    assert!(flags.contains(SessionFlags::MONOTONIC));
    assert!(!SessionFlags::empty().contains(SessionFlags::DISABLE_SOCKET_TIMEOUT));
}

fn options_with_auth(username: &str, mechanism: &str) -> ToolOptions {
    let mut options = ToolOptions::default();
    options.connection.port = Some(::mongo_tools_db::DEFAULT_TEST_PORT);
    options.auth = Some(Auth {
        username: username.to_owned(),
        mechanism: mechanism.to_owned(),
        ..Auth::default()
    });
    options
}

#[test]
fn prompts_for_missing_password() {
    let prompted = Cell::new(false);
    let provider = SessionProvider::with_password_prompt(options_with_auth("tool", ""), || {
        prompted.set(true);
        Ok(String::from("secret"))
    });

    assert!(provider.is_ok());
    assert!(prompted.get());
}

#[test]
fn no_prompt_for_certificate_auth() {
    let prompted = Cell::new(false);
    let provider = SessionProvider::with_password_prompt(options_with_auth("CN=tool", MECHANISM_X509),
                                                         || {
                                                             prompted.set(true);
                                                             Ok(String::new())
                                                         });

    assert!(provider.is_ok());
    assert!(!prompted.get());
}

#[test]
fn prompt_failure_is_returned() {
    let result = SessionProvider::with_password_prompt(options_with_auth("tool", ""),
                                                       || Err(Error::from("no terminal")));

    match result {
        Err(Error::OperationError(ref message)) => assert_eq!("no terminal", message),
        Err(err) => panic!("unexpected error: {}", err),
        Ok(_) => panic!("prompt failure should be returned"),
    }
}

#[test]
fn unsupported_tls_settings_fail_construction() {
    let fips = Ssl { use_ssl: true, fips_mode: true, ..Ssl::default() };
    let crl = Ssl { use_ssl: true, crl_file: String::from("/etc/ssl/revoked.pem"), ..Ssl::default() };

    for ssl in vec![fips, crl] {
        let mut options = ToolOptions::default();
        options.ssl = Some(ssl);

        match SessionProvider::new(options) {
            Err(err @ Error::ConfigurationError(_)) => {
                assert!(err.to_string().starts_with("error configuring the connector: "),
                        "{}",
                        err)
            }
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("unsupported TLS settings should be rejected"),
        }
    }
}

#[test]
fn unreachable_server_is_a_connection_error() {
    let mut options = ToolOptions::default();
    options.uri = Some(Uri {
        connection_string: String::from("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=250"),
    });

    let provider = SessionProvider::new(options).unwrap();
    let err = provider.get_session().unwrap_err();
    assert!(err.is_connection_error(), "{}", err);
    assert!(!provider.is_connected().unwrap());
}
