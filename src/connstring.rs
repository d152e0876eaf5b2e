//! Host lists as they appear in connection strings.
use error::Error::ArgumentError;
use error::Result;

use std::fmt;

pub const DEFAULT_PORT: u16 = 27017;
pub const URI_SCHEME: &'static str = "mongodb://";

/// Encapsulates the hostname and port of a host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Host {
    pub host_name: String,
    pub port: Option<u16>,
}

impl Host {
    pub fn new(host_name: String, port: Option<u16>) -> Host {
        Host {
            host_name: host_name,
            port: port,
        }
    }

    /// The port to connect to, falling back to the default.
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        if self.host_name.contains(':') {
            write!(fmt, "[{}]", self.host_name)?;
        } else {
            fmt.write_str(&self.host_name)?;
        }

        match self.port {
            Some(port) => write!(fmt, ":{}", port),
            None => Ok(()),
        }
    }
}

// Parses an IPv6 literal host entity of the form [host] or [host]:port.
fn parse_ipv6_literal_host(entity: &str) -> Result<Host> {
    match entity.find("]:") {
        Some(idx) => {
            let port = parse_port(&entity[idx + 2..])?;
            Ok(Host::new(entity[1..idx].to_lowercase(), Some(port)))
        }
        None if entity.ends_with(']') => {
            Ok(Host::new(entity[1..entity.len() - 1].to_lowercase(), None))
        }
        None => Err(ArgumentError(String::from(
            "An IPv6 address must be enclosed in '[' and ']' according to RFC 2732.",
        ))),
    }
}

/// Parses a host entity of the form host or host:port. Host names are lowercased.
pub fn parse_host(entity: &str) -> Result<Host> {
    if entity.starts_with('[') {
        return parse_ipv6_literal_host(entity);
    }

    let (host, port) = partition(entity, ":");
    if port.contains(':') {
        return Err(ArgumentError(String::from(
            "An IPv6 address literal must be enclosed in '[' and ']' according to RFC 2732.",
        )));
    }

    let port = if entity.contains(':') {
        Some(parse_port(port)?)
    } else {
        None
    };

    Ok(Host::new(host.to_lowercase(), port))
}

fn parse_port(port: &str) -> Result<u16> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(ArgumentError(format!("Invalid port '{}'.", port))),
        Ok(val) => Ok(val),
    }
}

/// Splits and parses a comma-separated host list.
pub fn parse_hosts(host_str: &str) -> Result<Vec<Host>> {
    let mut hosts = Vec::new();
    for entity in host_str.split(',') {
        if entity.is_empty() {
            return Err(ArgumentError(String::from("Empty host, or extra comma in host list.")));
        }
        hosts.push(parse_host(entity)?);
    }
    Ok(hosts)
}

// Partitions a string around the left-most occurrence of the separator, if it exists.
fn partition<'a>(string: &'a str, sep: &str) -> (&'a str, &'a str) {
    match string.find(sep) {
        Some(idx) => (&string[..idx], &string[idx + sep.len()..]),
        None => (string, ""),
    }
}
