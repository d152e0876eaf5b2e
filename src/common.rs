//! Read and write controls applied to the client connection.
use error::Error::ArgumentError;
use error::Result;

use mongodb::options::{self as mongo, ReadPreferenceOptions, SelectionCriteria, TagSet};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Server selection modes for read operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadMode {
    Primary,
    PrimaryPreferred,
    Secondary,
    SecondaryPreferred,
    Nearest,
}

impl ReadMode {
    /// Returns the connection string spelling of the mode.
    pub fn as_str(&self) -> &'static str {
        match *self {
            ReadMode::Primary => "primary",
            ReadMode::PrimaryPreferred => "primaryPreferred",
            ReadMode::Secondary => "secondary",
            ReadMode::SecondaryPreferred => "secondaryPreferred",
            ReadMode::Nearest => "nearest",
        }
    }
}

impl FromStr for ReadMode {
    type Err = ::error::Error;

    fn from_str(s: &str) -> Result<ReadMode> {
        Ok(match &s.to_lowercase()[..] {
            "primary" => ReadMode::Primary,
            "primarypreferred" => ReadMode::PrimaryPreferred,
            "secondary" => ReadMode::Secondary,
            "secondarypreferred" => ReadMode::SecondaryPreferred,
            "nearest" => ReadMode::Nearest,
            _ => return Err(ArgumentError(format!("unknown read preference mode '{}'", s))),
        })
    }
}

impl fmt::Display for ReadMode {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}

/// A read mode together with the server tag sets eligible to serve reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReadPreference {
    pub mode: ReadMode,
    #[serde(default)]
    pub tag_sets: Vec<BTreeMap<String, String>>,
}

impl ReadPreference {
    pub fn new(mode: ReadMode, tag_sets: Option<Vec<BTreeMap<String, String>>>) -> ReadPreference {
        ReadPreference {
            mode: mode,
            tag_sets: tag_sets.unwrap_or_default(),
        }
    }

    /// Converts the preference into the client's server selection criteria.
    pub fn to_selection_criteria(&self) -> Result<SelectionCriteria> {
        let options = if self.tag_sets.is_empty() {
            None
        } else {
            let mut options = ReadPreferenceOptions::default();
            options.tag_sets = Some(self.tag_sets
                .iter()
                .map(|tags| tags.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<TagSet>())
                .collect());
            Some(options)
        };

        let read_preference = match self.mode {
            ReadMode::Primary if options.is_some() => {
                return Err(ArgumentError(String::from(
                    "read preference tags cannot be combined with mode 'primary'",
                )))
            }
            ReadMode::Primary => mongo::ReadPreference::Primary,
            ReadMode::PrimaryPreferred => mongo::ReadPreference::PrimaryPreferred { options: options },
            ReadMode::Secondary => mongo::ReadPreference::Secondary { options: options },
            ReadMode::SecondaryPreferred => {
                mongo::ReadPreference::SecondaryPreferred { options: options }
            }
            ReadMode::Nearest => mongo::ReadPreference::Nearest { options: options },
        };

        Ok(SelectionCriteria::ReadPreference(read_preference))
    }
}

/// The number or set of servers that must acknowledge a write.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAcknowledgment")]
pub enum Acknowledgment {
    Nodes(u32),
    Majority,
    Custom(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAcknowledgment {
    Nodes(u32),
    Named(String),
}

impl From<RawAcknowledgment> for Acknowledgment {
    fn from(raw: RawAcknowledgment) -> Acknowledgment {
        match raw {
            RawAcknowledgment::Nodes(n) => Acknowledgment::Nodes(n),
            RawAcknowledgment::Named(ref name) if name == "majority" => Acknowledgment::Majority,
            RawAcknowledgment::Named(name) => Acknowledgment::Custom(name),
        }
    }
}

impl<'a> From<&'a Acknowledgment> for mongo::Acknowledgment {
    fn from(w: &'a Acknowledgment) -> mongo::Acknowledgment {
        match *w {
            Acknowledgment::Nodes(n) => mongo::Acknowledgment::Nodes(n),
            Acknowledgment::Majority => mongo::Acknowledgment::Majority,
            Acknowledgment::Custom(ref tag) => mongo::Acknowledgment::Custom(tag.clone()),
        }
    }
}

impl fmt::Display for Acknowledgment {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Acknowledgment::Nodes(n) => write!(fmt, "{}", n),
            Acknowledgment::Majority => fmt.write_str("majority"),
            Acknowledgment::Custom(ref tag) => fmt.write_str(tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct WriteConcern {
    /// Write replication.
    #[serde(default)]
    pub w: Option<Acknowledgment>,
    /// Propagation timeout in ms, used in conjunction with `w`.
    #[serde(default)]
    pub w_timeout: Option<u64>,
    /// If true, blocks until write operations have been committed to the journal.
    #[serde(default)]
    pub j: Option<bool>,
}

impl WriteConcern {
    pub fn new() -> WriteConcern {
        WriteConcern {
            w: Some(Acknowledgment::Nodes(1)),
            w_timeout: None,
            j: None,
        }
    }

    /// Requires acknowledgment from a majority of replica set members.
    pub fn majority() -> WriteConcern {
        WriteConcern {
            w: Some(Acknowledgment::Majority),
            w_timeout: None,
            j: None,
        }
    }

    /// Converts the concern into the client's write concern.
    pub fn to_driver(&self) -> mongo::WriteConcern {
        let mut concern = mongo::WriteConcern::default();
        concern.w = self.w.as_ref().map(mongo::Acknowledgment::from);
        concern.w_timeout = self.w_timeout.map(Duration::from_millis);
        concern.journal = self.j;
        concern
    }
}
