//! Composite parameter keys.
//!
//! Operators and panels address a parameter as `subsystem.parameter`, e.g.
//! `cmdvel_scaler_node.left_rate`. Internally the two halves are kept
//! apart so that a parameter name containing a `.` stays unambiguous.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SettingsError;


/// A `(subsystem, parameter)` pair identifying one scalar in one document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParameterKey {
    pub subsystem: String,
    pub parameter: String,
}

impl ParameterKey {
    pub fn new(subsystem: impl Into<String>, parameter: impl Into<String>) -> Self {
        ParameterKey {
            subsystem: subsystem.into(),
            parameter: parameter.into(),
        }
    }

    /// Parse a dotted key like `kt_server_client_node.client_id`.
    ///
    /// Splits on the first `.` only, so `node.a.b` addresses parameter
    /// `a.b` of subsystem `node`. Both halves must be non-empty.
    pub fn parse(input: &str) -> Result<Self, SettingsError> {
        let input = input.trim();
        match input.split_once('.') {
            Some((subsystem, parameter)) if !subsystem.is_empty() && !parameter.is_empty() => {
                Ok(ParameterKey::new(subsystem, parameter))
            }
            _ => Err(SettingsError::InvalidKey(input.to_string())),
        }
    }

    /// The dotted form, identical to `to_string()`.
    pub fn dotted(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.subsystem, self.parameter)
    }
}

impl FromStr for ParameterKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParameterKey::parse(s)
    }
}

impl Serialize for ParameterKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ParameterKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ParameterKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}
