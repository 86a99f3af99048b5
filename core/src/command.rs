//! Command: the typed interface for every `mowset` operation.
//!
//! Commands serialise as internally-tagged JSON, e.g.
//!
//! ```json
//! {"command": "ntrip.show", "format": "json"}
//! {"command": "other.set", "values": [["cmdvel_scaler_node.left_rate", "0.8"]]}
//! ```
//!
//! Values in `*.set` commands stay raw text here; they are read as YAML
//! scalars when the command runs, so `0.8` is a number and `abc` a string.

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command")]
pub enum Command {
    /// Usage text, optionally for one topic.
    #[serde(rename = "help")]
    Help {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
    },

    /// Print the NTRIP parameters.
    #[serde(rename = "ntrip.show")]
    NtripShow {
        /// "json" for JSON output, omit for `name: value` lines.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },

    /// Change NTRIP parameters; unlisted ones are kept.
    #[serde(rename = "ntrip.set")]
    NtripSet { values: Vec<(String, String)> },

    /// Print the motor scaling and KT server parameters.
    #[serde(rename = "other.show")]
    OtherShow {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },

    /// Change motor scaling / KT server parameters by dotted key.
    #[serde(rename = "other.set")]
    OtherSet { values: Vec<(String, String)> },

    /// List declared parameters with their bounds.
    #[serde(rename = "schema")]
    Schema,
}


/// A parsed command line: the command plus global flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// `--config <path>` if given.
    pub config: Option<String>,
    pub command: Command,
}
