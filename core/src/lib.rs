//! Mowbot settings core.
//!
//! Reads and writes the ROS parameter documents behind the mowbot settings
//! panels: NTRIP correction-service credentials, motor command scaling and
//! the KT server client. Each document wraps its parameters in a fixed
//! envelope:
//!
//! ```yaml
//! /**:
//!   cmdvel_scaler_node:
//!     ros__parameters:
//!       left_rate: 0.5
//!       right_rate: 0.5
//! ```
//!
//! # Modules
//!
//! - [`codec`]: envelope decode / encode
//! - [`store`]: file-backed get/set over `subsystem.parameter` keys
//! - [`schema`]: declared kinds and bounds, clamping, secret masking
//! - [`settings`]: the `sync` / `apply` façades
//! - [`registry`]: start-up construction and the process-wide instance
//! - [`config`]: where the documents live

pub mod cli;
pub mod codec;
pub mod command;
pub mod config;
pub mod error;
pub mod help;
pub mod key;
pub mod registry;
pub mod schema;
pub mod settings;
pub mod store;
pub mod sys;

pub use codec::{Document, ParamValue, ParameterBlock};
pub use config::AppConfig;
pub use error::{CodecError, Result, SettingsError};
pub use key::ParameterKey;
pub use registry::SettingsRegistry;
pub use schema::{ParamKind, ParamSpec, Schema};
pub use settings::{NtripSettings, OtherSettings, ParamMap, SettingsFacade, SyncObserver};
pub use store::{DocumentMap, ParameterStore};
