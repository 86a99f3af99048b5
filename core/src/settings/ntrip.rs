//! NTRIP correction-service credentials.
//!
//! One document, one subsystem (`ntrip_client`). Keys are bare parameter
//! names (`username`, `password`, ...) since there is nothing to prefix.

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use super::{normalize_changed, Observers, ParamMap, SettingsFacade, SyncObserver};
use crate::codec::ParameterBlock;
use crate::config::AppConfig;
use crate::error::{Result, SettingsError};
use crate::key::ParameterKey;
use crate::schema::Schema;
use crate::store::{DocumentMap, ParameterStore};

/// Subsystem name of the NTRIP client node.
pub const NTRIP_SUBSYSTEM: &str = "ntrip_client";


#[derive(Debug)]
pub struct NtripSettings {
    store: ParameterStore,
    schema: Schema,
    observers: Observers<String>,
}

impl NtripSettings {
    /// Façade over the NTRIP document at `path`, with the mowbot schema.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let mut docs = DocumentMap::new();
        docs.insert(NTRIP_SUBSYSTEM.to_string(), path.into());
        NtripSettings {
            store: ParameterStore::new(docs),
            schema: Schema::mowbot(),
            observers: Observers::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        NtripSettings::new(config.ntrip_document())
    }

    /// Replace the schema consulted on `apply`.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn document_path(&self) -> &Path {
        // Constructed with exactly this subsystem, so the lookup cannot miss.
        self.store
            .document_path(NTRIP_SUBSYSTEM)
            .unwrap_or_else(|| Path::new(""))
    }

    fn key(name: &str) -> ParameterKey {
        ParameterKey::new(NTRIP_SUBSYSTEM, name)
    }
}

impl SettingsFacade for NtripSettings {
    type Key = String;

    /// A missing document is logged and yields an empty mapping rather
    /// than an error; any other failure is returned.
    fn sync(&mut self) -> Result<ParamMap<String>> {
        let block = match self.store.read_block(NTRIP_SUBSYSTEM) {
            Ok(block) => block,
            Err(SettingsError::DocumentNotFound { path, .. }) => {
                error!("NTRIP params file not found: {}", path.display());
                ParameterBlock::new()
            }
            Err(e) => {
                error!("NTRIP sync failed: {}", e);
                return Err(e);
            }
        };

        for (name, value) in &block {
            if let Some(problem) = self.schema.check(&Self::key(name), value) {
                warn!("NTRIP parameter {}: {}", name, problem);
            }
        }

        self.observers.notify_all(&block);
        info!("NTRIP params loaded: {} parameter(s)", block.len());
        Ok(block)
    }

    /// Overwrite the whole parameter block with `settings`.
    ///
    /// Values equal to what the document holds are written back as they
    /// are; changed values are normalised first, and nothing is written if
    /// one of them fails.
    fn apply(&mut self, settings: &ParamMap<String>) -> Result<()> {
        let current = match self.store.read_block(NTRIP_SUBSYSTEM) {
            Ok(block) => block,
            Err(e) => {
                debug!("NTRIP apply without current values: {}", e);
                ParameterBlock::new()
            }
        };

        let mut block = ParameterBlock::new();
        for (name, value) in settings {
            let normalized =
                normalize_changed(&self.schema, &Self::key(name), value, current.get(name))?;
            block.insert(name.clone(), normalized);
        }

        if let Err(e) = self.store.replace_block(NTRIP_SUBSYSTEM, &block) {
            error!("NTRIP apply failed: {}", e);
            return Err(e);
        }
        let names: Vec<&str> = block.keys().map(String::as_str).collect();
        info!("NTRIP params saved: {}", names.join(", "));
        Ok(())
    }

    fn subscribe(&mut self, observer: SyncObserver<String>) {
        self.observers.subscribe(observer);
    }
}
