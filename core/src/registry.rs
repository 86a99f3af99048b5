//! Settings registry.
//!
//! The host application builds one `SettingsRegistry` from its
//! configuration at start-up and passes it to whoever needs it. Code that
//! cannot be handed a reference may reach the same instance through the
//! process-wide slot filled by [`install`]; a second `install` is an error,
//! never a silent reuse of the first configuration.

use std::sync::Mutex;

use log::info;
use once_cell::sync::OnceCell;

use crate::config::AppConfig;
use crate::error::{Result, SettingsError};
use crate::settings::{NtripSettings, OtherSettings};

static GLOBAL: OnceCell<Mutex<SettingsRegistry>> = OnceCell::new();


/// One façade per settings family, all built from the same configuration.
#[derive(Debug)]
pub struct SettingsRegistry {
    config: AppConfig,
    ntrip: NtripSettings,
    other: OtherSettings,
}

impl SettingsRegistry {
    pub fn new(config: AppConfig) -> Self {
        let ntrip = NtripSettings::from_config(&config);
        let other = OtherSettings::from_config(&config);
        SettingsRegistry {
            config,
            ntrip,
            other,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn ntrip(&self) -> &NtripSettings {
        &self.ntrip
    }

    pub fn ntrip_mut(&mut self) -> &mut NtripSettings {
        &mut self.ntrip
    }

    pub fn other(&self) -> &OtherSettings {
        &self.other
    }

    pub fn other_mut(&mut self) -> &mut OtherSettings {
        &mut self.other
    }
}


/// Make `registry` the process-wide instance.
pub fn install(registry: SettingsRegistry) -> Result<&'static Mutex<SettingsRegistry>> {
    let data_dir = registry.config.mowbot_legacy_data_path.clone();
    GLOBAL
        .set(Mutex::new(registry))
        .map_err(|_| SettingsError::RegistryInstalled)?;
    info!("settings registry installed for {}", data_dir.display());
    GLOBAL.get().ok_or(SettingsError::RegistryInstalled)
}


/// The process-wide instance, if one was installed.
pub fn global() -> Option<&'static Mutex<SettingsRegistry>> {
    GLOBAL.get()
}
