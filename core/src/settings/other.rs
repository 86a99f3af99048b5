//! Motor command scaling and KT server client settings.
//!
//! Two subsystems, each in its own document. Keys are [`ParameterKey`]s,
//! e.g. `cmdvel_scaler_node.left_rate`.

use std::collections::BTreeMap;

use log::{error, info, warn};

use super::{normalize_changed, Observers, ParamMap, SettingsFacade, SyncObserver};
use crate::codec::ParameterBlock;
use crate::config::AppConfig;
use crate::error::Result;
use crate::key::ParameterKey;
use crate::schema::Schema;
use crate::store::{DocumentMap, ParameterStore};

/// Subsystem name of the cmd_vel scaler node.
pub const CMDVEL_SCALER_SUBSYSTEM: &str = "cmdvel_scaler_node";

/// Subsystem name of the KT server bridge node.
pub const KT_SERVER_SUBSYSTEM: &str = "kt_server_client_node";


#[derive(Debug)]
pub struct OtherSettings {
    store: ParameterStore,
    schema: Schema,
    observers: Observers<ParameterKey>,
}

impl OtherSettings {
    pub fn new(documents: DocumentMap) -> Self {
        OtherSettings {
            store: ParameterStore::new(documents),
            schema: Schema::mowbot(),
            observers: Observers::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        OtherSettings::new(config.other_documents())
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }
}

impl SettingsFacade for OtherSettings {
    type Key = ParameterKey;

    /// Read every document. A missing or broken document fails the whole
    /// sync and observers are not called.
    fn sync(&mut self) -> Result<ParamMap<ParameterKey>> {
        let settings = match self.store.read_all() {
            Ok(settings) => settings,
            Err(e) => {
                error!("settings sync failed: {}", e);
                return Err(e);
            }
        };

        for (key, value) in &settings {
            if let Some(problem) = self.schema.check(key, value) {
                warn!("parameter {}: {}", key, problem);
            }
        }

        self.observers.notify_all(&settings);
        info!("settings loaded: {} parameter(s)", settings.len());
        Ok(settings)
    }

    /// Normalise changed values, then write. Values equal to what the
    /// documents hold pass through verbatim. Validation failures leave all
    /// documents untouched.
    fn apply(&mut self, settings: &ParamMap<ParameterKey>) -> Result<()> {
        let mut current: BTreeMap<&str, ParameterBlock> = BTreeMap::new();
        for key in settings.keys() {
            let subsystem = key.subsystem.as_str();
            if current.contains_key(subsystem) {
                continue;
            }
            // Unreadable documents are reported by the write below.
            let block = self.store.read_block(subsystem).unwrap_or_default();
            current.insert(subsystem, block);
        }

        let mut normalized = ParamMap::new();
        for (key, value) in settings {
            let stored = current
                .get(key.subsystem.as_str())
                .and_then(|block| block.get(&key.parameter));
            normalized.insert(
                key.clone(),
                normalize_changed(&self.schema, key, value, stored)?,
            );
        }

        if let Err(e) = self.store.write(&normalized) {
            error!("settings apply failed: {}", e);
            return Err(e);
        }
        let keys: Vec<String> = normalized.keys().map(ParameterKey::dotted).collect();
        info!("settings saved: {}", keys.join(", "));
        Ok(())
    }

    fn subscribe(&mut self, observer: SyncObserver<ParameterKey>) {
        self.observers.subscribe(observer);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ParamValue;
    use crate::error::SettingsError;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn setup() -> (TempDir, OtherSettings) {
        let dir = TempDir::new().unwrap();
        let cmdvel = dir.path().join("cmdvel.yaml");
        let kt = dir.path().join("kt.yaml");
        fs::write(
            &cmdvel,
            "/**:\n  cmdvel_scaler_node:\n    ros__parameters:\n      left_rate: 0.5\n      right_rate: 0.5\n",
        )
        .unwrap();
        fs::write(
            &kt,
            "/**:\n  kt_server_client_node:\n    ros__parameters:\n      client_id: abc\n      client_secret: s3cr3t\n      robot_serial: MB-7\n      robot_status_report_hz: 1\n",
        )
        .unwrap();
        let mut docs = DocumentMap::new();
        docs.insert(CMDVEL_SCALER_SUBSYSTEM.into(), cmdvel);
        docs.insert(KT_SERVER_SUBSYSTEM.into(), kt);
        (dir, OtherSettings::new(docs))
    }

    fn key(s: &str) -> ParameterKey {
        ParameterKey::parse(s).unwrap()
    }

    #[test]
    fn sync_yields_dotted_keys() {
        let (_dir, mut other) = setup();
        let settings = other.sync().unwrap();
        assert_eq!(settings.len(), 6);
        assert_eq!(settings[&key("cmdvel_scaler_node.left_rate")], ParamValue::from(0.5));
        assert_eq!(settings[&key("cmdvel_scaler_node.right_rate")], ParamValue::from(0.5));
        assert_eq!(
            settings[&key("kt_server_client_node.client_id")],
            ParamValue::from("abc")
        );
    }

    #[test]
    fn apply_single_key_updates_only_that_key() {
        let (_dir, mut other) = setup();
        let mut update = ParamMap::new();
        update.insert(key("cmdvel_scaler_node.left_rate"), ParamValue::from(0.8));
        other.apply(&update).unwrap();

        let block = other.store().read_block(CMDVEL_SCALER_SUBSYSTEM).unwrap();
        assert_eq!(block["left_rate"], ParamValue::from(0.8));
        assert_eq!(block["right_rate"], ParamValue::from(0.5));
    }

    #[test]
    fn apply_clamps_slider_values() {
        let (_dir, mut other) = setup();
        let mut update = ParamMap::new();
        update.insert(key("cmdvel_scaler_node.right_rate"), ParamValue::from(4.2));
        update.insert(key("kt_server_client_node.robot_status_report_hz"), ParamValue::from(99));
        other.apply(&update).unwrap();

        let settings = other.sync().unwrap();
        assert_eq!(settings[&key("cmdvel_scaler_node.right_rate")], ParamValue::from(1.0));
        assert_eq!(
            settings[&key("kt_server_client_node.robot_status_report_hz")].as_i64(),
            Some(10)
        );
    }

    #[test]
    fn apply_invalid_value_writes_nothing() {
        let (dir, mut other) = setup();
        let cmdvel_before = fs::read_to_string(dir.path().join("cmdvel.yaml")).unwrap();
        let mut update = ParamMap::new();
        update.insert(key("cmdvel_scaler_node.left_rate"), ParamValue::from(0.1));
        update.insert(key("kt_server_client_node.client_id"), ParamValue::from(7));
        assert!(matches!(
            other.apply(&update),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert_eq!(
            fs::read_to_string(dir.path().join("cmdvel.yaml")).unwrap(),
            cmdvel_before
        );
    }

    #[test]
    fn apply_unknown_parameter_fails_loudly() {
        let (_dir, mut other) = setup();
        let mut update = ParamMap::new();
        update.insert(key("cmdvel_scaler_node.top_speed"), ParamValue::from(2.0));
        assert!(matches!(
            other.apply(&update),
            Err(SettingsError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn sync_failure_skips_observers() {
        let (dir, mut other) = setup();
        fs::remove_file(dir.path().join("kt.yaml")).unwrap();
        let called = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&called);
        other.subscribe(Box::new(move |_: &ParamMap<ParameterKey>| {
            *flag.lock().unwrap() = true;
        }));
        assert!(matches!(
            other.sync(),
            Err(SettingsError::DocumentNotFound { .. })
        ));
        assert!(!*called.lock().unwrap());
    }

    #[test]
    fn apply_of_sync_is_idempotent() {
        let (_dir, mut other) = setup();
        let before = other.sync().unwrap();
        other.apply(&before).unwrap();
        assert_eq!(other.sync().unwrap(), before);
    }

    #[test]
    fn apply_of_sync_keeps_off_grid_and_numeric_values() {
        let (dir, mut other) = setup();
        let cmdvel = dir.path().join("cmdvel.yaml");
        let kt = dir.path().join("kt.yaml");
        fs::write(
            &cmdvel,
            "/**:\n  cmdvel_scaler_node:\n    ros__parameters:\n      left_rate: 1.5\n      right_rate: 0.555\n",
        )
        .unwrap();
        fs::write(
            &kt,
            "/**:\n  kt_server_client_node:\n    ros__parameters:\n      client_id: abc\n      client_secret: s3cr3t\n      robot_serial: 20240101\n      robot_status_report_hz: 25\n",
        )
        .unwrap();
        let parsed = |p: &std::path::Path| {
            crate::codec::Document::parse(&fs::read_to_string(p).unwrap()).unwrap()
        };
        let (cmdvel_before, kt_before) = (parsed(&cmdvel), parsed(&kt));

        let synced = other.sync().unwrap();
        other.apply(&synced).unwrap();

        assert_eq!(parsed(&cmdvel), cmdvel_before);
        assert_eq!(parsed(&kt), kt_before);
        let again = other.sync().unwrap();
        assert_eq!(again[&key("cmdvel_scaler_node.left_rate")], ParamValue::from(1.5));
        assert_eq!(again[&key("cmdvel_scaler_node.right_rate")], ParamValue::from(0.555));
    }
}
