use std::collections::BTreeMap;
use std::path::Path;

use serde_yaml::Value;

use crate::codec::ParamValue;
use crate::command::Command;
use crate::config::{self, AppConfig};
use crate::error::{Result, SettingsError};
use crate::help::help_text;
use crate::key::ParameterKey;
use crate::registry::SettingsRegistry;
use crate::schema::{ParamKind, Schema};
use crate::settings::ntrip::NTRIP_SUBSYSTEM;
use crate::settings::{ParamMap, SettingsFacade};


/// Runtime for one `mowset` invocation: owns the registry and dispatches
/// commands against it.
#[derive(Debug)]
pub struct Sys {
    registry: SettingsRegistry,
}

impl Sys {
    pub fn new(config: AppConfig) -> Self {
        Sys {
            registry: SettingsRegistry::new(config),
        }
    }

    pub fn from_config_file(path: &Path) -> Result<Sys> {
        Ok(Sys::new(config::load(path)?))
    }

    pub fn registry(&self) -> &SettingsRegistry {
        &self.registry
    }

    /// Run `cmd`, returning the text to print.
    pub fn execute(&mut self, cmd: &Command) -> Result<String> {
        match cmd {
            Command::Help { topic } => Ok(help_text(topic.as_deref())),
            Command::NtripShow { format } => self.ntrip_show(format.as_deref()),
            Command::NtripSet { values } => self.ntrip_set(values),
            Command::OtherShow { format } => self.other_show(format.as_deref()),
            Command::OtherSet { values } => self.other_set(values),
            Command::Schema => Ok(self.schema_listing()),
        }
    }

    // -------------------------------------------------------------------
    // NTRIP
    // -------------------------------------------------------------------

    fn ntrip_show(&mut self, format: Option<&str>) -> Result<String> {
        let ntrip = self.registry.ntrip_mut();
        let settings = ntrip.sync()?;
        let schema = ntrip.schema();
        let rows: Vec<(String, ParameterKey, &ParamValue)> = settings
            .iter()
            .map(|(name, v)| (name.clone(), ParameterKey::new(NTRIP_SUBSYSTEM, name.as_str()), v))
            .collect();
        render_rows(schema, &rows, format)
    }

    fn ntrip_set(&mut self, values: &[(String, String)]) -> Result<String> {
        let ntrip = self.registry.ntrip_mut();
        let mut settings = ntrip.sync()?;
        let prefix = format!("{}.", NTRIP_SUBSYSTEM);
        for (raw_key, raw_value) in values {
            let name = raw_key.strip_prefix(prefix.as_str()).unwrap_or(raw_key.as_str()).to_string();
            let key = ParameterKey::new(NTRIP_SUBSYSTEM, name.as_str());
            let value = coerce(ntrip.schema(), &key, settings.get(&name), raw_value);
            settings.insert(name, value);
        }
        ntrip.apply(&settings)?;
        Ok(format!("updated {} NTRIP parameter(s)", values.len()))
    }

    // -------------------------------------------------------------------
    // Motor scaling / KT server
    // -------------------------------------------------------------------

    fn other_show(&mut self, format: Option<&str>) -> Result<String> {
        let other = self.registry.other_mut();
        let settings = other.sync()?;
        let rows: Vec<(String, ParameterKey, &ParamValue)> = settings
            .iter()
            .map(|(key, v)| (key.dotted(), key.clone(), v))
            .collect();
        render_rows(other.schema(), &rows, format)
    }

    fn other_set(&mut self, values: &[(String, String)]) -> Result<String> {
        let other = self.registry.other_mut();
        let mut updates = ParamMap::new();
        let mut current: Option<ParamMap<ParameterKey>> = None;
        for (raw_key, raw_value) in values {
            let key = ParameterKey::parse(raw_key)?;
            if current.is_none() {
                current = Some(other.store().read_all()?);
            }
            let existing = current.as_ref().and_then(|c| c.get(&key));
            let value = coerce(other.schema(), &key, existing, raw_value);
            updates.insert(key, value);
        }
        other.apply(&updates)?;
        Ok(format!("updated {} parameter(s)", updates.len()))
    }

    fn schema_listing(&self) -> String {
        let schema = self.registry.other().schema();
        let mut out = String::new();
        for (key, spec) in schema.iter() {
            let kind = match &spec.kind {
                ParamKind::Slider { min, max, step } => {
                    format!("number {}..={} step {}", min, max, step)
                }
                ParamKind::Text { required, secret } => {
                    let mut flags = Vec::new();
                    if *required {
                        flags.push("required");
                    }
                    if *secret {
                        flags.push("secret");
                    }
                    if flags.is_empty() {
                        "text".to_string()
                    } else {
                        format!("text ({})", flags.join(", "))
                    }
                }
            };
            out.push_str(&format!("{:<46} {:<26} {}\n", key.dotted(), spec.label, kind));
        }
        out.trim_end().to_string()
    }
}


/// Render `(label, key, value)` rows as `label: value` lines or JSON,
/// masking secrets either way.
fn render_rows(
    schema: &Schema,
    rows: &[(String, ParameterKey, &ParamValue)],
    format: Option<&str>,
) -> Result<String> {
    if format == Some("json") {
        let mut obj = BTreeMap::new();
        for (label, key, value) in rows {
            let shown = match schema.get(key) {
                Some(spec) if spec.is_secret() => serde_json::Value::String(schema.display(key, value)),
                _ => serde_json::to_value(value).map_err(|e| SettingsError::Encode(e.to_string()))?,
            };
            obj.insert(label.clone(), shown);
        }
        return serde_json::to_string_pretty(&obj).map_err(|e| SettingsError::Encode(e.to_string()));
    }

    let lines: Vec<String> = rows
        .iter()
        .map(|(label, key, value)| format!("{}: {}", label, schema.display(key, value)))
        .collect();
    Ok(lines.join("\n"))
}


/// Turn operator text into a value for `key`.
///
/// Declared text parameters, and parameters currently holding a string,
/// take the text verbatim so `123456` stays a password rather than a
/// number. Everything else is read as a YAML scalar.
fn coerce(schema: &Schema, key: &ParameterKey, existing: Option<&ParamValue>, raw: &str) -> ParamValue {
    let declared_text = matches!(
        schema.get(key).map(|s| &s.kind),
        Some(ParamKind::Text { .. })
    );
    let currently_text = matches!(existing, Some(Value::String(_)));
    if declared_text || currently_text {
        return Value::String(raw.to_string());
    }
    parse_scalar(raw)
}


/// Read `raw` as a YAML scalar, falling back to a plain string.
pub fn parse_scalar(raw: &str) -> ParamValue {
    if raw.trim().is_empty() {
        return Value::String(raw.to_string());
    }
    match serde_yaml::from_str::<Value>(raw) {
        Ok(v @ Value::Bool(_)) | Ok(v @ Value::Number(_)) | Ok(v @ Value::String(_)) => v,
        Ok(Value::Null) => Value::Null,
        _ => Value::String(raw.to_string()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Sys) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ntrip_client_params.yaml"),
            "/**:\n  ntrip_client:\n    ros__parameters:\n      username: u1\n      password: p1\n      port: 2101\n      mountpoint: '0042'\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("cmdvel_scaler_params.yaml"),
            "/**:\n  cmdvel_scaler_node:\n    ros__parameters:\n      left_rate: 0.5\n      right_rate: 0.5\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("kt_server_bridge_params.yaml"),
            "/**:\n  kt_server_client_node:\n    ros__parameters:\n      robot_serial: MB-1\n      client_id: cid\n      client_secret: hidden\n      robot_status_report_hz: 1\n",
        )
        .unwrap();
        let sys = Sys::new(AppConfig::with_data_dir(dir.path()));
        (dir, sys)
    }

    #[test]
    fn parse_scalar_types() {
        assert_eq!(parse_scalar("0.8"), Value::from(0.8));
        assert_eq!(parse_scalar("true"), Value::Bool(true));
        assert_eq!(parse_scalar("rover"), Value::from("rover"));
        assert_eq!(parse_scalar("[oops"), Value::from("[oops"));
        assert_eq!(parse_scalar("a: b"), Value::from("a: b"));
        assert_eq!(parse_scalar(""), Value::from(""));
    }

    #[test]
    fn ntrip_show_masks_password() {
        let (_dir, mut sys) = setup();
        let out = sys.execute(&Command::NtripShow { format: None }).unwrap();
        assert!(out.contains("username: u1"));
        assert!(out.contains("password: ********"));
        assert!(!out.contains("p1"));
    }

    #[test]
    fn ntrip_show_json() {
        let (_dir, mut sys) = setup();
        let out = sys
            .execute(&Command::NtripShow { format: Some("json".into()) })
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["username"], "u1");
        assert_eq!(parsed["password"], "********");
        assert_eq!(parsed["port"], 2101);
    }

    #[test]
    fn ntrip_set_merges_and_keeps_types() {
        let (_dir, mut sys) = setup();
        sys.execute(&Command::NtripSet {
            values: vec![
                ("password".into(), "123456".into()),
                ("ntrip_client.mountpoint".into(), "0099".into()),
            ],
        })
        .unwrap();
        let settings = sys.registry.ntrip_mut().sync().unwrap();
        assert_eq!(settings["username"], Value::from("u1"));
        assert_eq!(settings["password"], Value::from("123456"));
        assert_eq!(settings["mountpoint"], Value::from("0099"));
        assert_eq!(settings["port"].as_u64(), Some(2101));
    }

    #[test]
    fn other_set_updates_one_key() {
        let (_dir, mut sys) = setup();
        let out = sys
            .execute(&Command::OtherSet {
                values: vec![("cmdvel_scaler_node.left_rate".into(), "0.8".into())],
            })
            .unwrap();
        assert_eq!(out, "updated 1 parameter(s)");
        let shown = sys.execute(&Command::OtherShow { format: None }).unwrap();
        assert!(shown.contains("cmdvel_scaler_node.left_rate: 0.8"));
        assert!(shown.contains("cmdvel_scaler_node.right_rate: 0.5"));
        assert!(shown.contains("kt_server_client_node.client_secret: ********"));
    }

    #[test]
    fn other_set_rejects_undotted_key() {
        let (_dir, mut sys) = setup();
        let err = sys
            .execute(&Command::OtherSet {
                values: vec![("left_rate".into(), "0.8".into())],
            })
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidKey(_)));
    }

    #[test]
    fn other_set_rejects_unknown_parameter() {
        let (_dir, mut sys) = setup();
        let err = sys
            .execute(&Command::OtherSet {
                values: vec![("cmdvel_scaler_node.boost".into(), "1".into())],
            })
            .unwrap_err();
        assert!(matches!(err, SettingsError::UnknownParameter { .. }));
    }

    #[test]
    fn schema_listing_shows_bounds() {
        let (_dir, mut sys) = setup();
        let out = sys.execute(&Command::Schema).unwrap();
        assert!(out.contains("cmdvel_scaler_node.left_rate"));
        assert!(out.contains("number 0..=1 step 0.01"));
        assert!(out.contains("text (required, secret)"));
    }

    #[test]
    fn help_dispatches() {
        let (_dir, mut sys) = setup();
        let out = sys.execute(&Command::Help { topic: None }).unwrap();
        assert!(out.starts_with("mowset"));
    }

    #[test]
    fn from_config_file_reads_yaml() {
        let (dir, _) = setup();
        let cfg = dir.path().join("settings.yaml");
        fs::write(
            &cfg,
            format!("mowbot_legacy_data_path: {}\n", dir.path().display()),
        )
        .unwrap();
        let sys = Sys::from_config_file(&cfg).unwrap();
        assert_eq!(sys.registry().config().mowbot_legacy_data_path, dir.path());
    }

    #[test]
    fn ntrip_set_succeeds_with_numeric_stored_password() {
        let (dir, mut sys) = setup();
        fs::write(
            dir.path().join("ntrip_client_params.yaml"),
            "/**:\n  ntrip_client:\n    ros__parameters:\n      username: u1\n      password: 123456\n",
        )
        .unwrap();
        sys.execute(&Command::NtripSet {
            values: vec![("username".into(), "u2".into())],
        })
        .unwrap();
        let settings = sys.registry.ntrip_mut().sync().unwrap();
        assert_eq!(settings["username"], Value::from("u2"));
        assert_eq!(settings["password"].as_i64(), Some(123456));
    }
}
