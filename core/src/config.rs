//! Application configuration: where the parameter documents live.
//!
//! ```yaml
//! mowbot_legacy_data_path: /home/mowbot/data
//! ntrip_params_file: ntrip_client_params.yaml
//! cmdvel_scaler_params_file: cmdvel_scaler_params.yaml
//! kt_server_bridge_params_file: kt_server_bridge_params.yaml
//! ```
//!
//! Only the base directory is required; file names fall back to the
//! defaults shown above.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SettingsError};
use crate::settings::other::{CMDVEL_SCALER_SUBSYSTEM, KT_SERVER_SUBSYSTEM};
use crate::store::DocumentMap;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base directory holding every parameter document.
    pub mowbot_legacy_data_path: PathBuf,

    #[serde(default = "default_ntrip_file")]
    pub ntrip_params_file: String,

    #[serde(default = "default_cmdvel_file")]
    pub cmdvel_scaler_params_file: String,

    #[serde(default = "default_kt_file")]
    pub kt_server_bridge_params_file: String,
}


fn default_ntrip_file() -> String {
    "ntrip_client_params.yaml".into()
}

fn default_cmdvel_file() -> String {
    "cmdvel_scaler_params.yaml".into()
}

fn default_kt_file() -> String {
    "kt_server_bridge_params.yaml".into()
}


impl AppConfig {
    /// Config rooted at `data_dir` with default file names.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        AppConfig {
            mowbot_legacy_data_path: data_dir.into(),
            ntrip_params_file: default_ntrip_file(),
            cmdvel_scaler_params_file: default_cmdvel_file(),
            kt_server_bridge_params_file: default_kt_file(),
        }
    }

    pub fn ntrip_document(&self) -> PathBuf {
        self.mowbot_legacy_data_path.join(&self.ntrip_params_file)
    }

    pub fn other_documents(&self) -> DocumentMap {
        let base = &self.mowbot_legacy_data_path;
        let mut docs = DocumentMap::new();
        docs.insert(
            CMDVEL_SCALER_SUBSYSTEM.to_string(),
            base.join(&self.cmdvel_scaler_params_file),
        );
        docs.insert(
            KT_SERVER_SUBSYSTEM.to_string(),
            base.join(&self.kt_server_bridge_params_file),
        );
        docs
    }
}


/// Load an `AppConfig` from a YAML file.
pub fn load(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SettingsError::Config(format!("cannot read '{}': {}", path.display(), e)))?;
    parse(&content)
}


/// Parse an `AppConfig` from a YAML string.
pub fn parse(content: &str) -> Result<AppConfig> {
    let config: AppConfig = serde_yaml::from_str(content)
        .map_err(|e| SettingsError::Config(format!("invalid settings config: {}", e)))?;
    if config.mowbot_legacy_data_path.as_os_str().is_empty() {
        return Err(SettingsError::Config(
            "mowbot_legacy_data_path must not be empty".into(),
        ));
    }
    Ok(config)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let yaml = r#"
mowbot_legacy_data_path: /data/mowbot
ntrip_params_file: ntrip.yaml
cmdvel_scaler_params_file: cmdvel.yaml
kt_server_bridge_params_file: kt.yaml
"#;
        let cfg = parse(yaml).unwrap();
        assert_eq!(cfg.mowbot_legacy_data_path, PathBuf::from("/data/mowbot"));
        assert_eq!(cfg.ntrip_document(), PathBuf::from("/data/mowbot/ntrip.yaml"));
        let other = cfg.other_documents();
        assert_eq!(other[CMDVEL_SCALER_SUBSYSTEM], PathBuf::from("/data/mowbot/cmdvel.yaml"));
        assert_eq!(other[KT_SERVER_SUBSYSTEM], PathBuf::from("/data/mowbot/kt.yaml"));
    }

    #[test]
    fn parse_minimal_config_uses_default_names() {
        let cfg = parse("mowbot_legacy_data_path: /srv/data\n").unwrap();
        assert_eq!(cfg, AppConfig::with_data_dir("/srv/data"));
        assert_eq!(
            cfg.ntrip_document(),
            PathBuf::from("/srv/data/ntrip_client_params.yaml")
        );
    }

    #[test]
    fn parse_missing_base_dir_fails() {
        let err = parse("ntrip_params_file: x.yaml\n").unwrap_err();
        assert!(err.to_string().contains("invalid settings config"));
    }

    #[test]
    fn parse_empty_base_dir_fails() {
        assert!(parse("mowbot_legacy_data_path: \"\"\n").is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "mowbot_legacy_data_path: /opt/mowbot\n").unwrap();
        let cfg = load(&path).unwrap();
        assert_eq!(cfg.mowbot_legacy_data_path, PathBuf::from("/opt/mowbot"));
    }

    #[test]
    fn load_missing_file_errors() {
        let result = load(Path::new("/tmp/nonexistent_mowbot_settings_xyz.yaml"));
        assert!(result.unwrap_err().to_string().contains("cannot read"));
    }
}
