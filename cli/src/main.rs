//! mowset: the command-line entry point for the mowbot settings core.
//!
//! # Usage
//!
//! ```text
//! mowset ntrip show
//! mowset ntrip set username=rover password=hunter2
//! mowset other show --json
//! mowset other set cmdvel_scaler_node.left_rate=0.8
//! mowset schema
//! ```

use std::path::PathBuf;
use std::process;

use log::debug;
use mowbot_settings_core::cli::parse_args;
use mowbot_settings_core::command::Command;
use mowbot_settings_core::help::help_text;
use mowbot_settings_core::sys::Sys;

const CONFIG_ENV: &str = "MOWSET_CONFIG";


fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    let invocation = match parse_args(&arg_refs) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("mowset: {}", e);
            process::exit(1);
        }
    };

    // Help never needs the documents, so it works before any config exists.
    if let Command::Help { topic } = &invocation.command {
        println!("{}", help_text(topic.as_deref()));
        return;
    }

    let config_path = resolve_config_path(invocation.config.as_deref());
    debug!("using settings config {}", config_path.display());

    let result = Sys::from_config_file(&config_path).and_then(|mut sys| sys.execute(&invocation.command));
    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("mowset: {}", e);
            process::exit(1);
        }
    }
}


fn resolve_config_path(flag: Option<&str>) -> PathBuf {
    config_path_from(
        flag,
        std::env::var(CONFIG_ENV).ok(),
        std::env::var("HOME").ok(),
    )
}


/// `--config` wins, then `$MOWSET_CONFIG`, then the per-user default.
fn config_path_from(flag: Option<&str>, env: Option<String>, home: Option<String>) -> PathBuf {
    if let Some(path) = flag {
        return PathBuf::from(path);
    }
    if let Some(path) = env.filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    let home = home.unwrap_or_else(|| "/tmp".into());
    PathBuf::from(home)
        .join(".config")
        .join("mowbot")
        .join("settings.yaml")
}


#[cfg(test)]
mod tests {
    use super::*;
    use mowbot_settings_core::config::AppConfig;

    #[test]
    fn config_path_default() {
        let path = config_path_from(None, None, Some("/home/op".into()));
        assert_eq!(path, PathBuf::from("/home/op/.config/mowbot/settings.yaml"));
    }

    #[test]
    fn config_path_from_env() {
        let path = config_path_from(None, Some("/etc/mowbot.yaml".into()), Some("/home/op".into()));
        assert_eq!(path, PathBuf::from("/etc/mowbot.yaml"));
    }

    #[test]
    fn config_path_flag_beats_env() {
        let path = config_path_from(Some("./local.yaml"), Some("/etc/mowbot.yaml".into()), None);
        assert_eq!(path, PathBuf::from("./local.yaml"));
    }

    #[test]
    fn config_path_empty_env_is_ignored() {
        let path = config_path_from(None, Some(String::new()), None);
        assert_eq!(path, PathBuf::from("/tmp/.config/mowbot/settings.yaml"));
    }

    #[test]
    fn execute_against_temp_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("cmdvel_scaler_params.yaml"),
            "/**:\n  cmdvel_scaler_node:\n    ros__parameters:\n      left_rate: 0.5\n      right_rate: 0.5\n",
        )
        .unwrap();
        let mut sys = Sys::new(AppConfig::with_data_dir(dir.path()));
        let out = sys.execute(&Command::Schema).unwrap();
        assert!(out.contains("kt_server_client_node.client_secret"));
    }
}
