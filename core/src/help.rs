//! Usage text for `mowset`.


/// Help for `topic`, or the overview when `None`.
pub fn help_text(topic: Option<&str>) -> String {
    match topic {
        None => overview(),
        Some("ntrip") => ntrip_help(),
        Some("other") => other_help(),
        Some("config") => config_help(),
        Some(t) => format!(
            "Unknown help topic: '{}'. Run 'mowset help' for a list of commands.",
            t
        ),
    }
}


fn overview() -> String {
    "\
mowset — mowbot settings

Usage: mowset [--config <path>] <command> [args...]

Commands:
  ntrip show [--json]              Show NTRIP client parameters
  ntrip set <name>=<value>...      Change NTRIP client parameters
  other show [--json]              Show motor scaling and KT server parameters
  other set <node.param>=<value>...  Change motor scaling / KT server parameters
  schema                           List declared parameters and their bounds
  help [ntrip|other|config]        Show help

Secrets are masked in 'show' output. Set RUST_LOG=info for progress logs."
        .to_string()
}


fn ntrip_help() -> String {
    "\
ntrip show [--json]
  Read the NTRIP client document and print each parameter.
  A missing document prints nothing and logs an error.

ntrip set <name>=<value>...
  Merge the given values onto the current parameters and rewrite the
  document. Username and password may not be empty.
  Example: mowset ntrip set username=rover password=secret"
        .to_string()
}


fn other_help() -> String {
    "\
other show [--json]
  Read the cmdvel scaler and KT server documents and print every
  parameter as <node>.<param>.

other set <node>.<param>=<value>...
  Update existing parameters only; unknown parameters are rejected.
  Rates are clamped to 0.0-1.0 in steps of 0.01, the report rate to
  0-10 Hz in whole steps.
  Example: mowset other set cmdvel_scaler_node.left_rate=0.8"
        .to_string()
}


fn config_help() -> String {
    "\
The config file is YAML:

  mowbot_legacy_data_path: /home/mowbot/data
  ntrip_params_file: ntrip_client_params.yaml
  cmdvel_scaler_params_file: cmdvel_scaler_params.yaml
  kt_server_bridge_params_file: kt_server_bridge_params.yaml

It is looked up from --config, then $MOWSET_CONFIG, then
$HOME/.config/mowbot/settings.yaml."
        .to_string()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_lists_commands() {
        let text = help_text(None);
        assert!(text.contains("ntrip show"));
        assert!(text.contains("other set"));
        assert!(text.contains("schema"));
    }

    #[test]
    fn topic_help() {
        assert!(help_text(Some("other")).contains("cmdvel_scaler_node.left_rate"));
        assert!(help_text(Some("config")).contains("MOWSET_CONFIG"));
    }

    #[test]
    fn unknown_topic() {
        assert!(help_text(Some("bogus")).starts_with("Unknown help topic"));
    }
}
