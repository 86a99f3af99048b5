use crate::command::{Command, Invocation};


/// Parse CLI arguments into an [`Invocation`].
///
/// Arguments are expected WITHOUT the program name. A leading
/// `--config <path>` is taken as a global flag; the next word selects
/// the command (`ntrip`, `other`, `schema`, `help`).
pub fn parse_args(args: &[&str]) -> Result<Invocation, String> {
    let mut rest = args;
    let mut config = None;

    while let Some(first) = rest.first() {
        match *first {
            "--config" | "-c" => {
                let path = rest
                    .get(1)
                    .ok_or_else(|| "Usage: mowset --config <path> <command>".to_string())?;
                config = Some(path.to_string());
                rest = &rest[2..];
            }
            _ => break,
        }
    }

    let command = parse_command(rest)?;
    Ok(Invocation { config, command })
}


fn parse_command(args: &[&str]) -> Result<Command, String> {
    if args.is_empty() {
        return Err("No command specified. Run 'mowset help' for usage.".into());
    }

    match args[0] {
        "help" | "--help" | "-h" => {
            let topic = args.get(1).map(|t| t.to_string());
            Ok(Command::Help { topic })
        }
        "ntrip" => parse_ntrip(args),
        "other" => parse_other(args),
        "schema" => Ok(Command::Schema),
        _ => Err(format!("Unknown command: '{}'", args[0])),
    }
}


// ---------------------------------------------------------------------------
// Sub-parsers
// ---------------------------------------------------------------------------

/// `mowset ntrip <show|set>`
fn parse_ntrip(args: &[&str]) -> Result<Command, String> {
    if args.len() < 2 {
        return Err("Usage: mowset ntrip <show|set>".into());
    }
    match args[1] {
        "show" => Ok(Command::NtripShow {
            format: parse_format(&args[2..]),
        }),
        "set" => {
            let values = parse_assignments(&args[2..], "mowset ntrip set <name>=<value>...")?;
            Ok(Command::NtripSet { values })
        }
        _ => Err(format!("Unknown ntrip subcommand: '{}'", args[1])),
    }
}


/// `mowset other <show|set>`
fn parse_other(args: &[&str]) -> Result<Command, String> {
    if args.len() < 2 {
        return Err("Usage: mowset other <show|set>".into());
    }
    match args[1] {
        "show" => Ok(Command::OtherShow {
            format: parse_format(&args[2..]),
        }),
        "set" => {
            let values =
                parse_assignments(&args[2..], "mowset other set <node>.<param>=<value>...")?;
            Ok(Command::OtherSet { values })
        }
        _ => Err(format!("Unknown other subcommand: '{}'", args[1])),
    }
}


fn parse_format(args: &[&str]) -> Option<String> {
    if args.contains(&"--json") {
        Some("json".into())
    } else {
        None
    }
}


/// Split `key=value` words. The value may itself contain `=`.
fn parse_assignments(args: &[&str], usage: &str) -> Result<Vec<(String, String)>, String> {
    if args.is_empty() {
        return Err(format!("Usage: {}", usage));
    }
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(format!("expected <key>=<value>, got '{}'", arg)),
        })
        .collect()
}
