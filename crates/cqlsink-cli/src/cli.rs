use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Write,
    Check,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Write(WriteArgs),
    Check(CheckArgs),
}

#[derive(Debug, Clone)]
pub struct WriteArgs {
    pub config: PathBuf,
    /// NDJSON input; stdin when `None`.
    pub input: Option<PathBuf>,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub config: PathBuf,
    pub connect: bool,
}

const DEFAULT_CONFIG: &str = "cqlsink.toml";

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help(HelpTopic::Root)),
        "write" => parse_write(it.map(|s| s.as_str())),
        "check" => parse_check(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

fn parse_write<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut input: Option<PathBuf> = None;
    let mut dry_run = false;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Write)),
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            "--dry-run" => dry_run = true,
            // conventional spelling for stdin
            "-" if input.is_none() => {}
            other if other.starts_with('-') => anyhow::bail!("unknown argument: {other}"),
            other => {
                if input.is_some() {
                    anyhow::bail!("only one input file is accepted, got extra {other}");
                }
                input = Some(PathBuf::from(other));
            }
        }
    }

    Ok(Command::Write(WriteArgs {
        config,
        input,
        dry_run,
    }))
}

fn parse_check<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut connect = false;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Check)),
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            "--connect" => connect = true,
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Check(CheckArgs { config, connect }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
cqlsink - write change-data-capture records to Cassandra/ScyllaDB

USAGE:
  cqlsink <COMMAND> [OPTIONS]

COMMANDS:
  write         Write NDJSON change records to the configured table
  check         Validate the config file

Run `cqlsink <command> --help` for more."
            );
        }
        HelpTopic::Write => {
            println!(
                "\
USAGE:
  cqlsink write [OPTIONS] [FILE]

NOTES:
  - Reads one JSON change record per line from FILE, or stdin if omitted.
  - Stops at the first failing record and reports its position.

OPTIONS:
  --config <FILE>       Config file path (default: cqlsink.toml)
  --dry-run             Print statements as JSON instead of executing them
  -h, --help            Print help"
            );
        }
        HelpTopic::Check => {
            println!(
                "\
USAGE:
  cqlsink check [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: cqlsink.toml)
  --connect             Also open a session to the cluster
  -h, --help            Print help"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_write_with_file() {
        let cmd = parse_args(&args(&[
            "cqlsink",
            "write",
            "--config",
            "prod.toml",
            "--dry-run",
            "records.ndjson",
        ]))
        .unwrap();
        let Command::Write(w) = cmd else {
            panic!("expected write");
        };

        assert_eq!(w.config, PathBuf::from("prod.toml"));
        assert!(w.dry_run);
        assert_eq!(w.input, Some(PathBuf::from("records.ndjson")));
    }

    #[test]
    fn parse_write_defaults_to_stdin() {
        let cmd = parse_args(&args(&["cqlsink", "write", "--config=a.toml", "-"])).unwrap();
        let Command::Write(w) = cmd else {
            panic!("expected write");
        };
        assert_eq!(w.config, PathBuf::from("a.toml"));
        assert_eq!(w.input, None);
        assert!(!w.dry_run);
    }

    #[test]
    fn parse_check_and_help() {
        let Command::Check(c) = parse_args(&args(&["cqlsink", "check", "--connect"])).unwrap() else {
            panic!("expected check");
        };
        assert_eq!(c.config, PathBuf::from(DEFAULT_CONFIG));
        assert!(c.connect);

        assert!(matches!(
            parse_args(&args(&["cqlsink"])).unwrap(),
            Command::Help(HelpTopic::Root)
        ));
        assert!(matches!(
            parse_args(&args(&["cqlsink", "write", "--help"])).unwrap(),
            Command::Help(HelpTopic::Write)
        ));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!(parse_args(&args(&["cqlsink", "migrate"])).is_err());
        assert!(parse_args(&args(&["cqlsink", "write", "--verbose"])).is_err());
        assert!(parse_args(&args(&["cqlsink", "write", "a", "b"])).is_err());
        assert!(parse_args(&args(&["cqlsink", "check", "--config"])).is_err());
    }
}
