use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Check,
    Import,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Check(CheckArgs),
    Import(ImportArgs),
}

#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub lenient: bool,
    pub sql: Option<String>,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ImportArgs {
    pub config: PathBuf,
    pub database: Option<String>,
    pub prefix: Option<String>,
    pub log: bool,
    pub files: Vec<PathBuf>,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "check" => parse_check(it.map(|s| s.as_str())),
        "import" => parse_import(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

fn parse_check<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut lenient = false;
    let mut sql: Option<String> = None;
    let mut files: Vec<PathBuf> = Vec::new();

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Check)),
            "--lenient" => lenient = true,
            "--sql" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--sql requires a value");
                };
                sql = Some(v.to_string());
            }
            _ if token.starts_with("--sql=") => {
                sql = Some(token.trim_start_matches("--sql=").to_string());
            }
            other if other.starts_with('-') => anyhow::bail!("unknown argument: {other}"),
            other => files.push(PathBuf::from(other)),
        }
    }

    if sql.is_some() && !files.is_empty() {
        anyhow::bail!("--sql cannot be combined with files");
    }

    Ok(Command::Check(CheckArgs {
        lenient,
        sql,
        files,
    }))
}

fn parse_import<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from("dbal.toml");
    let mut database: Option<String> = None;
    let mut prefix: Option<String> = None;
    let mut log = false;
    let mut files: Vec<PathBuf> = Vec::new();

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Import)),
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            "--database" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--database requires a value");
                };
                database = Some(v.to_string());
            }
            _ if token.starts_with("--database=") => {
                database = Some(token.trim_start_matches("--database=").to_string());
            }
            "--prefix" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--prefix requires a value");
                };
                prefix = Some(v.to_string());
            }
            _ if token.starts_with("--prefix=") => {
                prefix = Some(token.trim_start_matches("--prefix=").to_string());
            }
            "--log" => log = true,
            other if other.starts_with('-') => anyhow::bail!("unknown argument: {other}"),
            other => files.push(PathBuf::from(other)),
        }
    }

    if files.is_empty() {
        anyhow::bail!("missing script: expected `dbal import <FILE>...`");
    }

    Ok(Command::Import(ImportArgs {
        config,
        database,
        prefix,
        log,
        files,
    }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
dbal - guard checks and script import for dbal

USAGE:
  dbal <COMMAND> [OPTIONS]

COMMANDS:
  check         Run the validation guard over SQL text
  import        Run a `;`-delimited SQL script against a database
  help          Print this help

Run `dbal <command> --help` for more."
            );
        }
        HelpTopic::Check => {
            println!(
                "\
USAGE:
  dbal check [OPTIONS] [FILE]...

Splits each input into statements and runs the guard over every one.
Reads stdin when no FILE and no --sql is given.

OPTIONS:
  --sql <TEXT>          Check TEXT instead of files
  --lenient             Use the lenient guard (quote-then-comment only)
  -h, --help            Print help"
            );
        }
        HelpTopic::Import => {
            println!(
                "\
USAGE:
  dbal import [OPTIONS] <FILE>...

Runs each script through the import path: `#__` is replaced with the
table prefix, and each statement is executed under the lenient guard.
Stops at the first failing statement.

OPTIONS:
  --config <FILE>       Config file path (default: dbal.toml)
  --database <PATH>     Override database.database from config
  --prefix <PREFIX>     Override database.table_prefix from config
  --log                 Print the query log summary and slow queries
  -h, --help            Print help"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("dbal")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn no_args_prints_root_help() {
        let cmd = parse_args(&args(&[])).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::Root)));
    }

    #[test]
    fn parse_check_with_files() {
        let cmd = parse_args(&args(&["check", "--lenient", "a.sql", "b.sql"])).unwrap();
        let Command::Check(check) = cmd else {
            panic!("expected check");
        };
        assert!(check.lenient);
        assert!(check.sql.is_none());
        assert_eq!(
            check.files,
            vec![PathBuf::from("a.sql"), PathBuf::from("b.sql")]
        );
    }

    #[test]
    fn parse_check_inline_sql() {
        let cmd = parse_args(&args(&["check", "--sql=SELECT 1"])).unwrap();
        let Command::Check(check) = cmd else {
            panic!("expected check");
        };
        assert!(!check.lenient);
        assert_eq!(check.sql.as_deref(), Some("SELECT 1"));
    }

    #[test]
    fn check_rejects_sql_with_files() {
        let err = parse_args(&args(&["check", "--sql", "SELECT 1", "a.sql"])).unwrap_err();
        assert!(err.to_string().contains("--sql"));
    }

    #[test]
    fn parse_import_overrides() {
        let cmd = parse_args(&args(&[
            "import",
            "--config",
            "conf/dbal.toml",
            "--database=app.db",
            "--prefix",
            "cms_",
            "--log",
            "schema.sql",
        ]))
        .unwrap();
        let Command::Import(import) = cmd else {
            panic!("expected import");
        };
        assert_eq!(import.config, PathBuf::from("conf/dbal.toml"));
        assert_eq!(import.database.as_deref(), Some("app.db"));
        assert_eq!(import.prefix.as_deref(), Some("cms_"));
        assert!(import.log);
        assert_eq!(import.files, vec![PathBuf::from("schema.sql")]);
    }

    #[test]
    fn import_requires_a_script() {
        assert!(parse_args(&args(&["import", "--log"])).is_err());
    }

    #[test]
    fn subcommand_help() {
        let cmd = parse_args(&args(&["import", "--help"])).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::Import)));
        let cmd = parse_args(&args(&["check", "-h"])).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::Check)));
    }

    #[test]
    fn unknown_argument_fails() {
        assert!(parse_args(&args(&["check", "--strict"])).is_err());
        assert!(parse_args(&args(&["migrate"])).is_err());
    }
}
