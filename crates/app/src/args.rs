use std::fmt;
use std::path::PathBuf;

use quiz_core::MAX_QUESTIONS;

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    HelpRequested,
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidSource { raw: String },
    InvalidCount { raw: String },
    InvalidSeed { raw: String },
    InvalidDbUrl { raw: String },
    MissingRemoteUrl,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::HelpRequested => write!(f, "help requested"),
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidSource { raw } => {
                write!(f, "invalid --source value (expected dir, remote or sqlite): {raw}")
            }
            ArgsError::InvalidCount { raw } => {
                write!(f, "invalid --count / QUIZ_QUESTION_COUNT value: {raw}")
            }
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed / QUIZ_SEED value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::MissingRemoteUrl => {
                write!(f, "--source remote requires --remote-url or QUIZ_REMOTE_URL")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    Questions,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "questions" => Some(Self::Questions),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

/// Where the corpus is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Dir,
    Remote,
    Sqlite,
}

impl SourceKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dir" | "directory" => Some(Self::Dir),
            "remote" => Some(Self::Remote),
            "sqlite" | "db" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub source: SourceKind,
    pub corpus_dir: PathBuf,
    pub remote_url: Option<String>,
    pub collection: String,
    pub api_key: Option<String>,
    pub db_url: String,
    pub count: usize,
    pub seed: Option<u64>,
}

impl Args {
    /// Parse `argv` (without the program name). `env` looks up `QUIZ_*` defaults.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut args = argv.into_iter().peekable();

        // Default behavior: play when no subcommand is provided.
        let command = match args.peek().map(String::as_str) {
            None => Command::Play,
            Some(first) if first.starts_with('-') => Command::Play,
            Some(first) => {
                let command = Command::from_arg(first)
                    .ok_or_else(|| ArgsError::UnknownCommand(first.to_string()))?;
                args.next();
                command
            }
        };

        let mut source = match env("QUIZ_SOURCE") {
            Some(raw) => SourceKind::parse(&raw).ok_or(ArgsError::InvalidSource { raw })?,
            None => SourceKind::Dir,
        };
        let mut corpus_dir =
            PathBuf::from(env("QUIZ_CORPUS_DIR").unwrap_or_else(|| "subtitles".into()));
        let mut remote_url = env("QUIZ_REMOTE_URL").filter(|url| !url.trim().is_empty());
        let mut collection = env("QUIZ_REMOTE_COLLECTION").unwrap_or_else(|| "movies".into());
        let api_key = env("QUIZ_REMOTE_API_KEY").filter(|key| !key.trim().is_empty());
        let mut db_url = env("QUIZ_DB_URL").map_or_else(
            || "sqlite://quiz.sqlite3".into(),
            normalize_sqlite_url,
        );
        let mut count = match env("QUIZ_QUESTION_COUNT") {
            Some(raw) => parse_count(raw)?,
            None => MAX_QUESTIONS,
        };
        let mut seed = env("QUIZ_SEED").map(parse_seed).transpose()?;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--source" => {
                    let value = require_value(&mut args, "--source")?;
                    source =
                        SourceKind::parse(&value).ok_or(ArgsError::InvalidSource { raw: value })?;
                }
                "--dir" => corpus_dir = PathBuf::from(require_value(&mut args, "--dir")?),
                "--remote-url" => remote_url = Some(require_value(&mut args, "--remote-url")?),
                "--collection" => collection = require_value(&mut args, "--collection")?,
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--count" => count = parse_count(require_value(&mut args, "--count")?)?,
                "--seed" => seed = Some(parse_seed(require_value(&mut args, "--seed")?)?),
                "--help" | "-h" => return Err(ArgsError::HelpRequested),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if source == SourceKind::Remote && command != Command::Seed && remote_url.is_none() {
            return Err(ArgsError::MissingRemoteUrl);
        }

        Ok(Self {
            command,
            source,
            corpus_dir,
            remote_url,
            collection,
            api_key,
            db_url,
            count,
            seed,
        })
    }
}

fn parse_count(raw: String) -> Result<usize, ArgsError> {
    raw.trim().parse().map_err(|_| ArgsError::InvalidCount { raw })
}

fn parse_seed(raw: String) -> Result<u64, ArgsError> {
    raw.trim().parse().map_err(|_| ArgsError::InvalidSeed { raw })
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quote-quiz [play]   [--source dir|remote|sqlite] [options]");
    eprintln!("  quote-quiz questions [--source dir|remote|sqlite] [options]  # print one batch as JSON");
    eprintln!("  quote-quiz seed     [--dir <path>] [--db <sqlite_url>]      # import a directory into SQLite");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --dir <path>          quote files directory (default: subtitles)");
    eprintln!("  --remote-url <url>    remote store base URL");
    eprintln!("  --collection <name>   remote collection (default: movies)");
    eprintln!("  --db <sqlite_url>     database (default: sqlite://quiz.sqlite3)");
    eprintln!("  --count <n>           questions per game (default and maximum: {MAX_QUESTIONS})");
    eprintln!("  --seed <n>            deterministic question order");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_SOURCE, QUIZ_CORPUS_DIR, QUIZ_REMOTE_URL, QUIZ_REMOTE_COLLECTION,");
    eprintln!("  QUIZ_REMOTE_API_KEY, QUIZ_DB_URL, QUIZ_QUESTION_COUNT, QUIZ_SEED, RUST_LOG");
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(argv: &[&str], env: &[(&str, &str)]) -> Result<Args, ArgsError> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Args::parse(argv.iter().map(|s| (*s).to_string()), |key| env.get(key).cloned())
    }

    #[test]
    fn defaults_to_play_from_directory() {
        let args = parse(&[], &[]).unwrap();
        assert_eq!(args.command, Command::Play);
        assert_eq!(args.source, SourceKind::Dir);
        assert_eq!(args.corpus_dir, PathBuf::from("subtitles"));
        assert_eq!(args.collection, "movies");
        assert_eq!(args.db_url, "sqlite://quiz.sqlite3");
        assert_eq!(args.count, MAX_QUESTIONS);
        assert_eq!(args.seed, None);
    }

    #[test]
    fn flags_override_environment() {
        let args = parse(
            &["questions", "--dir", "quotes", "--count", "3", "--seed", "42"],
            &[("QUIZ_CORPUS_DIR", "elsewhere"), ("QUIZ_QUESTION_COUNT", "7")],
        )
        .unwrap();
        assert_eq!(args.command, Command::Questions);
        assert_eq!(args.corpus_dir, PathBuf::from("quotes"));
        assert_eq!(args.count, 3);
        assert_eq!(args.seed, Some(42));
    }

    #[test]
    fn remote_source_needs_a_url() {
        assert_eq!(
            parse(&["--source", "remote"], &[]).unwrap_err(),
            ArgsError::MissingRemoteUrl
        );

        let args = parse(
            &["--source", "remote", "--collection", "classics"],
            &[("QUIZ_REMOTE_URL", "http://localhost:9000"), ("QUIZ_REMOTE_API_KEY", "k")],
        )
        .unwrap();
        assert_eq!(args.remote_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(args.collection, "classics");
        assert_eq!(args.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse(&["--count"], &[]).unwrap_err(),
            ArgsError::MissingValue { flag: "--count" }
        );
        assert_eq!(
            parse(&["--count", "ten"], &[]).unwrap_err(),
            ArgsError::InvalidCount { raw: "ten".into() }
        );
        assert_eq!(
            parse(&["--source", "ftp"], &[]).unwrap_err(),
            ArgsError::InvalidSource { raw: "ftp".into() }
        );
        assert_eq!(
            parse(&["launch"], &[]).unwrap_err(),
            ArgsError::UnknownCommand("launch".into())
        );
        assert_eq!(
            parse(&["play", "--verbose"], &[]).unwrap_err(),
            ArgsError::UnknownArg("--verbose".into())
        );
        assert_eq!(parse(&["-h"], &[]).unwrap_err(), ArgsError::HelpRequested);
    }

    #[test]
    fn bad_environment_numbers_are_reported() {
        assert_eq!(
            parse(&[], &[("QUIZ_QUESTION_COUNT", "lots")]).unwrap_err(),
            ArgsError::InvalidCount { raw: "lots".into() }
        );
        assert_eq!(
            parse(&[], &[("QUIZ_SEED", "-1")]).unwrap_err(),
            ArgsError::InvalidSeed { raw: "-1".into() }
        );

        let args = parse(&[], &[("QUIZ_QUESTION_COUNT", "4"), ("QUIZ_SEED", "9")]).unwrap();
        assert_eq!((args.count, args.seed), (4, Some(9)));
    }

    #[test]
    fn sqlite_urls_pass_through() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/quiz.db".into()),
            "sqlite:///tmp/quiz.db"
        );
        assert_eq!(normalize_sqlite_url("/tmp/quiz.db".into()), "sqlite:///tmp/quiz.db");
    }
}
