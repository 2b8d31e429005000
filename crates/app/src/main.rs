use std::sync::Arc;
use std::time::Duration;

use services::{Clock, QuestionService, QuizLoopService};
use storage::repository::{CorpusSource, Storage};
use storage::{DirectoryCorpus, RemoteConfig, SqliteCorpus};
use tracing_subscriber::EnvFilter;

mod args;
mod play;

use args::{Args, ArgsError, Command, SourceKind, print_usage};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn open_storage(args: &Args) -> Result<Storage, Box<dyn std::error::Error>> {
    match args.source {
        SourceKind::Dir => Ok(Storage::directory(&args.corpus_dir)),
        SourceKind::Remote => {
            let base_url = args.remote_url.clone().ok_or(ArgsError::MissingRemoteUrl)?;
            let mut config = RemoteConfig::new(base_url, args.collection.clone());
            if let Some(key) = &args.api_key {
                config = config.with_api_key(key.clone());
            }
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()?;
            Ok(Storage::remote(client, config))
        }
        SourceKind::Sqlite => {
            prepare_sqlite_file(&args.db_url)?;
            Ok(Storage::sqlite(&args.db_url).await?)
        }
    }
}

fn question_service(args: &Args, storage: &Storage) -> QuestionService {
    let service = QuestionService::new(Arc::clone(&storage.corpus)).with_target(args.count);
    match args.seed {
        Some(seed) => service.with_seed(seed),
        None => service,
    }
}

/// Print one batch the way the generation endpoint returns it.
async fn print_questions(service: &QuestionService) -> Result<(), Box<dyn std::error::Error>> {
    match service.respond().await {
        Ok(questions) => {
            println!("{}", serde_json::to_string_pretty(&questions)?);
            Ok(())
        }
        Err(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            Err(format!("question generation failed with status {}", body.status).into())
        }
    }
}

/// Replace the database corpus with the contents of the quote directory.
async fn seed(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    prepare_sqlite_file(&args.db_url)?;
    let db = SqliteCorpus::connect(&args.db_url).await?;
    db.migrate().await?;

    let entries = DirectoryCorpus::new(&args.corpus_dir).fetch_corpus().await?;
    let cleared = db.replace_all(&entries).await?;

    tracing::info!(
        dir = %args.corpus_dir.display(),
        db = %args.db_url,
        cleared,
        imported = entries.len(),
        "seeded corpus"
    );
    println!(
        "Imported {} movies from {} into {}.",
        entries.len(),
        args.corpus_dir.display(),
        args.db_url
    );
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = match Args::parse(std::env::args().skip(1), |key| std::env::var(key).ok()) {
        Ok(args) => args,
        Err(ArgsError::HelpRequested) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    init_tracing();

    match args.command {
        Command::Seed => seed(&args).await,
        Command::Questions => {
            let storage = open_storage(&args).await?;
            print_questions(&question_service(&args, &storage)).await
        }
        Command::Play => {
            let storage = open_storage(&args).await?;
            let questions = Arc::new(question_service(&args, &storage));
            let quiz = QuizLoopService::new(Clock::default_clock(), questions);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            play::run(&quiz, stdin, &mut std::io::stdout()).await?;
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
