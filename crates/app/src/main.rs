use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use doriloop_core::model::{
    AttemptResult, Chapter, ChapterContent, ChapterId, QuestionAnswer, QuizBookDraft,
};
use services::{AppConfig, AppServices, Clock, QuestionRef};
use storage::JsonFileStore;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDataPath { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDataPath { raw } => write!(f, "invalid --data value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- stats [--data <path>]");
    eprintln!("  cargo run -p app -- seed  [--data <path>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --data doriloop.json");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DORILOOP_DATA, DORILOOP_BACKEND_URL, DORILOOP_LOOKUP_URL");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Stats,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "stats" => Some(Self::Stats),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

struct Args {
    data_path: PathBuf,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut data_path = std::env::var("DORILOOP_DATA")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from("doriloop.json"), PathBuf::from);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data" => {
                    let value = require_value(args, "--data")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDataPath { raw: value });
                    }
                    data_path = PathBuf::from(value);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { data_path })
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Stats,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Stats,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Compose everything here so core/services stay free of ambient state.
    let snapshots = Arc::new(JsonFileStore::new(parsed.data_path));
    let mut app = AppServices::new(snapshots, Clock::default_clock(), AppConfig::from_env()).await?;

    match cmd {
        Command::Stats => {
            let books = app.progress().list_quiz_books();
            if books.is_empty() {
                println!("no quiz books registered yet (try `seed`)");
                return Ok(());
            }
            for progress in books {
                println!(
                    "[{}] {} — round {}, {} chapters, {} questions, rate {}%",
                    progress.book.id(),
                    progress.book.title(),
                    progress.book.current_round(),
                    progress.book.chapter_count(),
                    progress.book.question_count(),
                    progress.current_rate,
                );
                for chapter in &progress.chapters {
                    println!(
                        "  ch{} {} — rate {}% ({} questions)",
                        chapter.number, chapter.title, chapter.rate, chapter.question_count
                    );
                }
            }
            Ok(())
        }
        Command::Seed => {
            let draft = sample_book();
            let store = app.progress_mut();
            let book_id = store.add_quiz_book(draft).await?;
            store
                .record_attempt(
                    QuestionRef {
                        book_id,
                        chapter_number: 1,
                        section_number: None,
                        question_number: 1,
                    },
                    AttemptResult::Correct,
                    1,
                )
                .await?;
            println!("seeded book {book_id} with one recorded attempt");
            Ok(())
        }
    }
}

fn sample_book() -> QuizBookDraft {
    let questions: Vec<QuestionAnswer> = (1..=5)
        .map(|n| QuestionAnswer::new(n, None).expect("valid question number"))
        .collect();
    let chapter = Chapter::new(
        ChapterId::new(1),
        "Getting Started",
        1,
        ChapterContent::WithoutSections(questions),
    )
    .expect("valid sample chapter");
    QuizBookDraft {
        title: "Sample Quiz Book".into(),
        category: Some("demo".into()),
        chapters: vec![chapter],
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
