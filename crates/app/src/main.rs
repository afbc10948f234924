use std::fmt;
use std::io::Write;

use quiz_core::model::{Country, CountryCode, GameMode, GameStatus};
use services::config::parse_codes;
use services::{AnswerOutcome, AppServices, Clock, PoolState, QuizConfig, SessionController};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidMode { raw: String },
    InvalidDbUrl { raw: String },
    EmptyCustomSelection,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidMode { raw } => write!(f, "invalid --mode value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::EmptyCustomSelection => {
                write!(f, "--mode custom needs --codes with at least one country code")
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play  [--mode <mode>] [--region <region>] [--codes <A,B,..>]");
    eprintln!("                            [--db <sqlite_url>] [--countries-url <url>]");
    eprintln!("  cargo run -p app -- reset [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Modes: learning (default), survival, capital, custom");
    eprintln!();
    eprintln!("In game: type an answer, or :skip :reveal :status :reset :menu");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  GEO_QUIZ_DB_URL, GEO_QUIZ_COUNTRIES_URL, GEO_QUIZ_LOCALE,");
    eprintln!("  GEO_QUIZ_EXTRA_CODES, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

struct Args {
    config: QuizConfig,
    mode: GameMode,
    region: Option<String>,
    codes: Vec<CountryCode>,
}

impl Args {
    fn parse(
        cmd: Command,
        args: &mut impl Iterator<Item = String>,
        mut config: QuizConfig,
    ) -> Result<Self, ArgsError> {
        config.db_url = normalize_sqlite_url(config.db_url);
        let mut mode = GameMode::default();
        let mut region = None;
        let mut codes = Vec::new();

        while let Some(arg) = args.next() {
            match (cmd, arg.as_str()) {
                (_, "--db") => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    config.db_url = normalize_sqlite_url(value);
                }
                (Command::Play, "--mode") => {
                    let value = require_value(args, "--mode")?;
                    mode = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidMode { raw: value.clone() })?;
                }
                (Command::Play, "--region") => {
                    region = Some(require_value(args, "--region")?);
                }
                (Command::Play, "--codes") => {
                    codes = parse_codes(&require_value(args, "--codes")?);
                }
                (Command::Play, "--countries-url") => {
                    config.catalog.base_url = require_value(args, "--countries-url")?;
                }
                (_, "--help" | "-h") => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if mode == GameMode::Custom && codes.is_empty() {
            return Err(ArgsError::EmptyCustomSelection);
        }

        Ok(Self {
            config,
            mode,
            region,
            codes,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
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
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
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

//
// ─── TERMINAL ──────────────────────────────────────────────────────────────────
//

struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// `None` on end of input.
    async fn prompt(&mut self, text: &str) -> std::io::Result<Option<String>> {
        print!("{text}");
        std::io::stdout().flush()?;
        self.lines.next_line().await
    }

    async fn confirm(&mut self, question: &str) -> std::io::Result<bool> {
        let answer = self.prompt(&format!("{question} [y/N] ")).await?;
        Ok(answer.is_some_and(|a| matches!(a.trim(), "y" | "Y" | "yes" | "oui")))
    }
}

fn question_for(mode: GameMode, country: &Country) -> String {
    match mode {
        GameMode::Capital => format!("Capital of {}? ", country.display_name()),
        GameMode::Learning | GameMode::Survival | GameMode::Custom => {
            let flag = country
                .flag_alt()
                .or(country.flag_url())
                .unwrap_or("(no flag available)");
            format!("Flag: {flag}\nCountry? ")
        }
    }
}

fn print_status(quiz: &SessionController) {
    let view = quiz.view();
    let mode = view.mode.map_or("-", GameMode::as_str);
    let region = view.region.as_deref().unwrap_or("all regions");
    println!(
        "[{mode} | {region}] score {}/{} ({}%), visited {} ({}%), known overall {}",
        view.progress.score,
        view.progress.total,
        view.progress.progress_percent,
        view.progress.visited_count,
        view.progress.visited_percent,
        view.known_count,
    );
}

fn print_summary(quiz: &SessionController) {
    match quiz.last_summary() {
        Some(summary) => println!(
            "Finished {}: {}/{} in {}s.",
            summary.mode,
            summary.score,
            summary.total,
            summary.duration().num_seconds()
        ),
        None => print_status(quiz),
    }
}

async fn load_pool(
    services: &mut AppServices,
    console: &mut Console,
) -> std::io::Result<bool> {
    loop {
        match services.load_pool().await {
            PoolState::Ready(pool) => {
                println!("{} countries loaded.", pool.len());
                return Ok(true);
            }
            PoolState::Failed { message } => {
                eprintln!("could not load countries: {message}");
            }
            PoolState::NotLoaded => {}
        }
        if !console.confirm("Retry?").await? {
            return Ok(false);
        }
        tracing::info!("retrying country pool load");
    }
}

async fn play_loop(
    quiz: &mut SessionController,
    console: &mut Console,
) -> std::io::Result<()> {
    while let (Some(mode), Some(current)) = (quiz.mode(), quiz.current().cloned()) {
        let Some(line) = console.prompt(&question_for(mode, &current)).await? else {
            break;
        };

        match line.trim() {
            ":menu" => {
                quiz.return_to_menu();
                break;
            }
            ":skip" => {
                if let Some(skipped) = quiz.skip().await {
                    println!("Skipped: {}", skipped.display_name());
                }
            }
            ":reveal" => match quiz.reveal() {
                Some(answer) => println!("Answer: {answer}"),
                None => println!("Nothing to reveal."),
            },
            ":status" => print_status(quiz),
            ":reset" => {
                if console.confirm("Erase all saved progress?").await? {
                    quiz.reset_progress().await;
                    println!("Progress erased.");
                }
            }
            guess => match quiz.submit_answer(guess).await {
                AnswerOutcome::Correct { country, .. } => {
                    println!("Correct: {}!", country.display_name());
                }
                AnswerOutcome::Incorrect => println!("Incorrect, try again."),
                AnswerOutcome::Ignored => {}
            },
        }
    }

    if quiz.status() == GameStatus::Finished {
        print_summary(quiz);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
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
    let parsed = Args::parse(cmd, &mut iter, QuizConfig::from_env()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    tracing::debug!(db = %parsed.config.db_url, command = ?cmd, "opening storage");
    prepare_sqlite_file(&parsed.config.db_url)?;
    let mut services = AppServices::new_sqlite(&parsed.config, Clock::system()).await?;
    let mut console = Console::new();

    match cmd {
        Command::Reset => {
            if console.confirm("Erase all saved progress?").await? {
                services.reset_progress().await?;
                println!("Progress erased.");
            }
            Ok(())
        }
        Command::Play => {
            if !load_pool(&mut services, &mut console).await? {
                return Ok(());
            }
            let mut quiz = services.session_controller().await?;
            if parsed.mode == GameMode::Custom {
                quiz.set_custom_selection(parsed.codes)?;
            }
            quiz.start_game(parsed.mode, parsed.region.as_deref()).await;
            play_loop(&mut quiz, &mut console).await?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
