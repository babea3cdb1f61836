use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::config::{parse_amount, parse_category, parse_difficulty, parse_timeout};
use services::{Clock, ConfigError, OpenTdbProvider, QuestionKind, QuizConfig, QuizLoopService};
use ui::{App, UiApp, build_app_context};

mod terminal;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    Invalid { flag: &'static str, source: ConfigError },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::Invalid { flag, source } => write!(f, "invalid {flag} value: {source}"),
        }
    }
}

impl std::error::Error for ArgsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArgsError::Invalid { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn invalid(flag: &'static str) -> impl FnOnce(ConfigError) -> ArgsError {
    move |source| ArgsError::Invalid { flag, source }
}

struct DesktopApp {
    quiz_loop: Arc<QuizLoopService>,
}

impl UiApp for DesktopApp {
    fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui   [options]   # desktop window (default)");
    eprintln!("  cargo run -p app -- play [options]   # quiz in the terminal");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --amount <n>          questions per quiz, 1-50 (default: 5)");
    eprintln!("  --api-url <url>       trivia api base url (default: https://opentdb.com)");
    eprintln!("  --category <id>       trivia category id");
    eprintln!("  --difficulty <level>  easy | medium | hard");
    eprintln!("  --type <kind>         multiple | boolean");
    eprintln!("  --timeout-secs <n>    request timeout (default: 10)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_API_URL, QUIZ_AMOUNT, QUIZ_CATEGORY, QUIZ_DIFFICULTY,");
    eprintln!("  QUIZ_QUESTION_TYPE, QUIZ_TIMEOUT_SECS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Play,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "play" => Some(Self::Play),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Parsed {
    Run(QuizConfig),
    Help,
}

/// Overlay command-line flags on `config` (already carrying env overrides).
fn parse_flags(
    args: &mut impl Iterator<Item = String>,
    mut config: QuizConfig,
) -> Result<Parsed, ArgsError> {
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--amount" => {
                let value = require_value(args, "--amount")?;
                config.amount = parse_amount(&value).map_err(invalid("--amount"))?;
            }
            "--api-url" => {
                let value = require_value(args, "--api-url")?;
                if value.trim().is_empty() {
                    return Err(invalid("--api-url")(ConfigError::EmptyApiUrl));
                }
                config.api.base_url = value.trim().to_string();
            }
            "--category" => {
                let value = require_value(args, "--category")?;
                config.api.category = Some(parse_category(&value).map_err(invalid("--category"))?);
            }
            "--difficulty" => {
                let value = require_value(args, "--difficulty")?;
                config.api.difficulty =
                    Some(parse_difficulty(&value).map_err(invalid("--difficulty"))?);
            }
            "--type" => {
                let value = require_value(args, "--type")?;
                config.api.kind = Some(value.parse::<QuestionKind>().map_err(invalid("--type"))?);
            }
            "--timeout-secs" => {
                let value = require_value(args, "--timeout-secs")?;
                config.api.timeout = parse_timeout(&value).map_err(invalid("--timeout-secs"))?;
            }
            "--help" | "-h" => return Ok(Parsed::Help),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }

    Ok(Parsed::Run(config))
}

fn build_quiz_loop(config: &QuizConfig) -> Result<Arc<QuizLoopService>, Box<dyn std::error::Error>> {
    let provider = OpenTdbProvider::new(config.api.clone())?;
    Ok(Arc::new(
        QuizLoopService::new(Clock::system(), Arc::new(provider)).with_amount(config.amount),
    ))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Launching the desktop UI is the default when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some(first) if first.starts_with('-') => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with('-') {
        argv.remove(0);
    }

    let config = match parse_flags(&mut argv.into_iter(), QuizConfig::from_env()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })? {
        Parsed::Run(config) => config,
        Parsed::Help => {
            print_usage();
            return Ok(());
        }
    };

    log::info!(
        "quiz config: {} questions from {}",
        config.amount,
        config.api.base_url
    );
    let quiz_loop = build_quiz_loop(&config)?;

    match cmd {
        Command::Ui => {
            let app: Arc<dyn UiApp> = Arc::new(DesktopApp { quiz_loop });
            let context = build_app_context(&app);

            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Quiz App")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Play => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            terminal::play(&quiz_loop, &mut stdin.lock(), &mut stdout.lock()).await?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
