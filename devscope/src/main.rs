// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Command-line interface for the devscope binary.
//!
//! `analyze` runs one query and prints the analysis as JSON. `interactive`
//! reads usernames from standard input, one per line. A new line cancels the
//! query still in flight, so only the latest answer is printed.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process,
    sync::Arc,
    time::Duration,
};

use clap::{ArgAction, Args, Parser, Subcommand};
use devscope::{Analysis, Analyzer, Error, QueryOutcome, Secrets, Settings, io_error, load_settings};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    task::{JoinError, JoinHandle},
};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Command line interface for analyzing GitHub profiles.
#[derive(Debug, Parser,)]
#[command(name = "devscope", version, about = "Analyze a GitHub profile and its repositories")]
struct Cli
{
    /// Optional YAML settings file.
    #[arg(long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf,>,

    /// GitHub API token.
    #[arg(long = "github-token", env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    github_token: Option<String,>,

    /// Gemini API key.
    #[arg(long = "gemini-api-key", env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    gemini_api_key: Option<String,>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
enum Command
{
    /// Analyze a single username and print the result.
    Analyze(AnalyzeArgs,),
    /// Read usernames from standard input; newer lines supersede older ones.
    Interactive(OutputArgs,),
}

#[derive(Debug, Args,)]
struct AnalyzeArgs
{
    /// GitHub username to analyze.
    #[arg(value_name = "USERNAME")]
    username: String,

    /// Do not request the skills list.
    #[arg(long = "no-skills", action = ArgAction::SetTrue)]
    no_skills: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args,)]
struct OutputArgs
{
    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    init_tracing();

    if let Err(error,) = run(Cli::parse(),).await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing()
{
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "devscope=info".into(),),)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr,),)
        .init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates configuration, fetch and serialization errors.
async fn run(cli: Cli,) -> Result<(), Error,>
{
    let secrets = Secrets::new(cli.github_token, cli.gemini_api_key,)?;
    let mut settings = resolve_settings(cli.config.as_deref(),)?;

    match cli.command {
        Command::Analyze(args,) => {
            if args.no_skills {
                settings.generation.skills = false;
            }
            let analyzer = Analyzer::connect(&secrets, &settings,)?;
            run_analyze(&analyzer, &args.username, args.output.pretty,).await
        }
        Command::Interactive(output,) => {
            let analyzer = Arc::new(Analyzer::connect(&secrets, &settings,)?,);
            run_interactive(analyzer, output.pretty,).await
        }
    }
}

fn resolve_settings(path: Option<&Path,>,) -> Result<Settings, Error,>
{
    match path {
        Some(path,) => load_settings(path,),
        None => Ok(Settings::default(),),
    }
}

async fn run_analyze(analyzer: &Analyzer, username: &str, pretty: bool,) -> Result<(), Error,>
{
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} [{elapsed_precise}] {msg}",)
            .expect("valid template",),
    );
    pb.enable_steady_tick(Duration::from_millis(100,),);
    pb.set_message(format!("Analyzing {}...", username.trim()),);

    let outcome = analyzer.analyze(username,).await;
    pb.finish_and_clear();

    match outcome? {
        QueryOutcome::Completed(analysis,) => print_analysis(&analysis, pretty,),
        QueryOutcome::Superseded {
            ..
        } => Ok((),),
    }
}

async fn run_interactive(analyzer: Arc<Analyzer,>, pretty: bool,) -> Result<(), Error,>
{
    info!("Reading usernames from standard input");
    let mut lines = BufReader::new(tokio::io::stdin(),).lines();
    let mut in_flight: Option<JoinHandle<(),>,> = None;

    while let Some(line,) =
        lines.next_line().await.map_err(|source| io_error(Path::new("<stdin>",), source,),)?
    {
        let username = line.trim().to_owned();
        if username.is_empty() {
            continue;
        }

        if let Some(previous,) = in_flight.take() {
            debug!("Cancelling previous query");
            previous.abort();
        }

        let analyzer = Arc::clone(&analyzer,);
        in_flight = Some(tokio::spawn(async move {
            let result = match analyzer.analyze(&username,).await {
                Ok(QueryOutcome::Completed(analysis,),) => print_analysis(&analysis, pretty,),
                Ok(QueryOutcome::Superseded {
                    ..
                },) => Ok((),),
                Err(error,) => Err(error,),
            };
            if let Err(error,) = result {
                eprintln!("{}", error.to_display_string());
            }
        },),);
    }

    if let Some(last,) = in_flight {
        report_join(last.await,);
    }

    Ok((),)
}

/// Surfaces a panicked query task; cancelled tasks are expected.
fn report_join(result: Result<(), JoinError,>,) -> bool
{
    match result {
        Err(error,) if error.is_panic() => {
            error!("Query task panicked: {}", error);
            eprintln!("query task panicked: {error}");
            true
        }
        _ => false,
    }
}

fn print_analysis(analysis: &Analysis, pretty: bool,) -> Result<(), Error,>
{
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    write_analysis(&mut handle, analysis, pretty,)?;
    writeln!(handle).map_err(|source| io_error(Path::new("<stdout>",), source,),)
}

fn write_analysis<W: io::Write,>(writer: &mut W, analysis: &Analysis, pretty: bool,) -> Result<(), Error,>
{
    if pretty {
        serde_json::to_writer_pretty(writer, analysis,)?;
    } else {
        serde_json::to_writer(writer, analysis,)?;
    }

    Ok((),)
}
