//! `tabula` binary: run the HTTP service or ask a single question.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tabula::config::Settings;
use tabula_server::AppState;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Ask questions of uploaded tables through an LLM.
#[derive(Parser, Debug)]
#[command(name = "tabula")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// SQLite database path (overrides DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Model identifier (overrides MODEL_NAME)
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Address to listen on
        #[arg(long, env = "TABULA_BIND", default_value = "0.0.0.0:8000")]
        bind: SocketAddr,
    },
    /// Answer one question and exit
    Ask {
        /// The question
        question: String,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "tabula=info,tabula_server=info,tower_http=info",
        1 => "tabula=debug,tabula_server=debug,tower_http=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = Settings::from_env().context("loading configuration")?;
    if let Some(path) = cli.database {
        settings.database_path = path;
    }
    if let Some(model) = cli.model {
        settings.model = model;
    }
    settings.validate()?;
    tracing::debug!(?settings, "Configuration loaded");

    let state = AppState::from_settings(&settings).context("initialising services")?;

    match cli.command {
        Command::Serve { bind } => tabula_server::serve(state, bind).await?,
        Command::Ask { question } => ask(&state, &question).await?,
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn ask(state: &AppState, question: &str) -> anyhow::Result<()> {
    let outcome = state.analyst.chat(question, None).await?;
    for call in &outcome.function_calls {
        let ok = call.result["success"].as_bool().unwrap_or(false);
        println!("[{}] {} {}", if ok { "ok" } else { "error" }, call.function, call.arguments);
    }
    if !outcome.function_calls.is_empty() {
        println!();
    }
    println!("{}", outcome.answer);
    if outcome.exhausted {
        tracing::warn!(iterations = outcome.iterations, "Iteration budget exhausted");
    }
    Ok(())
}
