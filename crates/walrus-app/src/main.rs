//! Workshop Walrus binary, the composition root.
//!
//! `serve` runs the relay in front of the OpenAI chat-completions API.
//! `ask` and `chat` run a client session against a relay and render the
//! interpreted result in the terminal.

mod cli;
mod commands;
mod render;

use std::path::{Path, PathBuf};

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use walrus_core::config::{RelayConfig, API_KEY_ENV};
use walrus_core::{Credentials, WalrusConfig};
use walrus_relay::{start_server, AppState};
use walrus_session::{RelayClient, SessionController, SubmitOutcome, SystemClipboard};

use crate::cli::{CliArgs, Command};
use crate::commands::{parse_command, SessionCommand, HELP_TEXT};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> AppResult<()> {
    // A missing .env file is normal.
    let dotenv = dotenvy::dotenv();

    let args = CliArgs::parse();
    let config_path = args.resolve_config_path();
    let loaded = WalrusConfig::load_with_fallback(&config_path.path, config_path.explicit);
    let mut config = loaded
        .as_ref()
        .map(|(config, _)| config.clone())
        .unwrap_or_default();
    config.apply_env();
    args.apply_overrides(&mut config);

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let path = config_path.path.display();
    match loaded {
        Ok((_, None)) => tracing::info!(path = %path, "Configuration loaded"),
        Ok((_, Some(e))) if e.is_not_found() => {
            tracing::debug!(path = %path, "No config file, using defaults")
        }
        Ok((_, Some(e))) => {
            tracing::warn!(path = %path, error = %e, "Failed to load config, using defaults")
        }
        Err(e) => {
            tracing::error!(error = %e, "Refusing to start");
            return Err(e.into());
        }
    }
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    match args.command {
        Command::Serve { .. } => run_serve(config).await,
        Command::Ask {
            prompt, csv, copy, ..
        } => run_ask(config, prompt, csv.as_deref(), copy).await,
        Command::Chat { .. } => run_chat(config).await,
    }
}

/// Start the relay. Refuses to bind without an API key.
async fn run_serve(config: WalrusConfig) -> AppResult<()> {
    serve_with(config, |key| std::env::var(key).ok()).await
}

async fn serve_with<F>(config: WalrusConfig, lookup: F) -> AppResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let state = prepare_relay(&config.relay, lookup)?;
    start_server(&config.relay, state).await?;
    Ok(())
}

/// Resolve the credential and build the relay state. Binds nothing.
fn prepare_relay<F>(relay: &RelayConfig, lookup: F) -> AppResult<AppState>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = match Credentials::from_lookup(lookup) {
        Ok(credentials) => {
            tracing::info!("OpenAI API key loaded: yes");
            credentials
        }
        Err(e) => {
            tracing::error!(error = %e, "OpenAI API key loaded: no");
            return Err(format!("{} must be set to run the relay", API_KEY_ENV).into());
        }
    };

    tracing::info!(
        model = %relay.model,
        upstream = %relay.upstream_url,
        "Relay configured"
    );

    Ok(AppState::from_config(relay, credentials)?)
}

/// One-shot session: submit, render, then run the requested exports.
async fn run_ask(
    config: WalrusConfig,
    prompt: String,
    csv_dir: Option<&Path>,
    copy: bool,
) -> AppResult<()> {
    let session = SessionController::new(RelayClient::new(&config.client)?, prompt);

    eprintln!("{}", render::LOADING);
    submit_and_render(&session).await;

    if let Some(dir) = csv_dir {
        export_csv(&session, dir);
    }
    if copy {
        copy_activities(&session);
    }
    Ok(())
}

/// Interactive session on a line editor pre-filled with the current prompt.
async fn run_chat(config: WalrusConfig) -> AppResult<()> {
    let session = SessionController::new(
        RelayClient::new(&config.client)?,
        config.client.default_prompt.clone(),
    );
    let export_dir = PathBuf::from(&config.client.export_dir);

    let mut rl = DefaultEditor::new()?;

    println!("{}\n", render::header());
    println!("Type :help for commands.\n");

    loop {
        let current = session.prompt();
        let line = match rl.readline_with_initial("walrus> ", (current.as_str(), "")) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                tracing::error!(error = %e, "Readline error");
                break;
            }
        };

        match parse_command(&line) {
            SessionCommand::Submit(prompt) => {
                if !prompt.trim().is_empty() {
                    if let Err(e) = rl.add_history_entry(prompt.as_str()) {
                        tracing::debug!(error = %e, "Failed to record history entry");
                    }
                }
                session.set_prompt(prompt);
                println!("{}", render::LOADING);
                submit_and_render(&session).await;
            }
            SessionCommand::Show => match session.result() {
                Some(result) => println!("{}", render::render_result(&result)),
                None => println!("Nothing to show yet."),
            },
            SessionCommand::Copy => copy_activities(&session),
            SessionCommand::Csv(dir) => {
                export_csv(&session, dir.as_deref().unwrap_or(&export_dir));
            }
            SessionCommand::Move { from, to } => match session.move_activity(from, to) {
                Ok(()) => {
                    if let Some(result) = session.result() {
                        println!("{}", render::render_result(&result));
                    }
                }
                Err(e) => println!("{}", e),
            },
            SessionCommand::Help => println!("{}", HELP_TEXT),
            SessionCommand::Quit => break,
            SessionCommand::Invalid(message) => println!("{}", message),
        }
    }

    println!("Goodbye!");
    Ok(())
}

async fn submit_and_render(session: &SessionController<RelayClient>) {
    match session.submit().await {
        SubmitOutcome::Applied(result) => println!("{}", render::render_result(&result)),
        SubmitOutcome::Superseded => tracing::debug!("Response superseded by a newer submission"),
    }
}

fn export_csv(session: &SessionController<RelayClient>, dir: &Path) {
    match session.export_csv(dir) {
        Ok(path) => println!("Saved {}", path.display()),
        Err(e) => println!("CSV export failed: {}", e),
    }
}

fn copy_activities(session: &SessionController<RelayClient>) {
    match session.copy_to_clipboard(&SystemClipboard) {
        Ok(()) => println!("Activities copied to clipboard!"),
        Err(e) => println!("Failed to copy activities: {}", e),
    }
}
