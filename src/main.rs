//! Terminal flashcards player.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml`.
//! - Pick a speech backend, restore the session, and load the deck.
//! - Feed stdin commands and Ctrl+C into the player runtime.

mod engines;
mod keys;
mod terminal;

use crate::keys::{HELP, Input, parse_line};
use crate::terminal::TerminalPresenter;
use anyhow::{Context, Result, anyhow};
use flashcards_core::config::{AppConfig, load_config};
use flashcards_core::deck::{deck_label, load_deck_file};
use flashcards_core::presenter::UnsupportedWakeLock;
use flashcards_core::{FileStore, PlayerError, PlayerEvent, PlayerHandle, PlayerRuntime};
use std::env;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const CONFIG_PATH_ENV: &str = "FLASHCARDS_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "conf/config.toml";

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let deck_path = parse_args()?;
    let config_path = env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = load_config(&config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        deck = %deck_path.display(),
        config = %config_path.display(),
        level = %config.log_level,
        backend = %config.speech_backend,
        "Starting flashcards player"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build the tokio runtime")?;
    let result = runtime.block_on(play(config, deck_path));
    // Stdin reads sit on a blocking thread that never finishes on its own.
    runtime.shutdown_background();
    result
}

async fn play(config: AppConfig, deck_path: PathBuf) -> Result<()> {
    let engine = engines::select_engine(&config).await;
    let store = FileStore::open(&config.session_path);
    let mut player = PlayerRuntime::new(
        &config,
        engine,
        Box::new(TerminalPresenter::new()),
        store,
        Box::new(UnsupportedWakeLock),
    );
    let handle = player.handle();

    match load_deck_file(&deck_path) {
        Ok((label, deck)) => {
            handle.send(PlayerEvent::DeckLoaded { label, deck });
        }
        Err(err) => {
            let reason = match err {
                PlayerError::DeckFormat(reason) => reason,
                other => other.to_string(),
            };
            handle.send(PlayerEvent::DeckRejected {
                label: deck_label(&deck_path),
                error: reason,
            });
        }
    }

    install_ctrlc(handle.clone());
    tokio::spawn(read_commands(handle, config.clone()));
    println!("Type `help` for commands.");

    player.run().await;
    Ok(())
}

fn install_ctrlc(handle: PlayerHandle) {
    if let Err(err) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C; saving session");
        handle.send(PlayerEvent::Unload);
    }) {
        warn!("Failed to install Ctrl+C signal handler: {err}");
    }
}

async fn read_commands(handle: PlayerHandle, config: AppConfig) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Stdin closed; keyboard controls disabled");
                return;
            }
            Err(err) => {
                warn!("Failed to read stdin: {err}");
                return;
            }
        };
        match parse_line(&line, &config) {
            Some(Input::Event(event)) => {
                if !handle.send(event) {
                    return;
                }
            }
            Some(Input::Quit) => {
                handle.send(PlayerEvent::Unload);
                return;
            }
            Some(Input::Help) => println!("{HELP}"),
            None => println!("Unknown command `{}`; type `help`.", line.trim()),
        }
    }
}

fn parse_args() -> Result<PathBuf> {
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| anyhow!("Usage: flashcards-player <deck.json>"))?;

    let path = PathBuf::from(path);
    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.as_path().display()));
    }
    Ok(path)
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    if env::var_os("RUST_LOG").is_some() {
        info!("RUST_LOG is set; ignoring configured log level");
        return;
    }
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
