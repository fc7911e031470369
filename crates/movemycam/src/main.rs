//! Binary entrypoint for MoveMyCam.
use std::{
    io,
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use camera::onvif::OnvifApi;
use clap::{Parser, Subcommand};
use config::ConfigStore;
use movemycam_engine::{Engine, EngineOptions, RdevHook};
use tracing::{error, info};

/// Line-oriented control loop on stdin.
mod console;

use crate::console::{Console, ConsoleNotifier};

#[derive(Parser, Debug)]
#[command(
    name = "movemycam",
    about = "Move PTZ cameras to presets with global hotkeys",
    version
)]
/// Command-line interface for the `movemycam` binary.
struct Cli {
    /// Optional subcommand.
    #[command(subcommand)]
    command: Option<Command>,

    /// Start listening for hotkeys immediately
    #[arg(short = 'a', long)]
    auto_activate: bool,

    /// Path to the configuration file (defaults to ./MoveMyCam.conf)
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load and validate the configuration then exit.
    Check {
        /// Path to configuration file to check
        path: Option<PathBuf>,
    },
}

fn open_store(path: Option<PathBuf>) -> Result<ConfigStore, config::Error> {
    match path {
        Some(p) => ConfigStore::new(p),
        None => Ok(ConfigStore::with_default_path()),
    }
}

fn check(path: Option<PathBuf>) -> ExitCode {
    let mut store = match open_store(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e.pretty());
            return ExitCode::FAILURE;
        }
    };
    match store.load() {
        Ok(true) => {
            let doc = store.document();
            println!(
                "{}: {} camera(s), {} armed, log level {}",
                store.path().display(),
                doc.cameras.len(),
                doc.armed().count(),
                doc.log_level
            );
            ExitCode::SUCCESS
        }
        Ok(false) => {
            eprintln!("{}: configuration not loaded", store.path().display());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}: {}", store.path().display(), e.pretty());
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log = logging::init(&cli.log.spec());
    if cli.log.is_explicit() {
        log.pin();
    }

    if let Some(Command::Check { path }) = cli.command {
        return check(path.or(cli.config));
    }

    let mut store = match open_store(cli.config) {
        Ok(s) => s.with_log_handle(log),
        Err(e) => {
            eprintln!("{}", e.pretty());
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = store.load() {
        error!(error = %e.pretty(), "Configuration file not loaded!");
        eprintln!("{}", e.pretty());
    }
    let store = store.shared();

    let engine = match Engine::new(
        store.clone(),
        Arc::new(RdevHook::new()),
        Arc::new(OnvifApi::new()),
        EngineOptions::default(),
    ) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    engine.set_notifier(Arc::new(ConsoleNotifier));

    let mut console = Console::new(&engine, store, io::stdin().lock(), io::stdout());
    info!("movemycam_ready");
    let result = if cli.auto_activate {
        console.activate().and_then(|()| console.run())
    } else {
        console.run()
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "console_failed");
            ExitCode::FAILURE
        }
    }
}
