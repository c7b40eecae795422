use listener::error::ListenerError;
use listener::intake::{IntakeCommand, parse_line};
use listener::logger::{default_log_dir, initialize as LoggerInitialize};
use listener::settings::load_listener_config;

use common::ErrorLocation;
use listener_client::config::env::try_load_dotenv;
use listener_client::config::paths::detect_config_path;
use listener_client::{ControllerHandle, spawn_controller};

use std::fs::create_dir_all;
use std::panic::Location;
use std::path::Path;
use std::process::ExitCode;

use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tokio::signal::ctrl_c;
use tokio::spawn as TokioSpawn;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Logger may not be up yet
            eprintln!("{e}");
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ListenerError> {
    let log_dir = default_log_dir()?;
    create_dir_all(&log_dir).map_err(|e| ListenerError::App {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir)?;

    info!("Bitfocus listener starting");
    info!("Log directory: {}", log_dir.display());

    try_load_dotenv();

    let config_path = detect_config_path();
    info!(
        "Config path: {} ({:?})",
        config_path.path.display(),
        config_path.source
    );
    let config = load_listener_config(&config_path.path)?;

    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    TokioSpawn(async move {
        while let Some(update) = status_rx.recv().await {
            info!("Status: {update}");
        }
    });

    let handle = spawn_controller(config, status_tx);
    handle.start().map_err(|e| ListenerError::Core {
        message: format!("Failed to start controller: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let mut lines = BufReader::new(stdin()).lines();
    let interrupted = ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            _ = &mut interrupted => {
                info!("Interrupted");
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => match parse_line(&line) {
                    Ok(Some(IntakeCommand::Quit)) => break,
                    Ok(Some(command)) => dispatch(&handle, &config_path.path, command),
                    Ok(None) => {}
                    Err(e) => warn!("Skipping input: {e}"),
                },
                Ok(None) => {
                    info!("Input closed");
                    break;
                }
                Err(e) => {
                    error!("Failed to read input: {e}");
                    break;
                }
            },
        }
    }

    handle.shutdown().await.map_err(|e| ListenerError::Core {
        message: format!("Controller did not shut down cleanly: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    info!("Bitfocus listener stopped");
    Ok(())
}

fn dispatch(handle: &ControllerHandle, config_path: &Path, command: IntakeCommand) {
    let result = match command {
        IntakeCommand::Restart => {
            info!("Manual restart");
            handle.start()
        }
        IntakeCommand::Reload => match load_listener_config(config_path) {
            Ok(config) => {
                info!("Config reloaded from {}", config_path.display());
                handle.config_updated(config.connection)
            }
            Err(e) => {
                error!("Reload failed, keeping current config: {e}");
                Ok(())
            }
        },
        IntakeCommand::Send(command) => {
            handle.send_command(command);
            Ok(())
        }
        IntakeCommand::Quit => Ok(()),
    };

    if let Err(e) = result {
        error!("{e}");
    }
}
