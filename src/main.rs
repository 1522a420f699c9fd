mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{demo_actions, Cli};
use colored::*;
use console_menu::{CrosstermTerminal, MenuEngine, StreamTerminal, Terminal};
use std::io::{self, IsTerminal};
use std::path::Path;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initializes logging to `log_file`, or to stderr when none is given.
///
/// Stdout is the menu itself, so log lines never go there. The returned guard
/// must be held until exit to flush buffered file output.
fn init_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::from_default_env();

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
        return Ok(None);
    };

    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("log file path '{}' has no file name", path.display()))?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_file().as_deref())?;
    let config = cli.menu_config();

    // Raw keystrokes need a real terminal; piped input is read as a byte stream.
    let terminal: Box<dyn Terminal> = if io::stdin().is_terminal() {
        info!("Using interactive terminal");
        Box::new(CrosstermTerminal::new())
    } else {
        info!("Stdin is not a terminal, reading input as a stream");
        Box::new(StreamTerminal::new(io::stdin().lock(), io::stdout()))
    };

    let mut engine = match MenuEngine::with_config(config, demo_actions(), terminal) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to build menu: {:?}", e);
            println!("{} {}", "Error:".red(), e.to_string().red());
            return Err(e.into());
        },
    };

    if let Err(e) = engine.run() {
        error!("Menu terminated: {:?}", e);
        println!("{} {}", "Error:".red(), e.to_string().red());
        return Err(e.into());
    }

    Ok(())
}
