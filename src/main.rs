//! hero-bot entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config, apply CLI flags, validate credentials
//!   3. Init logger once (CLI `-v` flags > env > config)
//!   4. Open the custom store, build the resolver and dispatcher
//!   5. Spawn Ctrl-C → shutdown watcher
//!   6. Run the chat channels until shutdown

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use hero_bot::commands::Dispatcher;
use hero_bot::error::AppError;
use hero_bot::resolve::Resolver;
use hero_bot::store::json_file::JsonFileStore;
use hero_bot::{comms, config, logger};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let mut config = config::load(args.config_path.as_deref())?;
    if args.interactive {
        config.comms.pty.enabled = true;
    }
    config.validate()?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(&config.log_level, args.log_level)?;

    info!(
        bot_name = %config.bot_name,
        data_dir = %config.data_dir.display(),
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        interactive = args.interactive,
        "config loaded"
    );

    let store_path = config.store_file.clone();
    let store = tokio::task::spawn_blocking(move || JsonFileStore::open(store_path))
        .await
        .map_err(|e| AppError::Store(format!("store open task failed: {e}")))??;

    let resolver = Resolver::from_config(&config, Arc::new(store))?;
    let dispatcher = Arc::new(Dispatcher::new(resolver, &config.commands));

    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let channels = comms::start(&config, dispatcher, shutdown.clone())?;
    channels.join().await?;
    shutdown.cancel();

    if args.interactive {
        use std::io::Write as _;
        println!("\nBye :) ...");
        let _ = std::io::stdout().flush();
    }

    Ok(())
}

// ── CLI ───────────────────────────────────────────────────────────────────────

struct CliArgs {
    log_level: Option<&'static str>,
    interactive: bool,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut interactive = false;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: hero-bot [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -i, --interactive          Enable the console channel");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Set logging verbosity");
                std::process::exit(0);
            }
            "-i" | "--interactive" => interactive = true,
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    //   -v → warn, -vv → info, -vvv → debug, -vvvv+ → trace
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs { log_level, interactive, config_path }
}
