use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use joinwatch::config::Config;
use joinwatch::domain::RegistrationEventKind;
use joinwatch::eventlog::{EventSource, WevtutilEventSource};
use joinwatch::probe::{ConnectivityProber, HickoryResolver, ProberConfig, SystemHostProber};
use joinwatch::report::{ConsoleReporter, Reporter, Transcript, write_marker};
use joinwatch::runner::{RegistrationWatcher, TokioSleeper, WatcherConfig};
use joinwatch::task::SchtasksTrigger;

mod cli;

use cli::Cli;
use cli::commands::Commands;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(env!("CARGO_PKG_NAME"))
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join(format!("{}.log", env!("CARGO_PKG_NAME")));

    // Setup env_logger with file output. The filter is wide open so the
    // configured level can still be raised once the config is loaded
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace"))
        .target(env_logger::Target::Pipe(target))
        .init();
    apply_log_level(Some("info"));

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Level to cap logging at; RUST_LOG wins over the config
fn effective_log_level(rust_log_set: bool, level: Option<&str>) -> Option<LevelFilter> {
    if rust_log_set {
        return None;
    }
    level.and_then(|level| level.trim().parse::<LevelFilter>().ok())
}

fn apply_log_level(level: Option<&str>) {
    let rust_log_set = std::env::var_os("RUST_LOG").is_some();
    match effective_log_level(rust_log_set, level) {
        Some(filter) => log::set_max_level(filter),
        None if !rust_log_set => {
            if let Some(level) = level {
                warn!("Ignoring unknown log level {:?}", level);
            }
        }
        None => {}
    }
}

fn build_prober(
    config: &Config,
    reporter: Arc<dyn Reporter>,
) -> ConnectivityProber<HickoryResolver, SystemHostProber> {
    ConnectivityProber::with_config(
        Arc::new(HickoryResolver::from_system_conf()),
        Arc::new(SystemHostProber::from_config(&config.probe)),
        reporter,
        ProberConfig::from(&config.probe),
    )
}

/// Run the watcher. The transcript lives for the whole run and is closed
/// when this function returns, before the process exits.
async fn run_watch(config: &Config) -> Result<i32> {
    let transcript = Arc::new(Transcript::open(&config.paths.transcript).context("Failed to open transcript")?);
    let reporter: Arc<dyn Reporter> = transcript.clone();

    if let Err(e) = write_marker(&config.paths.marker) {
        warn!("{}", e);
        reporter.line(&format!("Could not write marker file: {}", e));
    }

    let watcher = RegistrationWatcher::new(
        Arc::new(WevtutilEventSource::new(config.events.channel.clone())),
        Arc::new(build_prober(config, reporter.clone())),
        Arc::new(SchtasksTrigger::from_config(&config.task)),
        Arc::new(TokioSleeper),
        reporter.clone(),
        WatcherConfig::from(config),
    );

    let outcome = watcher.run().await;
    outcome.report(reporter.as_ref());
    info!(
        "Watch finished: {:?}, reboot required: {}, exit code {}",
        outcome,
        outcome.requires_reboot(),
        outcome.exit_code()
    );

    Ok(outcome.exit_code())
}

async fn run_probe(config: &Config) -> Result<i32> {
    let prober = build_prober(config, Arc::new(ConsoleReporter));
    let domain = &config.probe.domain;

    if prober.probe(domain, config.watch.exhaustive_probe).await {
        println!("{} {}", "Reachable:".green(), domain);
        Ok(0)
    } else {
        println!("{} {}", "Unreachable:".red(), domain);
        Ok(1)
    }
}

async fn run_events(config: &Config) -> Result<i32> {
    let source = WevtutilEventSource::new(config.events.channel.clone());
    println!("{} {}", "Channel:".cyan(), source.channel());

    for kind in RegistrationEventKind::ALL {
        match source.latest(kind).await {
            Ok(Some(event)) => {
                println!(
                    "{} {}",
                    kind.to_string().green(),
                    event.time_created.as_deref().unwrap_or("")
                );
                println!("  {}", event.message);
            }
            Ok(None) => println!("{} {}", kind.to_string().dimmed(), "not found".dimmed()),
            Err(e) => println!("{} {}", kind.to_string().red(), e),
        }
    }
    Ok(0)
}

fn run_application(cli: &Cli, config: &Config) -> Result<i32> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
        let effective = serde_yaml::to_string(config).context("Failed to render config")?;
        println!("{}", effective);
    }

    // Single-threaded: every probe, query and sleep runs in sequence
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    match &cli.command {
        None | Some(Commands::Watch { .. }) => runtime.block_on(run_watch(config)),
        Some(Commands::Probe { .. }) => runtime.block_on(run_probe(config)),
        Some(Commands::Events) => runtime.block_on(run_events(config)),
    }
}

fn try_main() -> Result<i32> {
    // Setup logging first so config load warnings are recorded
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration, then fold in overrides before validating
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(command) = &cli.command {
        command.apply_overrides(&mut config);
    }
    config.validate().context("Invalid configuration")?;
    apply_log_level(config.log_level.as_deref());

    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).context("Application failed")
}

fn main() {
    // Exit codes above 255 (3010) need process::exit; everything that must be
    // flushed is dropped inside try_main
    let code = match try_main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:?}", "Error:".red(), e);
            1
        }
    };
    std::process::exit(code);
}
