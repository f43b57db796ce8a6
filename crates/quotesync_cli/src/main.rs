//! Command-line presentation adapter.
//!
//! # Responsibility
//! - Translate user intents (show, add, filter, import, export, sync) into
//!   core service calls.
//! - Render quotes and sync notices to the terminal.

use clap::{Parser, Subcommand};
use quotesync_core::{
    init_logging, open_service, AppConfig, HttpRemoteSource, Quote, ReconcileWorker, Reconciler,
    SyncNotice, SyncObserver,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "quotesync", version, about = "Local-first quote collection with server sync")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, default_value = "quotesync.toml")]
    config: PathBuf,
    /// Overrides `data_dir` from the config file.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show a random quote from the current filter.
    Show,
    /// Add a quote and send it to the server.
    Add {
        text: String,
        category: String,
        /// Skip the best-effort server push.
        #[arg(long)]
        offline: bool,
    },
    /// List quotes, optionally for one category.
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// List known categories.
    Categories,
    /// Select the persisted category filter (`all` clears it).
    Filter { category: String },
    /// Write every quote to a JSON file.
    Export { path: PathBuf },
    /// Append every quote from a JSON file.
    Import { path: PathBuf },
    /// Pull once from the server.
    Sync,
    /// Keep pulling on the configured interval.
    Watch {
        /// Stop after this many seconds.
        #[arg(long, default_value_t = 60)]
        seconds: u64,
    },
}

struct TerminalObserver;

impl SyncObserver for TerminalObserver {
    fn notify(&self, notice: SyncNotice) {
        eprintln!("[sync] {notice}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = AppConfig::load_from(&cli.config)?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    config.data_dir = absolute(&config.data_dir)?;
    std::fs::create_dir_all(&config.data_dir)?;
    init_logging(&config.log_level, config.data_dir.join("logs"))?;

    let mut service = open_service(config.db_path())?;
    let reconciler = Reconciler::new(
        Arc::new(HttpRemoteSource::from_config(&config.sync)?),
        Arc::new(TerminalObserver),
    )
    .with_server_category(config.sync.server_category.clone())
    .with_batch_limit(config.sync.batch_limit);

    match cli.command.unwrap_or(Commands::Show) {
        Commands::Show => {
            print_previous(service.restore_last_shown());
            match service.show_random(&mut rand::thread_rng()) {
                Some(quote) => print_quote(&quote),
                None => println!(
                    "No quotes available for category `{}`.",
                    service.current_filter()
                ),
            }
        }
        Commands::Add {
            text,
            category,
            offline,
        } => {
            let quote = service.add_quote(text, category)?;
            println!("Added quote to `{}`.", quote.category());
            if !offline {
                match reconciler.push(&quote) {
                    Ok(()) => println!("Sent to server."),
                    Err(_) => println!("Kept locally; server push failed."),
                }
            }
        }
        Commands::List { category } => {
            let quotes = match category {
                Some(category) => service.filtered(&category),
                None => service.visible_quotes(),
            };
            for quote in &quotes {
                print_quote(quote);
            }
            if quotes.is_empty() {
                println!("No quotes.");
            }
        }
        Commands::Categories => {
            for category in service.categories() {
                let marker = if category == service.current_filter() {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {category}");
            }
        }
        Commands::Filter { category } => {
            service.set_filter(&category)?;
            println!("Filter set to `{}`.", service.current_filter());
        }
        Commands::Export { path } => {
            service.export_file(&path)?;
            println!("Exported {} quotes to {}.", service.len(), path.display());
        }
        Commands::Import { path } => {
            let imported = service.import_file(&path)?;
            println!("Imported {imported} quotes.");
        }
        Commands::Sync => {
            let service = Mutex::new(service);
            let added = reconciler.pull_once(&service)?;
            if added == 0 {
                println!("Already up to date.");
            }
        }
        Commands::Watch { seconds } => {
            print_previous(service.restore_last_shown());
            if let Some(quote) = service.show_random(&mut rand::thread_rng()) {
                print_quote(&quote);
            }
            let service = Arc::new(Mutex::new(service));
            let worker =
                ReconcileWorker::spawn(reconciler, service.clone(), config.sync.interval());
            thread::sleep(Duration::from_secs(seconds));
            let stats = worker.stop();
            let service = service.lock().unwrap_or_else(PoisonError::into_inner);
            let total = service.len();
            println!(
                "Stopped after {} pulls ({} failed); {} quotes merged, {} total.",
                stats.pulls, stats.pull_failures, stats.quotes_merged, total
            );
        }
    }

    Ok(())
}

fn print_previous(previous: Option<Quote>) {
    if let Some(quote) = previous {
        println!("Previously shown this session:");
        print_quote(&quote);
    }
}

fn print_quote(quote: &Quote) {
    println!("\"{}\"\n  - Category: {}", quote.text(), quote.category());
}

fn absolute(path: &Path) -> CliResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}
