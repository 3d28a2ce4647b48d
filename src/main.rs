#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing::{Level as TraceLevel, info, warn};
use tracing_subscriber::FmtSubscriber;

use carddav_sync_console::config::{ConsoleSettings, GroupMappingEntry, parse_value};
use carddav_sync_console::constants::keys::{DISPLAY_ORDER, GROUP_MAPPING};
use carddav_sync_console::constants::settings::LOG_LEVEL_ENV;
use carddav_sync_console::{Console, Gateway, HttpGateway, NotificationKind, StatusSnapshot};

#[derive(Debug, Parser)]
#[command(name = "carddav-sync-console", version, about = "Inspect and configure a CardDAV sync backend")]
struct Cli {
    /// Backend base URL (overrides the settings file)
    #[arg(long, global = true)]
    gateway_url: Option<String>,

    /// Settings file to use instead of the default location
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the last sync run
    Status {
        /// Keep refreshing every 5 seconds until Ctrl-C
        #[arg(long)]
        watch: bool,
    },
    /// Start a sync run
    Sync,
    /// Show or change backend settings
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Edit group mappings (changes are saved immediately)
    #[command(subcommand)]
    Mapping(MappingCommand),
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the current configuration
    Show,
    /// Stage one or more KEY VALUE pairs and save them together
    Set {
        #[arg(required = true, num_args = 2.., value_name = "KEY VALUE")]
        pairs: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
enum MappingCommand {
    /// List group mappings with their index
    List,
    /// Add a mapping
    Add { check_group: String, reference_group: String },
    /// Replace the mapping at INDEX
    Set {
        index: usize,
        check_group: String,
        reference_group: String,
    },
    /// Remove the mapping at INDEX
    Remove { index: usize },
}

fn init_logging(settings: &ConsoleSettings) -> Result<()> {
    let log_level = match std::env::var(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| settings.log_level.clone())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn print_status(snapshot: &StatusSnapshot) {
    println!("{}: {}", snapshot.status.badge(), snapshot.description());
    if !snapshot.last_run.is_empty() {
        println!("  last run: {}", snapshot.last_run);
    }
}

fn print_mappings(entries: &[GroupMappingEntry]) {
    if entries.is_empty() {
        println!("(no group mappings)");
        return;
    }
    for (index, entry) in entries.iter().enumerate() {
        println!("{index:>3}  {} -> {}", entry.check_group, entry.reference_group);
    }
}

fn print_config(console: &Console) -> bool {
    let Some(document) = console.mirror().document() else {
        return false;
    };
    for key in DISPLAY_ORDER {
        if let Some(value) = document.get(key) {
            println!("{key} = {value}");
        }
    }
    for (key, value) in document.iter() {
        if key != GROUP_MAPPING && !DISPLAY_ORDER.contains(&key) {
            println!("{key} = {value}");
        }
    }
    println!("{GROUP_MAPPING}:");
    print_mappings(console.mappings());
    true
}

/// Print whatever notification the last operation left behind
fn report(console: &Console) {
    if let Some(notification) = console.notifications().current() {
        match notification.kind {
            NotificationKind::Success => println!("{}", notification.message),
            NotificationKind::Failure => eprintln!("error: {}", notification.message),
        }
    }
}

async fn watch_status(console: &mut Console) {
    let poller = console.poller_mut();
    let mut updates = poller.subscribe();
    poller.set_auto_refresh(true);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(snapshot) = updates.borrow_and_update().clone() {
                    print_status(&snapshot);
                }
            }
        }
    }

    poller.set_auto_refresh(false);
    info!("Stopped watching status");
}

async fn run(console: &mut Console, command: Command, watch_by_default: bool) -> Result<bool> {
    let ok = match command {
        Command::Status { watch } => {
            let snapshot = console.poller().snapshot();
            if let Some(snapshot) = &snapshot {
                print_status(snapshot);
            }
            if watch || watch_by_default {
                watch_status(console).await;
                true
            } else {
                snapshot.is_some()
            }
        }
        Command::Sync => console.trigger_sync().await.is_ok(),
        Command::Config(ConfigCommand::Show) => print_config(console),
        Command::Config(ConfigCommand::Set { pairs }) => {
            if pairs.len() % 2 != 0 {
                bail!("config set expects KEY VALUE pairs, got {} arguments", pairs.len());
            }
            if console.mirror().document().is_none() {
                return Ok(false);
            }
            for pair in pairs.chunks_exact(2) {
                let value = parse_value(&pair[1])?;
                if !console.stage_setting(&pair[0], value) {
                    bail!("{GROUP_MAPPING} is edited with the mapping commands");
                }
            }
            console.save_settings().await.is_ok()
        }
        Command::Mapping(command) => {
            if console.mirror().document().is_none() {
                return Ok(false);
            }
            let result = match command {
                MappingCommand::List => Ok(()),
                MappingCommand::Add { check_group, reference_group } => {
                    console.add_mapping(GroupMappingEntry::new(check_group, reference_group)).await
                }
                MappingCommand::Set { index, check_group, reference_group } => {
                    if index >= console.mappings().len() {
                        bail!("no group mapping at index {index}");
                    }
                    console
                        .edit_mapping(index, GroupMappingEntry::new(check_group, reference_group))
                        .await
                }
                MappingCommand::Remove { index } => {
                    if index >= console.mappings().len() {
                        bail!("no group mapping at index {index}");
                    }
                    console.remove_mapping(index).await
                }
            };
            print_mappings(console.mappings());
            result.is_ok()
        }
    };
    Ok(ok)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => ConsoleSettings::load_from(path)?,
        None => ConsoleSettings::load()?,
    };
    if let Some(url) = cli.gateway_url {
        settings.gateway_url = url;
    }
    init_logging(&settings)?;

    info!(gateway = %settings.gateway_url, "Connecting to sync backend");
    let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::new(&settings.gateway_url, settings.request_timeout()));
    let mut console = Console::open(gateway).await;

    let ok = run(&mut console, cli.command, settings.auto_refresh).await?;
    report(&console);

    if ok {
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("Command did not complete");
        Ok(ExitCode::FAILURE)
    }
}
