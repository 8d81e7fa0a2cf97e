use std::io::Write as _;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use updraft::provider;
use updraft::state::{ConfigManager, UpdateController, UpdateState, UpdaterSettings};
use updraft::{SystemShell, UpdateInfo};

#[derive(Parser)]
#[command(name = "updraft")]
#[command(about = "Check for, download and stage application updates", long_about = None)]
struct Cli {
    /// Version of the application being updated
    #[arg(long, default_value = env!("CARGO_PKG_VERSION"))]
    current_version: String,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Check whether a newer release exists
    Check {
        /// Show the notification again even if it was dismissed
        #[arg(long)]
        reset: bool,
    },
    /// Download and install the latest release (opens the release page on manual-only platforms)
    Update,
    /// Open the release page in the browser
    ReleasePage,
    /// Keep running and re-check periodically
    Watch,
    /// Print the effective updater settings
    Config,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = load_settings();

    if let Some(Commands::Config) = cli.command {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    tokio::runtime::Builder::new_current_thread().enable_all().build()?.block_on(run(cli, settings))
}

fn load_settings() -> UpdaterSettings {
    ConfigManager::new()
        .and_then(|manager| manager.load_settings())
        .unwrap_or_else(|e| {
            log::warn!("Failed to load updater settings, using defaults: {e:#}");
            UpdaterSettings::default()
        })
        .with_env_overrides()
}

async fn run(cli: Cli, settings: UpdaterSettings) -> Result<()> {
    let controller =
        UpdateController::with_disabled_provider(settings.clone(), Arc::new(SystemShell));

    let service = provider::resolve(&settings, &cli.current_version).await;
    controller.install_provider(Arc::new(service));

    let announce = matches!(cli.command, Some(Commands::Watch));
    let renderer = tokio::spawn(render(controller.subscribe(), announce));

    match cli.command.unwrap_or(Commands::Check { reset: false }) {
        Commands::Check { reset } => match controller.check_for_update(reset).await {
            Some(update) => print_update(&update),
            None => println!("You're on the latest version."),
        },
        Commands::Update => {
            if controller.check_for_update(true).await.is_some() {
                let installed = controller.download_and_install_update().await;
                print_outcome(installed, controller.settings());
            } else {
                println!("No update available.");
            }
        }
        Commands::ReleasePage => controller.open_release_page().await,
        Commands::Watch => controller.run_periodic_checks().await,
        Commands::Config => {}
    }

    renderer.abort();
    Ok(())
}

fn print_update(update: &UpdateInfo) {
    println!("New version {} available", update.version);
    if let Some(notes) = &update.notes {
        println!("\n{notes}\n");
    }
    if let Some(url) = &update.release_url {
        println!("Release notes: {url}");
    }
}

fn print_outcome(installed: bool, settings: &UpdaterSettings) {
    if installed {
        println!("\nUpdate downloaded. Restart the app to finish.");
    } else if !settings.manual_only {
        println!("\nDownload stopped.");
    }
}

/// Minimal terminal presenter: redraws whenever the snapshot changes.
///
/// With `announce`, newly found updates are printed as they arrive.
async fn render(mut rx: watch::Receiver<UpdateState>, announce: bool) {
    let mut last_pct = None;
    let mut notified = false;

    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();

        if announce
            && state.should_notify()
            && !notified
            && let Some(update) = &state.update_info
        {
            print_update(update);
        }
        notified = state.should_notify();

        if state.is_downloading && state.total_bytes > 0 {
            let pct = state.progress_pct();
            if last_pct != Some(pct) {
                last_pct = Some(pct);
                print!("\rDownloading... {pct:>3}%");
                let _ = std::io::stdout().flush();
            }
        } else {
            last_pct = None;
        }
    }
}
