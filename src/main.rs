//! # quick-release
//!
//! Command line front end for the Quick Release site list.
//!
//! ## Example
//!
//! ```bash
//! quick-release add Bilibili member.bilibili.com
//! quick-release webdav configure https://dav.example.com/dav alice --password secret
//! quick-release open-all
//! quick-release sync
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use quick_release::database;
use quick_release::error::AppError;
use quick_release::models::{Notification, SyncConfig};
use quick_release::services::{
    export_import_service, site_service, sync_service, ConfigStore, RestoreOutcome,
    SyncCoordinator, SyncSettingsHandle,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::mpsc;
use webdav_sync::{HttpTransport, WebDavSyncClient};

/// Keep a list of upload sites, open them all at once and sync the list over WebDAV.
#[derive(Parser, Debug)]
#[command(name = "quick-release")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Local database file
    #[arg(long, global = true, env = "QUICK_RELEASE_DB")]
    db: Option<PathBuf>,

    /// Origin of the hosting page, used to detect mixed-content blocking
    #[arg(long, global = true, env = "QUICK_RELEASE_PAGE_ORIGIN")]
    page_origin: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show all sites
    List,

    /// Add a site (https:// is added when no scheme is given)
    Add { name: String, url: String },

    /// Delete the site with the given number (as shown by `list`)
    Delete { number: usize },

    /// Move a site to another position
    Move { from: usize, to: usize },

    /// Print all URLs in list order
    OpenAll,

    /// Export the list to a JSON file
    Export { path: Option<PathBuf> },

    /// Replace the list with the contents of a JSON file
    Import { path: PathBuf },

    /// Manage WebDAV settings
    Webdav {
        #[command(subcommand)]
        action: WebdavCommands,
    },

    /// Upload the list to the WebDAV server now
    Sync,

    /// Show the result of loading the list from the WebDAV server
    Restore,
}

#[derive(Subcommand, Debug)]
enum WebdavCommands {
    /// Test the connection and save the settings
    Configure {
        server: String,
        username: String,
        #[arg(long, env = "QUICK_RELEASE_WEBDAV_PASSWORD", hide_env_values = true)]
        password: String,
        /// Do not upload automatically after every change
        #[arg(long)]
        no_auto_sync: bool,
    },

    /// Test the saved settings
    Test,

    /// Turn automatic upload after changes on or off
    AutoSync { state: Toggle },

    /// Forget server and credentials
    Clear,

    /// Show the saved settings
    Status,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Toggle {
    On,
    Off,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            log::debug!("{:?}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

/// Errors returned from here are printed once by `main`; notifications
/// only carry background outcomes and successes.
async fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let db_path = cli.db.unwrap_or_else(database::default_database_path);
    let conn = database::init_database(&db_path)?;
    let mut store = ConfigStore::open(conn);
    if let Some(e) = store.load_error() {
        eprintln!("Stored sites could not be read ({}), starting with an empty list", e);
    }

    if store.is_first_run()? {
        log::info!("First start, local data in {}", db_path.display());
        store.mark_first_run_done()?;
    }

    let mut client = WebDavSyncClient::new(
        HttpTransport::new().map_err(|e| AppError::Other(e.to_string()))?,
    );
    if let Some(origin) = cli.page_origin {
        client = client.with_page_origin(origin);
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let settings = SyncSettingsHandle::new(sync_service::load_sync_config(store.conn())?);
    let coordinator = SyncCoordinator::new(client, settings, tx);

    let restore = coordinator.restore_on_startup(&mut store).await;
    log::debug!("Startup restore: {:?}", restore);

    let result = execute(cli.command, &mut store, &coordinator, restore).await;

    while let Ok(notification) = rx.try_recv() {
        print_notification(&notification);
    }
    result
}

async fn execute(
    command: Commands,
    store: &mut ConfigStore,
    coordinator: &SyncCoordinator<HttpTransport>,
    restore: RestoreOutcome,
) -> Result<ExitCode, AppError> {
    match command {
        Commands::List => {
            if store.sites().is_empty() {
                println!("No sites configured yet. Add one with `quick-release add <name> <url>`.");
            }
            for (i, site) in store.sites().iter().enumerate() {
                println!("{:>3}. {}  {}", i + 1, site.name, site.url);
            }
        }
        Commands::Add { name, url } => {
            let entry = site_service::add_site(store, &name, &url)?;
            println!("Added {} ({})", entry.name, entry.url);
            auto_sync(coordinator, store).await;
        }
        Commands::Delete { number } => {
            let removed = site_service::delete_site(store, position(number)?)?;
            println!("Deleted {} ({})", removed.name, removed.url);
            auto_sync(coordinator, store).await;
        }
        Commands::Move { from, to } => {
            site_service::move_site(store, position(from)?, position(to)?)?;
            auto_sync(coordinator, store).await;
        }
        Commands::OpenAll => {
            for url in site_service::open_all(store)? {
                println!("{}", url);
            }
        }
        Commands::Export { path } => {
            let path = path
                .unwrap_or_else(|| PathBuf::from(export_import_service::DEFAULT_EXPORT_FILE));
            let written = export_import_service::export_to_file(store, &path)?;
            println!("Exported to {}", written.display());
        }
        Commands::Import { path } => {
            let count = export_import_service::import_from_file(store, &path)?;
            println!("Imported {} sites", count);
            auto_sync(coordinator, store).await;
        }
        Commands::Webdav { action } => webdav(action, store, coordinator).await?,
        Commands::Sync => {
            coordinator.manual_sync(store.conn(), store.sites()).await?;
        }
        Commands::Restore => match restore {
            RestoreOutcome::Disabled => println!("WebDAV sync is not enabled"),
            RestoreOutcome::AlreadyDone => {}
            RestoreOutcome::RemoteEmpty => println!("No remote sites, local list kept"),
            RestoreOutcome::Restored(count) => println!("Restored {} sites", count),
            // already reported by the startup notification
            RestoreOutcome::Failed(_) => return Ok(ExitCode::FAILURE),
        },
    }
    Ok(ExitCode::SUCCESS)
}

async fn webdav(
    action: WebdavCommands,
    store: &ConfigStore,
    coordinator: &SyncCoordinator<HttpTransport>,
) -> Result<(), AppError> {
    match action {
        WebdavCommands::Configure {
            server,
            username,
            password,
            no_auto_sync,
        } => {
            let mut candidate = SyncConfig::new(&server, &username, &password);
            candidate.auto_sync = !no_auto_sync;
            let saved = coordinator.configure(store.conn(), candidate).await?;
            println!("Saved WebDAV settings for {}", saved.server);
        }
        WebdavCommands::Test => coordinator.test_connection().await?,
        WebdavCommands::AutoSync { state } => {
            let enabled = matches!(state, Toggle::On);
            coordinator.set_auto_sync(store.conn(), enabled)?;
            println!("Auto-sync {}", if enabled { "on" } else { "off" });
        }
        WebdavCommands::Clear => {
            coordinator.clear(store.conn())?;
            println!("WebDAV settings cleared");
        }
        WebdavCommands::Status => {
            let config = coordinator.settings().snapshot();
            if config.sync_enabled {
                println!("Server:    {}", config.server);
                println!("Username:  {}", config.username);
            } else {
                println!("WebDAV sync is not configured");
            }
            println!("Auto-sync: {}", if config.auto_sync { "on" } else { "off" });
            match sync_service::last_sync(store.conn())? {
                Some(at) => println!("Last sync: {}", at.to_rfc3339()),
                None => println!("Last sync: never"),
            }
        }
    }
    Ok(())
}

/// Runs the auto-sync hook and waits for it, the process would end otherwise
async fn auto_sync(coordinator: &SyncCoordinator<HttpTransport>, store: &ConfigStore) {
    if let Some(handle) = coordinator.after_local_save(store.sites()) {
        if let Err(e) = handle.await {
            log::error!("Auto-sync task failed: {}", e);
        }
    }
}

/// 1-based number from the command line to 0-based index
fn position(number: usize) -> Result<usize, AppError> {
    number
        .checked_sub(1)
        .ok_or_else(|| AppError::Validation("Site numbers start at 1".to_string()))
}

fn print_notification(notification: &Notification) {
    eprintln!("{}", notification);
}
