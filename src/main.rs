use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use bookmark_hub_sync::compare::MatchKey;
use bookmark_hub_sync::model::BrowserFamily;
use bookmark_hub_sync::report::CompareReport;
use bookmark_hub_sync::scheduler::{self, SchedulerConfig};
use bookmark_hub_sync::service::{DownloadOutcome, DownloadTarget, SyncService};
use bookmark_hub_sync::settings::Settings;
use bookmark_hub_sync::store::TreeStore;

#[derive(Parser)]
#[command(name = "bookmark-hub-sync")]
#[command(about = "Mirror browser bookmarks to a GitHub Gist and back", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file path (default: ~/.bookmark-hub/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config and an empty bookmark store
    Init {
        /// Browser family: firefox, chrome, edge, safari or unknown
        #[arg(short, long, default_value = "unknown")]
        family: String,

        /// Bookmark store path (default: ~/.bookmark-hub/bookmarks.json)
        #[arg(short, long)]
        store: Option<PathBuf>,
    },

    /// Upload the local bookmark tree to the gist
    Upload {
        /// Remove duplicate URLs before uploading
        #[arg(long)]
        dedup: bool,

        /// Dry run - show what would be uploaded without making changes
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Download a snapshot and rebuild the local tree from it
    Download {
        /// Snapshot file name inside the gist
        #[arg(short, long)]
        file: Option<String>,

        /// Pull another browser's snapshot: firefox, chrome, edge, safari
        #[arg(short, long)]
        browser: Option<String>,

        /// Remove duplicate URLs before importing
        #[arg(long)]
        dedup: bool,
    },

    /// Remove every bookmark under the standard root folders
    Clear {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Remove duplicate bookmarks from the local tree
    Dedup {
        /// Dry run - report duplicates without making changes
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Count bookmarks in the local tree
    Count,

    /// Compare the local tree against a remote snapshot
    Compare {
        /// Snapshot file name inside the gist
        #[arg(short, long)]
        file: Option<String>,

        /// Comparison attribute: url or title
        #[arg(long, default_value = "url")]
        by: String,

        /// Show folder paths for every entry
        #[arg(short, long)]
        detailed: bool,
    },

    /// List snapshot files stored in the gist
    Files,

    /// Start the scheduler for periodic automatic uploads
    Schedule {
        /// Cron expression (default: "0 0 * * * *" - every hour)
        #[arg(long, default_value = "0 0 * * * *")]
        cron: String,

        /// Run as daemon
        #[arg(short, long)]
        daemon: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Init { family, store } => {
            let Some(family) = BrowserFamily::parse(&family) else {
                eprintln!("❌ Invalid browser family: {}. Use 'firefox', 'chrome', 'edge', 'safari' or 'unknown'", family);
                std::process::exit(1);
            };
            let store_path = match store {
                Some(path) => path,
                None => Settings::default_store_path()?,
            };

            let mut settings = settings;
            settings.browser_family = family;
            settings.store_path = Some(store_path.clone());
            settings.save(cli.config.as_deref())?;
            info!("✅ Config written for browser family: {}", family);

            if store_path.exists() {
                info!("📁 Keeping existing bookmark store at {:?}", store_path);
            } else {
                TreeStore::fresh(family.id_scheme())
                    .with_path(store_path.clone())
                    .persist()?;
                info!("📁 Created empty bookmark store at {:?}", store_path);
            }
            info!("✏️  Add the gist token and gist id to the config to enable sync");
        }

        Commands::Upload { dedup, dry_run } => {
            info!("📤 Starting bookmark upload");
            let service = SyncService::new(settings);
            let count = service.upload(dedup, dry_run).await?;
            info!("✅ Upload complete: {} bookmarks", count);
        }

        Commands::Download { file, browser, dedup } => {
            let target = match (file, browser) {
                (Some(file), _) => Some(DownloadTarget::File(file)),
                (None, Some(raw)) => match BrowserFamily::parse(&raw) {
                    Some(family) => Some(DownloadTarget::Family(family)),
                    None => {
                        eprintln!("❌ Invalid browser family: {}. Use 'firefox', 'chrome', 'edge', 'safari' or 'unknown'", raw);
                        std::process::exit(1);
                    }
                },
                (None, None) => None,
            };

            info!("📥 Starting bookmark download");
            let service = SyncService::new(settings);
            match service.download(target, dedup).await? {
                DownloadOutcome::Applied { count, stats } => {
                    info!(
                        "✅ Download complete: {} bookmarks ({} skipped)",
                        count, stats.skipped
                    );
                }
                DownloadOutcome::NoData => {
                    warn!("⚠️  No remote bookmark data - local tree left untouched");
                }
            }
        }

        Commands::Clear { yes } => {
            if !yes {
                print!("This removes every bookmark under the standard roots. Continue? (y/N): ");
                use std::io::{self, Write};
                io::stdout().flush().ok();

                let mut input = String::new();
                io::stdin().read_line(&mut input).ok();

                if !input.trim().eq_ignore_ascii_case("y") {
                    info!("❌ Cancelled");
                    return Ok(());
                }
            }

            info!("🧹 Clearing local bookmarks");
            let service = SyncService::new(settings);
            let removed = service.clear_all()?;
            info!("✅ Clear complete: {} top-level entries removed", removed);
        }

        Commands::Dedup { dry_run } => {
            info!("🔄 Scanning for duplicate bookmarks");
            let service = SyncService::new(settings);
            let outcome = service.dedup_local(dry_run)?;
            if outcome.removed() == 0 {
                info!("✅ No duplicates found ({} bookmarks)", outcome.before);
            } else if outcome.applied {
                info!(
                    "✅ Removed {} duplicates ({} → {} bookmarks)",
                    outcome.removed(),
                    outcome.before,
                    outcome.after
                );
            } else {
                info!(
                    "🏃 Dry run: would remove {} duplicates ({} → {} bookmarks)",
                    outcome.removed(),
                    outcome.before,
                    outcome.after
                );
            }
        }

        Commands::Count => {
            let service = SyncService::new(settings);
            let count = service.local_count()?;
            println!("{}", count);
        }

        Commands::Compare { file, by, detailed } => {
            let Some(key) = MatchKey::parse(&by) else {
                eprintln!("❌ Invalid comparison attribute: {}. Use 'url' or 'title'", by);
                std::process::exit(1);
            };

            info!("🔍 Comparing local bookmarks against the gist");
            let service = SyncService::new(settings);
            let (outcome, file_name) = service.compare(file, key).await?;
            println!("{}", CompareReport::new(&outcome, key, &file_name).format(detailed));
        }

        Commands::Files => {
            info!("📋 Listing snapshot files in the gist");
            let service = SyncService::new(settings);
            let files = service.list_files().await?;

            println!("\n☁️  Snapshot files:");
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            if files.is_empty() {
                println!("  (none)");
            }
            for file in &files {
                println!("  • {}: {} bookmarks", file.file_name, file.bookmark_count);
            }
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
        }

        Commands::Schedule { cron, daemon } => {
            info!("⏰ Starting scheduler with cron: {}", cron);
            let config = SchedulerConfig::new(cron, daemon);
            scheduler::start_scheduler(config, settings).await?;
        }
    }

    Ok(())
}
