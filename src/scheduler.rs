use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::service::SyncService;
use crate::settings::Settings;

pub struct SchedulerConfig {
    pub cron_expression: String,
    pub daemon: bool,
}

impl SchedulerConfig {
    pub fn new(cron: String, daemon: bool) -> Self {
        Self {
            cron_expression: cron,
            daemon,
        }
    }
}

/// Periodic automatic upload of the local tree.
pub async fn start_scheduler(config: SchedulerConfig, settings: Settings) -> Result<()> {
    let mut scheduler = JobScheduler::new().await?;

    info!("⏰ Scheduler initialized with cron: {}", config.cron_expression);

    let cron_expr = config.cron_expression.clone();
    let job = Job::new_async(cron_expr.as_str(), move |_uuid, _l| {
        let settings = settings.clone();
        Box::pin(async move {
            info!("🔄 Scheduled upload triggered");

            let service = SyncService::new(settings);
            match service.upload(false, false).await {
                Ok(count) => {
                    info!("✅ Scheduled upload completed: {} bookmarks", count);
                }
                Err(e) => {
                    error!("❌ Scheduled upload failed: {}", e);
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    if config.daemon {
        info!("🔄 Running as daemon. Press Ctrl+C to stop.");
        tokio::signal::ctrl_c().await?;
        info!("🛑 Shutting down scheduler...");
    } else {
        info!("⏰ Scheduler started. Keeping process alive...");
        tokio::signal::ctrl_c().await?;
    }

    scheduler.shutdown().await?;
    Ok(())
}
