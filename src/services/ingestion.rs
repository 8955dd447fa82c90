use anyhow::Result;
use log::{info, warn};

use crate::cache::Cache;
use crate::config::settings::AppConfig;
use crate::domain::Mode;
use crate::fetchers::SheetFetcher;

/// Downloads both match logs and refreshes the on-disk copies
pub struct IngestionService {
    cache: Cache,
    fetcher: SheetFetcher,
}

impl IngestionService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            cache: Cache::new(config.paths.cache_dir())?,
            fetcher: SheetFetcher::new(&config.sheet)?,
        })
    }

    pub async fn run(&self) -> Result<()> {
        info!("=== Starting Sheet Download ===\n");

        for mode in [Mode::Singles, Mode::Doubles] {
            self.refresh(mode).await?;
        }

        info!("=== Download Complete ===");
        Ok(())
    }

    /// A failed download is only fatal when there is no earlier copy to fall back on
    async fn refresh(&self, mode: Mode) -> Result<()> {
        let url = self.fetcher.export_url(mode);

        match self.fetcher.fetch_csv(mode).await {
            Ok(bytes) => self.cache.save_raw(mode.as_str(), &url, &bytes),
            Err(e) if self.cache.exists(mode.as_str()) => {
                warn!("Failed to fetch {} sheet, falling back to cached CSV: {:#}", mode, e);
                if let Some(meta) = self.cache.load_meta(mode.as_str())? {
                    info!("  → Cached copy from {}", meta.fetched_at);
                }
                Ok(())
            }
            Err(e) => Err(e.context(format!("No cached {} match log to fall back on", mode))),
        }
    }
}
