use anyhow::Result;
use log::info;

use crate::config::settings::SheetSettings;
use crate::domain::Mode;
use crate::http::RetryingClient;

/// Downloads the CSV export of one spreadsheet tab per mode
pub struct SheetFetcher {
    client: RetryingClient,
    base_url: String,
    sheet_key: String,
    gid_singles: u64,
    gid_doubles: u64,
}

impl SheetFetcher {
    pub fn new(settings: &SheetSettings) -> Result<Self> {
        Ok(Self {
            client: RetryingClient::from_settings(settings)?,
            base_url: settings.base_url.to_string(),
            sheet_key: settings.sheet_key.clone(),
            gid_singles: settings.gid_singles,
            gid_doubles: settings.gid_doubles,
        })
    }

    pub fn export_url(&self, mode: Mode) -> String {
        let gid = match mode {
            Mode::Singles => self.gid_singles,
            Mode::Doubles => self.gid_doubles,
        };
        build_export_url(&self.base_url, &self.sheet_key, gid)
    }

    pub async fn fetch_csv(&self, mode: Mode) -> Result<Vec<u8>> {
        let url = self.export_url(mode);
        info!("Fetching {} sheet...", mode);
        let bytes = self.client.get_bytes(&url).await?;
        info!("  → Downloaded {} bytes", bytes.len());
        Ok(bytes)
    }
}

fn build_export_url(base_url: &str, sheet_key: &str, gid: u64) -> String {
    format!("{}?key={}&gid={}&output=csv", base_url, sheet_key, gid)
}
