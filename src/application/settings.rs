use crate::domain::ports::SettingsStoreBox;
use crate::domain::settings::Settings;
use crate::error::Result;
use tracing::info;

pub struct SettingsService {
    store: SettingsStoreBox,
}

impl SettingsService {
    pub fn new(store: SettingsStoreBox) -> Self {
        Self { store }
    }

    /// Validates and upserts every section present in `changes`, then returns
    /// the settings as stored.
    ///
    /// All sections are validated before anything is written.
    pub async fn apply(&self, changes: Settings) -> Result<Settings> {
        if let Some(invoice) = &changes.invoice {
            invoice.validate()?;
        }
        if let Some(sms) = &changes.sms {
            sms.validate()?;
        }

        if let Some(invoice) = changes.invoice {
            self.store.upsert_invoice_settings(invoice).await?;
            info!("Invoice settings updated");
        }
        if let Some(sms) = changes.sms {
            self.store.upsert_sms_settings(sms).await?;
            info!("SMS settings updated");
        }
        self.current().await
    }

    pub async fn current(&self) -> Result<Settings> {
        Ok(Settings {
            invoice: self.store.invoice_settings().await?,
            sms: self.store.sms_settings().await?,
        })
    }
}
