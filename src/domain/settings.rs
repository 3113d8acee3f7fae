//! Back-office settings.
//!
//! Each settings kind is a single record stored under a fixed key and
//! replaced wholesale on every upsert.

use crate::error::{CourierError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const INVOICE_SETTINGS_KEY: &str = "invoice";
pub const SMS_SETTINGS_KEY: &str = "sms";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSettings {
    pub company_name: String,
    #[serde(default)]
    pub gstin: Option<String>,
    pub invoice_prefix: String,
    #[serde(default)]
    pub hsn_code: Option<String>,
    /// GST percentage applied on invoice generation.
    pub gst_rate: Decimal,
    #[serde(default)]
    pub terms: Option<String>,
}

impl InvoiceSettings {
    pub fn validate(&self) -> Result<()> {
        if self.company_name.trim().is_empty() {
            return Err(CourierError::ValidationError(
                "company name must not be empty".to_string(),
            ));
        }
        if self.invoice_prefix.trim().is_empty() {
            return Err(CourierError::ValidationError(
                "invoice prefix must not be empty".to_string(),
            ));
        }
        if self.gst_rate < Decimal::ZERO || self.gst_rate > Decimal::ONE_HUNDRED {
            return Err(CourierError::ValidationError(format!(
                "GST rate {} is not a percentage",
                self.gst_rate
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsSettings {
    pub enabled: bool,
    pub sender_id: String,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub booking_template: Option<String>,
    #[serde(default)]
    pub delivery_template: Option<String>,
}

impl SmsSettings {
    /// Sender ids are six letters; only checked once SMS is switched on.
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let sender = self.sender_id.trim();
        if sender.len() != 6 || !sender.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CourierError::ValidationError(format!(
                "SMS sender id '{}' must be six letters",
                self.sender_id
            )));
        }
        if self.api_url.as_deref().is_none_or(|u| u.trim().is_empty()) {
            return Err(CourierError::ValidationError(
                "SMS API URL is required when SMS is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

/// The settings a caller wants to change; absent sections are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<InvoiceSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms: Option<SmsSettings>,
}
