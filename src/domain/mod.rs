//! Domain types and pure business rules.
//!
//! Nothing in here touches storage directly; persistence is expressed through
//! the async traits in [`ports`] and implemented in `crate::infrastructure`.

pub mod invoice;
pub mod money;
pub mod payment;
pub mod ports;
pub mod pricing;
pub mod rate_card;
pub mod reference;
pub mod sector;
pub mod settings;
pub mod shipment;

use rust_decimal::Decimal;

pub type CustomerId = u32;
pub type InvoiceId = u32;
pub type PaymentId = u64;

/// Shipment weight in kilograms.
pub type Weight = Decimal;
