//! Application layer: the engines that orchestrate domain rules over the store ports.
//!
//! [`pricing::PricingEngine`] prices shipment quote requests,
//! [`allocation::PaymentAllocator`] records payments against outstanding
//! invoices, and [`settings::SettingsService`] keeps the back-office settings.

pub mod allocation;
pub mod pricing;
pub mod sector;
pub mod settings;
