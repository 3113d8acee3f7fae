//! # freightdesk
//!
//! Rule engines for a courier back office:
//!
//! - **Pricing**: resolve a destination to a pricing sector, look up the
//!   customer's sector rate card and compute the freight charge plus the
//!   waybill surcharge ([`application::pricing::PricingEngine`]).
//! - **Payment allocation**: record a customer payment and settle outstanding
//!   invoices oldest-first inside one ledger transaction
//!   ([`application::allocation::PaymentAllocator`]).
//!
//! Storage sits behind the async ports in [`domain::ports`]; an in-memory
//! adapter is always available and a RocksDB adapter is built with the
//! `storage-rocksdb` feature.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod telemetry;
