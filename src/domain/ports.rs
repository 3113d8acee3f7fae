use super::invoice::Invoice;
use super::payment::{CustomerPayment, NewPayment, PaymentOnInvoice};
use super::rate_card::SectorRateCard;
use super::reference::{PincodeRecord, StateRecord};
use super::sector::SectorName;
use super::settings::{InvoiceSettings, SmsSettings};
use super::{CustomerId, InvoiceId, PaymentId};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait RateCardStore: Send + Sync {
    /// Inserts or replaces the card for `(card.customer_id, card.sector)`.
    async fn upsert(&self, card: SectorRateCard) -> Result<()>;
    async fn find(&self, customer_id: CustomerId, sector: SectorName) -> Result<Option<SectorRateCard>>;
}

#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn put_state(&self, state: StateRecord) -> Result<()>;
    async fn put_pincode(&self, entry: PincodeRecord) -> Result<()>;
    /// The registry record of the state a pincode belongs to.
    async fn state_for_pincode(&self, pincode: &str) -> Result<Option<StateRecord>>;
    /// Case-insensitive exact match on the state name.
    async fn find_state(&self, name: &str) -> Result<Option<StateRecord>>;
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Loads an invoice as produced by invoice generation. Not transactional.
    async fn put_invoice(&self, invoice: Invoice) -> Result<()>;
    async fn invoice(&self, invoice_id: InvoiceId) -> Result<Option<Invoice>>;
    async fn invoices_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Invoice>>;
    async fn all_invoices(&self) -> Result<Vec<Invoice>>;
    async fn payment(&self, payment_id: PaymentId) -> Result<Option<CustomerPayment>>;
    async fn allocations_for_payment(&self, payment_id: PaymentId) -> Result<Vec<PaymentOnInvoice>>;

    /// Opens a unit of work for one customer's ledger.
    ///
    /// Only one transaction per customer is open at a time; a second `begin`
    /// for the same customer waits until the first is committed, rolled back
    /// or dropped.
    async fn begin(&self, customer_id: CustomerId) -> Result<Box<dyn LedgerTransaction>>;
}

/// Writes staged against one customer's ledger.
///
/// Nothing is visible to other readers until [`LedgerTransaction::commit`].
/// Dropping the transaction without committing discards every staged write.
#[async_trait]
pub trait LedgerTransaction: Send {
    fn customer_id(&self) -> CustomerId;
    async fn insert_payment(&mut self, payment: NewPayment) -> Result<CustomerPayment>;
    /// UNPAID and PARTIALLY_PAID invoices of the customer, oldest first,
    /// including writes staged in this transaction.
    async fn outstanding_invoices(&mut self) -> Result<Vec<Invoice>>;
    async fn update_invoice(&mut self, invoice: &Invoice) -> Result<()>;
    async fn insert_allocation(&mut self, allocation: PaymentOnInvoice) -> Result<()>;
    async fn commit(self: Box<Self>) -> Result<()>;
    async fn rollback(self: Box<Self>) -> Result<()>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn invoice_settings(&self) -> Result<Option<InvoiceSettings>>;
    async fn upsert_invoice_settings(&self, settings: InvoiceSettings) -> Result<()>;
    async fn sms_settings(&self) -> Result<Option<SmsSettings>>;
    async fn upsert_sms_settings(&self, settings: SmsSettings) -> Result<()>;
}

pub type RateCardStoreBox = Box<dyn RateCardStore>;
pub type ReferenceStoreBox = Box<dyn ReferenceStore>;
pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type SettingsStoreBox = Box<dyn SettingsStore>;
