#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use freightdesk::domain::invoice::Invoice;
use freightdesk::domain::payment::{
    CustomerPayment, NewPayment, PaymentMethod, PaymentOnInvoice, PaymentRequest,
};
use freightdesk::domain::ports::{LedgerStore, LedgerTransaction};
use freightdesk::domain::rate_card::SectorRateCard;
use freightdesk::domain::sector::SectorName;
use freightdesk::domain::{CustomerId, InvoiceId, PaymentId};
use freightdesk::error::{CourierError, Result};
use freightdesk::infrastructure::in_memory::InMemoryLedger;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::NamedTempFile;

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

pub fn invoice(id: InvoiceId, customer: CustomerId, day: u32, net: Decimal) -> Invoice {
    Invoice::new(id, customer, format!("INV-{id:03}"), date(day), net, Decimal::ZERO).unwrap()
}

pub fn payment(customer: CustomerId, amount: Decimal) -> PaymentRequest {
    PaymentRequest {
        customer_id: customer,
        amount,
        payment_date: date(28),
        method: PaymentMethod::BankTransfer,
        reference: Some("UTR-1".into()),
        image: None,
    }
}

/// A Delhi card for customer 1 with every rate family populated.
pub fn delhi_card() -> SectorRateCard {
    let mut card = SectorRateCard::new(1, SectorName::Delhi);
    card.service_provider = Some("DTDC".into());
    card.bulk_min_weight_surface = Some(dec!(5));
    card.surface_upto10 = Some(dec!(12));
    card.surface_upto15 = Some(dec!(11));
    card.surface_upto20 = Some(dec!(10));
    card.surface_above20 = Some(dec!(9));
    card.bulk_min_weight_air = Some(dec!(3));
    card.air_upto10 = Some(dec!(40));
    card.air_above20 = Some(dec!(30));
    card.dox_upto100g = Some(dec!(25));
    card.dox_upto250g = Some(dec!(35));
    card.dox_upto500g = Some(dec!(50));
    card.dox_add500g = Some(dec!(30));
    card.premium_upto250g = Some(dec!(80));
    card.premium_upto500g = Some(dec!(100));
    card.premium_add500g = Some(dec!(20));
    card
}

pub fn write_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

/// Wraps the in-memory ledger and fails the `fail_on`-th invoice update
/// (1-based, counted across all transactions).
#[derive(Clone)]
pub struct FailingLedger {
    inner: InMemoryLedger,
    updates: Arc<AtomicUsize>,
    fail_on: usize,
}

impl FailingLedger {
    pub fn new(inner: InMemoryLedger, fail_on: usize) -> Self {
        Self {
            inner,
            updates: Arc::new(AtomicUsize::new(0)),
            fail_on,
        }
    }
}

#[async_trait]
impl LedgerStore for FailingLedger {
    async fn put_invoice(&self, invoice: Invoice) -> Result<()> {
        self.inner.put_invoice(invoice).await
    }

    async fn invoice(&self, invoice_id: InvoiceId) -> Result<Option<Invoice>> {
        self.inner.invoice(invoice_id).await
    }

    async fn invoices_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Invoice>> {
        self.inner.invoices_for_customer(customer_id).await
    }

    async fn all_invoices(&self) -> Result<Vec<Invoice>> {
        self.inner.all_invoices().await
    }

    async fn payment(&self, payment_id: PaymentId) -> Result<Option<CustomerPayment>> {
        self.inner.payment(payment_id).await
    }

    async fn allocations_for_payment(&self, payment_id: PaymentId) -> Result<Vec<PaymentOnInvoice>> {
        self.inner.allocations_for_payment(payment_id).await
    }

    async fn begin(&self, customer_id: CustomerId) -> Result<Box<dyn LedgerTransaction>> {
        let inner = self.inner.begin(customer_id).await?;
        Ok(Box::new(FailingTransaction {
            inner,
            updates: self.updates.clone(),
            fail_on: self.fail_on,
        }))
    }
}

struct FailingTransaction {
    inner: Box<dyn LedgerTransaction>,
    updates: Arc<AtomicUsize>,
    fail_on: usize,
}

#[async_trait]
impl LedgerTransaction for FailingTransaction {
    fn customer_id(&self) -> CustomerId {
        self.inner.customer_id()
    }

    async fn insert_payment(&mut self, payment: NewPayment) -> Result<CustomerPayment> {
        self.inner.insert_payment(payment).await
    }

    async fn outstanding_invoices(&mut self) -> Result<Vec<Invoice>> {
        self.inner.outstanding_invoices().await
    }

    async fn update_invoice(&mut self, invoice: &Invoice) -> Result<()> {
        let count = self.updates.fetch_add(1, Ordering::SeqCst) + 1;
        if count == self.fail_on {
            return Err(CourierError::PersistenceFailure(format!(
                "simulated failure updating invoice {}",
                invoice.id
            )));
        }
        self.inner.update_invoice(invoice).await
    }

    async fn insert_allocation(&mut self, allocation: PaymentOnInvoice) -> Result<()> {
        self.inner.insert_allocation(allocation).await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.inner.rollback().await
    }
}
