use crate::domain::invoice::{Invoice, sort_oldest_first};
use crate::domain::payment::{CustomerPayment, NewPayment, PaymentOnInvoice};
use crate::domain::ports::{LedgerStore, LedgerTransaction, RateCardStore, ReferenceStore, SettingsStore};
use crate::domain::rate_card::SectorRateCard;
use crate::domain::reference::{PincodeRecord, StateRecord};
use crate::domain::sector::SectorName;
use crate::domain::settings::{INVOICE_SETTINGS_KEY, InvoiceSettings, SMS_SETTINGS_KEY, SmsSettings};
use crate::domain::{CustomerId, InvoiceId, PaymentId};
use crate::error::{CourierError, Result};
use crate::infrastructure::locks::CustomerLocks;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{OwnedMutexGuard, RwLock};
use tracing::debug;

/// Rate cards keyed by (customer, sector).
#[derive(Default, Clone)]
pub struct InMemoryRateCardStore {
    cards: Arc<RwLock<HashMap<(CustomerId, SectorName), SectorRateCard>>>,
}

impl InMemoryRateCardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateCardStore for InMemoryRateCardStore {
    async fn upsert(&self, card: SectorRateCard) -> Result<()> {
        let mut cards = self.cards.write().await;
        cards.insert((card.customer_id, card.sector), card);
        Ok(())
    }

    async fn find(&self, customer_id: CustomerId, sector: SectorName) -> Result<Option<SectorRateCard>> {
        let cards = self.cards.read().await;
        Ok(cards.get(&(customer_id, sector)).cloned())
    }
}

/// State registry and pincode map.
#[derive(Default, Clone)]
pub struct InMemoryReferenceStore {
    states: Arc<RwLock<HashMap<String, StateRecord>>>,
    pincodes: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReferenceStore for InMemoryReferenceStore {
    async fn put_state(&self, state: StateRecord) -> Result<()> {
        let mut states = self.states.write().await;
        states.insert(StateRecord::key(&state.name), state);
        Ok(())
    }

    async fn put_pincode(&self, entry: PincodeRecord) -> Result<()> {
        let mut pincodes = self.pincodes.write().await;
        pincodes.insert(entry.pincode.trim().to_string(), entry.state);
        Ok(())
    }

    async fn state_for_pincode(&self, pincode: &str) -> Result<Option<StateRecord>> {
        let state_name = {
            let pincodes = self.pincodes.read().await;
            pincodes.get(pincode.trim()).cloned()
        };
        match state_name {
            Some(name) => self.find_state(&name).await,
            None => Ok(None),
        }
    }

    async fn find_state(&self, name: &str) -> Result<Option<StateRecord>> {
        let states = self.states.read().await;
        Ok(states.get(&StateRecord::key(name)).cloned())
    }
}

#[derive(Default)]
struct LedgerState {
    invoices: BTreeMap<InvoiceId, Invoice>,
    payments: BTreeMap<PaymentId, CustomerPayment>,
    allocations: Vec<PaymentOnInvoice>,
}

/// Invoices, payments and allocations held in memory.
///
/// Transactions stage their writes privately and apply them under a single
/// write lock on commit.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
    next_payment_id: Arc<AtomicU64>,
    locks: CustomerLocks,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn put_invoice(&self, invoice: Invoice) -> Result<()> {
        let previous_owner = self
            .state
            .read()
            .await
            .invoices
            .get(&invoice.id)
            .map(|i| i.customer_id);
        // Waits for open transactions of the old and new owner.
        let _guards = self
            .locks
            .acquire_all(previous_owner.into_iter().chain([invoice.customer_id]))
            .await;
        let mut state = self.state.write().await;
        state.invoices.insert(invoice.id, invoice);
        Ok(())
    }

    async fn invoice(&self, invoice_id: InvoiceId) -> Result<Option<Invoice>> {
        let state = self.state.read().await;
        Ok(state.invoices.get(&invoice_id).cloned())
    }

    async fn invoices_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Invoice>> {
        let state = self.state.read().await;
        let mut invoices: Vec<Invoice> = state
            .invoices
            .values()
            .filter(|i| i.customer_id == customer_id)
            .cloned()
            .collect();
        sort_oldest_first(&mut invoices);
        Ok(invoices)
    }

    async fn all_invoices(&self) -> Result<Vec<Invoice>> {
        let state = self.state.read().await;
        Ok(state.invoices.values().cloned().collect())
    }

    async fn payment(&self, payment_id: PaymentId) -> Result<Option<CustomerPayment>> {
        let state = self.state.read().await;
        Ok(state.payments.get(&payment_id).cloned())
    }

    async fn allocations_for_payment(&self, payment_id: PaymentId) -> Result<Vec<PaymentOnInvoice>> {
        let state = self.state.read().await;
        Ok(state
            .allocations
            .iter()
            .filter(|a| a.payment_id == payment_id)
            .copied()
            .collect())
    }

    async fn begin(&self, customer_id: CustomerId) -> Result<Box<dyn LedgerTransaction>> {
        let guard = self.locks.acquire(customer_id).await;
        debug!(customer_id, "Ledger transaction opened");
        Ok(Box::new(InMemoryLedgerTransaction {
            state: self.state.clone(),
            next_payment_id: self.next_payment_id.clone(),
            customer_id,
            payments: Vec::new(),
            invoices: BTreeMap::new(),
            allocations: Vec::new(),
            _guard: guard,
        }))
    }
}

pub struct InMemoryLedgerTransaction {
    state: Arc<RwLock<LedgerState>>,
    next_payment_id: Arc<AtomicU64>,
    customer_id: CustomerId,
    payments: Vec<CustomerPayment>,
    invoices: BTreeMap<InvoiceId, Invoice>,
    allocations: Vec<PaymentOnInvoice>,
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl LedgerTransaction for InMemoryLedgerTransaction {
    fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    async fn insert_payment(&mut self, payment: NewPayment) -> Result<CustomerPayment> {
        if payment.customer_id != self.customer_id {
            return Err(CourierError::ValidationError(format!(
                "payment for customer {} inside transaction for customer {}",
                payment.customer_id, self.customer_id
            )));
        }
        let id = self.next_payment_id.fetch_add(1, Ordering::SeqCst) + 1;
        let payment = payment.into_payment(id);
        self.payments.push(payment.clone());
        Ok(payment)
    }

    async fn outstanding_invoices(&mut self) -> Result<Vec<Invoice>> {
        let state = self.state.read().await;
        let mut invoices: Vec<Invoice> = state
            .invoices
            .values()
            .filter(|i| i.customer_id == self.customer_id)
            .map(|i| self.invoices.get(&i.id).unwrap_or(i).clone())
            .filter(Invoice::is_outstanding)
            .collect();
        sort_oldest_first(&mut invoices);
        Ok(invoices)
    }

    async fn update_invoice(&mut self, invoice: &Invoice) -> Result<()> {
        let known = {
            let state = self.state.read().await;
            state
                .invoices
                .get(&invoice.id)
                .is_some_and(|i| i.customer_id == self.customer_id)
        };
        if !known || invoice.customer_id != self.customer_id {
            return Err(CourierError::PersistenceFailure(format!(
                "invoice {} not found for customer {}",
                invoice.id, self.customer_id
            )));
        }
        self.invoices.insert(invoice.id, invoice.clone());
        Ok(())
    }

    async fn insert_allocation(&mut self, allocation: PaymentOnInvoice) -> Result<()> {
        if !self.payments.iter().any(|p| p.id == allocation.payment_id) {
            return Err(CourierError::PersistenceFailure(format!(
                "payment {} was not recorded in this transaction",
                allocation.payment_id
            )));
        }
        self.allocations.push(allocation);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        let mut state = this.state.write().await;
        for payment in this.payments {
            state.payments.insert(payment.id, payment);
        }
        for (id, invoice) in this.invoices {
            state.invoices.insert(id, invoice);
        }
        state.allocations.extend(this.allocations);
        debug!(customer_id = this.customer_id, "Ledger transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        debug!(customer_id = self.customer_id, "Ledger transaction rolled back");
        Ok(())
    }
}

/// Settings rows keyed by their fixed key, stored as JSON like the persistent store does.
#[derive(Default, Clone)]
pub struct InMemorySettingsStore {
    rows: Arc<RwLock<HashMap<&'static str, serde_json::Value>>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn load<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>> {
        let rows = self.rows.read().await;
        match rows.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    async fn save<T: Serialize + Sync>(&self, key: &'static str, settings: &T) -> Result<()> {
        let value = serde_json::to_value(settings)?;
        let mut rows = self.rows.write().await;
        rows.insert(key, value);
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn invoice_settings(&self) -> Result<Option<InvoiceSettings>> {
        self.load(INVOICE_SETTINGS_KEY).await
    }

    async fn upsert_invoice_settings(&self, settings: InvoiceSettings) -> Result<()> {
        self.save(INVOICE_SETTINGS_KEY, &settings).await
    }

    async fn sms_settings(&self) -> Result<Option<SmsSettings>> {
        self.load(SMS_SETTINGS_KEY).await
    }

    async fn upsert_sms_settings(&self, settings: SmsSettings) -> Result<()> {
        self.save(SMS_SETTINGS_KEY, &settings).await
    }
}
