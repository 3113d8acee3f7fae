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
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info};

/// Column Family for rate cards, keyed by customer id + sector label.
pub const CF_RATE_CARDS: &str = "rate_cards";
/// Column Family for the state registry, keyed by lowercased state name.
pub const CF_STATES: &str = "states";
/// Column Family mapping pincodes to state names.
pub const CF_PINCODES: &str = "pincodes";
/// Column Family for invoices, keyed by invoice id.
pub const CF_INVOICES: &str = "invoices";
/// Index of invoice ids per customer: customer id + invoice id -> empty.
pub const CF_CUSTOMER_INVOICES: &str = "customer_invoices";
/// Column Family for payments, keyed by payment id.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family for payment-on-invoice links: payment id + invoice id.
pub const CF_ALLOCATIONS: &str = "allocations";
/// Column Family for settings rows under their fixed keys.
pub const CF_SETTINGS: &str = "settings";

const COLUMN_FAMILIES: [&str; 8] = [
    CF_RATE_CARDS,
    CF_STATES,
    CF_PINCODES,
    CF_INVOICES,
    CF_CUSTOMER_INVOICES,
    CF_PAYMENTS,
    CF_ALLOCATIONS,
    CF_SETTINGS,
];

/// A persistent store implementing every port on top of RocksDB.
///
/// Ledger transactions stage their writes and commit them as a single
/// `WriteBatch`, which RocksDB applies atomically.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    next_payment_id: Arc<AtomicU64>,
    locks: CustomerLocks,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating any
    /// missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()));
        let db = DB::open_cf_descriptors(&opts, path.as_ref(), descriptors)?;

        let last_payment_id = {
            let cf = column_family(&db, CF_PAYMENTS)?;
            match db.iterator_cf(cf, IteratorMode::End).next() {
                Some(item) => {
                    let (key, _) = item?;
                    decode_u64(&key)?
                }
                None => 0,
            }
        };
        info!(path = %path.as_ref().display(), last_payment_id, "RocksDB store opened");

        Ok(Self {
            db: Arc::new(db),
            next_payment_id: Arc::new(AtomicU64::new(last_payment_id)),
            locks: CustomerLocks::new(),
        })
    }
}

fn column_family<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily> {
    db.cf_handle(name).ok_or_else(|| {
        CourierError::PersistenceFailure(format!("column family '{name}' not found"))
    })
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| CourierError::PersistenceFailure(format!("serialization error: {e}")))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| CourierError::PersistenceFailure(format!("deserialization error: {e}")))
}

fn decode_u64(key: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| CourierError::PersistenceFailure("malformed payment key".to_string()))?;
    Ok(u64::from_be_bytes(bytes))
}

fn rate_card_key(customer_id: CustomerId, sector: SectorName) -> Vec<u8> {
    let mut key = customer_id.to_be_bytes().to_vec();
    key.extend_from_slice(sector.as_str().as_bytes());
    key
}

fn customer_invoice_key(customer_id: CustomerId, invoice_id: InvoiceId) -> [u8; 8] {
    let mut key = [0u8; 8];
    key[..4].copy_from_slice(&customer_id.to_be_bytes());
    key[4..].copy_from_slice(&invoice_id.to_be_bytes());
    key
}

fn allocation_key(payment_id: PaymentId, invoice_id: InvoiceId) -> [u8; 12] {
    let mut key = [0u8; 12];
    key[..8].copy_from_slice(&payment_id.to_be_bytes());
    key[8..].copy_from_slice(&invoice_id.to_be_bytes());
    key
}

/// Values of every key in `cf_name` that starts with `prefix`.
fn scan_prefix<T: DeserializeOwned>(db: &DB, cf_name: &str, prefix: &[u8]) -> Result<Vec<(Box<[u8]>, Option<T>)>> {
    let cf = column_family(db, cf_name)?;
    let mut found = Vec::new();
    for item in db.iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward)) {
        let (key, value) = item?;
        if !key.starts_with(prefix) {
            break;
        }
        let decoded = if value.is_empty() { None } else { Some(decode(&value)?) };
        found.push((key, decoded));
    }
    Ok(found)
}

fn get_json<T: DeserializeOwned>(db: &DB, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
    let cf = column_family(db, cf_name)?;
    match db.get_cf(cf, key)? {
        Some(bytes) => Ok(Some(decode(&bytes)?)),
        None => Ok(None),
    }
}

fn put_json<T: Serialize>(db: &DB, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
    let cf = column_family(db, cf_name)?;
    db.put_cf(cf, key, encode(value)?)?;
    Ok(())
}

fn load_invoice(db: &DB, invoice_id: InvoiceId) -> Result<Option<Invoice>> {
    get_json(db, CF_INVOICES, &invoice_id.to_be_bytes())
}

fn load_customer_invoices(db: &DB, customer_id: CustomerId) -> Result<Vec<Invoice>> {
    let keys = scan_prefix::<()>(db, CF_CUSTOMER_INVOICES, &customer_id.to_be_bytes())?;
    let mut invoices = Vec::with_capacity(keys.len());
    for (key, _) in keys {
        let invoice_id = InvoiceId::from_be_bytes([key[4], key[5], key[6], key[7]]);
        if let Some(invoice) = load_invoice(db, invoice_id)? {
            invoices.push(invoice);
        }
    }
    sort_oldest_first(&mut invoices);
    Ok(invoices)
}

fn load_state(db: &DB, name: &str) -> Result<Option<StateRecord>> {
    get_json(db, CF_STATES, StateRecord::key(name).as_bytes())
}

#[async_trait]
impl RateCardStore for RocksDBStore {
    async fn upsert(&self, card: SectorRateCard) -> Result<()> {
        put_json(&self.db, CF_RATE_CARDS, &rate_card_key(card.customer_id, card.sector), &card)
    }

    async fn find(&self, customer_id: CustomerId, sector: SectorName) -> Result<Option<SectorRateCard>> {
        get_json(&self.db, CF_RATE_CARDS, &rate_card_key(customer_id, sector))
    }
}

#[async_trait]
impl ReferenceStore for RocksDBStore {
    async fn put_state(&self, state: StateRecord) -> Result<()> {
        put_json(&self.db, CF_STATES, StateRecord::key(&state.name).as_bytes(), &state)
    }

    async fn put_pincode(&self, entry: PincodeRecord) -> Result<()> {
        put_json(&self.db, CF_PINCODES, entry.pincode.trim().as_bytes(), &entry)
    }

    async fn state_for_pincode(&self, pincode: &str) -> Result<Option<StateRecord>> {
        let entry: Option<PincodeRecord> = get_json(&self.db, CF_PINCODES, pincode.trim().as_bytes())?;
        match entry {
            Some(entry) => load_state(&self.db, &entry.state),
            None => Ok(None),
        }
    }

    async fn find_state(&self, name: &str) -> Result<Option<StateRecord>> {
        load_state(&self.db, name)
    }
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn put_invoice(&self, invoice: Invoice) -> Result<()> {
        let invoices = column_family(&self.db, CF_INVOICES)?;
        let index = column_family(&self.db, CF_CUSTOMER_INVOICES)?;

        let previous = load_invoice(&self.db, invoice.id)?;
        let _guards = self
            .locks
            .acquire_all(previous.iter().map(|p| p.customer_id).chain([invoice.customer_id]))
            .await;

        let mut batch = WriteBatch::default();
        if let Some(previous) = previous
            && previous.customer_id != invoice.customer_id
        {
            batch.delete_cf(index, customer_invoice_key(previous.customer_id, previous.id));
        }
        batch.put_cf(index, customer_invoice_key(invoice.customer_id, invoice.id), b"");
        batch.put_cf(invoices, invoice.id.to_be_bytes(), encode(&invoice)?);
        self.db.write(batch)?;
        Ok(())
    }

    async fn invoice(&self, invoice_id: InvoiceId) -> Result<Option<Invoice>> {
        load_invoice(&self.db, invoice_id)
    }

    async fn invoices_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Invoice>> {
        load_customer_invoices(&self.db, customer_id)
    }

    async fn all_invoices(&self) -> Result<Vec<Invoice>> {
        let rows = scan_prefix::<Invoice>(&self.db, CF_INVOICES, &[])?;
        Ok(rows.into_iter().filter_map(|(_, invoice)| invoice).collect())
    }

    async fn payment(&self, payment_id: PaymentId) -> Result<Option<CustomerPayment>> {
        get_json(&self.db, CF_PAYMENTS, &payment_id.to_be_bytes())
    }

    async fn allocations_for_payment(&self, payment_id: PaymentId) -> Result<Vec<PaymentOnInvoice>> {
        let rows = scan_prefix::<PaymentOnInvoice>(&self.db, CF_ALLOCATIONS, &payment_id.to_be_bytes())?;
        Ok(rows.into_iter().filter_map(|(_, allocation)| allocation).collect())
    }

    async fn begin(&self, customer_id: CustomerId) -> Result<Box<dyn LedgerTransaction>> {
        let guard = self.locks.acquire(customer_id).await;
        debug!(customer_id, "Ledger transaction opened");
        Ok(Box::new(RocksDBLedgerTransaction {
            db: self.db.clone(),
            next_payment_id: self.next_payment_id.clone(),
            customer_id,
            payments: Vec::new(),
            invoices: BTreeMap::new(),
            allocations: Vec::new(),
            _guard: guard,
        }))
    }
}

pub struct RocksDBLedgerTransaction {
    db: Arc<DB>,
    next_payment_id: Arc<AtomicU64>,
    customer_id: CustomerId,
    payments: Vec<CustomerPayment>,
    invoices: BTreeMap<InvoiceId, Invoice>,
    allocations: Vec<PaymentOnInvoice>,
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl LedgerTransaction for RocksDBLedgerTransaction {
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
        let mut invoices: Vec<Invoice> = load_customer_invoices(&self.db, self.customer_id)?
            .into_iter()
            .map(|i| self.invoices.get(&i.id).cloned().unwrap_or(i))
            .filter(Invoice::is_outstanding)
            .collect();
        sort_oldest_first(&mut invoices);
        Ok(invoices)
    }

    async fn update_invoice(&mut self, invoice: &Invoice) -> Result<()> {
        let known = load_invoice(&self.db, invoice.id)?
            .is_some_and(|stored| stored.customer_id == self.customer_id);
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
        let payments_cf = column_family(&self.db, CF_PAYMENTS)?;
        let invoices_cf = column_family(&self.db, CF_INVOICES)?;
        let allocations_cf = column_family(&self.db, CF_ALLOCATIONS)?;

        let mut batch = WriteBatch::default();
        for payment in &self.payments {
            batch.put_cf(payments_cf, payment.id.to_be_bytes(), encode(payment)?);
        }
        for invoice in self.invoices.values() {
            batch.put_cf(invoices_cf, invoice.id.to_be_bytes(), encode(invoice)?);
        }
        for allocation in &self.allocations {
            batch.put_cf(
                allocations_cf,
                allocation_key(allocation.payment_id, allocation.invoice_id),
                encode(allocation)?,
            );
        }
        self.db.write(batch)?;
        debug!(customer_id = self.customer_id, "Ledger transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        debug!(customer_id = self.customer_id, "Ledger transaction rolled back");
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for RocksDBStore {
    async fn invoice_settings(&self) -> Result<Option<InvoiceSettings>> {
        get_json(&self.db, CF_SETTINGS, INVOICE_SETTINGS_KEY.as_bytes())
    }

    async fn upsert_invoice_settings(&self, settings: InvoiceSettings) -> Result<()> {
        put_json(&self.db, CF_SETTINGS, INVOICE_SETTINGS_KEY.as_bytes(), &settings)
    }

    async fn sms_settings(&self) -> Result<Option<SmsSettings>> {
        get_json(&self.db, CF_SETTINGS, SMS_SETTINGS_KEY.as_bytes())
    }

    async fn upsert_sms_settings(&self, settings: SmsSettings) -> Result<()> {
        put_json(&self.db, CF_SETTINGS, SMS_SETTINGS_KEY.as_bytes(), &settings)
    }
}
