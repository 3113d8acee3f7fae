use clap::{Parser, Subcommand};
use freightdesk::application::allocation::PaymentAllocator;
use freightdesk::application::pricing::PricingEngine;
use freightdesk::application::settings::SettingsService;
use freightdesk::domain::invoice::Invoice;
use freightdesk::domain::payment::PaymentRequest;
use freightdesk::domain::ports::{LedgerStoreBox, RateCardStoreBox, ReferenceStoreBox, SettingsStoreBox};
use freightdesk::domain::rate_card::SectorRateCard;
use freightdesk::domain::reference::{PincodeRecord, StateRecord};
use freightdesk::domain::settings::Settings;
use freightdesk::domain::shipment::QuoteRequest;
use freightdesk::infrastructure::in_memory::{
    InMemoryLedger, InMemoryRateCardStore, InMemoryReferenceStore, InMemorySettingsStore,
};
#[cfg(feature = "storage-rocksdb")]
use freightdesk::infrastructure::rocksdb::RocksDBStore;
use freightdesk::interfaces::csv::invoice_csv::{InvoiceRow, InvoiceWriter};
use freightdesk::interfaces::csv::quote_writer::QuoteWriter;
use freightdesk::interfaces::csv::record_reader::RecordReader;
use freightdesk::telemetry::init_tracing;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price shipment requests and print one quote per request
    Quote {
        /// Quote requests CSV file
        requests: PathBuf,
        /// Sector rate cards to load first
        #[arg(long)]
        rates: Option<PathBuf>,
        /// State registry to load first
        #[arg(long)]
        states: Option<PathBuf>,
        /// Pincode to state mapping to load first
        #[arg(long)]
        pincodes: Option<PathBuf>,
    },
    /// Allocate customer payments against outstanding invoices and print the invoices
    Allocate {
        /// Payments CSV file
        payments: PathBuf,
        /// Invoices to load first
        #[arg(long)]
        invoices: Option<PathBuf>,
    },
    /// Upsert invoice and SMS settings from a JSON file and print what is stored
    Settings {
        /// Settings JSON file
        file: PathBuf,
    },
}

struct Stores {
    rate_cards: RateCardStoreBox,
    references: ReferenceStoreBox,
    ledger: LedgerStoreBox,
    settings: SettingsStoreBox,
}

impl Stores {
    fn in_memory() -> Self {
        Self {
            rate_cards: Box::new(InMemoryRateCardStore::new()),
            references: Box::new(InMemoryReferenceStore::new()),
            ledger: Box::new(InMemoryLedger::new()),
            settings: Box::new(InMemorySettingsStore::new()),
        }
    }

    fn open(db_path: Option<PathBuf>) -> Result<Self> {
        match db_path {
            #[cfg(feature = "storage-rocksdb")]
            Some(path) => {
                let store = RocksDBStore::open(path).into_diagnostic()?;
                Ok(Self {
                    rate_cards: Box::new(store.clone()),
                    references: Box::new(store.clone()),
                    ledger: Box::new(store.clone()),
                    settings: Box::new(store),
                })
            }
            #[cfg(not(feature = "storage-rocksdb"))]
            Some(_) => {
                warn!(
                    "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
                );
                Ok(Self::in_memory())
            }
            None => Ok(Self::in_memory()),
        }
    }
}

fn read_records<T: DeserializeOwned>(
    path: PathBuf,
) -> Result<impl Iterator<Item = freightdesk::error::Result<T>>> {
    let file = File::open(&path)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot open {}", path.display()))?;
    Ok(RecordReader::new(file).records())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)
        .into_diagnostic()
        .wrap_err("cannot install the log subscriber")?;

    let stores = Stores::open(cli.db_path)?;

    match cli.command {
        Command::Quote {
            requests,
            rates,
            states,
            pincodes,
        } => quote(stores, requests, rates, states, pincodes).await,
        Command::Allocate { payments, invoices } => allocate(stores, payments, invoices).await,
        Command::Settings { file } => settings(stores, file).await,
    }
}

async fn quote(
    stores: Stores,
    requests: PathBuf,
    rates: Option<PathBuf>,
    states: Option<PathBuf>,
    pincodes: Option<PathBuf>,
) -> Result<()> {
    if let Some(path) = rates {
        for card in read_records::<SectorRateCard>(path)? {
            match card {
                Ok(card) => stores.rate_cards.upsert(card).await.into_diagnostic()?,
                Err(e) => warn!(error = %e, "Skipping rate card row"),
            }
        }
    }
    if let Some(path) = states {
        for state in read_records::<StateRecord>(path)? {
            match state {
                Ok(state) => stores.references.put_state(state).await.into_diagnostic()?,
                Err(e) => warn!(error = %e, "Skipping state row"),
            }
        }
    }
    if let Some(path) = pincodes {
        for entry in read_records::<PincodeRecord>(path)? {
            match entry {
                Ok(entry) => stores.references.put_pincode(entry).await.into_diagnostic()?,
                Err(e) => warn!(error = %e, "Skipping pincode row"),
            }
        }
    }

    let engine = PricingEngine::new(stores.rate_cards, stores.references);
    let mut writer = QuoteWriter::new(io::stdout());
    for request in read_records::<QuoteRequest>(requests)? {
        match request {
            Ok(request) => match engine.quote(&request).await {
                Ok(quote) => writer.write_quote(&request, &quote).into_diagnostic()?,
                Err(e) => warn!(error = %e, "Skipping quote request"),
            },
            Err(e) => warn!(error = %e, "Error reading quote request"),
        }
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}

async fn allocate(stores: Stores, payments: PathBuf, invoices: Option<PathBuf>) -> Result<()> {
    if let Some(path) = invoices {
        for row in read_records::<InvoiceRow>(path)? {
            match row.and_then(Invoice::try_from) {
                Ok(invoice) => stores.ledger.put_invoice(invoice).await.into_diagnostic()?,
                Err(e) => warn!(error = %e, "Skipping invoice row"),
            }
        }
    }

    let allocator = PaymentAllocator::new(stores.ledger);
    for request in read_records::<PaymentRequest>(payments)? {
        match request {
            Ok(request) => {
                if let Err(e) = allocator.allocate(request).await {
                    warn!(error = %e, "Skipping payment");
                }
            }
            Err(e) => warn!(error = %e, "Error reading payment"),
        }
    }

    let invoices = allocator.ledger().all_invoices().await.into_diagnostic()?;
    let mut writer = InvoiceWriter::new(io::stdout());
    writer.write_invoices(invoices).into_diagnostic()?;
    Ok(())
}

async fn settings(stores: Stores, file: PathBuf) -> Result<()> {
    let source = File::open(&file)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot open {}", file.display()))?;
    let changes: Settings = serde_json::from_reader(source).into_diagnostic()?;

    let service = SettingsService::new(stores.settings);
    let current = service.apply(changes).await.into_diagnostic()?;
    println!("{}", serde_json::to_string_pretty(&current).into_diagnostic()?);
    Ok(())
}
