use crate::domain::invoice::Invoice;
use crate::domain::{CustomerId, InvoiceId};
use crate::error::{CourierError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// An invoice row as exported by invoice generation. Status is not read; it
/// is derived from the amounts.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceRow {
    pub id: InvoiceId,
    pub customer: CustomerId,
    pub number: String,
    pub date: NaiveDate,
    pub net_amount: Decimal,
    #[serde(default)]
    pub amount_paid: Option<Decimal>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = CourierError;

    fn try_from(row: InvoiceRow) -> Result<Self> {
        Invoice::new(
            row.id,
            row.customer,
            row.number,
            row.date,
            row.net_amount,
            row.amount_paid.unwrap_or(Decimal::ZERO),
        )
    }
}

#[derive(Serialize)]
struct InvoiceLine<'a> {
    invoice: InvoiceId,
    customer: CustomerId,
    number: &'a str,
    date: NaiveDate,
    net_amount: Decimal,
    amount_paid: Decimal,
    status: &'static str,
}

/// Writes invoice state as CSV, ordered by invoice id.
pub struct InvoiceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> InvoiceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_invoices(&mut self, mut invoices: Vec<Invoice>) -> Result<()> {
        invoices.sort_by_key(|i| i.id);
        for invoice in &invoices {
            self.writer.serialize(InvoiceLine {
                invoice: invoice.id,
                customer: invoice.customer_id,
                number: &invoice.invoice_number,
                date: invoice.invoice_date,
                net_amount: invoice.net_amount().normalize(),
                amount_paid: invoice.amount_paid().normalize(),
                status: invoice.payment_status().as_str(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
