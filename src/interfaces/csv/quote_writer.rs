use crate::domain::CustomerId;
use crate::domain::shipment::{FreightQuote, QuoteRequest};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct QuoteLine<'a> {
    customer: Option<CustomerId>,
    pincode: Option<&'a str>,
    state: Option<&'a str>,
    sector: &'static str,
    freight_charge: Decimal,
    waybill_surcharge: Decimal,
    other_expense: Decimal,
    total: Decimal,
}

/// Writes one CSV line per priced request.
pub struct QuoteWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> QuoteWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_quote(&mut self, request: &QuoteRequest, quote: &FreightQuote) -> Result<()> {
        self.writer.serialize(QuoteLine {
            customer: request.customer_id,
            pincode: request.destination_pincode.as_deref(),
            state: request.state.as_deref(),
            sector: quote.sector.as_str(),
            freight_charge: quote.freight_charge.normalize(),
            waybill_surcharge: quote.waybill_surcharge.normalize(),
            other_expense: quote.other_expense.normalize(),
            total: quote.total().normalize(),
        })?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
