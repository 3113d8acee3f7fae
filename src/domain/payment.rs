use super::money::Amount;
use super::{CustomerId, InvoiceId, PaymentId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Cheque,
    BankTransfer,
    Upi,
    Card,
    Other,
}

/// A payment as submitted by a caller, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentRequest {
    #[serde(rename = "customer")]
    pub customer_id: CustomerId,
    pub amount: Decimal,
    #[serde(rename = "date")]
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A payment ready to be inserted; the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub customer_id: CustomerId,
    pub amount: Amount,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub image: Option<String>,
}

impl NewPayment {
    pub fn into_payment(self, id: PaymentId) -> CustomerPayment {
        CustomerPayment {
            id,
            customer_id: self.customer_id,
            amount: self.amount,
            payment_date: self.payment_date,
            method: self.method,
            reference: self.reference,
            image: self.image,
        }
    }
}

/// A recorded money receipt. Never modified after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerPayment {
    pub id: PaymentId,
    pub customer_id: CustomerId,
    pub amount: Amount,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub image: Option<String>,
}

/// The part of one payment applied to one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOnInvoice {
    pub payment_id: PaymentId,
    pub invoice_id: InvoiceId,
    pub amount_applied: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    pub payment_id: PaymentId,
    pub invoices_updated: usize,
    /// Left over after every outstanding invoice was settled. Not stored anywhere.
    pub unallocated: Decimal,
    pub allocations: Vec<PaymentOnInvoice>,
}

impl AllocationOutcome {
    pub fn applied(&self) -> Decimal {
        self.allocations.iter().map(|a| a.amount_applied).sum()
    }
}
