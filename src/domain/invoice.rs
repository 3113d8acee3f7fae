use super::{CustomerId, InvoiceId};
use crate::error::{CourierError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::PartiallyPaid => "PARTIALLY_PAID",
            PaymentStatus::Paid => "PAID",
        }
    }

    /// Status implied by the two invoice amounts.
    pub fn derive(net_amount: Decimal, amount_paid: Decimal) -> Self {
        if amount_paid >= net_amount {
            PaymentStatus::Paid
        } else if amount_paid > Decimal::ZERO {
            PaymentStatus::PartiallyPaid
        } else {
            PaymentStatus::Unpaid
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer invoice as seen by payment allocation.
///
/// `amount_paid` never exceeds `net_amount` and `payment_status` always
/// matches the two amounts; both are enforced by [`Invoice::new`] and
/// [`Invoice::apply_payment`], the only ways to change them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub customer_id: CustomerId,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    net_amount: Decimal,
    amount_paid: Decimal,
    payment_status: PaymentStatus,
}

impl Invoice {
    pub fn new(
        id: InvoiceId,
        customer_id: CustomerId,
        invoice_number: impl Into<String>,
        invoice_date: NaiveDate,
        net_amount: Decimal,
        amount_paid: Decimal,
    ) -> Result<Self> {
        if net_amount < Decimal::ZERO {
            return Err(CourierError::ValidationError(format!(
                "invoice {id}: net amount {net_amount} is negative"
            )));
        }
        if amount_paid < Decimal::ZERO || amount_paid > net_amount {
            return Err(CourierError::ValidationError(format!(
                "invoice {id}: amount paid {amount_paid} outside 0..={net_amount}"
            )));
        }
        Ok(Self {
            id,
            customer_id,
            invoice_number: invoice_number.into(),
            invoice_date,
            net_amount,
            amount_paid,
            payment_status: PaymentStatus::derive(net_amount, amount_paid),
        })
    }

    pub fn net_amount(&self) -> Decimal {
        self.net_amount
    }

    pub fn amount_paid(&self) -> Decimal {
        self.amount_paid
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn amount_due(&self) -> Decimal {
        self.net_amount - self.amount_paid
    }

    pub fn is_outstanding(&self) -> bool {
        matches!(
            self.payment_status,
            PaymentStatus::Unpaid | PaymentStatus::PartiallyPaid
        )
    }

    /// Applies up to `available` to this invoice and returns what was applied.
    pub fn apply_payment(&mut self, available: Decimal) -> Decimal {
        let applied = available.min(self.amount_due()).max(Decimal::ZERO);
        if applied > Decimal::ZERO {
            self.amount_paid += applied;
            self.payment_status = PaymentStatus::derive(self.net_amount, self.amount_paid);
        }
        applied
    }
}

/// Oldest debt first; invoice id breaks ties on the same date.
pub fn sort_oldest_first(invoices: &mut [Invoice]) {
    invoices.sort_by(|a, b| {
        a.invoice_date
            .cmp(&b.invoice_date)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_status_derivation() {
        assert_eq!(PaymentStatus::derive(dec!(100), dec!(0)), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::derive(dec!(100), dec!(1)), PaymentStatus::PartiallyPaid);
        assert_eq!(PaymentStatus::derive(dec!(100), dec!(100)), PaymentStatus::Paid);
    }

    #[test]
    fn test_new_rejects_overpaid_invoice() {
        assert!(matches!(
            Invoice::new(1, 1, "INV-1", date(1), dec!(100), dec!(101)),
            Err(CourierError::ValidationError(_))
        ));
        assert!(matches!(
            Invoice::new(1, 1, "INV-1", date(1), dec!(100), dec!(-1)),
            Err(CourierError::ValidationError(_))
        ));
    }

    #[test]
    fn test_apply_payment_caps_at_due() {
        let mut invoice = Invoice::new(1, 1, "INV-1", date(1), dec!(1000), dec!(400)).unwrap();
        assert_eq!(invoice.payment_status(), PaymentStatus::PartiallyPaid);

        let applied = invoice.apply_payment(dec!(900));
        assert_eq!(applied, dec!(600));
        assert_eq!(invoice.amount_paid(), dec!(1000));
        assert_eq!(invoice.payment_status(), PaymentStatus::Paid);
        assert!(!invoice.is_outstanding());

        assert_eq!(invoice.apply_payment(dec!(10)), dec!(0));
    }

    #[test]
    fn test_partial_payment() {
        let mut invoice = Invoice::new(1, 1, "INV-1", date(1), dec!(500), dec!(0)).unwrap();
        assert_eq!(invoice.apply_payment(dec!(120.50)), dec!(120.50));
        assert_eq!(invoice.amount_due(), dec!(379.50));
        assert_eq!(invoice.payment_status(), PaymentStatus::PartiallyPaid);
    }

    #[test]
    fn test_sort_oldest_first() {
        let mut invoices = vec![
            Invoice::new(3, 1, "C", date(5), dec!(1), dec!(0)).unwrap(),
            Invoice::new(2, 1, "B", date(1), dec!(1), dec!(0)).unwrap(),
            Invoice::new(1, 1, "A", date(5), dec!(1), dec!(0)).unwrap(),
        ];
        sort_oldest_first(&mut invoices);
        let ids: Vec<_> = invoices.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
