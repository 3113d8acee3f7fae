use crate::domain::money::Amount;
use crate::domain::payment::{AllocationOutcome, NewPayment, PaymentOnInvoice, PaymentRequest};
use crate::domain::ports::{LedgerStoreBox, LedgerTransaction};
use crate::error::Result;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

/// Records customer payments and settles outstanding invoices oldest-first.
///
/// Every allocation runs inside one ledger transaction: the payment, the
/// invoice updates and the payment-on-invoice links are committed together or
/// not at all.
pub struct PaymentAllocator {
    ledger: LedgerStoreBox,
}

impl PaymentAllocator {
    /// Creates an allocator over a ledger.
    ///
    /// # Arguments
    ///
    /// * `ledger` - Store of invoices, payments and allocation links. Its
    ///   `begin` must serialize transactions per customer.
    pub fn new(ledger: LedgerStoreBox) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &LedgerStoreBox {
        &self.ledger
    }

    #[instrument(skip(self, request), fields(customer_id = request.customer_id, amount = %request.amount))]
    pub async fn allocate(&self, request: PaymentRequest) -> Result<AllocationOutcome> {
        let amount = Amount::new(request.amount)?;
        let payment = NewPayment {
            customer_id: request.customer_id,
            amount,
            payment_date: request.payment_date,
            method: request.method,
            reference: request.reference,
            image: request.image,
        };

        let mut tx = self.ledger.begin(payment.customer_id).await?;
        match apply_payment(&mut *tx, payment).await {
            Ok(outcome) => {
                tx.commit().await?;
                info!(
                    payment_id = outcome.payment_id,
                    invoices_updated = outcome.invoices_updated,
                    unallocated = %outcome.unallocated,
                    "Payment allocated"
                );
                if outcome.unallocated > Decimal::ZERO {
                    warn!(
                        payment_id = outcome.payment_id,
                        unallocated = %outcome.unallocated,
                        "Payment exceeds outstanding invoices; remainder left unallocated"
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback after failed allocation also failed");
                }
                Err(e)
            }
        }
    }
}

async fn apply_payment(tx: &mut dyn LedgerTransaction, payment: NewPayment) -> Result<AllocationOutcome> {
    let payment = tx.insert_payment(payment).await?;
    let mut remaining = payment.amount.value();
    let mut allocations = Vec::new();

    for mut invoice in tx.outstanding_invoices().await? {
        if remaining <= Decimal::ZERO {
            break;
        }
        let applied = invoice.apply_payment(remaining);
        if applied <= Decimal::ZERO {
            continue;
        }

        let allocation = PaymentOnInvoice {
            payment_id: payment.id,
            invoice_id: invoice.id,
            amount_applied: applied,
        };
        tx.insert_allocation(allocation).await?;
        tx.update_invoice(&invoice).await?;
        remaining -= applied;
        allocations.push(allocation);

        debug!(
            invoice_id = invoice.id,
            applied = %applied,
            status = %invoice.payment_status(),
            "Invoice settled"
        );
    }

    Ok(AllocationOutcome {
        payment_id: payment.id,
        invoices_updated: allocations.len(),
        unallocated: remaining,
        allocations,
    })
}
