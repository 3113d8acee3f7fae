use crate::application::sector;
use crate::domain::CustomerId;
use crate::domain::pricing::{PricingPolicy, calculate_freight};
use crate::domain::ports::{RateCardStoreBox, ReferenceStoreBox};
use crate::domain::rate_card::SectorRateCard;
use crate::domain::sector::SectorName;
use crate::domain::shipment::{FreightQuote, QuoteRequest};
use crate::error::{CourierError, Result};
use tracing::{info, instrument};

/// Answers `calculate-rate` requests.
///
/// Read-only: it resolves the sector, fetches the customer's rate card and
/// prices the shipment. Concurrent quotes do not interact.
pub struct PricingEngine {
    rate_cards: RateCardStoreBox,
    references: ReferenceStoreBox,
    policy: PricingPolicy,
}

impl PricingEngine {
    pub fn new(rate_cards: RateCardStoreBox, references: ReferenceStoreBox) -> Self {
        Self::with_policy(rate_cards, references, PricingPolicy::default())
    }

    /// Creates an engine with a non-default surcharge policy.
    ///
    /// # Arguments
    ///
    /// * `rate_cards` - Store holding one card per (customer, sector).
    /// * `references` - State and pincode registry used for sector resolution.
    /// * `policy` - Waybill surcharge provider, threshold and rate.
    pub fn with_policy(
        rate_cards: RateCardStoreBox,
        references: ReferenceStoreBox,
        policy: PricingPolicy,
    ) -> Self {
        Self {
            rate_cards,
            references,
            policy,
        }
    }

    pub async fn resolve_sector(&self, pincode: Option<&str>, state: Option<&str>) -> Result<SectorName> {
        sector::resolve_sector(&*self.references, pincode, state).await
    }

    /// The card for `(customer_id, sector)`, or `RateNotFound`.
    pub async fn rate_card(&self, customer_id: CustomerId, sector: SectorName) -> Result<SectorRateCard> {
        self.rate_cards
            .find(customer_id, sector)
            .await?
            .ok_or(CourierError::RateNotFound {
                customer_id,
                sector,
            })
    }

    #[instrument(skip(self, request), fields(customer_id = ?request.customer_id))]
    pub async fn quote(&self, request: &QuoteRequest) -> Result<FreightQuote> {
        let shipment = request.validate()?;
        let sector = self
            .resolve_sector(shipment.destination_pincode.as_deref(), shipment.state.as_deref())
            .await?;
        let card = self.rate_card(shipment.customer_id, sector).await?;

        let charges = calculate_freight(
            &card,
            shipment.weight,
            shipment.mode,
            shipment.is_dox,
            shipment.invoice_value,
            &self.policy,
        )?;
        let quote = FreightQuote::new(sector, charges);

        info!(
            %sector,
            weight = %shipment.weight,
            mode = ?shipment.mode,
            freight_charge = %quote.freight_charge,
            waybill_surcharge = %quote.waybill_surcharge,
            "Freight quoted"
        );
        Ok(quote)
    }
}
