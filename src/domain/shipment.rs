use super::sector::SectorName;
use super::{CustomerId, Weight};
use crate::error::{CourierError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShipmentMode {
    #[serde(alias = "premium", alias = "Premium")]
    Premium,
    #[serde(alias = "surface", alias = "Surface")]
    Surface,
    #[serde(alias = "air", alias = "Air")]
    Air,
}

/// A `calculate-rate` request as it arrives from a booking form.
///
/// Fields are optional because callers send partial forms; [`QuoteRequest::validate`]
/// turns it into a [`Shipment`] or names the first missing field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuoteRequest {
    #[serde(rename = "customer")]
    pub customer_id: Option<CustomerId>,
    #[serde(rename = "pincode")]
    pub destination_pincode: Option<String>,
    pub state: Option<String>,
    pub weight: Option<Weight>,
    pub mode: Option<ShipmentMode>,
    #[serde(rename = "dox", default)]
    pub is_dox: bool,
    pub invoice_value: Option<Decimal>,
}

/// A validated shipment, ready for pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct Shipment {
    pub customer_id: CustomerId,
    pub destination_pincode: Option<String>,
    pub state: Option<String>,
    pub weight: Weight,
    pub mode: ShipmentMode,
    pub is_dox: bool,
    pub invoice_value: Decimal,
}

impl QuoteRequest {
    pub fn validate(&self) -> Result<Shipment> {
        let customer_id = self
            .customer_id
            .ok_or(CourierError::MissingRequiredField("customer"))?;
        let destination_pincode = non_blank(&self.destination_pincode);
        let state = non_blank(&self.state);
        if destination_pincode.is_none() && state.is_none() {
            return Err(CourierError::MissingRequiredField("destination"));
        }
        let weight = self
            .weight
            .ok_or(CourierError::MissingRequiredField("weight"))?;
        if weight <= Decimal::ZERO {
            return Err(CourierError::InvalidWeight(weight));
        }
        let mode = self.mode.ok_or(CourierError::MissingRequiredField("mode"))?;

        Ok(Shipment {
            customer_id,
            destination_pincode,
            state,
            weight,
            mode,
            is_dox: self.is_dox,
            invoice_value: self.invoice_value.unwrap_or(Decimal::ZERO),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Freight charge and waybill surcharge for one shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FreightCharges {
    pub freight_charge: Decimal,
    pub waybill_surcharge: Decimal,
}

/// The full pricing answer handed back to a booking flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreightQuote {
    pub sector: SectorName,
    pub freight_charge: Decimal,
    pub waybill_surcharge: Decimal,
    /// Always zero for now; booking forms fill it in by hand.
    pub other_expense: Decimal,
}

impl FreightQuote {
    pub fn new(sector: SectorName, charges: FreightCharges) -> Self {
        Self {
            sector,
            freight_charge: charges.freight_charge,
            waybill_surcharge: charges.waybill_surcharge,
            other_expense: Decimal::ZERO,
        }
    }

    pub fn total(&self) -> Decimal {
        self.freight_charge + self.waybill_surcharge + self.other_expense
    }
}
