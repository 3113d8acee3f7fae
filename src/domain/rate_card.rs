use super::CustomerId;
use super::money::rate_or_zero;
use super::sector::SectorName;
use super::shipment::ShipmentMode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-kg rates for one bulk mode, bracketed by weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkRates {
    pub min_weight: Option<Decimal>,
    pub upto10: Option<Decimal>,
    pub upto15: Option<Decimal>,
    pub upto20: Option<Decimal>,
    pub above20: Option<Decimal>,
}

impl BulkRates {
    /// Picks the per-kg rate for a raw (unrounded) weight.
    ///
    /// The 10kg and 15kg brackets only apply when their rate is set and
    /// nonzero; otherwise the next bracket up is tried.
    pub fn rate_for(&self, weight: Decimal) -> Decimal {
        let upto10 = rate_or_zero(self.upto10);
        let upto15 = rate_or_zero(self.upto15);
        if weight <= Decimal::TEN && !upto10.is_zero() {
            upto10
        } else if weight <= Decimal::from(15) && !upto15.is_zero() {
            upto15
        } else if weight <= Decimal::from(20) {
            rate_or_zero(self.upto20)
        } else {
            rate_or_zero(self.above20)
        }
    }

    pub fn min_weight(&self) -> Decimal {
        rate_or_zero(self.min_weight)
    }
}

/// All pricing rules for one (customer, sector) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorRateCard {
    #[serde(rename = "customer")]
    pub customer_id: CustomerId,
    pub sector: SectorName,
    pub service_provider: Option<String>,

    pub bulk_min_weight_surface: Option<Decimal>,
    pub bulk_min_weight_air: Option<Decimal>,
    pub surface_upto10: Option<Decimal>,
    pub surface_upto15: Option<Decimal>,
    pub surface_upto20: Option<Decimal>,
    pub surface_above20: Option<Decimal>,
    pub air_upto10: Option<Decimal>,
    pub air_upto15: Option<Decimal>,
    pub air_upto20: Option<Decimal>,
    pub air_above20: Option<Decimal>,

    pub dox_upto100g: Option<Decimal>,
    pub dox_upto250g: Option<Decimal>,
    pub dox_upto500g: Option<Decimal>,
    pub dox_add500g: Option<Decimal>,

    pub premium_upto250g: Option<Decimal>,
    pub premium_upto500g: Option<Decimal>,
    pub premium_add500g: Option<Decimal>,
}

impl SectorRateCard {
    /// An empty card; every rate reads as zero until set.
    pub fn new(customer_id: CustomerId, sector: SectorName) -> Self {
        Self {
            customer_id,
            sector,
            service_provider: None,
            bulk_min_weight_surface: None,
            bulk_min_weight_air: None,
            surface_upto10: None,
            surface_upto15: None,
            surface_upto20: None,
            surface_above20: None,
            air_upto10: None,
            air_upto15: None,
            air_upto20: None,
            air_above20: None,
            dox_upto100g: None,
            dox_upto250g: None,
            dox_upto500g: None,
            dox_add500g: None,
            premium_upto250g: None,
            premium_upto500g: None,
            premium_add500g: None,
        }
    }

    /// Bulk table for SURFACE or AIR. PREMIUM has no bulk table.
    pub fn bulk_rates(&self, mode: ShipmentMode) -> Option<BulkRates> {
        match mode {
            ShipmentMode::Surface => Some(BulkRates {
                min_weight: self.bulk_min_weight_surface,
                upto10: self.surface_upto10,
                upto15: self.surface_upto15,
                upto20: self.surface_upto20,
                above20: self.surface_above20,
            }),
            ShipmentMode::Air => Some(BulkRates {
                min_weight: self.bulk_min_weight_air,
                upto10: self.air_upto10,
                upto15: self.air_upto15,
                upto20: self.air_upto20,
                above20: self.air_above20,
            }),
            ShipmentMode::Premium => None,
        }
    }
}
