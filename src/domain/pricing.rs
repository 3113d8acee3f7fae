//! Freight and surcharge rules.
//!
//! These functions are pure: they take a rate card and shipment attributes and
//! return money. Looking up the card is the job of
//! [`crate::application::pricing::PricingEngine`].

use super::Weight;
use super::money::rate_or_zero;
use super::rate_card::SectorRateCard;
use super::shipment::{FreightCharges, ShipmentMode};
use crate::error::{CourierError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const HALF_KG: Decimal = dec!(0.5);
const QUARTER_KG: Decimal = dec!(0.25);
const TENTH_KG: Decimal = dec!(0.1);

/// Knobs for the value-based waybill surcharge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Only cards for this provider attract the surcharge.
    pub surcharge_provider: String,
    /// Invoice values strictly above this attract the surcharge.
    pub surcharge_threshold: Decimal,
    pub surcharge_rate: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            surcharge_provider: "DTDC".to_string(),
            surcharge_threshold: dec!(49999),
            surcharge_rate: dec!(0.002),
        }
    }
}

/// Flat `base_rate` up to `base_weight`, then `increment_rate` for every
/// started `increment_size` beyond it.
///
/// # Arguments
///
/// * `weight` - Shipment weight in kilograms. Zero or less prices to zero.
/// * `base_rate` - Charge for anything up to `base_weight`.
/// * `base_weight` - Weight covered by `base_rate`.
/// * `increment_rate` - Charge per started increment above `base_weight`.
/// * `increment_size` - Size of one increment in kilograms.
///
/// Fails with `InvalidWeight` when the charge does not fit in a `Decimal`.
pub fn calculate_slab_rate(
    weight: Weight,
    base_rate: Decimal,
    base_weight: Weight,
    increment_rate: Decimal,
    increment_size: Weight,
) -> Result<Decimal> {
    if weight <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    if weight <= base_weight {
        return Ok(base_rate);
    }
    weight
        .checked_sub(base_weight)
        .and_then(|excess| excess.checked_div(increment_size))
        .map(|increments| increments.ceil())
        .and_then(|increments| increment_rate.checked_mul(increments))
        .and_then(|extra| base_rate.checked_add(extra))
        .ok_or(CourierError::InvalidWeight(weight))
}

/// Freight charge for one shipment, without the surcharge.
pub fn freight_charge(card: &SectorRateCard, weight: Weight, mode: ShipmentMode, is_dox: bool) -> Result<Decimal> {
    if mode == ShipmentMode::Premium {
        return if weight <= QUARTER_KG {
            Ok(rate_or_zero(card.premium_upto250g))
        } else {
            calculate_slab_rate(
                weight,
                rate_or_zero(card.premium_upto500g),
                HALF_KG,
                rate_or_zero(card.premium_add500g),
                HALF_KG,
            )
        };
    }

    if is_dox {
        return if weight <= TENTH_KG {
            Ok(rate_or_zero(card.dox_upto100g))
        } else if weight <= QUARTER_KG {
            Ok(rate_or_zero(card.dox_upto250g))
        } else {
            calculate_slab_rate(
                weight,
                rate_or_zero(card.dox_upto500g),
                HALF_KG,
                rate_or_zero(card.dox_add500g),
                HALF_KG,
            )
        };
    }

    match card.bulk_rates(mode) {
        Some(rates) => {
            let rate = rates.rate_for(weight);
            let chargeable = weight.ceil().max(rates.min_weight());
            rate.checked_mul(chargeable)
                .ok_or(CourierError::InvalidWeight(weight))
        }
        None => Ok(Decimal::ZERO),
    }
}

pub fn waybill_surcharge(card: &SectorRateCard, invoice_value: Decimal, policy: &PricingPolicy) -> Result<Decimal> {
    let provider_matches = card
        .service_provider
        .as_deref()
        .is_some_and(|p| p.trim().eq_ignore_ascii_case(&policy.surcharge_provider));

    if provider_matches && invoice_value > policy.surcharge_threshold {
        invoice_value.checked_mul(policy.surcharge_rate).ok_or_else(|| {
            CourierError::InvalidAmount(format!("invoice value {invoice_value} is too large to surcharge"))
        })
    } else {
        Ok(Decimal::ZERO)
    }
}

/// Both charges for one shipment. Their sum is guaranteed to fit in a `Decimal`.
pub fn calculate_freight(
    card: &SectorRateCard,
    weight: Weight,
    mode: ShipmentMode,
    is_dox: bool,
    invoice_value: Decimal,
    policy: &PricingPolicy,
) -> Result<FreightCharges> {
    let freight_charge = freight_charge(card, weight, mode, is_dox)?;
    let waybill_surcharge = waybill_surcharge(card, invoice_value, policy)?;
    if freight_charge.checked_add(waybill_surcharge).is_none() {
        return Err(CourierError::InvalidAmount(format!(
            "freight {freight_charge} plus surcharge {waybill_surcharge} overflows"
        )));
    }
    Ok(FreightCharges {
        freight_charge,
        waybill_surcharge,
    })
}
