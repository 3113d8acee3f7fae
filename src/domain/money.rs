use crate::error::CourierError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A strictly positive money amount received from a customer.
///
/// Payment allocation only ever works with an `Amount`, so a zero or negative
/// receipt is rejected before anything is written.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, CourierError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(CourierError::InvalidAmount(format!(
                "payment amount must be positive, got {value}"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = CourierError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Reads a nullable rate field, treating an unset rate as zero.
pub fn rate_or_zero(field: Option<Decimal>) -> Decimal {
    field.unwrap_or(Decimal::ZERO)
}
