use super::sector::SectorName;
use serde::{Deserialize, Serialize};

/// An entry in the state registry. A state without a sector falls through to
/// the static table during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    pub name: String,
    #[serde(default)]
    pub sector: Option<SectorName>,
}

impl StateRecord {
    pub fn new(name: impl Into<String>, sector: Option<SectorName>) -> Self {
        Self {
            name: name.into(),
            sector,
        }
    }

    /// Registry key: case-insensitive, surrounding whitespace ignored.
    pub fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PincodeRecord {
    pub pincode: String,
    pub state: String,
}

impl PincodeRecord {
    pub fn new(pincode: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            pincode: pincode.into(),
            state: state.into(),
        }
    }
}
