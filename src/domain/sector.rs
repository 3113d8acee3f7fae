use crate::error::CourierError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse geographic pricing zone used as the rate-card key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SectorName {
    Local,
    Delhi,
    Up,
    BiharJharkhand,
    North,
    NorthEast,
    Metro,
    RestOfIndia,
}

impl SectorName {
    pub const ALL: [SectorName; 8] = [
        SectorName::Local,
        SectorName::Delhi,
        SectorName::Up,
        SectorName::BiharJharkhand,
        SectorName::North,
        SectorName::NorthEast,
        SectorName::Metro,
        SectorName::RestOfIndia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectorName::Local => "Local",
            SectorName::Delhi => "Delhi",
            SectorName::Up => "UP",
            SectorName::BiharJharkhand => "Bihar Jharkhand",
            SectorName::North => "North",
            SectorName::NorthEast => "North East",
            SectorName::Metro => "Metro",
            SectorName::RestOfIndia => "Rest of India",
        }
    }
}

impl fmt::Display for SectorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectorName {
    type Err = CourierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_state_name(s);
        SectorName::ALL
            .into_iter()
            .find(|sector| normalize_state_name(sector.as_str()) == wanted)
            .ok_or_else(|| CourierError::UnknownSector(s.to_string()))
    }
}

impl TryFrom<String> for SectorName {
    type Error = CourierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SectorName> for String {
    fn from(sector: SectorName) -> Self {
        sector.as_str().to_string()
    }
}

/// Lowercases and drops every non-alphanumeric character,
/// so "Jammu & Kashmir" and "jammu and-kashmir " differ only by "and".
pub fn normalize_state_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Hard-coded fallback used when neither the pincode nor the state registry
/// assigns a sector.
pub fn sector_from_state_name(name: &str) -> Option<SectorName> {
    let sector = match normalize_state_name(name).as_str() {
        "up" | "uttarpradesh" | "uttarakhand" | "uttaranchal" => SectorName::Up,
        "delhi" | "newdelhi" | "nctofdelhi" | "nctdelhi" => SectorName::Delhi,
        "bihar" | "jharkhand" => SectorName::BiharJharkhand,
        "haryana" | "punjab" | "rajasthan" | "chandigarh" | "himachalpradesh"
        | "jammuandkashmir" | "jammukashmir" => SectorName::North,
        "assam" | "arunachalpradesh" | "manipur" | "meghalaya" | "mizoram" | "nagaland"
        | "tripura" | "sikkim" => SectorName::NorthEast,
        _ => return None,
    };
    Some(sector)
}
