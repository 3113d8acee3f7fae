use crate::domain::ports::ReferenceStore;
use crate::domain::sector::{SectorName, sector_from_state_name};
use crate::error::Result;
use tracing::debug;

/// Maps a destination to its pricing sector.
///
/// Tries, in order: the pincode's registered state, the named state in the
/// registry, the static state table, and finally `Rest of India`. Unknown
/// destinations never fail; only a store error does.
pub async fn resolve_sector(
    references: &dyn ReferenceStore,
    pincode: Option<&str>,
    state: Option<&str>,
) -> Result<SectorName> {
    if let Some(pincode) = pincode.map(str::trim).filter(|p| !p.is_empty())
        && let Some(record) = references.state_for_pincode(pincode).await?
        && let Some(sector) = record.sector
    {
        debug!(pincode, %sector, "Sector resolved from pincode");
        return Ok(sector);
    }

    let Some(state) = state.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(SectorName::RestOfIndia);
    };

    if let Some(record) = references.find_state(state).await?
        && let Some(sector) = record.sector
    {
        debug!(state, %sector, "Sector resolved from state registry");
        return Ok(sector);
    }

    Ok(sector_from_state_name(state).unwrap_or(SectorName::RestOfIndia))
}
