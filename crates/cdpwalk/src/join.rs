//! Assembles independently-walked CDP cache columns into neighbor records.

use cdpwalk_core::types::NeighborEntry;

/// Three-way inner join on the shared row index, exact equality.
///
/// Output follows the encounter order of the device-id table. Rows whose
/// index is missing from either other table are dropped: a neighbor row is
/// only usable once all three attributes resolved. Malformed or empty
/// tables simply yield fewer rows.
pub fn join_tables(
    device_ids: &[(String, String)],
    addresses: &[(String, String)],
    capabilities: &[(String, String)],
) -> Vec<NeighborEntry> {
    device_ids
        .iter()
        .filter_map(|(index, name)| {
            let (_, address) = addresses.iter().find(|(i, _)| i == index)?;
            let (_, capability) = capabilities.iter().find(|(i, _)| i == index)?;
            Some(NeighborEntry {
                row_index: index.clone(),
                device_name: name.clone(),
                address: address.clone(),
                capability: capability.clone(),
            })
        })
        .collect()
}
