use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};

use crate::collect::results::ResultTable;
use crate::collect::zones::ZoneGeometries;
use crate::error::{ValidationErrors, ZoneMapError};
use crate::geometric::merged::{dissolve, MergedTable, MergedZone};
use crate::geometric::zone_groups::ZoneGroups;

/// Check a result table against the zone geometries and group definitions
///
/// Runs before any geometry is touched and reports every problem found:
/// unknown columns, group names shadowing base zones, groups without any
/// resolvable member and base zones claimed by two groups of the same table.
pub fn validate(
    table: &ResultTable,
    zones: &ZoneGeometries,
    groups: &ZoneGroups,
) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    // base zone -> first active group claiming it
    let mut claimed: BTreeMap<&str, &str> = BTreeMap::new();

    let mut columns: Vec<&str> = table.columns().iter().map(String::as_str).collect();
    columns.sort_unstable();

    for column in columns {
        let Some(members) = groups.members(column) else {
            if !zones.contains(column) {
                errors.push(ZoneMapError::UnknownZoneOrGroup(column.to_string()));
            }
            continue;
        };

        if zones.contains(column) {
            errors.push(ZoneMapError::GroupNameCollision(column.to_string()));
        }
        if !members.iter().any(|m| zones.contains(m)) {
            errors.push(ZoneMapError::EmptyGroupMembership(column.to_string()));
        }
        for member in members {
            match claimed.get(member.as_str()) {
                Some(first) if *first != column => {
                    errors.push(ZoneMapError::OverlappingGroups {
                        zone: member.clone(),
                        first: first.to_string(),
                        second: column.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    claimed.insert(member.as_str(), column);
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Join a result table onto the zone geometries
///
/// Every column naming a zone group becomes one dissolved row and its member
/// zones are removed; values are then attached per series. Rows with no
/// matching column keep `None` values. Nothing is modified when validation
/// fails.
pub fn merge(
    table: &ResultTable,
    zones: &ZoneGeometries,
    groups: &ZoneGroups,
) -> Result<MergedTable, ValidationErrors> {
    validate(table, zones, groups)?;

    let table = table.sorted();
    let series_count = table.series().len();

    let mut rows: BTreeMap<String, MergedZone> = zones
        .iter()
        .map(|(id, geometry)| (id.clone(), MergedZone::new(geometry.clone(), series_count)))
        .collect();

    let mut consumed: BTreeSet<String> = BTreeSet::new();
    for column in table.columns() {
        let Some(members) = groups.members(column) else {
            continue;
        };
        let present: Vec<String> = members
            .iter()
            .filter(|m| {
                let found = zones.contains(m);
                if !found {
                    debug!("Zone '{}' of group '{}' has no geometry, skipped", m, column);
                }
                found
            })
            .cloned()
            .collect();
        let Some(geometry) = dissolve(present.iter().filter_map(|m| zones.get(m))) else {
            // validate() rejects groups without resolvable members
            continue;
        };
        let mut zone = MergedZone::new(geometry, series_count);
        zone.members = present;
        consumed.extend(members.iter().cloned());
        rows.insert(column.clone(), zone);
    }

    for zone in &consumed {
        rows.remove(zone);
    }

    for (c, column) in table.columns().iter().enumerate() {
        let Some(row) = rows.get_mut(column) else {
            warn!(
                "Values of zone '{}' are discarded, the zone is part of an aggregated group",
                column
            );
            continue;
        };
        for (s, value) in row.values.iter_mut().enumerate() {
            *value = table.value(s, c);
        }
    }

    info!(
        "Merged {} result columns into {} zones ({} dissolved)",
        table.columns().len(),
        rows.len(),
        consumed.len()
    );

    Ok(MergedTable::from_parts(
        rows,
        table.series().to_vec(),
        zones.geo_core.clone(),
    ))
}
