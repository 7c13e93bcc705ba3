use geo::Point;
use serde::{Deserialize, Serialize};

#[cfg(feature = "proj")]
use anyhow::{Context, Result};
#[cfg(feature = "proj")]
use geo::Centroid;
#[cfg(feature = "proj")]
use log::info;
#[cfg(feature = "proj")]
use std::collections::BTreeMap;

#[cfg(feature = "proj")]
use crate::error::ZoneMapError;
#[cfg(feature = "proj")]
use crate::geo_core::{Crs, GeoCore, LAEA_EUROPE, WEB_MERCATOR, WGS84};
#[cfg(feature = "proj")]
use crate::geometric::merged::{MergedTable, MergedZone};

/// Map projection of a figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Lambert Azimuthal Equal Area over Europe (EPSG:3035)
    #[default]
    EqualArea,
    /// Orthographic view centered on the zones carrying data
    Orthographic,
}

/// Reproject a merged table for display
///
/// The orthographic center is the combined centroid of the rows with at
/// least one value; rows without values are reprojected all the same.
#[cfg(feature = "proj")]
pub fn reproject(table: &MergedTable, projection: Projection) -> Result<MergedTable> {
    let target = match projection {
        Projection::EqualArea => LAEA_EUROPE,
        Projection::Orthographic => {
            let center = orthographic_center(table)?;
            Crs::orthographic(center.x(), center.y())
        }
    };
    info!("Reprojecting {} zones to {}", table.len(), target);
    to_crs(table, &target)
}

/// Transform every row geometry into `target`
#[cfg(feature = "proj")]
pub fn to_crs(table: &MergedTable, target: &Crs) -> Result<MergedTable> {
    let source = table.geo_core.get_crs();
    if source == target {
        return Ok(table.clone());
    }
    let proj = GeoCore::transformer(source, target)?;

    let (rows, series) = table.clone().into_rows();
    let mut transformed = BTreeMap::new();
    for (id, zone) in rows {
        let geometry = GeoCore::transform_multi_polygon(&proj, &zone.geometry)
            .with_context(|| format!("Failed to reproject zone '{}' to {}", id, target))?;
        transformed.insert(id, MergedZone { geometry, ..zone });
    }

    Ok(MergedTable::from_parts(
        transformed,
        series,
        GeoCore::new(target.clone()),
    ))
}

/// Center of the zones with data, in WGS84 longitude/latitude
///
/// Zone centroids are computed and combined in Web Mercator.
#[cfg(feature = "proj")]
pub fn orthographic_center(table: &MergedTable) -> Result<Point<f64>> {
    let mercator = to_crs(table, &WEB_MERCATOR)?;
    let centroids: Vec<Point<f64>> = mercator
        .iter()
        .filter(|(_, zone)| zone.has_data())
        .filter_map(|(_, zone)| zone.geometry.centroid())
        .collect();
    let center = combined_centroid(&centroids).ok_or(ZoneMapError::NoData)?;
    GeoCore::transform_point(&WEB_MERCATOR, &WGS84, center)
}

/// Centroid of the distinct points, independent of input order
///
/// Exact duplicates count once, as in the centroid of a multipoint.
pub fn combined_centroid(points: &[Point<f64>]) -> Option<Point<f64>> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x().total_cmp(&b.x()).then(a.y().total_cmp(&b.y())));
    sorted.dedup_by(|a, b| {
        a.x().total_cmp(&b.x()).is_eq() && a.y().total_cmp(&b.y()).is_eq()
    });
    if sorted.is_empty() {
        return None;
    }

    let n = sorted.len() as f64;
    let (x, y) = sorted
        .iter()
        .fold((0.0, 0.0), |(x, y), p| (x + p.x(), y + p.y()));
    Some(Point::new(x / n, y / n))
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(feature = "proj")]
    use geo::{polygon, MultiPolygon};

    #[cfg(feature = "proj")]
    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ]])
    }

    #[cfg(feature = "proj")]
    fn europe() -> MergedTable {
        let mut table = MergedTable::new(vec!["2030".to_string()]);
        let mut fr = MergedZone::new(square(0.0, 45.0, 4.0), 1);
        fr.values = vec![Some(10.0)];
        table.insert("FR", fr);
        let mut de = MergedZone::new(square(7.0, 48.0, 5.0), 1);
        de.values = vec![Some(12.0)];
        table.insert("DE", de);
        table.insert("PL", MergedZone::new(square(15.0, 50.0, 8.0), 1));
        table
    }

    #[test]
    fn test_projection_names() {
        let parsed: Projection = serde_json::from_str("\"orthographic\"").unwrap();
        assert_eq!(parsed, Projection::Orthographic);
        assert_eq!(
            serde_json::to_string(&Projection::EqualArea).unwrap(),
            "\"equal_area\""
        );
    }

    #[test]
    fn test_combined_centroid_is_order_invariant() {
        let points = vec![
            Point::new(0.1, 0.7),
            Point::new(1e6, -2.5),
            Point::new(-3.3, 9.9),
            Point::new(0.3, 0.3),
        ];
        let forward = combined_centroid(&points).unwrap();
        let mut backward = points.clone();
        backward.reverse();
        backward.swap(0, 2);
        assert_eq!(combined_centroid(&backward).unwrap(), forward);
        assert!(combined_centroid(&[]).is_none());
    }

    #[test]
    fn test_combined_centroid_ignores_zone_size() {
        let points = [Point::new(0.0, 0.0), Point::new(4.0, 0.0)];
        assert_eq!(combined_centroid(&points).unwrap(), Point::new(2.0, 0.0));
    }

    #[test]
    fn test_combined_centroid_counts_duplicates_once() {
        let points = [
            Point::new(0.0, 2.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 2.0),
        ];
        assert_eq!(combined_centroid(&points).unwrap(), Point::new(2.0, 1.0));
    }

    #[cfg(feature = "proj")]
    #[test]
    fn test_equal_area_round_trip() {
        let table = europe();
        let projected = reproject(&table, Projection::EqualArea).unwrap();
        assert_eq!(projected.geo_core.get_crs(), &LAEA_EUROPE);
        assert_eq!(projected.len(), 3);
        assert_eq!(projected.value("DE", "2030"), Some(12.0));

        let back = to_crs(&projected, &WGS84).unwrap();
        for (id, zone) in table.iter() {
            let expected = zone.centroid().unwrap();
            let actual = back.get(id).unwrap().centroid().unwrap();
            assert!((expected.x() - actual.x()).abs() < 1e-6, "{}", id);
            assert!((expected.y() - actual.y()).abs() < 1e-6, "{}", id);
        }
    }

    #[cfg(feature = "proj")]
    #[test]
    fn test_orthographic_center_ignores_rows_without_data() {
        let table = europe();
        let center = orthographic_center(&table).unwrap();
        // FR and DE only, PL has no value
        assert!(center.x() > 2.0 && center.x() < 12.0);
        assert!(center.y() > 47.0 && center.y() < 53.0);

        let projected = reproject(&table, Projection::Orthographic).unwrap();
        assert!(projected.contains("PL"));
        assert!(projected
            .geo_core
            .get_crs()
            .definition()
            .starts_with("+proj=ortho"));
    }

    #[cfg(feature = "proj")]
    #[test]
    fn test_orthographic_center_is_order_invariant() {
        let zones = [
            ("SE", square(12.0, 55.0, 10.0), Some(3.0)),
            ("FR", square(0.0, 45.0, 4.0), Some(10.0)),
            ("PL", square(15.0, 50.0, 8.0), None),
            ("DE", square(7.0, 48.0, 5.0), Some(12.0)),
        ];
        let build = |order: &[usize]| {
            let mut table = MergedTable::new(vec!["2030".to_string()]);
            for &i in order {
                let (id, geometry, value) = &zones[i];
                let mut zone = MergedZone::new(geometry.clone(), 1);
                zone.values = vec![*value];
                table.insert(*id, zone);
            }
            table
        };
        let forward = orthographic_center(&build(&[0, 1, 2, 3])).unwrap();
        let backward = orthographic_center(&build(&[3, 2, 1, 0])).unwrap();
        assert_eq!(forward, backward);
    }

    #[cfg(feature = "proj")]
    #[test]
    fn test_orthographic_center_without_data() {
        let mut table = MergedTable::new(vec!["2030".to_string()]);
        table.insert("PL", MergedZone::new(square(15.0, 50.0, 8.0), 1));
        let err = orthographic_center(&table).unwrap_err();
        assert_eq!(err.downcast_ref::<ZoneMapError>(), Some(&ZoneMapError::NoData));
    }
}
