use anyhow::{bail, Context, Result};
use geo::{Geometry as GeoGeometry, MultiPolygon};
use geojson::{Feature, GeoJson};
use log::{info, warn};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::Path;

use crate::collect::global_variables::{get_zones_path, ZONE_ID_PROPERTY};
use crate::error::ZoneMapError;
use crate::geo_core::{GeoCore, WGS84};

/// Bidding-zone geometries keyed by zone code
///
/// Every zone is stored as a multipolygon so that single-part and multi-part
/// zones (islands, exclaves) go through the same geometry operations.
#[derive(Debug, Clone, Default)]
pub struct ZoneGeometries {
    zones: BTreeMap<String, MultiPolygon<f64>>,
    /// CRS of the stored coordinates (WGS84 for the bundled dataset)
    pub geo_core: GeoCore,
}

impl ZoneGeometries {
    pub fn new() -> Self {
        ZoneGeometries {
            zones: BTreeMap::new(),
            geo_core: GeoCore::new(WGS84),
        }
    }

    /// Load zones from GeoJSON bytes (FeatureCollection or single Feature)
    pub fn from_geojson(geojson_data: &[u8]) -> Result<Self> {
        let geojson_str =
            std::str::from_utf8(geojson_data).context("GeoJSON data is not valid UTF-8")?;
        let geojson: GeoJson = geojson_str.parse().context("Failed to parse GeoJSON")?;

        let features = match geojson {
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Feature(f) => vec![f],
            GeoJson::Geometry(_) => {
                bail!("GeoJSON must be a Feature or FeatureCollection");
            }
        };

        let mut zones = Self::new();
        for feature in &features {
            let Some(id) = feature_id(feature) else {
                warn!("Skipping feature without '{}' property", ZONE_ID_PROPERTY);
                continue;
            };
            let geometry = feature_geometry(&id, feature)?;
            if zones.zones.contains_key(&id) {
                bail!("Zone '{}' is defined more than once", id);
            }
            zones.insert(id, geometry);
        }

        Ok(zones)
    }

    /// Load zones from a GeoJSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read zone geometries: {:?}", path))?;
        let zones = Self::from_geojson(&bytes)
            .with_context(|| format!("Failed to load zone geometries: {:?}", path))?;
        info!("Loaded {} zones from {:?}", zones.len(), path);
        Ok(zones)
    }

    /// Load the bidding-zone dataset from its configured location
    pub fn from_default_path() -> Result<Self> {
        Self::from_path(get_zones_path())
    }

    pub fn insert(&mut self, id: impl Into<String>, geometry: MultiPolygon<f64>) {
        self.zones.insert(id.into(), geometry);
    }

    pub fn get(&self, id: &str) -> Option<&MultiPolygon<f64>> {
        self.zones.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.zones.contains_key(id)
    }

    /// Zone codes in lexicographic order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.zones.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, MultiPolygon<f64>> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl FromIterator<(String, MultiPolygon<f64>)> for ZoneGeometries {
    fn from_iter<I: IntoIterator<Item = (String, MultiPolygon<f64>)>>(iter: I) -> Self {
        let mut zones = Self::new();
        for (id, geometry) in iter {
            zones.insert(id, geometry);
        }
        zones
    }
}

fn feature_id(feature: &Feature) -> Option<String> {
    let property = feature
        .properties
        .as_ref()
        .and_then(|props| props.get(ZONE_ID_PROPERTY));
    match property {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => match &feature.id {
            Some(geojson::feature::Id::String(s)) => Some(s.clone()),
            Some(geojson::feature::Id::Number(n)) => Some(n.to_string()),
            None => None,
        },
    }
}

fn feature_geometry(id: &str, feature: &Feature) -> Result<MultiPolygon<f64>> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| ZoneMapError::InvalidGeometry(id.to_string()))?;

    let geo_geom: GeoGeometry<f64> = geometry
        .value
        .clone()
        .try_into()
        .with_context(|| format!("Failed to convert geometry of zone '{}'", id))?;

    match geo_geom {
        GeoGeometry::Polygon(p) => Ok(MultiPolygon::new(vec![p])),
        GeoGeometry::MultiPolygon(mp) => Ok(mp),
        _ => Err(ZoneMapError::InvalidGeometry(id.to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ZONES: &str = r#"
    {
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"id": "GB"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"id": "NI"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0], [1.0, 0.0]]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"name": "no id"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]]
                }
            }
        ]
    }
    "#;

    #[test]
    fn test_from_geojson() {
        let zones = ZoneGeometries::from_geojson(ZONES.as_bytes()).unwrap();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones.ids().collect::<Vec<_>>(), vec!["GB", "NI"]);
        assert_eq!(zones.get("GB").unwrap().0.len(), 1);
        assert_eq!(zones.geo_core.get_crs(), &WGS84);
    }

    #[test]
    fn test_from_geojson_rejects_points() {
        let data = r#"{
            "type": "Feature",
            "properties": {"id": "XX"},
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}
        }"#;
        let err = ZoneGeometries::from_geojson(data.as_bytes()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ZoneMapError>(),
            Some(&ZoneMapError::InvalidGeometry("XX".to_string()))
        );
    }

    #[test]
    fn test_from_geojson_rejects_duplicates() {
        let data = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"id": "DE"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}},
                {"type": "Feature", "properties": {"id": "DE"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}}
            ]
        }"#;
        assert!(ZoneGeometries::from_geojson(data.as_bytes()).is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ZONES.as_bytes()).unwrap();
        let zones = ZoneGeometries::from_path(file.path()).unwrap();
        assert!(zones.contains("NI"));
        assert!(ZoneGeometries::from_path("does/not/exist.geojson").is_err());
    }
}
