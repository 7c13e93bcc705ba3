use geo::{BooleanOps, BoundingRect, Centroid, MultiPolygon, Point};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry};
use log::debug;
use serde_json::{json, Map as JsonMap};
use std::collections::btree_map;
use std::collections::BTreeMap;

#[cfg(feature = "polars")]
use anyhow::{Context, Result};
#[cfg(feature = "polars")]
use geo::Area;
#[cfg(feature = "polars")]
use polars::prelude::*;

use crate::geo_core::{BoundingBox, GeoCore, WGS84};

/// One row of the merged table: a base zone or a dissolved group
#[derive(Debug, Clone, PartialEq)]
pub struct MergedZone {
    pub geometry: MultiPolygon<f64>,
    /// One entry per series, `None` where the table has no value
    pub values: Vec<Option<f64>>,
    /// Base zones dissolved into this row, empty for a base zone
    pub members: Vec<String>,
}

impl MergedZone {
    pub fn new(geometry: MultiPolygon<f64>, series_count: usize) -> Self {
        MergedZone {
            geometry,
            values: vec![None; series_count],
            members: Vec::new(),
        }
    }

    pub fn is_group(&self) -> bool {
        !self.members.is_empty()
    }

    /// Whether at least one series carries a value
    pub fn has_data(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }

    pub fn value(&self, series: usize) -> Option<f64> {
        self.values.get(series).copied().flatten()
    }

    pub fn centroid(&self) -> Option<Point<f64>> {
        self.geometry.centroid()
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.geometry.bounding_rect().map(BoundingBox::from_rect)
    }
}

/// Zone geometries joined with result values, keyed and sorted by zone code
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedTable {
    rows: BTreeMap<String, MergedZone>,
    series: Vec<String>,
    /// CRS of the row geometries
    pub geo_core: GeoCore,
}

impl MergedTable {
    pub fn new(series: Vec<String>) -> Self {
        MergedTable {
            rows: BTreeMap::new(),
            series,
            geo_core: GeoCore::new(WGS84),
        }
    }

    pub(crate) fn from_parts(
        rows: BTreeMap<String, MergedZone>,
        series: Vec<String>,
        geo_core: GeoCore,
    ) -> Self {
        MergedTable {
            rows,
            series,
            geo_core,
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, zone: MergedZone) {
        self.rows.insert(id.into(), zone);
    }

    pub fn series(&self) -> &[String] {
        &self.series
    }

    pub fn series_index(&self, name: &str) -> Option<usize> {
        self.series.iter().position(|s| s == name)
    }

    pub fn get(&self, id: &str) -> Option<&MergedZone> {
        self.rows.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rows.contains_key(id)
    }

    /// Value of zone `id` in the series named `series`
    pub fn value(&self, id: &str, series: &str) -> Option<f64> {
        let index = self.series_index(series)?;
        self.rows.get(id)?.value(index)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, MergedZone> {
        self.rows.iter()
    }

    pub(crate) fn into_rows(self) -> (BTreeMap<String, MergedZone>, Vec<String>) {
        (self.rows, self.series)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Zones carrying at least one value, in key order
    pub fn zones_with_data(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|(_, zone)| zone.has_data())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// All present values, every series, rows with data only
    pub fn values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.rows
            .values()
            .filter(|zone| zone.has_data())
            .flat_map(|zone| zone.values.iter().copied())
    }

    /// Union of the bounds of the given zones; unknown ids are ignored
    pub fn total_bounds<S: AsRef<str>>(&self, ids: &[S]) -> Option<BoundingBox> {
        ids.iter()
            .filter_map(|id| self.rows.get(id.as_ref()))
            .filter_map(MergedZone::bounds)
            .reduce(|a, b| a.union(&b))
    }

    /// Intersect every geometry with `frame`, dropping rows left empty
    pub fn clip(&self, frame: &BoundingBox) -> MergedTable {
        let window = MultiPolygon::new(vec![frame.to_polygon()]);
        let mut rows = BTreeMap::new();
        for (id, zone) in &self.rows {
            let clipped = zone.geometry.intersection(&window);
            if clipped.0.is_empty() {
                debug!("Zone '{}' lies outside the frame and is dropped", id);
                continue;
            }
            let mut zone = zone.clone();
            zone.geometry = clipped;
            rows.insert(id.clone(), zone);
        }
        MergedTable::from_parts(rows, self.series.clone(), self.geo_core.clone())
    }

    /// Export as a FeatureCollection with `id` and one property per series
    pub fn to_geojson(&self) -> GeoJson {
        let features = self
            .rows
            .iter()
            .map(|(id, zone)| {
                let geometry = Geometry::new(geojson::Value::from(&zone.geometry));
                let mut feature = Feature::from(geometry);
                feature.set_property("id", id.clone());
                for (name, value) in self.series.iter().zip(&zone.values) {
                    feature.set_property(name.clone(), *value);
                }
                if zone.is_group() {
                    feature.set_property("members", zone.members.clone());
                }
                feature
            })
            .collect();

        let crs = self.geo_core.get_crs();
        let foreign_members = (crs != &WGS84).then(|| {
            let mut members = JsonMap::new();
            members.insert(
                "crs".to_string(),
                json!({"type": "name", "properties": {"name": crs.definition()}}),
            );
            members
        });

        GeoJson::from(FeatureCollection {
            bbox: None,
            features,
            foreign_members,
        })
    }

    /// Tabular view: id, centroid, area and one column per series
    #[cfg(feature = "polars")]
    pub fn to_polars_df(&self) -> Result<DataFrame> {
        let mut ids = Vec::with_capacity(self.rows.len());
        let mut centroid_x = Vec::with_capacity(self.rows.len());
        let mut centroid_y = Vec::with_capacity(self.rows.len());
        let mut area = Vec::with_capacity(self.rows.len());
        let mut series_values = vec![Vec::with_capacity(self.rows.len()); self.series.len()];

        for (id, zone) in &self.rows {
            let centroid = zone.centroid();
            ids.push(id.clone());
            centroid_x.push(centroid.map(|p| p.x()));
            centroid_y.push(centroid.map(|p| p.y()));
            area.push(zone.geometry.unsigned_area());
            for (column, value) in series_values.iter_mut().zip(&zone.values) {
                column.push(*value);
            }
        }

        let mut columns = vec![
            Column::new("id".into(), ids),
            Column::new("centroid_x".into(), centroid_x),
            Column::new("centroid_y".into(), centroid_y),
            Column::new("area".into(), area),
        ];
        for (name, values) in self.series.iter().zip(series_values) {
            columns.push(Column::new(name.as_str().into(), values));
        }

        DataFrame::new(columns).context("Failed to create DataFrame")
    }
}

/// Dissolve polygons into one multipolygon; `None` for an empty input
pub fn dissolve<'a, I>(geometries: I) -> Option<MultiPolygon<f64>>
where
    I: IntoIterator<Item = &'a MultiPolygon<f64>>,
{
    geometries
        .into_iter()
        .fold(None, |acc: Option<MultiPolygon<f64>>, geometry| match acc {
            None => Some(geometry.clone()),
            Some(acc) => Some(acc.union(geometry)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ]])
    }

    fn table() -> MergedTable {
        let mut table = MergedTable::new(vec!["2030".to_string(), "2040".to_string()]);
        let mut fr = MergedZone::new(square(0.0, 0.0, 2.0), 2);
        fr.values = vec![Some(1.0), None];
        table.insert("FR", fr);
        table.insert("ES", MergedZone::new(square(-4.0, -2.0, 2.0), 2));
        let mut uk = MergedZone::new(square(0.0, 4.0, 1.0), 2);
        uk.values = vec![None, Some(-2.5)];
        uk.members = vec!["GB".to_string(), "NI".to_string()];
        table.insert("UK", uk);
        table
    }

    #[test]
    fn test_zones_with_data() {
        let table = table();
        assert_eq!(table.zones_with_data(), vec!["FR", "UK"]);
        assert_eq!(table.value("UK", "2040"), Some(-2.5));
        assert_eq!(table.value("ES", "2030"), None);
        assert_eq!(table.value("FR", "2050"), None);
    }

    #[test]
    fn test_total_bounds() {
        let table = table();
        let bounds = table.total_bounds(&["FR", "UK"]).unwrap();
        assert_eq!(bounds, BoundingBox::new(0.0, 0.0, 2.0, 5.0));
        assert!(table.total_bounds::<&str>(&[]).is_none());
    }

    #[test]
    fn test_dissolve() {
        let left = square(0.0, 0.0, 1.0);
        let right = square(1.0, 0.0, 1.0);
        let merged = dissolve([&left, &right]).unwrap();
        assert_eq!(merged.0.len(), 1);
        assert!((merged.unsigned_area() - 2.0).abs() < 1e-9);
        assert!(dissolve(std::iter::empty()).is_none());
    }

    #[test]
    fn test_clip() {
        let table = table();
        let clipped = table.clip(&BoundingBox::new(-1.0, -1.0, 1.0, 1.0));
        assert_eq!(clipped.ids().collect::<Vec<_>>(), vec!["FR"]);
        let fr = clipped.get("FR").unwrap();
        assert!((fr.geometry.unsigned_area() - 1.0).abs() < 1e-9);
        assert_eq!(fr.values, vec![Some(1.0), None]);
    }

    #[test]
    fn test_to_geojson() {
        let table = table();
        let GeoJson::FeatureCollection(fc) = table.to_geojson() else {
            panic!("expected a FeatureCollection");
        };
        assert_eq!(fc.features.len(), 3);
        assert!(fc.foreign_members.is_none());
        let uk = &fc.features[2];
        assert_eq!(uk.property("id"), Some(&json!("UK")));
        assert_eq!(uk.property("2030"), Some(&serde_json::Value::Null));
        assert_eq!(uk.property("2040"), Some(&json!(-2.5)));
        assert_eq!(uk.property("members"), Some(&json!(["GB", "NI"])));
    }

    #[cfg(feature = "polars")]
    #[test]
    fn test_to_polars_df() {
        let df = table().to_polars_df().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 6);
        assert!(df.column("2030").is_ok());
        assert!(df.column("centroid_x").is_ok());
    }
}
