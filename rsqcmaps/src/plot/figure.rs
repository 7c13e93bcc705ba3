use anyhow::{Context, Result};
use geojson::GeoJson;
use serde::Serialize;

use crate::commons::basic_functions::zone_label;
use crate::geo_core::BoundingBox;
use crate::geometric::frame::FramedTable;
use crate::geometric::merged::MergedTable;
use crate::plot::color_scale::ColorScale;
use crate::plot::config::FigureConfig;

#[cfg(feature = "proj")]
use crate::collect::results::ResultTable;
#[cfg(feature = "proj")]
use crate::collect::zones::ZoneGeometries;
#[cfg(feature = "proj")]
use crate::geometric::{aggregate::merge, frame::frame, reproject::reproject};
#[cfg(feature = "proj")]
use crate::geometric::zone_groups::ZoneGroups;
#[cfg(feature = "proj")]
use log::info;

/// Panel width per series, in inches
const PANEL_WIDTH: f64 = 2.5;
const FIGURE_HEIGHT: f64 = 4.0;
/// Color bar axes as `[left, bottom, width, height]` figure fractions
const COLORBAR_AXES: [f64; 4] = [0.88, 0.15, 0.03, 0.7];
/// Right edge of the panel area, leaving room for the color bar
const RIGHT_MARGIN: f64 = 0.85;
const EMPTY_EDGE_COLOR: &str = "#ffffff";
const EDGE_COLOR: &str = "#000000";

/// How a zone is painted in one panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillRole {
    /// No value in this series
    Empty,
    /// Has a value in this series, but is not highlighted
    Hidden,
    /// Painted with the colormap
    Highlighted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneFill {
    pub zone: String,
    pub role: FillRole,
    pub color: String,
    pub edge_color: String,
    pub edge_width: f64,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneLabel {
    pub zone: String,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub halo_width: f64,
}

/// One map per series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub series: String,
    pub extent: BoundingBox,
    pub fills: Vec<ZoneFill>,
    pub labels: Vec<ZoneLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBar {
    pub axes: [f64; 4],
    pub right_margin: f64,
    pub vmin: f64,
    pub vmax: f64,
    pub colormap: String,
    /// Evenly spaced colormap stops as hex codes
    pub colors: Vec<String>,
    pub label: String,
}

/// Everything a renderer needs besides the zone geometries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigurePlan {
    /// Width and height in inches
    pub figsize: [f64; 2],
    pub dpi: u32,
    pub font_family: String,
    pub font_size: f64,
    /// CRS of the panel extents, label positions and geometries
    pub crs: String,
    pub panels: Vec<Panel>,
    pub colorbar: ColorBar,
}

impl FigurePlan {
    /// Lay out one panel per series of the framed table
    pub fn build(framed: &FramedTable, scale: &ColorScale, config: &FigureConfig) -> Result<Self> {
        let colormap = config.colormap()?;
        let (empty, hide) = config.colors()?;
        let (empty, hide) = (empty.to_hex(), hide.to_hex());
        let table = &framed.table;

        let mut panels = Vec::with_capacity(table.series().len());
        for (index, series) in table.series().iter().enumerate() {
            let mut fills = Vec::with_capacity(table.len());
            let mut labels = Vec::new();
            for (id, zone) in table.iter() {
                let value = zone.value(index);
                let highlighted = framed.highlighted.binary_search(id).is_ok();
                let (role, color) = match value {
                    None => (FillRole::Empty, empty.clone()),
                    Some(v) if highlighted => {
                        (FillRole::Highlighted, scale.color(&colormap, v).to_hex())
                    }
                    Some(_) => (FillRole::Hidden, hide.clone()),
                };
                let edge_color = match role {
                    FillRole::Empty => EMPTY_EDGE_COLOR,
                    _ => EDGE_COLOR,
                };

                if let (FillRole::Highlighted, Some(v), Some(centroid)) =
                    (role, value, zone.centroid())
                {
                    labels.push(ZoneLabel {
                        zone: id.clone(),
                        text: zone_label(id, v),
                        x: centroid.x(),
                        y: centroid.y(),
                        halo_width: config.label_halo_width,
                    });
                }
                fills.push(ZoneFill {
                    zone: id.clone(),
                    role,
                    color,
                    edge_color: edge_color.to_string(),
                    edge_width: config.edge_width,
                    value,
                });
            }
            panels.push(Panel {
                series: series.clone(),
                extent: framed.frame,
                fills,
                labels,
            });
        }

        let stops = 11;
        let colors = (0..stops)
            .map(|i| colormap.at(i as f64 / (stops - 1) as f64).to_hex())
            .collect();

        Ok(FigurePlan {
            figsize: [PANEL_WIDTH * panels.len() as f64, FIGURE_HEIGHT],
            dpi: config.dpi,
            font_family: config.font_family.clone(),
            font_size: config.font_size,
            crs: table.geo_core.get_crs().definition(),
            panels,
            colorbar: ColorBar {
                axes: COLORBAR_AXES,
                right_margin: RIGHT_MARGIN,
                vmin: scale.vmin,
                vmax: scale.vmax,
                colormap: colormap.name.clone(),
                colors,
                label: config.legend_label.clone(),
            },
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize figure plan")
    }
}

/// Framed zone table and the plan to draw it
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub table: MergedTable,
    pub plan: FigurePlan,
}

impl Figure {
    pub fn to_geojson(&self) -> GeoJson {
        self.table.to_geojson()
    }
}

/// Prepare a choropleth figure of `table` over the bidding zones
///
/// Merges values onto the zones (dissolving the groups named by columns),
/// reprojects, derives the shared color scale, frames the highlighted zones
/// and lays out one panel per series.
#[cfg(feature = "proj")]
pub fn plot(
    table: &ResultTable,
    zones: &ZoneGeometries,
    groups: &ZoneGroups,
    config: &FigureConfig,
) -> Result<Figure> {
    config.validate()?;
    let merged = merge(table, zones, groups)?;
    let projected = reproject(&merged, config.projection)?;
    let scale = ColorScale::from_table(config.color_scale, &projected)?;
    let framed = frame(
        &projected,
        &config.highlight,
        config.buffer_frame,
        config.shift_frame,
    )?;
    let plan = FigurePlan::build(&framed, &scale, config)?;
    info!(
        "Prepared figure with {} panels over {} zones",
        plan.panels.len(),
        framed.table.len()
    );
    Ok(Figure {
        table: framed.table,
        plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometric::frame::Highlight;
    use crate::geometric::merged::MergedZone;
    use geo::{polygon, MultiPolygon};

    fn square(x: f64, y: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x, y: y),
            (x: x + 2.0, y: y),
            (x: x + 2.0, y: y + 2.0),
            (x: x, y: y + 2.0),
            (x: x, y: y),
        ]])
    }

    fn framed() -> FramedTable {
        let mut table = MergedTable::new(vec!["2030".to_string(), "2040".to_string()]);
        let mut de = MergedZone::new(square(0.0, 0.0), 2);
        de.values = vec![Some(10.0), None];
        table.insert("DE", de);
        let mut fr = MergedZone::new(square(2.0, 0.0), 2);
        fr.values = vec![Some(0.0), Some(5.0)];
        table.insert("FR", fr);
        table.insert("PL", MergedZone::new(square(4.0, 0.0), 2));
        FramedTable {
            frame: BoundingBox::new(0.0, 0.0, 6.0, 2.0),
            highlighted: vec!["DE".to_string()],
            table,
        }
    }

    #[test]
    fn test_build_roles_and_labels() {
        let config = FigureConfig {
            colormap: "QC_test".to_string(),
            highlight: Highlight::Zones(vec!["DE".to_string()]),
            ..FigureConfig::default()
        };
        let scale = ColorScale::new(0.0, 10.0);
        let plan = FigurePlan::build(&framed(), &scale, &config).unwrap();

        assert_eq!(plan.figsize, [5.0, 4.0]);
        assert_eq!(plan.panels.len(), 2);
        assert_eq!(plan.crs, "EPSG:4326");

        let first = &plan.panels[0];
        let roles: Vec<FillRole> = first.fills.iter().map(|f| f.role).collect();
        assert_eq!(
            roles,
            vec![FillRole::Highlighted, FillRole::Hidden, FillRole::Empty]
        );
        assert_eq!(first.fills[0].color, crate::commons::colors::QC_RED.to_hex());
        assert_eq!(first.fills[1].color, "#dcdcdc");
        assert_eq!(first.fills[2].edge_color, "#ffffff");
        assert_eq!(first.labels.len(), 1);
        assert_eq!(first.labels[0].text, "DE\n10.0");
        assert_eq!((first.labels[0].x, first.labels[0].y), (1.0, 1.0));

        assert!(plan.panels[1].labels.is_empty());
    }

    #[test]
    fn test_missing_value_in_series_is_empty() {
        let config = FigureConfig {
            colormap: "QC_test".to_string(),
            ..FigureConfig::default()
        };
        let plan = FigurePlan::build(&framed(), &ColorScale::new(0.0, 10.0), &config).unwrap();

        // DE has data in 2030 only
        let second = &plan.panels[1];
        assert_eq!(second.fills[0].zone, "DE");
        assert_eq!(second.fills[0].role, FillRole::Empty);
        assert_eq!(second.fills[0].color, "#dcdcdc");
        assert_eq!(second.fills[0].edge_color, "#ffffff");
        assert_eq!(second.fills[1].role, FillRole::Hidden);
        assert_eq!(second.fills[1].edge_color, "#000000");
    }

    #[test]
    fn test_colorbar_and_json() {
        let config = FigureConfig {
            legend_label: "Price".to_string(),
            ..FigureConfig::default()
        };
        let plan = FigurePlan::build(&framed(), &ColorScale::new(-1.0, 1.0), &config).unwrap();
        assert_eq!(plan.colorbar.axes, [0.88, 0.15, 0.03, 0.7]);
        assert_eq!(plan.colorbar.right_margin, 0.85);
        assert_eq!(plan.colorbar.colors.len(), 11);
        assert_eq!(plan.colorbar.colormap, "QC_sequential");

        let json: serde_json::Value = serde_json::from_str(&plan.to_json().unwrap()).unwrap();
        assert_eq!(json["colorbar"]["label"], "Price");
        assert_eq!(json["panels"][0]["fills"][0]["role"], "highlighted");
        assert_eq!(json["panels"][0]["extent"]["max_x"], 6.0);
    }

    #[cfg(feature = "proj")]
    #[test]
    fn test_plot() {
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"id": "GB"},
                 "geometry": {"type": "Polygon", "coordinates": [[[-4,51],[0,51],[0,55],[-4,55],[-4,51]]]}},
                {"type": "Feature", "properties": {"id": "NI"},
                 "geometry": {"type": "Polygon", "coordinates": [[[-8,54],[-4,54],[-4,55],[-8,55],[-8,54]]]}},
                {"type": "Feature", "properties": {"id": "FR"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,44],[6,44],[6,50],[0,50],[0,44]]]}},
                {"type": "Feature", "properties": {"id": "DE"},
                 "geometry": {"type": "Polygon", "coordinates": [[[6,47],[14,47],[14,54],[6,54],[6,47]]]}}
            ]
        }"#;
        let zones = ZoneGeometries::from_geojson(geojson.as_bytes()).unwrap();
        let table = ResultTable::from_columns(
            vec!["2030".to_string()],
            vec![
                ("UK".to_string(), vec![Some(-3.0)]),
                ("FR".to_string(), vec![Some(7.0)]),
            ],
        )
        .unwrap();
        let config = FigureConfig {
            color_scale: crate::plot::color_scale::ColorScalePolicy::Diverging,
            ..FigureConfig::default()
        };

        let figure = plot(&table, &zones, &ZoneGroups::default(), &config).unwrap();
        assert_eq!(figure.table.ids().collect::<Vec<_>>(), vec!["DE", "FR", "UK"]);
        assert_eq!(figure.plan.crs, "EPSG:3035");
        assert_eq!((figure.plan.colorbar.vmin, figure.plan.colorbar.vmax), (-7.0, 7.0));

        let panel = &figure.plan.panels[0];
        assert_eq!(panel.fills[0].role, FillRole::Empty);
        assert_eq!(panel.labels.len(), 2);
        assert_eq!(panel.labels[1].text, "UK\n-3.0");

        let GeoJson::FeatureCollection(fc) = figure.to_geojson() else {
            panic!("expected a FeatureCollection");
        };
        assert_eq!(fc.features.len(), 3);
        assert!(fc.foreign_members.is_some());
    }

    #[cfg(feature = "proj")]
    #[test]
    fn test_plot_rejects_unknown_column() {
        let zones: ZoneGeometries = [("FR".to_string(), square(0.0, 45.0))].into_iter().collect();
        let table = ResultTable::from_columns(
            vec!["2030".to_string()],
            vec![("XX".to_string(), vec![Some(1.0)])],
        )
        .unwrap();
        let err =
            plot(&table, &zones, &ZoneGroups::default(), &FigureConfig::default()).unwrap_err();
        assert!(err.to_string().contains("'XX'"));
    }
}
