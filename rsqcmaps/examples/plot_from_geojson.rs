// Example: Preparing a figure plan from inline zones and values
// UK is a default zone group, so GB and NI are dissolved into one zone
use anyhow::Result;
use rsqcmaps::plot::color_scale::ColorScalePolicy;
use rsqcmaps::{plot, FigureConfig, ResultTable, ZoneGeometries, ZoneGroups};

fn main() -> Result<()> {
    rsqcmaps::log::init(Some("debug"))?;

    println!("=== Example: Figure plan from GeoJSON ===\n");

    let geojson_data = r#"
    {
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"id": "GB"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-5.0, 50.0], [1.5, 50.0], [1.5, 58.0], [-5.0, 58.0], [-5.0, 50.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"id": "NI"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-8.0, 54.0], [-5.0, 54.0], [-5.0, 55.3], [-8.0, 55.3], [-8.0, 54.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"id": "FR"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-4.5, 43.0], [7.5, 43.0], [7.5, 50.0], [-4.5, 50.0], [-4.5, 43.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"id": "DE"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[7.5, 47.5], [15.0, 47.5], [15.0, 55.0], [7.5, 55.0], [7.5, 47.5]]]
                }
            }
        ]
    }
    "#;

    let zones = ZoneGeometries::from_geojson(geojson_data.as_bytes())?;
    println!("Zones loaded: {:?}", zones.ids().collect::<Vec<_>>());

    let table = ResultTable::from_columns(
        vec!["2030".to_string(), "2040".to_string()],
        vec![
            ("UK".to_string(), vec![Some(-3.0), Some(1.25)]),
            ("FR".to_string(), vec![Some(7.0), None]),
        ],
    )?;

    let config = FigureConfig {
        color_scale: ColorScalePolicy::Diverging,
        colormap: "QC_diverging".to_string(),
        legend_label: "Price change [EUR/MWh]".to_string(),
        ..FigureConfig::default()
    };

    let figure = plot(&table, &zones, &ZoneGroups::default(), &config)?;

    println!("\nCRS: {}", figure.plan.crs);
    println!(
        "Color range: [{}, {}]",
        figure.plan.colorbar.vmin, figure.plan.colorbar.vmax
    );
    for panel in &figure.plan.panels {
        println!("\nPanel {}:", panel.series);
        for fill in &panel.fills {
            println!("  {:<3} {:?} {}", fill.zone, fill.role, fill.color);
        }
        for label in &panel.labels {
            println!("  label {:?} at ({:.0}, {:.0})", label.text, label.x, label.y);
        }
    }

    println!("\nFigure plan JSON:\n{}", figure.plan.to_json()?);

    Ok(())
}
