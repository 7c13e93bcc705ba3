// Example: Merging a CSV result table onto the bidding-zone dataset
// Usage: cargo run --example merge_from_csv -- results.csv [zones.geojson]
// Without a zones path the dataset is read from RSQCMAPS_ZONES or data/el_zones_raew.geojson
use anyhow::{Context, Result};
use rsqcmaps::{merge, ResultTable, ZoneGeometries, ZoneGroups};
use std::env;

fn main() -> Result<()> {
    rsqcmaps::log::init(None)?;

    let mut args = env::args().skip(1);
    let csv_path = args
        .next()
        .context("Usage: merge_from_csv <results.csv> [zones.geojson]")?;

    let table = ResultTable::from_csv_path(&csv_path)?;
    let zones = match args.next() {
        Some(path) => ZoneGeometries::from_path(path)?,
        None => ZoneGeometries::from_default_path()?,
    };

    println!(
        "Result table: {} series x {} columns",
        table.series().len(),
        table.columns().len()
    );

    let merged = merge(&table, &zones, &ZoneGroups::default())?;
    println!("Merged zones: {}", merged.len());
    println!("Zones with data: {:?}", merged.zones_with_data());

    let df = merged.to_polars_df()?;
    println!("\nDataFrame preview:");
    println!("{}", df);

    Ok(())
}
