use anyhow::{bail, Result};
use std::collections::HashSet;

#[cfg(any(feature = "csv", feature = "polars"))]
use anyhow::Context;
#[cfg(feature = "csv")]
use std::io::Read;
#[cfg(feature = "csv")]
use std::path::Path;

#[cfg(feature = "polars")]
use polars::prelude::*;

use crate::error::ZoneMapError;

/// Label column used when a table is read without an explicit one
pub const DEFAULT_LABEL_COLUMN: &str = "result";

/// Numeric results to paint on the map
///
/// Columns are zone or zone-group codes, rows are named series (one map
/// panel per series). Missing values are `None`; NaN is read as missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    series: Vec<String>,
    columns: Vec<String>,
    /// Row-major: `values[series][column]`
    values: Vec<Vec<Option<f64>>>,
}

impl ResultTable {
    /// Build a table from row-major values
    pub fn new(
        series: Vec<String>,
        columns: Vec<String>,
        values: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if values.len() != series.len() {
            bail!(
                "Result table has {} series names but {} rows of values",
                series.len(),
                values.len()
            );
        }
        for (name, row) in series.iter().zip(&values) {
            if row.len() != columns.len() {
                bail!(
                    "Series '{}' has {} values for {} columns",
                    name,
                    row.len(),
                    columns.len()
                );
            }
        }
        check_unique(&columns, ZoneMapError::DuplicateColumn)?;
        check_unique(&series, ZoneMapError::DuplicateSeries)?;

        let values: Vec<Vec<Option<f64>>> = values
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|v| v.filter(|x| !x.is_nan()))
                    .collect::<Vec<_>>()
            })
            .collect();

        Ok(ResultTable {
            series,
            columns,
            values,
        })
    }

    /// Build a table from `(zone, values per series)` columns
    pub fn from_columns(
        series: Vec<String>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self> {
        let mut names = Vec::with_capacity(columns.len());
        let mut values = vec![Vec::with_capacity(columns.len()); series.len()];
        for (name, column) in columns {
            if column.len() != series.len() {
                bail!(
                    "Column '{}' has {} values for {} series",
                    name,
                    column.len(),
                    series.len()
                );
            }
            for (row, value) in values.iter_mut().zip(column) {
                row.push(value);
            }
            names.push(name);
        }
        Self::new(series, names, values)
    }

    /// Read a CSV table: the first header names the series label column,
    /// the remaining headers are zone codes, empty cells are missing values
    #[cfg(feature = "csv")]
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers().context("Failed to read CSV headers")?.clone();
        if headers.is_empty() {
            bail!("CSV result table has no header");
        }
        let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

        let mut series = Vec::new();
        let mut values = Vec::new();
        for record in rdr.records() {
            let record = record.context("Failed to read CSV record")?;
            let label = record.get(0).unwrap_or_default().to_string();
            let mut row = Vec::with_capacity(columns.len());
            for (zone, cell) in columns.iter().zip(record.iter().skip(1)) {
                row.push(parse_cell(&label, zone, cell)?);
            }
            series.push(label);
            values.push(row);
        }

        Self::new(series, columns, values)
    }

    #[cfg(feature = "csv")]
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
        Self::from_csv_reader(file)
            .with_context(|| format!("Failed to load result table: {:?}", path))
    }

    /// Read a polars DataFrame whose columns are zone codes
    ///
    /// `label_column` names the column holding series names; without one the
    /// series are named by row number.
    #[cfg(feature = "polars")]
    pub fn from_polars_df(df: &DataFrame, label_column: Option<&str>) -> Result<Self> {
        let series: Vec<String> = match label_column {
            Some(name) => {
                let labels = df
                    .column(name)
                    .with_context(|| format!("Label column '{}' not found", name))?
                    .as_materialized_series()
                    .cast(&DataType::String)
                    .context("Failed to read series labels")?;
                labels
                    .str()?
                    .into_iter()
                    .enumerate()
                    .map(|(i, label)| label.map_or_else(|| i.to_string(), str::to_string))
                    .collect()
            }
            None => (0..df.height()).map(|i| i.to_string()).collect(),
        };

        let mut columns = Vec::new();
        for column in df.get_columns() {
            let zone = column.name().to_string();
            if label_column == Some(zone.as_str()) {
                continue;
            }
            let values = column.as_materialized_series();
            if matches!(values.dtype(), DataType::String) {
                for (label, cell) in series.iter().zip(values.str()?.into_iter()) {
                    if let Some(cell) = cell {
                        parse_cell(label, &zone, cell)?;
                    }
                }
            }
            let values = values
                .cast(&DataType::Float64)
                .with_context(|| format!("Column '{}' is not numeric", zone))?;
            let values: Vec<Option<f64>> = values.f64()?.into_iter().collect();
            columns.push((zone, values));
        }

        Self::from_columns(series, columns)
    }

    pub fn series(&self) -> &[String] {
        &self.series
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn value(&self, series: usize, column: usize) -> Option<f64> {
        self.values.get(series).and_then(|row| row.get(column).copied().flatten())
    }

    /// Value of `zone` in the series named `series`
    pub fn get(&self, series: &str, zone: &str) -> Option<f64> {
        let s = self.series.iter().position(|name| name == series)?;
        let c = self.columns.iter().position(|name| name == zone)?;
        self.value(s, c)
    }

    /// All series values of one column
    pub fn column_values(&self, zone: &str) -> Option<Vec<Option<f64>>> {
        let c = self.columns.iter().position(|name| name == zone)?;
        Some(self.values.iter().map(|row| row[c]).collect())
    }

    /// Copy with columns in lexicographic order
    pub fn sorted(&self) -> Self {
        let mut order: Vec<usize> = (0..self.columns.len()).collect();
        order.sort_by(|&a, &b| self.columns[a].cmp(&self.columns[b]));
        ResultTable {
            series: self.series.clone(),
            columns: order.iter().map(|&i| self.columns[i].clone()).collect(),
            values: self
                .values
                .iter()
                .map(|row| order.iter().map(|&i| row[i]).collect())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty() || self.columns.is_empty()
    }
}

fn check_unique(names: &[String], error: fn(String) -> ZoneMapError) -> Result<()> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(error(name.clone()).into());
        }
    }
    Ok(())
}

#[cfg(any(feature = "csv", feature = "polars"))]
fn parse_cell(series: &str, zone: &str, cell: &str) -> Result<Option<f64>> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(ZoneMapError::NonNumericValue {
            series: series.to_string(),
            zone: zone.to_string(),
            value: cell.to_string(),
        }
        .into()),
    }
}
