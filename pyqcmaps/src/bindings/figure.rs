use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rsqcmaps::geometric::aggregate;
use rsqcmaps::geometric::frame::Highlight;
use rsqcmaps::geometric::reproject::Projection;
use rsqcmaps::geometric::zone_groups::ZoneGroups;
use rsqcmaps::plot::color_scale::ColorScalePolicy;
use rsqcmaps::plot::config::FigureConfig;
use rsqcmaps::plot::figure::{self, Figure};

use crate::bindings::json_to_py;
use crate::bindings::results::PyResultTable;
use crate::bindings::zones::{PyZoneGeometries, PyZoneGroups};

/// FigureConfig Python binding
#[pyclass]
#[derive(Clone)]
pub struct PyFigureConfig {
    pub(crate) inner: FigureConfig,
}

#[pymethods]
impl PyFigureConfig {
    /// Defaults, overridden by the optional TOML document
    #[new]
    #[pyo3(signature = (toml = None))]
    fn new(toml: Option<&str>) -> PyResult<Self> {
        let inner = match toml {
            Some(content) => FigureConfig::from_toml_str(content)
                .map_err(|e| PyValueError::new_err(format!("Invalid FigureConfig: {:#}", e)))?,
            None => FigureConfig::default(),
        };
        Ok(PyFigureConfig { inner })
    }

    #[staticmethod]
    fn from_path(path: &str) -> PyResult<Self> {
        FigureConfig::from_path(path)
            .map(|inner| PyFigureConfig { inner })
            .map_err(|e| PyValueError::new_err(format!("Failed to load FigureConfig: {:#}", e)))
    }

    #[getter]
    fn dpi(&self) -> u32 {
        self.inner.dpi
    }

    #[setter]
    fn set_dpi(&mut self, dpi: u32) {
        self.inner.dpi = dpi;
    }

    #[getter]
    fn colormap(&self) -> String {
        self.inner.colormap.clone()
    }

    #[setter]
    fn set_colormap(&mut self, colormap: String) -> PyResult<()> {
        rsqcmaps::commons::colors::Colormap::by_name(&colormap)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        self.inner.colormap = colormap;
        Ok(())
    }

    #[getter]
    fn legend_label(&self) -> String {
        self.inner.legend_label.clone()
    }

    #[setter]
    fn set_legend_label(&mut self, label: String) {
        self.inner.legend_label = label;
    }

    /// `None` highlights every zone with data
    #[getter]
    fn highlight(&self) -> Option<Vec<String>> {
        match &self.inner.highlight {
            Highlight::All => None,
            Highlight::Zones(zones) => Some(zones.clone()),
        }
    }

    #[setter]
    fn set_highlight(&mut self, zones: Option<Vec<String>>) {
        self.inner.highlight = zones.map_or(Highlight::All, Highlight::Zones);
    }

    /// `"equal_area"` or `"orthographic"`
    #[getter]
    fn projection(&self) -> String {
        enum_name(&self.inner.projection)
    }

    #[setter]
    fn set_projection(&mut self, projection: String) -> PyResult<()> {
        self.inner.projection = parse_enum::<Projection>(projection)?;
        Ok(())
    }

    /// `"sequential"` or `"diverging"`
    #[getter]
    fn color_scale(&self) -> String {
        enum_name(&self.inner.color_scale)
    }

    #[setter]
    fn set_color_scale(&mut self, policy: String) -> PyResult<()> {
        self.inner.color_scale = parse_enum::<ColorScalePolicy>(policy)?;
        Ok(())
    }

    #[getter]
    fn buffer_frame(&self) -> [f64; 4] {
        self.inner.buffer_frame
    }

    #[setter]
    fn set_buffer_frame(&mut self, buffer: [f64; 4]) {
        self.inner.buffer_frame = buffer;
    }

    #[getter]
    fn shift_frame(&self) -> [f64; 2] {
        self.inner.shift_frame
    }

    #[setter]
    fn set_shift_frame(&mut self, shift: [f64; 2]) {
        self.inner.shift_frame = shift;
    }

    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner).map_err(|e| PyValueError::new_err(e.to_string()))
    }
}

/// Figure Python binding: framed zones plus the plan to draw them
#[pyclass]
pub struct PyFigure {
    inner: Figure,
}

#[pymethods]
impl PyFigure {
    /// Framed zones as a GeoJSON dict in the figure CRS
    fn geojson(&self, py: Python) -> PyResult<Py<PyAny>> {
        json_to_py(py, &self.inner.to_geojson().to_string())
    }

    /// Figure plan as a dict
    fn plan(&self, py: Python) -> PyResult<Py<PyAny>> {
        json_to_py(py, &self.plan_json()?)
    }

    fn plan_json(&self) -> PyResult<String> {
        self.inner
            .plan
            .to_json()
            .map_err(|e| PyValueError::new_err(format!("{:#}", e)))
    }
}

/// Prepare a figure plan of `table` over the zones
#[pyfunction]
#[pyo3(signature = (table, zones, groups = None, config = None))]
pub fn plot(
    table: PyRef<PyResultTable>,
    zones: PyRef<PyZoneGeometries>,
    groups: Option<PyRef<PyZoneGroups>>,
    config: Option<PyRef<PyFigureConfig>>,
) -> PyResult<PyFigure> {
    let groups = groups.map_or_else(ZoneGroups::default, |g| g.inner.clone());
    let config = config.map_or_else(FigureConfig::default, |c| c.inner.clone());
    figure::plot(&table.inner, &zones.inner, &groups, &config)
        .map(|inner| PyFigure { inner })
        .map_err(|e| PyValueError::new_err(format!("Failed to plot: {:#}", e)))
}

/// Merge values onto the zones and return the table as a GeoJSON dict in WGS84
#[pyfunction]
#[pyo3(signature = (table, zones, groups = None))]
pub fn merge(
    py: Python,
    table: PyRef<PyResultTable>,
    zones: PyRef<PyZoneGeometries>,
    groups: Option<PyRef<PyZoneGroups>>,
) -> PyResult<Py<PyAny>> {
    let groups = groups.map_or_else(ZoneGroups::default, |g| g.inner.clone());
    let merged = aggregate::merge(&table.inner, &zones.inner, &groups)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    json_to_py(py, &merged.to_geojson().to_string())
}

/// Route library log records to stderr
#[pyfunction]
#[pyo3(signature = (level = None))]
pub fn init_logging(level: Option<&str>) -> PyResult<()> {
    rsqcmaps::log::init(level).map_err(|e| PyValueError::new_err(e.to_string()))
}

fn enum_name<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(name)) => name,
        _ => String::new(),
    }
}

fn parse_enum<T: serde::de::DeserializeOwned>(name: String) -> PyResult<T> {
    serde_json::from_value(serde_json::Value::String(name))
        .map_err(|e| PyValueError::new_err(e.to_string()))
}
