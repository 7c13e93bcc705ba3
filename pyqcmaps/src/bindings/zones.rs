use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rsqcmaps::collect::zones::ZoneGeometries;
use rsqcmaps::geometric::zone_groups::ZoneGroups;
use std::collections::HashMap;

/// ZoneGeometries Python binding
#[pyclass]
pub struct PyZoneGeometries {
    pub(crate) inner: ZoneGeometries,
}

#[pymethods]
impl PyZoneGeometries {
    /// Load a GeoJSON file, or the configured bidding-zone dataset when no path is given
    #[new]
    #[pyo3(signature = (path = None))]
    fn new(path: Option<String>) -> PyResult<Self> {
        let zones = match path {
            Some(path) => ZoneGeometries::from_path(path),
            None => ZoneGeometries::from_default_path(),
        };
        zones
            .map(|inner| PyZoneGeometries { inner })
            .map_err(|e| PyValueError::new_err(format!("Failed to load zones: {:#}", e)))
    }

    #[staticmethod]
    fn from_geojson(data: &str) -> PyResult<Self> {
        ZoneGeometries::from_geojson(data.as_bytes())
            .map(|inner| PyZoneGeometries { inner })
            .map_err(|e| PyValueError::new_err(format!("Failed to parse zones: {:#}", e)))
    }

    fn ids(&self) -> Vec<String> {
        self.inner.ids().map(str::to_string).collect()
    }

    #[getter]
    fn crs(&self) -> String {
        self.inner.geo_core.get_crs().definition()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __contains__(&self, id: &str) -> bool {
        self.inner.contains(id)
    }
}

/// ZoneGroups Python binding
#[pyclass]
#[derive(Clone)]
pub struct PyZoneGroups {
    pub(crate) inner: ZoneGroups,
}

#[pymethods]
impl PyZoneGroups {
    /// Groups from a `{name: [members]}` dict, or the default aggregates
    #[new]
    #[pyo3(signature = (groups = None))]
    fn new(groups: Option<HashMap<String, Vec<String>>>) -> Self {
        let inner = match groups {
            Some(groups) => {
                let mut inner = ZoneGroups::new();
                for (name, members) in groups {
                    inner.insert(name, members);
                }
                inner
            }
            None => ZoneGroups::default(),
        };
        PyZoneGroups { inner }
    }

    #[staticmethod]
    fn from_toml(path: &str) -> PyResult<Self> {
        ZoneGroups::from_path(path)
            .map(|inner| PyZoneGroups { inner })
            .map_err(|e| PyValueError::new_err(format!("Failed to load zone groups: {:#}", e)))
    }

    fn insert(&mut self, name: String, members: Vec<String>) {
        self.inner.insert(name, members);
    }

    fn members(&self, name: &str) -> Option<Vec<String>> {
        self.inner.members(name).map(<[String]>::to_vec)
    }

    fn names(&self) -> Vec<String> {
        self.inner.names().map(str::to_string).collect()
    }
}
