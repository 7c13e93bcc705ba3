use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rsqcmaps::collect::results::ResultTable;

/// ResultTable Python binding
#[pyclass]
pub struct PyResultTable {
    pub(crate) inner: ResultTable,
}

#[pymethods]
impl PyResultTable {
    /// Build from row-major values: `values[series][column]`, `None` for missing
    #[new]
    fn new(
        series: Vec<String>,
        columns: Vec<String>,
        values: Vec<Vec<Option<f64>>>,
    ) -> PyResult<Self> {
        match ResultTable::new(series, columns, values) {
            Ok(table) => Ok(PyResultTable { inner: table }),
            Err(e) => Err(PyValueError::new_err(format!(
                "Failed to create ResultTable: {}",
                e
            ))),
        }
    }

    /// Load from CSV: first column holds series labels, other headers are zone codes
    #[staticmethod]
    fn from_csv(path: &str) -> PyResult<Self> {
        ResultTable::from_csv_path(path)
            .map(|inner| PyResultTable { inner })
            .map_err(|e| PyValueError::new_err(format!("Failed to load ResultTable: {:#}", e)))
    }

    #[getter]
    fn series(&self) -> Vec<String> {
        self.inner.series().to_vec()
    }

    #[getter]
    fn columns(&self) -> Vec<String> {
        self.inner.columns().to_vec()
    }

    fn get(&self, series: &str, zone: &str) -> Option<f64> {
        self.inner.get(series, zone)
    }

    fn __repr__(&self) -> String {
        format!(
            "ResultTable(series={}, columns={})",
            self.inner.series().len(),
            self.inner.columns().len()
        )
    }
}
