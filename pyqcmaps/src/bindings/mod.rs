// Python bindings module
// Each file contains one or more PyO3 #[pyclass] definitions

pub mod figure;
pub mod results;
pub mod zones;

pub use figure::{init_logging, merge, plot, PyFigure, PyFigureConfig};
pub use results::PyResultTable;
pub use zones::{PyZoneGeometries, PyZoneGroups};

use pyo3::prelude::*;

/// Convert a JSON string to Python objects with the `json` module
pub(crate) fn json_to_py(py: Python, json_str: &str) -> PyResult<Py<PyAny>> {
    let json = py.import("json")?;
    let value: Bound<PyAny> = json.call_method1("loads", (json_str,))?;
    Ok(value.unbind())
}
