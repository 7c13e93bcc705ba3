use pyo3::prelude::*;

mod bindings;

use bindings::{
    init_logging, merge, plot, PyFigure, PyFigureConfig, PyResultTable, PyZoneGeometries,
    PyZoneGroups,
};

/// Python bindings for rsqcmaps
/// Choropleth figure plans for European bidding zones

#[pymodule]
fn pyqcmaps(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyResultTable>()?;
    m.add_class::<PyZoneGeometries>()?;
    m.add_class::<PyZoneGroups>()?;
    m.add_class::<PyFigureConfig>()?;
    m.add_class::<PyFigure>()?;

    // Aliases for a Pythonic API (ResultTable instead of PyResultTable)
    m.setattr("ResultTable", m.getattr("PyResultTable")?)?;
    m.setattr("ZoneGeometries", m.getattr("PyZoneGeometries")?)?;
    m.setattr("ZoneGroups", m.getattr("PyZoneGroups")?)?;
    m.setattr("FigureConfig", m.getattr("PyFigureConfig")?)?;
    m.setattr("Figure", m.getattr("PyFigure")?)?;

    m.add_function(wrap_pyfunction!(plot, m)?)?;
    m.add_function(wrap_pyfunction!(merge, m)?)?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;

    m.add(
        "__doc__",
        "Python bindings for rsqcmaps - choropleth figure plans for European bidding zones",
    )?;

    Ok(())
}
