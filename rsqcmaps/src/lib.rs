//! Choropleth map preparation for European electricity bidding zones.
//!
//! Result values keyed by zone code are merged onto the bidding-zone
//! geometries, zones named together by a group are dissolved, the table is
//! reprojected and framed, and [`plot::figure::plot`] returns a figure plan
//! for an external renderer.

pub mod collect;
pub mod commons;
pub mod error;
pub mod geo_core;
pub mod geometric;
pub mod log;
pub mod plot;

pub use collect::results::ResultTable;
pub use collect::zones::ZoneGeometries;
pub use error::{ValidationErrors, ZoneMapError};
pub use geometric::aggregate::merge;
pub use geometric::merged::{MergedTable, MergedZone};
pub use geometric::zone_groups::ZoneGroups;
pub use plot::config::FigureConfig;
#[cfg(feature = "proj")]
pub use plot::figure::plot;
