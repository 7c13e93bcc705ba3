use geo::{coord, Polygon, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "proj")]
use anyhow::{bail, Context, Result};
#[cfg(feature = "proj")]
use geo::{Coord, MapCoords, MultiPolygon, Point};
#[cfg(feature = "proj")]
use proj::Proj;

/// Coordinate reference system of a geometry table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Crs {
    /// Registered EPSG code, e.g. 4326 or 3035
    Epsg(u32),
    /// Free-form PROJ definition string
    Proj(String),
}

/// Geographic WGS84, the CRS of the zone dataset on disk
pub const WGS84: Crs = Crs::Epsg(4326);
/// Web Mercator, used to locate the orthographic projection center
pub const WEB_MERCATOR: Crs = Crs::Epsg(3857);
/// Lambert Azimuthal Equal Area, Europe-centered
pub const LAEA_EUROPE: Crs = Crs::Epsg(3035);

impl Crs {
    /// Orthographic projection looking straight down on (`lon`, `lat`)
    pub fn orthographic(lon: f64, lat: f64) -> Self {
        Crs::Proj(format!(
            "+proj=ortho +lat_0={} +lon_0={} +datum=WGS84",
            lat, lon
        ))
    }

    /// Definition accepted by PROJ
    pub fn definition(&self) -> String {
        match self {
            Crs::Epsg(code) => format!("EPSG:{}", code),
            Crs::Proj(definition) => definition.clone(),
        }
    }

    pub fn epsg(&self) -> Option<u32> {
        match self {
            Crs::Epsg(code) => Some(*code),
            Crs::Proj(_) => None,
        }
    }
}

impl Default for Crs {
    fn default() -> Self {
        WGS84
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.definition())
    }
}

/// CRS bookkeeping shared by the geometry tables
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoCore {
    crs: Crs,
}

impl GeoCore {
    pub fn new(crs: Crs) -> Self {
        GeoCore { crs }
    }

    pub fn get_crs(&self) -> &Crs {
        &self.crs
    }

    /// Build a PROJ transformation between two CRS, in lon/lat axis order
    #[cfg(feature = "proj")]
    pub fn transformer(from: &Crs, to: &Crs) -> Result<Proj> {
        Proj::new_known_crs(&from.definition(), &to.definition(), None).with_context(|| {
            format!("Failed to create Proj transformation from {} to {}", from, to)
        })
    }

    /// Transform coordinates from one CRS to another
    #[cfg(feature = "proj")]
    pub fn transform_coords(from: &Crs, to: &Crs, x: f64, y: f64) -> Result<(f64, f64)> {
        let proj = Self::transformer(from, to)?;
        convert(&proj, x, y)
    }

    /// Transform a Point from one CRS to another
    #[cfg(feature = "proj")]
    pub fn transform_point(from: &Crs, to: &Crs, point: Point<f64>) -> Result<Point<f64>> {
        let (x, y) = Self::transform_coords(from, to, point.x(), point.y())?;
        Ok(Point::new(x, y))
    }

    /// Transform every vertex of a multipolygon
    #[cfg(feature = "proj")]
    pub fn transform_multi_polygon(
        proj: &Proj,
        geometry: &MultiPolygon<f64>,
    ) -> Result<MultiPolygon<f64>> {
        geometry.try_map_coords(|c: Coord<f64>| -> Result<Coord<f64>> {
            let (x, y) = convert(proj, c.x, c.y)?;
            Ok(coord! { x: x, y: y })
        })
    }
}

#[cfg(feature = "proj")]
fn convert(proj: &Proj, x: f64, y: f64) -> Result<(f64, f64)> {
    let (tx, ty) = proj
        .convert((x, y))
        .context("Failed to transform coordinates")?;
    if !tx.is_finite() || !ty.is_finite() {
        bail!("Coordinate ({}, {}) has no finite image in the target CRS", x, y);
    }
    Ok((tx, ty))
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_rect(rect: Rect<f64>) -> Self {
        BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Move each side by a fraction of the box size: `[minx, miny, maxx, maxy]`
    pub fn buffered(&self, buffer: [f64; 4]) -> BoundingBox {
        let (dx, dy) = (self.width(), self.height());
        BoundingBox::new(
            self.min_x + buffer[0] * dx,
            self.min_y + buffer[1] * dy,
            self.max_x + buffer[2] * dx,
            self.max_y + buffer[3] * dy,
        )
    }

    /// Translate by `[x, y]`, expressed as fractions of `reference`'s width and height
    pub fn shifted(&self, shift: [f64; 2], reference: &BoundingBox) -> BoundingBox {
        let sx = shift[0] * reference.width();
        let sy = shift[1] * reference.height();
        BoundingBox::new(
            self.min_x + sx,
            self.min_y + sy,
            self.max_x + sx,
            self.max_y + sy,
        )
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Rect::new(
            coord! { x: self.min_x, y: self.min_y },
            coord! { x: self.max_x, y: self.max_y },
        )
        .to_polygon()
    }
}
