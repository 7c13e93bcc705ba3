use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::commons::colors::{Colormap, Rgba};
use crate::geometric::frame::Highlight;
use crate::geometric::reproject::Projection;
use crate::plot::color_scale::ColorScalePolicy;

/// Settings of one figure, passed explicitly to [`crate::plot::figure::plot`]
///
/// Every field has a default, so a TOML file only lists what it changes:
///
/// ```toml
/// colormap = "QC_diverging"
/// color_scale = "diverging"
/// highlight = ["DE", "FR"]
/// legend_label = "Price change [EUR/MWh]"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FigureConfig {
    pub dpi: u32,
    pub font_family: String,
    pub font_size: f64,
    /// Fill of zones without any value
    pub empty_color: String,
    /// Fill of zones with data that are not highlighted
    pub hide_color: String,
    pub colormap: String,
    pub color_scale: ColorScalePolicy,
    pub highlight: Highlight,
    /// Frame padding as fractions of the highlighted extent, `[minx, miny, maxx, maxy]`
    pub buffer_frame: [f64; 4],
    /// Frame offset as fractions of the highlighted extent, `[x, y]`
    pub shift_frame: [f64; 2],
    pub projection: Projection,
    pub edge_width: f64,
    pub label_halo_width: f64,
    pub legend_label: String,
}

impl Default for FigureConfig {
    fn default() -> Self {
        FigureConfig {
            dpi: 300,
            font_family: "Helvetica".to_string(),
            font_size: 10.0,
            empty_color: "gainsboro".to_string(),
            hide_color: "gainsboro".to_string(),
            colormap: "QC_sequential".to_string(),
            color_scale: ColorScalePolicy::Sequential,
            highlight: Highlight::All,
            buffer_frame: [-0.05, -0.05, 0.05, 0.05],
            shift_frame: [0.0, 0.0],
            projection: Projection::EqualArea,
            edge_width: 0.5,
            label_halo_width: 1.0,
            legend_label: String::new(),
        }
    }
}

impl FigureConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: FigureConfig =
            toml::from_str(content).context("Failed to parse figure configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read figure configuration: {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid figure configuration: {:?}", path))
    }

    /// Check that colors and the colormap name resolve
    pub fn validate(&self) -> Result<()> {
        self.colors()?;
        self.colormap()?;
        Ok(())
    }

    /// Empty and hide fills
    pub fn colors(&self) -> Result<(Rgba, Rgba)> {
        let empty = Rgba::parse(&self.empty_color).context("Invalid empty_color")?;
        let hide = Rgba::parse(&self.hide_color).context("Invalid hide_color")?;
        Ok((empty, hide))
    }

    pub fn colormap(&self) -> Result<Colormap> {
        Colormap::by_name(&self.colormap)
    }
}
