use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::commons::basic_functions::value_range;
use crate::commons::colors::{Colormap, Rgba};
use crate::error::ZoneMapError;
use crate::geometric::merged::MergedTable;

/// How the color range is derived from the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScalePolicy {
    /// From the smallest to the largest value
    #[default]
    Sequential,
    /// Symmetric around zero
    Diverging,
}

/// Value range shared by every panel of a figure
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorScale {
    pub vmin: f64,
    pub vmax: f64,
}

impl ColorScale {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        ColorScale { vmin, vmax }
    }

    /// Scale over the present values; [`ZoneMapError::NoData`] when there are none
    pub fn from_values<I>(policy: ColorScalePolicy, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let (min, max) = value_range(values).ok_or(ZoneMapError::NoData)?;
        Ok(match policy {
            ColorScalePolicy::Sequential => ColorScale::new(min, max),
            ColorScalePolicy::Diverging => {
                let bound = max.abs().max(min.abs());
                ColorScale::new(-bound, bound)
            }
        })
    }

    /// Scale over every series of the zones carrying data
    pub fn from_table(policy: ColorScalePolicy, table: &MergedTable) -> Result<Self> {
        Self::from_values(policy, table.values())
    }

    /// Position of `value` in `[0, 1]`; a degenerate range maps to the middle
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.vmax - self.vmin;
        if span <= 0.0 {
            return 0.5;
        }
        ((value - self.vmin) / span).clamp(0.0, 1.0)
    }

    pub fn color(&self, colormap: &Colormap, value: f64) -> Rgba {
        colormap.at(self.normalize(value))
    }
}
