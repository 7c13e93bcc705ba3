use anyhow::{bail, Context, Result};

/// RGBA color with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

pub const QC_BLUE: Rgba = Rgba::new(0.2298057, 0.29871797, 0.75368315, 1.0);
pub const QC_ORANGE: Rgba = Rgba::new(0.99215686, 0.55294118, 0.23529412, 1.0);
pub const QC_RED: Rgba = Rgba::new(0.70567316, 0.01555616, 0.15023281, 1.0);
pub const QC_BACKGROUND: Rgba = Rgba::new(0.184, 0.267, 0.314, 1.0);
pub const QC_LOGO: Rgba = Rgba::new(0.859, 0.988, 0.557, 1.0);
pub const QC_GREEN: Rgba = Rgba::new(0.259, 0.588, 0.404, 1.0);
pub const QC_BROWN: Rgba = Rgba::new(0.545, 0.353, 0.169, 1.0);

/// CSS names accepted in configuration files
const NAMED_COLORS: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("gainsboro", "#dcdcdc"),
    ("whitesmoke", "#f5f5f5"),
    ("lightgray", "#d3d3d3"),
    ("lightgrey", "#d3d3d3"),
    ("floralwhite", "#fffaf0"),
];

impl Rgba {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Rgba { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex
            .strip_prefix('#')
            .with_context(|| format!("Color '{}' must start with '#'", hex))?;
        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            bail!("Color '{}' must have 6 or 8 hex digits", hex);
        }
        let channel = |i: usize| -> Result<f64> {
            let value = u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("Invalid hex digits in color '{}'", hex))?;
            Ok(value as f64 / 255.0)
        };
        let a = if digits.len() == 8 { channel(6)? } else { 1.0 };
        Ok(Rgba::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Parse a hex code or one of the supported color names
    pub fn parse(color: &str) -> Result<Self> {
        let lower = color.trim().to_lowercase();
        if let Some((_, hex)) = NAMED_COLORS.iter().find(|(name, _)| *name == lower) {
            return Self::from_hex(hex);
        }
        Self::from_hex(&lower)
    }

    /// `#rrggbb`, or `#rrggbbaa` for translucent colors
    pub fn to_hex(&self) -> String {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                byte(self.r),
                byte(self.g),
                byte(self.b),
                byte(self.a)
            )
        }
    }

    fn lerp(&self, other: &Rgba, t: f64) -> Rgba {
        if t >= 1.0 {
            return *other;
        }
        Rgba::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }
}

/// Linear segmented colormap over evenly spaced color stops
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    pub name: String,
    stops: Vec<Rgba>,
}

impl Colormap {
    pub fn from_stops(name: impl Into<String>, stops: Vec<Rgba>) -> Result<Self> {
        let name = name.into();
        if stops.len() < 2 {
            bail!("Colormap '{}' needs at least two colors", name);
        }
        Ok(Colormap { name, stops })
    }

    /// Colormap from hex codes or color names
    pub fn from_colors(name: impl Into<String>, colors: &[String]) -> Result<Self> {
        let stops = colors
            .iter()
            .map(|c| Rgba::parse(c))
            .collect::<Result<Vec<_>>>()?;
        Self::from_stops(name, stops)
    }

    /// Built-in colormap by name; a `_r` suffix reverses it
    ///
    /// Known names: `QC_sequential`, `QC_diverging`, `QC_test` (alias `QC`)
    /// and `bluered`.
    pub fn by_name(name: &str) -> Result<Self> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (name, false),
        };
        let stops = match base {
            "QC" | "QC_test" => vec![QC_BLUE, QC_ORANGE, QC_RED],
            "QC_sequential" => vec![QC_LOGO, QC_BLUE, QC_BACKGROUND],
            "QC_diverging" => vec![QC_GREEN, QC_BLUE, QC_BROWN],
            "bluered" => vec![QC_BLUE, QC_RED],
            _ => bail!("Unknown colormap '{}'", name),
        };
        let colormap = Self::from_stops(base, stops)?;
        Ok(if reversed {
            colormap.reversed()
        } else {
            colormap
        })
    }

    pub fn reversed(&self) -> Self {
        let mut stops = self.stops.clone();
        stops.reverse();
        Colormap {
            name: format!("{}_r", self.name),
            stops,
        }
    }

    /// Color at position `t`, clamped to `[0, 1]`
    pub fn at(&self, t: f64) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let segments = (self.stops.len() - 1) as f64;
        let scaled = t * segments;
        let index = (scaled.floor() as usize).min(self.stops.len() - 2);
        self.stops[index].lerp(&self.stops[index + 1], scaled - index as f64)
    }
}
