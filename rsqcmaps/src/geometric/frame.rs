use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ZoneMapError;
use crate::geo_core::BoundingBox;
use crate::geometric::merged::MergedTable;

/// Zones drawn with colormap colors
///
/// Reads `"all"` or a list of zone codes from configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "HighlightSetting", into = "HighlightSetting")]
pub enum Highlight {
    /// Every zone carrying data
    #[default]
    All,
    Zones(Vec<String>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum HighlightSetting {
    Keyword(String),
    Zones(Vec<String>),
}

impl TryFrom<HighlightSetting> for Highlight {
    type Error = String;

    fn try_from(setting: HighlightSetting) -> Result<Self, Self::Error> {
        match setting {
            HighlightSetting::Keyword(word) if word.eq_ignore_ascii_case("all") => {
                Ok(Highlight::All)
            }
            HighlightSetting::Keyword(word) => Err(format!(
                "highlight must be \"all\" or a list of zones, got \"{}\"",
                word
            )),
            HighlightSetting::Zones(zones) => Ok(Highlight::Zones(zones)),
        }
    }
}

impl From<Highlight> for HighlightSetting {
    fn from(highlight: Highlight) -> Self {
        match highlight {
            Highlight::All => HighlightSetting::Keyword("all".to_string()),
            Highlight::Zones(zones) => HighlightSetting::Zones(zones),
        }
    }
}

impl Highlight {
    pub fn is_all(&self) -> bool {
        matches!(self, Highlight::All)
    }

    /// Zone codes to highlight in `table`, sorted
    pub fn resolve(&self, table: &MergedTable) -> Result<Vec<String>> {
        match self {
            Highlight::All => Ok(table
                .zones_with_data()
                .into_iter()
                .map(str::to_string)
                .collect()),
            Highlight::Zones(zones) => {
                if let Some(unknown) = zones.iter().find(|z| !table.contains(z)) {
                    return Err(ZoneMapError::UnknownHighlightZone(unknown.clone()).into());
                }
                let mut zones = zones.clone();
                zones.sort();
                zones.dedup();
                Ok(zones)
            }
        }
    }
}

/// Merged table cut to the extent of its highlighted zones
#[derive(Debug, Clone, PartialEq)]
pub struct FramedTable {
    pub frame: BoundingBox,
    pub highlighted: Vec<String>,
    pub table: MergedTable,
}

/// Extent around the `highlighted` zones
///
/// Sides move by `buffer` (`[minx, miny, maxx, maxy]`) and the whole box by
/// `shift` (`[x, y]`), both as fractions of the width and height of the
/// highlighted bounds.
pub fn area_frame<S: AsRef<str>>(
    table: &MergedTable,
    highlighted: &[S],
    buffer: [f64; 4],
    shift: [f64; 2],
) -> Result<BoundingBox> {
    let bounds = table
        .total_bounds(highlighted)
        .ok_or(ZoneMapError::NoData)?;
    Ok(bounds.buffered(buffer).shifted(shift, &bounds))
}

/// Resolve the highlight set, compute its frame and clip to it unless every
/// zone with data is highlighted
pub fn frame(
    table: &MergedTable,
    highlight: &Highlight,
    buffer: [f64; 4],
    shift: [f64; 2],
) -> Result<FramedTable> {
    let highlighted = highlight.resolve(table)?;
    let frame = area_frame(table, &highlighted, buffer, shift)?;
    debug!(
        "Frame of {} highlighted zones: ({}, {}, {}, {})",
        highlighted.len(),
        frame.min_x,
        frame.min_y,
        frame.max_x,
        frame.max_y
    );
    let table = if highlight.is_all() {
        table.clone()
    } else {
        table.clip(&frame)
    };
    Ok(FramedTable {
        frame,
        highlighted,
        table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometric::merged::MergedZone;
    use geo::{polygon, MultiPolygon};

    const BUFFER: [f64; 4] = [-0.05, -0.05, 0.05, 0.05];

    fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: min_x, y: min_y),
            (x: max_x, y: min_y),
            (x: max_x, y: max_y),
            (x: min_x, y: max_y),
            (x: min_x, y: min_y),
        ]])
    }

    fn table() -> MergedTable {
        let mut table = MergedTable::new(vec!["2030".to_string()]);
        let mut a = MergedZone::new(rect(0.0, 0.0, 4.0, 10.0), 1);
        a.values = vec![Some(1.0)];
        table.insert("A", a);
        let mut b = MergedZone::new(rect(4.0, 0.0, 10.0, 6.0), 1);
        b.values = vec![Some(2.0)];
        table.insert("B", b);
        table.insert("C", MergedZone::new(rect(30.0, 30.0, 40.0, 40.0), 1));
        table
    }

    fn assert_close(actual: BoundingBox, expected: BoundingBox) {
        for (a, e) in [
            (actual.min_x, expected.min_x),
            (actual.min_y, expected.min_y),
            (actual.max_x, expected.max_x),
            (actual.max_y, expected.max_y),
        ] {
            assert!((a - e).abs() < 1e-9, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_area_frame_buffer() {
        let frame = area_frame(&table(), &["A", "B"], BUFFER, [0.0, 0.0]).unwrap();
        assert_close(frame, BoundingBox::new(-0.5, -0.5, 10.5, 10.5));
    }

    #[test]
    fn test_area_frame_shift() {
        let frame = area_frame(&table(), &["A", "B"], [0.0; 4], [0.1, -0.2]).unwrap();
        assert_close(frame, BoundingBox::new(1.0, -2.0, 11.0, 8.0));
    }

    #[test]
    fn test_area_frame_empty() {
        let err = area_frame::<&str>(&table(), &[], BUFFER, [0.0, 0.0]).unwrap_err();
        assert_eq!(err.downcast_ref::<ZoneMapError>(), Some(&ZoneMapError::NoData));
    }

    #[test]
    fn test_frame_all_keeps_geometry() {
        let framed = frame(&table(), &Highlight::All, BUFFER, [0.0, 0.0]).unwrap();
        assert_eq!(framed.highlighted, vec!["A", "B"]);
        assert_eq!(framed.table, table());
    }

    #[test]
    fn test_frame_subset_clips() {
        let highlight = Highlight::Zones(vec!["A".to_string()]);
        let framed = frame(&table(), &highlight, [0.0; 4], [0.0, 0.0]).unwrap();
        assert_close(framed.frame, BoundingBox::new(0.0, 0.0, 4.0, 10.0));
        assert!(!framed.table.contains("C"));
        assert!(framed.table.contains("A"));
    }

    #[test]
    fn test_unknown_highlight_zone() {
        let highlight = Highlight::Zones(vec!["A".to_string(), "ZZ".to_string()]);
        let err = highlight.resolve(&table()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ZoneMapError>(),
            Some(&ZoneMapError::UnknownHighlightZone("ZZ".to_string()))
        );
    }

    #[test]
    fn test_highlight_setting() {
        let all: Highlight = serde_json::from_str("\"all\"").unwrap();
        assert!(all.is_all());
        let zones: Highlight = serde_json::from_str("[\"FR\", \"DE\"]").unwrap();
        assert_eq!(
            zones,
            Highlight::Zones(vec!["FR".to_string(), "DE".to_string()])
        );
        assert!(serde_json::from_str::<Highlight>("\"some\"").is_err());
        assert_eq!(serde_json::to_string(&Highlight::All).unwrap(), "\"all\"");
    }
}
