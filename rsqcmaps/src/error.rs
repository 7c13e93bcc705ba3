use thiserror::Error;

/// Domain errors raised while building result tables, merging zones and
/// preparing figures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneMapError {
    /// A result column names neither a base zone nor a zone group
    #[error("column '{0}' matches neither a known zone nor a zone group")]
    UnknownZoneOrGroup(String),

    /// None of the members of an active group exist in the zone geometries
    #[error("zone group '{0}' has no member present in the zone geometries")]
    EmptyGroupMembership(String),

    /// A table cell could not be read as a number
    #[error("non-numeric value '{value}' for zone '{zone}' in series '{series}'")]
    NonNumericValue {
        series: String,
        zone: String,
        value: String,
    },

    /// The same zone or group column appears twice in a result table
    #[error("column '{0}' appears more than once in the result table")]
    DuplicateColumn(String),

    /// The same series name appears twice in a result table
    #[error("series '{0}' appears more than once in the result table")]
    DuplicateSeries(String),

    /// A base zone is claimed by two groups used in the same merge
    #[error("zone '{zone}' belongs to both active groups '{first}' and '{second}'")]
    OverlappingGroups {
        zone: String,
        first: String,
        second: String,
    },

    /// A group name shadows a base zone identifier
    #[error("zone group '{0}' has the same name as a base zone")]
    GroupNameCollision(String),

    /// A highlighted zone is not part of the merged table
    #[error("highlighted zone '{0}' is not present in the merged table")]
    UnknownHighlightZone(String),

    /// No zone carries a value, so there is nothing to scale or frame
    #[error("no zone carries a value")]
    NoData,

    /// A feature's geometry is missing or not polygonal
    #[error("zone '{0}' has no polygonal geometry")]
    InvalidGeometry(String),
}

/// Every problem found by a validation pass
#[derive(Debug, Clone, PartialEq, Error)]
#[error("validation failed: {}", render(.0))]
pub struct ValidationErrors(pub Vec<ZoneMapError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ZoneMapError] {
        &self.0
    }

    pub fn contains(&self, error: &ZoneMapError) -> bool {
        self.0.contains(error)
    }
}

fn render(errors: &[ZoneMapError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
