use std::env;
use std::path::PathBuf;

/// Location of the bidding-zone dataset when nothing else is configured
pub const DEFAULT_ZONES_PATH: &str = "data/el_zones_raew.geojson";

/// Environment variable overriding [`DEFAULT_ZONES_PATH`]
pub const ZONES_PATH_ENV: &str = "RSQCMAPS_ZONES";

/// Property holding the zone code in the dataset
pub const ZONE_ID_PROPERTY: &str = "id";

pub fn get_zones_path() -> PathBuf {
    env::var_os(ZONES_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ZONES_PATH))
}
