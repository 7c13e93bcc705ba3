use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Composite zones and the base zones they dissolve
///
/// A group only takes effect when a result table has a column with its name;
/// the default table therefore contains overlapping alternatives (`DELU` and
/// `DEATLU`, `NO125` and `NO`) of which a caller picks one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneGroups {
    groups: BTreeMap<String, Vec<String>>,
}

impl ZoneGroups {
    pub fn new() -> Self {
        ZoneGroups {
            groups: BTreeMap::new(),
        }
    }

    /// Read groups from a TOML table of `NAME = ["MEMBER", ...]` entries
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse zone groups")
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read zone groups file: {:?}", path))?;
        Self::from_toml_str(&content)
    }

    pub fn insert<I, S>(&mut self, name: impl Into<String>, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .insert(name.into(), members.into_iter().map(Into::into).collect());
    }

    pub fn members(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Default for ZoneGroups {
    /// Aggregates used in European market studies
    fn default() -> Self {
        let mut groups = ZoneGroups::new();
        groups.insert("UK", ["GB", "NI"]);
        groups.insert("IESEM", ["IE", "NI"]);
        groups.insert("BT", ["EE", "LT", "LV"]);
        groups.insert("DELU", ["DE", "LU"]);
        groups.insert("DEATLU", ["DE", "AT", "LU"]);
        groups.insert("NO125", ["NO1", "NO2", "NO5"]);
        groups.insert("NO", ["NO1", "NO2", "NO3", "NO4", "NO5"]);
        groups.insert("SE", ["SE1", "SE2", "SE3", "SE4"]);
        groups.insert("IT", ["IT1", "IT2", "IT3", "IT4", "IT5", "IT6"]);
        groups.insert("DK", ["DK1", "DK2"]);
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_groups() {
        let groups = ZoneGroups::default();
        assert_eq!(groups.len(), 10);
        assert_eq!(groups.members("UK").unwrap(), &["GB", "NI"]);
        assert_eq!(groups.members("DEATLU").unwrap(), &["DE", "AT", "LU"]);
        assert!(groups.members("SE12").is_none());
    }

    #[test]
    fn test_from_toml_str() {
        let groups = ZoneGroups::from_toml_str(
            r#"
            SE12 = ["SE1", "SE2"]
            SE34 = ["SE3", "SE4"]
            "#,
        )
        .unwrap();
        assert_eq!(groups.names().collect::<Vec<_>>(), vec!["SE12", "SE34"]);
        assert_eq!(groups.members("SE34").unwrap(), &["SE3", "SE4"]);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.toml");
        std::fs::write(&path, "DK = [\"DK1\", \"DK2\"]\n").unwrap();
        let groups = ZoneGroups::from_path(&path).unwrap();
        assert!(groups.contains("DK"));
    }
}
