//! Installation table - the hubs installed at each site
//!
//! Tables are TOML files listing canonical hub strings per site. A sample
//! table for two sites is compiled in and available through
//! [`InstallationTable::builtin`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::topology::{Hub, TopologyError};

const BUILTIN_SITES: &str = include_str!("../data/sites.toml");

#[derive(Error, Debug)]
pub enum SitesError {
    #[error("Failed to read installation table: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse installation table: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize installation table: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid hub at site {site}: {source}")]
    HubError {
        site: String,
        #[source]
        source: TopologyError,
    },
}

/// One site and the hubs installed there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Site identifier, e.g. "H1"
    pub id: String,
    /// Human-readable name
    #[serde(default)]
    pub name: Option<String>,
    /// Canonical hub strings
    #[serde(default)]
    pub hubs: Vec<String>,
}

impl Site {
    /// Decode every hub of this site, in table order
    pub fn decode_hubs(&self) -> Result<Vec<Hub>, SitesError> {
        self.hubs
            .iter()
            .map(|s| {
                Hub::decode(s).map_err(|source| SitesError::HubError {
                    site: self.id.clone(),
                    source,
                })
            })
            .collect()
    }
}

/// The installation table index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationTable {
    /// Version of the table format
    #[serde(default = "default_version")]
    pub version: String,
    /// Sites, in table order
    #[serde(default)]
    pub site: Vec<Site>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for InstallationTable {
    fn default() -> Self {
        Self {
            version: default_version(),
            site: Vec::new(),
        }
    }
}

impl InstallationTable {
    /// Load an installation table from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SitesError> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::from_toml(&content)?;
        debug!(path = %path.display(), sites = table.site.len(), "Loaded installation table");
        Ok(table)
    }

    /// Load an installation table from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, SitesError> {
        let table: InstallationTable = toml::from_str(content)?;
        Ok(table)
    }

    /// The compiled-in sample table (sites H1 and L1)
    pub fn builtin() -> Result<Self, SitesError> {
        Self::from_toml(BUILTIN_SITES)
    }

    /// Find a site by id, case-insensitively
    pub fn find_site(&self, id: &str) -> Option<&Site> {
        self.site.iter().find(|s| s.id.eq_ignore_ascii_case(id))
    }

    /// Append a site
    pub fn add(&mut self, site: Site) {
        self.site.push(site);
    }

    /// Decode every hub of every site, in table order
    pub fn hubs(&self) -> Result<Vec<Hub>, SitesError> {
        let mut hubs = Vec::new();
        for site in &self.site {
            hubs.extend(site.decode_hubs()?);
        }
        Ok(hubs)
    }

    /// Save the table to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), SitesError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::PORTS_PER_HUB;

    #[test]
    fn test_builtin_table() {
        let table = InstallationTable::builtin().unwrap();
        assert_eq!(table.version, "1.0");
        let ids: Vec<_> = table.site.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["H1", "L1"]);

        let hubs = table.hubs().unwrap();
        assert!(!hubs.is_empty());
        for (hub, source) in hubs.iter().zip(table.site.iter().flat_map(|s| &s.hubs)) {
            assert_eq!(hub.slots().len(), PORTS_PER_HUB);
            // Sample data is stored in canonical form
            assert_eq!(&hub.encode(), source);
        }
    }

    #[test]
    fn test_find_site() {
        let table = InstallationTable::builtin().unwrap();
        let site = table.find_site("h1").unwrap();
        assert_eq!(site.name.as_deref(), Some("LIGO Hanford"));
        assert!(site.decode_hubs().unwrap().iter().all(|h| h.site() == "H1"));
        assert!(table.find_site("K1").is_none());
    }

    #[test]
    fn test_bad_hub_reports_site() {
        let toml = r#"
[[site]]
id = "T1"
hubs = ["T1:SYS-TIMING_C_M_A;:,,,"]
"#;
        let table = InstallationTable::from_toml(toml).unwrap();
        match table.hubs().unwrap_err() {
            SitesError::HubError { site, source } => {
                assert_eq!(site, "T1");
                assert!(matches!(source, TopologyError::Format(_)));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            InstallationTable::from_file(&dir.path().join("absent.toml")),
            Err(SitesError::IoError(_))
        ));

        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[[site]\nid = ").unwrap();
        assert!(matches!(
            InstallationTable::from_file(&path),
            Err(SitesError::ParseError(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let table = InstallationTable::from_toml("").unwrap();
        assert_eq!(table, InstallationTable::default());
        assert!(table.hubs().unwrap().is_empty());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.toml");

        let mut table = InstallationTable::default();
        table.add(Site {
            id: "T1".to_string(),
            name: Some("test stand".to_string()),
            hubs: vec!["T1:SYS-TIMING_C_M_A;:IRIGB;IRIG-B,,,,,,,,,,,,,,,".to_string()],
        });
        table.to_file(&path).unwrap();

        let loaded = InstallationTable::from_file(&path).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.hubs().unwrap().len(), 1);
    }
}
