//! Configuration loading

use anyhow::{Context, Result};
use geco_core::{Hub, HubDescriptor, InstallationTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub installation: InstallationConfig,
}

/// Where hubs come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallationConfig {
    /// Include the compiled-in sample table
    #[serde(default = "default_true")]
    pub builtin: bool,
    /// Additional installation table (TOML)
    #[serde(default)]
    pub sites_file: Option<PathBuf>,
    /// Extra hubs as canonical strings
    #[serde(default)]
    pub hubs: Vec<String>,
    /// JSON files holding one structured hub descriptor each
    #[serde(default)]
    pub descriptors: Vec<PathBuf>,
}

impl Default for InstallationConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            sites_file: None,
            hubs: Vec::new(),
            descriptors: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl InstallationConfig {
    /// Decode every configured hub: built-in table, sites file, canonical
    /// strings, then descriptor files
    pub fn load_hubs(&self) -> Result<Vec<Hub>> {
        let mut hubs = Vec::new();

        if self.builtin {
            let table = InstallationTable::builtin().context("built-in installation table")?;
            hubs.extend(table.hubs()?);
        }

        if let Some(path) = &self.sites_file {
            let table = InstallationTable::from_file(path)
                .with_context(|| format!("installation table {}", path.display()))?;
            hubs.extend(table.hubs()?);
        }

        for s in &self.hubs {
            hubs.push(Hub::decode(s).with_context(|| format!("hub {:?}", s))?);
        }

        for path in &self.descriptors {
            hubs.push(load_descriptor(path)?);
        }

        debug!(count = hubs.len(), "Loaded hubs");
        Ok(hubs)
    }
}

/// Load a structured hub descriptor from a JSON file
pub fn load_descriptor(path: &Path) -> Result<Hub> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading descriptor {}", path.display()))?;
    let descriptor = HubDescriptor::from_json(&content)
        .with_context(|| format!("parsing descriptor {}", path.display()))?;
    descriptor
        .build()
        .with_context(|| format!("descriptor {}", path.display()))
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        debug!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geco_core::DeviceKind;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert!(config.installation.builtin);
        assert!(config.installation.hubs.is_empty());
        assert!(!config.installation.load_hubs().unwrap().is_empty());
    }

    #[test]
    fn test_config_sources() {
        let dir = tempfile::tempdir().unwrap();

        let descriptor = HubDescriptor::new("T1", "SYS-TIMING", "C", "M", "B")
            .with_slot(1, DeviceKind::Cfc, "bench");
        let descriptor_path = dir.path().join("hub.json");
        std::fs::write(&descriptor_path, descriptor.to_json_pretty().unwrap()).unwrap();

        let config_path = dir.path().join("geco.toml");
        std::fs::write(
            &config_path,
            format!(
                r#"
[installation]
builtin = false
hubs = ["T1:SYS-TIMING_C_M_A;:IRIGB;IRIG-B,,,,,,,,,,,,,,,"]
descriptors = [{:?}]
"#,
                descriptor_path.display().to_string()
            ),
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        let hubs = config.installation.load_hubs().unwrap();
        assert_eq!(hubs.len(), 2);
        assert_eq!(hubs[0].id(), "A");
        assert_eq!(hubs[1], descriptor.build().unwrap());
    }

    #[test]
    fn test_bad_hub_is_an_error() {
        let installation = InstallationConfig {
            builtin: false,
            hubs: vec!["T1:SYS-TIMING_C_M_A;:,,".to_string()],
            ..Default::default()
        };
        let err = installation.load_hubs().unwrap_err();
        assert!(format!("{:#}", err).contains("Malformed hub string"));
    }
}
