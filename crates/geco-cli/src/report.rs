//! Query execution and output lines

use anyhow::Result;
use clap::ValueEnum;
use geco_core::{hub_channels, DeviceCollection, DeviceVariant, Hub};
use tracing::debug;

use crate::filter::Filters;

/// What to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryType {
    /// Device descriptors: hub strings, then child devices
    Devices,
    /// Channels of matching hubs
    Hub,
    /// Channels of matching child devices
    Child,
    /// Hub channels followed by child channels
    All,
}

/// Run a query over `hubs` and return the output lines
pub fn render(hubs: &[Hub], query: QueryType, filters: &Filters, json: bool) -> Result<Vec<String>> {
    let collection = DeviceCollection::from_hubs(hubs);
    let mut lines = Vec::new();

    if matches!(query, QueryType::Devices | QueryType::Hub | QueryType::All) {
        let selected = collection
            .select(DeviceVariant::Hub)
            .by(filters.hub_constraints())?;
        debug!(hubs = selected.hubs().count(), "Selected hubs");

        for hub in selected.hubs() {
            match query {
                QueryType::Devices if json => lines.push(hub.to_descriptor().to_json_pretty()?),
                QueryType::Devices => lines.push(hub.encode()),
                _ => lines.extend(hub_channels(hub)),
            }
        }
    }

    if matches!(query, QueryType::Devices | QueryType::Child | QueryType::All) {
        let selected = collection
            .select(DeviceVariant::Child)
            .by(filters.child_constraints()?)?;
        debug!(children = selected.children().count(), "Selected child devices");

        for child in selected.children() {
            match query {
                // Structured output already covers every slot
                QueryType::Devices if json => {}
                QueryType::Devices => lines.push(child.to_string()),
                _ => lines.extend(child.channels()),
            }
        }
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geco_core::{child_channels, DeviceKind, HubDescriptor, InstallationTable};

    fn sample() -> Vec<Hub> {
        InstallationTable::builtin().unwrap().hubs().unwrap()
    }

    #[test]
    fn test_devices_unfiltered() {
        let hubs = sample();
        let lines = render(&hubs, QueryType::Devices, &Filters::default(), false).unwrap();
        let children: usize = hubs.iter().map(Hub::occupied_count).sum();
        assert_eq!(lines.len(), hubs.len() + children);
        assert_eq!(lines[0], hubs[0].encode());
    }

    #[test]
    fn test_hub_channels_for_location() {
        let hubs = sample();
        let filters = Filters {
            site: Some("h1".to_string()),
            location: Some("x".to_string()),
            ..Default::default()
        };
        let lines = render(&hubs, QueryType::Hub, &filters, false).unwrap();
        let x_end = hubs
            .iter()
            .find(|h| h.site() == "H1" && h.location() == "X")
            .unwrap();
        assert_eq!(lines, hub_channels(x_end));
    }

    #[test]
    fn test_child_channels_for_port() {
        let hub = HubDescriptor::new("T1", "SYS-TIMING", "C", "M", "A")
            .with_slot(0, DeviceKind::Irigb, "IRIG-B")
            .with_slot(3, DeviceKind::Duotone, "")
            .build()
            .unwrap();
        let hubs = vec![hub];
        let filters = Filters {
            port: Some(3),
            ..Default::default()
        };
        let lines = render(&hubs, QueryType::Child, &filters, false).unwrap();
        assert_eq!(lines, child_channels(&hubs[0], 3).unwrap());

        let filters = Filters {
            device_kind: Some("i".to_string()),
            ..Default::default()
        };
        let lines = render(&hubs, QueryType::All, &filters, false).unwrap();
        let mut expected = hub_channels(&hubs[0]);
        expected.extend(child_channels(&hubs[0], 0).unwrap());
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_devices_json() {
        let hubs = sample();
        let filters = Filters {
            site: Some("l1".to_string()),
            location: Some("y".to_string()),
            ..Default::default()
        };
        let lines = render(&hubs, QueryType::Devices, &filters, true).unwrap();
        assert_eq!(lines.len(), 1);
        let descriptor = HubDescriptor::from_json(&lines[0]).unwrap();
        assert_eq!(descriptor.site, "L1");
        assert_eq!(descriptor.location, "Y");
    }

    #[test]
    fn test_unknown_attribute_fails() {
        let hubs = sample();
        let filters = Filters {
            hub_where: vec!["port=1".to_string()],
            ..Default::default()
        };
        assert!(render(&hubs, QueryType::Hub, &filters, false).is_err());
    }
}
