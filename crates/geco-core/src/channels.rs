//! Channel name generation
//!
//! Channel names are the hub prefix (`site:subsystem_location_kind_id`)
//! joined with suffixes from the [`catalog`](crate::catalog). Occupancy only
//! decides which child lists are included.

use crate::catalog::SuffixCategory;
use crate::device::PORTS_PER_HUB;
use crate::topology::{Child, Hub, TopologyError};

/// Channels of the hub itself: the common diagnostics followed by the
/// per-port diagnostics of ports 0..16, whether or not a port is occupied.
pub fn hub_channels(hub: &Hub) -> Vec<String> {
    let prefix = hub.prefix();
    let common = SuffixCategory::HubCommon.suffixes();
    let per_port = SuffixCategory::HubPortRelated.suffixes();

    let mut channels = Vec::with_capacity(common.len() + PORTS_PER_HUB * per_port.len());
    channels.extend(common.iter().map(|suffix| format!("{}_{}", prefix, suffix)));
    for port in 0..PORTS_PER_HUB {
        channels.extend(
            per_port
                .iter()
                .map(|suffix| format!("{}_PORT_{}_{}", prefix, port, suffix)),
        );
    }
    channels
}

/// Channels of the device on port `slot`
pub fn child_channels(hub: &Hub, slot: usize) -> Result<Vec<String>, TopologyError> {
    Ok(hub.child(slot)?.channels())
}

/// Channels of every device plugged into `hub`, by ascending port
pub fn children_channels(hub: &Hub) -> Vec<String> {
    hub.children().flat_map(|child| child.channels()).collect()
}

/// Hub channels followed by [`children_channels`]
pub fn all_channels_in_use(hub: &Hub) -> Vec<String> {
    let mut channels = hub_channels(hub);
    channels.extend(children_channels(hub));
    channels
}

pub(crate) fn child_view_channels(child: &Child<'_>) -> Vec<String> {
    let prefix = format!("{}_PORT_{}_", child.hub().prefix(), child.index());
    SuffixCategory::ChildCommon
        .suffixes()
        .iter()
        .chain(SuffixCategory::Device(child.kind()).suffixes())
        .map(|suffix| format!("{}{}", prefix, suffix))
        .collect()
}
