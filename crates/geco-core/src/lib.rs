//! Geco Core - Timing hub topology, channel names and device queries
//!
//! This crate provides the naming layer of the timing distribution system:
//! - Canonical string codec for a hub and the devices on its 16 ports
//! - Structured (JSON/TOML) form of the same topology
//! - Channel name generation from static suffix catalogs
//! - Constraint queries over collections of hubs and child devices
//! - Installation tables listing the hubs at each site

pub mod catalog;
pub mod channels;
pub mod collection;
pub mod device;
pub mod query;
pub mod sites;
pub mod topology;

pub use catalog::SuffixCategory;
pub use channels::{all_channels_in_use, child_channels, children_channels, hub_channels};
pub use collection::{Device, DeviceCollection, DeviceVariant, Selection};
pub use device::{DeviceKind, PORTS_PER_HUB};
pub use query::{Constraint, Operator, QueryError};
pub use sites::{InstallationTable, Site, SitesError};
pub use topology::{Child, Hub, HubDescriptor, Slot, SlotDescriptor, TopologyError};
