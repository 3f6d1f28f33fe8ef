//! Heterogeneous device collections and constraint-based selection

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

use crate::channels;
use crate::query::{Constraint, QueryError};
use crate::topology::{Child, Hub};

/// Which kind of device a selection targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceVariant {
    Hub,
    Child,
}

impl fmt::Display for DeviceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceVariant::Hub => f.write_str("hub"),
            DeviceVariant::Child => f.write_str("child"),
        }
    }
}

/// A hub or a device on one of its ports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device<'a> {
    Hub(&'a Hub),
    Child(Child<'a>),
}

impl<'a> Device<'a> {
    pub fn variant(&self) -> DeviceVariant {
        match self {
            Device::Hub(_) => DeviceVariant::Hub,
            Device::Child(_) => DeviceVariant::Child,
        }
    }

    /// The hub itself, or the hub a child is attached to
    pub fn hub(&self) -> &'a Hub {
        match self {
            Device::Hub(hub) => *hub,
            Device::Child(child) => child.hub(),
        }
    }

    /// Channels belonging to this device only
    pub fn channels(&self) -> Vec<String> {
        match self {
            Device::Hub(hub) => channels::hub_channels(hub),
            Device::Child(child) => child.channels(),
        }
    }
}

/// Human-readable descriptor: the canonical string for a hub,
/// `<hub prefix>_PORT_<n>:<KIND>;<description>` for a child
impl fmt::Display for Device<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Hub(hub) => write!(f, "{}", hub),
            Device::Child(child) => write!(f, "{}", child),
        }
    }
}

impl<'a> From<&'a Hub> for Device<'a> {
    fn from(hub: &'a Hub) -> Self {
        Device::Hub(hub)
    }
}

impl<'a> From<Child<'a>> for Device<'a> {
    fn from(child: Child<'a>) -> Self {
        Device::Child(child)
    }
}

/// Ordered collection of hubs and children, preserving insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceCollection<'a> {
    devices: Vec<Device<'a>>,
}

impl<'a> DeviceCollection<'a> {
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
        }
    }

    /// Every hub followed directly by its occupied ports, in port order
    pub fn from_hubs<I>(hubs: I) -> Self
    where
        I: IntoIterator<Item = &'a Hub>,
    {
        let mut collection = Self::new();
        for hub in hubs {
            collection.push(Device::Hub(hub));
            for child in hub.children() {
                collection.push(Device::Child(child));
            }
        }
        collection
    }

    pub fn push(&mut self, device: impl Into<Device<'a>>) {
        self.devices.push(device.into());
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Device<'a>> {
        self.devices.iter()
    }

    pub fn hubs(&self) -> impl Iterator<Item = &'a Hub> + '_ {
        self.devices.iter().filter_map(|device| match device {
            Device::Hub(hub) => Some(*hub),
            Device::Child(_) => None,
        })
    }

    pub fn children(&self) -> impl Iterator<Item = Child<'a>> + '_ {
        self.devices.iter().filter_map(|device| match device {
            Device::Child(child) => Some(*child),
            Device::Hub(_) => None,
        })
    }

    /// Restrict to one variant, without any constraint filtering
    pub fn only_type(&self, variant: DeviceVariant) -> Self {
        self.devices
            .iter()
            .filter(|device| device.variant() == variant)
            .copied()
            .collect()
    }

    /// Start a selection of `variant` devices
    pub fn select(&self, variant: DeviceVariant) -> Selection<'_, 'a> {
        Selection {
            collection: self,
            variant,
        }
    }
}

impl<'a> FromIterator<Device<'a>> for DeviceCollection<'a> {
    fn from_iter<T: IntoIterator<Item = Device<'a>>>(iter: T) -> Self {
        Self {
            devices: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for DeviceCollection<'a> {
    type Item = Device<'a>;
    type IntoIter = std::vec::IntoIter<Device<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.into_iter()
    }
}

impl<'c, 'a> IntoIterator for &'c DeviceCollection<'a> {
    type Item = &'c Device<'a>;
    type IntoIter = std::slice::Iter<'c, Device<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}

/// A pending selection of one variant from a collection
#[derive(Debug, Clone, Copy)]
pub struct Selection<'c, 'a> {
    collection: &'c DeviceCollection<'a>,
    variant: DeviceVariant,
}

impl<'c, 'a> Selection<'c, 'a> {
    /// Devices of the selected variant, unconstrained
    pub fn only(&self) -> DeviceCollection<'a> {
        self.collection.only_type(self.variant)
    }

    /// Apply constraint expressions left to right (logical AND).
    ///
    /// Each effective constraint re-applies the variant filter before
    /// comparing. Wildcard and empty expressions are skipped, so a call
    /// whose expressions are all wildcards, or that has none at all, returns
    /// the original collection unchanged, other variants included. Use
    /// [`Selection::only`] for a type-restricted, unconstrained result.
    pub fn by<I, S>(&self, expressions: I) -> Result<DeviceCollection<'a>, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = self.collection.clone();
        for expression in expressions {
            let expression = expression.as_ref();
            let Some(constraint) = Constraint::parse(expression)? else {
                trace!(expression, "Skipping wildcard constraint");
                continue;
            };
            let filter = constraint.resolve(self.variant)?;
            selected = selected
                .only_type(self.variant)
                .into_iter()
                .filter(|device| filter.matches(device))
                .collect();
            trace!(
                constraint = %constraint,
                remaining = selected.len(),
                "Applied constraint"
            );
        }
        Ok(selected)
    }
}
