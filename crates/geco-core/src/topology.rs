//! Hub/slot topology and its canonical string form
//!
//! A hub and the devices on its 16 ports are described by a single string:
//!
//! ```text
//! site:subsystem_location_kind_id;description:KIND;desc,,KIND;desc,...
//! ```
//!
//! `:` separates the site, the hub name and the port list, `_` separates the
//! hub name fields, `,` separates the 16 ports and `;` separates a kind from
//! its description. None of `:`, `,` or `;` may appear inside a value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::channels;
use crate::device::{DeviceKind, PORTS_PER_HUB};

/// Characters that delimit the canonical string and may not appear in values
pub const RESERVED_CHARS: [char; 3] = [':', ',', ';'];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Malformed hub string: {0}")]
    Format(String),
    #[error("Unknown device kind: {0:?}")]
    UnknownDeviceKind(String),
    #[error("Invalid hub description: {0}")]
    Validation(String),
    #[error("Invalid slot range: {0}")]
    Range(String),
    #[error("Slot {0} is empty")]
    EmptySlot(usize),
}

/// One of the 16 attachment points of a hub
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Nothing connected
    #[default]
    Empty,
    /// A child device with its (possibly empty) description
    Occupied {
        kind: DeviceKind,
        description: String,
    },
}

impl Slot {
    pub fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    pub fn kind(&self) -> Option<DeviceKind> {
        match self {
            Slot::Occupied { kind, .. } => Some(*kind),
            Slot::Empty => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Slot::Occupied { description, .. } => Some(description),
            Slot::Empty => None,
        }
    }

    fn decode(index: usize, token: &str) -> Result<Self, TopologyError> {
        let mut parts = token.split(';');
        let kind = parts.next().unwrap_or_default();
        let description = parts.next();
        if parts.next().is_some() {
            return Err(TopologyError::Format(format!(
                "slot {} has more than one ';': {:?}",
                index, token
            )));
        }

        if kind.is_empty() {
            return match description {
                None => Ok(Slot::Empty),
                Some(_) => Err(TopologyError::Format(format!(
                    "slot {} has a description but no device kind",
                    index
                ))),
            };
        }

        let kind = DeviceKind::from_token(kind)
            .ok_or_else(|| TopologyError::UnknownDeviceKind(kind.to_string()))?;
        Ok(Slot::Occupied {
            kind,
            description: description.unwrap_or_default().to_string(),
        })
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Empty => Ok(()),
            Slot::Occupied { kind, description } => write!(f, "{};{}", kind, description),
        }
    }
}

/// A timing hub (master or fanout) and the devices on its ports.
///
/// Hubs are immutable once built. They are created by decoding a canonical
/// string ([`FromStr`]) or from a [`HubDescriptor`], and encoded back with
/// [`fmt::Display`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "HubDescriptor", into = "HubDescriptor")]
pub struct Hub {
    site: String,
    subsystem: String,
    location: String,
    kind: String,
    id: String,
    description: String,
    slots: [Slot; PORTS_PER_HUB],
}

impl Hub {
    /// Decode a canonical hub string
    pub fn decode(s: &str) -> Result<Self, TopologyError> {
        s.parse()
    }

    /// Encode to the canonical hub string
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Site (interferometer) identifier, e.g. `H1`
    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    /// Location code, e.g. `C` for the corner station
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Hub kind, master or fanout
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Distinguishes hubs of the same kind at one location (`A`, `B`, ...)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Free-text description, empty when none was given
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn slots(&self) -> &[Slot; PORTS_PER_HUB] {
        &self.slots
    }

    /// Hub name without the port list: `site:subsystem_location_kind_id`.
    ///
    /// Not a valid hub string on its own, but the prefix of every channel
    /// belonging to this hub.
    pub fn prefix(&self) -> String {
        format!(
            "{}:{}_{}_{}_{}",
            self.site, self.subsystem, self.location, self.kind, self.id
        )
    }

    /// Number of occupied slots
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_occupied()).count()
    }

    /// Select slots with range semantics.
    ///
    /// - no bounds: all 16 slots
    /// - `start` only: the single slot at `start`
    /// - `start` and `stop` (and optionally `step`): `start..stop` stepping by
    ///   `step`, with `start` clamped up to 0 and `stop` clamped down to 16
    ///
    /// A negative `stop`, a non-positive `step`, an out-of-range single index
    /// or any other combination of bounds is a [`TopologyError::Range`].
    pub fn select_slots(
        &self,
        start: Option<isize>,
        stop: Option<isize>,
        step: Option<isize>,
    ) -> Result<Vec<(usize, &Slot)>, TopologyError> {
        match (start, stop, step) {
            (None, None, None) => Ok(self.slots.iter().enumerate().collect()),
            (Some(index), None, None) => {
                let index = checked_index(index)?;
                Ok(vec![(index, &self.slots[index])])
            }
            (Some(start), Some(stop), step) => {
                let step = step.unwrap_or(1);
                if step <= 0 {
                    return Err(TopologyError::Range(format!(
                        "step must be positive, got {}",
                        step
                    )));
                }
                if stop < 0 {
                    return Err(TopologyError::Range(format!(
                        "stop must not be negative, got {}",
                        stop
                    )));
                }
                let start = start.max(0) as usize;
                let stop = (stop as usize).min(PORTS_PER_HUB);
                Ok((start..stop)
                    .step_by(step as usize)
                    .map(|i| (i, &self.slots[i]))
                    .collect())
            }
            _ => Err(TopologyError::Range(
                "stop and step require a start bound".to_string(),
            )),
        }
    }

    /// View of the device on port `index`
    pub fn child(&self, index: usize) -> Result<Child<'_>, TopologyError> {
        match self.slots.get(index) {
            None => Err(TopologyError::Range(format!(
                "slot index {} outside 0..{}",
                index, PORTS_PER_HUB
            ))),
            Some(Slot::Empty) => Err(TopologyError::EmptySlot(index)),
            Some(Slot::Occupied { kind, description }) => Ok(Child {
                hub: self,
                index,
                kind: *kind,
                description,
            }),
        }
    }

    /// Views of every occupied port, in port order
    pub fn children(&self) -> impl Iterator<Item = Child<'_>> {
        (0..PORTS_PER_HUB).filter_map(move |i| self.child(i).ok())
    }

    /// Project to the structured form
    pub fn to_descriptor(&self) -> HubDescriptor {
        HubDescriptor {
            site: self.site.clone(),
            subsystem: self.subsystem.clone(),
            location: self.location.clone(),
            kind: self.kind.clone(),
            id: self.id.clone(),
            description: self.description.clone(),
            slots: self
                .slots
                .iter()
                .map(|slot| SlotDescriptor {
                    dev_kind: slot.kind().map(|k| k.as_str().to_string()),
                    description: slot.description().map(str::to_string),
                })
                .collect(),
        }
    }

    /// Build a hub from the structured form, validating every field
    pub fn from_descriptor(descriptor: &HubDescriptor) -> Result<Self, TopologyError> {
        check_header(
            &descriptor.site,
            &descriptor.subsystem,
            &descriptor.location,
            &descriptor.kind,
            &descriptor.id,
            &descriptor.description,
        )?;

        if descriptor.slots.len() != PORTS_PER_HUB {
            return Err(TopologyError::Validation(format!(
                "expected {} slots, found {}",
                PORTS_PER_HUB,
                descriptor.slots.len()
            )));
        }

        let mut slots: [Slot; PORTS_PER_HUB] = Default::default();
        for (index, slot) in descriptor.slots.iter().enumerate() {
            slots[index] = slot.to_slot(index)?;
        }

        Ok(Self {
            site: descriptor.site.clone(),
            subsystem: descriptor.subsystem.clone(),
            location: descriptor.location.clone(),
            kind: descriptor.kind.clone(),
            id: descriptor.id.clone(),
            description: descriptor.description.clone(),
            slots,
        })
    }
}

fn checked_index(index: isize) -> Result<usize, TopologyError> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < PORTS_PER_HUB)
        .ok_or_else(|| {
            TopologyError::Range(format!(
                "slot index {} outside 0..{}",
                index, PORTS_PER_HUB
            ))
        })
}

fn check_reserved(field: &str, value: &str) -> Result<(), TopologyError> {
    match value.chars().find(|c| RESERVED_CHARS.contains(c)) {
        Some(c) => Err(TopologyError::Validation(format!(
            "{} {:?} contains reserved character {:?}",
            field, value, c
        ))),
        None => Ok(()),
    }
}

/// Validate every header value of a hub, shared by both decoding paths
fn check_header(
    site: &str,
    subsystem: &str,
    location: &str,
    kind: &str,
    id: &str,
    description: &str,
) -> Result<(), TopologyError> {
    check_name_field("site", site, false)?;
    check_name_field("subsystem", subsystem, true)?;
    check_name_field("location", location, true)?;
    check_name_field("kind", kind, true)?;
    check_name_field("id", id, true)?;
    check_reserved("description", description)
}

/// Hub name fields must be non-empty; the `_`-separated ones may not contain `_`
fn check_name_field(field: &str, value: &str, underscore: bool) -> Result<(), TopologyError> {
    if value.is_empty() {
        return Err(TopologyError::Validation(format!("{} is empty", field)));
    }
    check_reserved(field, value)?;
    if underscore && value.contains('_') {
        return Err(TopologyError::Validation(format!(
            "{} {:?} contains reserved character '_'",
            field, value
        )));
    }
    Ok(())
}

impl TryFrom<HubDescriptor> for Hub {
    type Error = TopologyError;

    fn try_from(descriptor: HubDescriptor) -> Result<Self, Self::Error> {
        Hub::from_descriptor(&descriptor)
    }
}

impl From<Hub> for HubDescriptor {
    fn from(hub: Hub) -> Self {
        hub.to_descriptor()
    }
}

impl FromStr for Hub {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sections: Vec<&str> = s.split(':').collect();
        let [site, header, ports] = sections[..] else {
            return Err(TopologyError::Format(format!(
                "expected 3 ':'-separated sections, found {}",
                sections.len()
            )));
        };
        if site.is_empty() {
            return Err(TopologyError::Format("site is empty".to_string()));
        }

        let mut header_parts = header.split(';');
        let name = header_parts.next().unwrap_or_default();
        let description = header_parts.next().unwrap_or_default();
        if header_parts.next().is_some() {
            return Err(TopologyError::Format(format!(
                "hub name has more than one ';': {:?}",
                header
            )));
        }

        let fields: Vec<&str> = name.split('_').collect();
        let [subsystem, location, kind, id] = fields[..] else {
            return Err(TopologyError::Format(format!(
                "expected subsystem_location_kind_id, found {:?}",
                name
            )));
        };
        if fields.iter().any(|f| f.is_empty()) {
            return Err(TopologyError::Format(format!(
                "empty field in hub name {:?}",
                name
            )));
        }
        check_header(site, subsystem, location, kind, id, description).map_err(|e| match e {
            TopologyError::Validation(reason) => TopologyError::Format(reason),
            other => other,
        })?;

        let tokens: Vec<&str> = ports.split(',').collect();
        if tokens.len() != PORTS_PER_HUB {
            return Err(TopologyError::Format(format!(
                "expected {} slots, found {}",
                PORTS_PER_HUB,
                tokens.len()
            )));
        }

        let mut slots: [Slot; PORTS_PER_HUB] = Default::default();
        for (index, token) in tokens.into_iter().enumerate() {
            slots[index] = Slot::decode(index, token)?;
        }

        Ok(Self {
            site: site.to_string(),
            subsystem: subsystem.to_string(),
            location: location.to_string(),
            kind: kind.to_string(),
            id: id.to_string(),
            description: description.to_string(),
            slots,
        })
    }
}

impl fmt::Display for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}:", self.prefix(), self.description)?;
        for (index, slot) in self.slots.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", slot)?;
        }
        Ok(())
    }
}

/// Decoded view of the device on one hub port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Child<'a> {
    hub: &'a Hub,
    index: usize,
    kind: DeviceKind,
    description: &'a str,
}

impl<'a> Child<'a> {
    pub fn hub(&self) -> &'a Hub {
        self.hub
    }

    /// Port number on the hub
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn description(&self) -> &'a str {
        self.description
    }

    /// `site:subsystem_location_kind_id_PORT_<index>`
    pub fn name(&self) -> String {
        format!("{}_PORT_{}", self.hub.prefix(), self.index)
    }

    /// Channel names of this device
    pub fn channels(&self) -> Vec<String> {
        channels::child_view_channels(self)
    }
}

impl fmt::Display for Child<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{};{}", self.name(), self.kind, self.description)
    }
}

/// Structured form of a hub, the neutral record used for JSON/TOML interchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubDescriptor {
    pub site: String,
    pub subsystem: String,
    pub location: String,
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub slots: Vec<SlotDescriptor>,
}

/// Structured form of one slot.
///
/// An empty slot has both fields absent (`None`, serialized as `null`), which
/// is distinct from an occupied slot with an empty description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDescriptor {
    #[serde(rename = "devKind", default)]
    pub dev_kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl SlotDescriptor {
    pub fn occupied(kind: DeviceKind, description: &str) -> Self {
        Self {
            dev_kind: Some(kind.as_str().to_string()),
            description: Some(description.to_string()),
        }
    }

    fn to_slot(&self, index: usize) -> Result<Slot, TopologyError> {
        match (&self.dev_kind, &self.description) {
            (None, None) => Ok(Slot::Empty),
            (Some(kind), Some(description)) => {
                check_reserved(&format!("slot {} kind", index), kind)?;
                check_reserved(&format!("slot {} description", index), description)?;
                let kind = DeviceKind::from_token(kind)
                    .ok_or_else(|| TopologyError::UnknownDeviceKind(kind.clone()))?;
                Ok(Slot::Occupied {
                    kind,
                    description: description.clone(),
                })
            }
            _ => Err(TopologyError::Validation(format!(
                "slot {}: device kind and description must be given together",
                index
            ))),
        }
    }
}

impl HubDescriptor {
    /// Descriptor with no description and all 16 slots empty
    pub fn new(site: &str, subsystem: &str, location: &str, kind: &str, id: &str) -> Self {
        Self {
            site: site.to_string(),
            subsystem: subsystem.to_string(),
            location: location.to_string(),
            kind: kind.to_string(),
            id: id.to_string(),
            description: String::new(),
            slots: vec![SlotDescriptor::default(); PORTS_PER_HUB],
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Occupy slot `index`. Indices past the end are ignored here and caught
    /// by validation when the hub is built.
    pub fn with_slot(mut self, index: usize, kind: DeviceKind, description: &str) -> Self {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = SlotDescriptor::occupied(kind, description);
        }
        self
    }

    /// Validate and build the hub
    pub fn build(&self) -> Result<Hub, TopologyError> {
        Hub::from_descriptor(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
