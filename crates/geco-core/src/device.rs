//! Device kinds that can occupy a hub slot

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::topology::TopologyError;

/// Number of attachment points on every hub
pub const PORTS_PER_HUB: usize = 16;

/// Kind of child device attached to a hub port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceKind {
    /// Timing comparator
    Cfc,
    /// Slave/DuoTone assembly, usually inside an IO chassis
    Duotone,
    /// Fanout module deriving its timing from the hub
    Fanout,
    /// IRIG-B module
    Irigb,
    /// Oscillator locking module
    Xolock,
}

impl DeviceKind {
    /// All kinds in catalog order
    pub const ALL: [DeviceKind; 5] = [
        DeviceKind::Cfc,
        DeviceKind::Duotone,
        DeviceKind::Fanout,
        DeviceKind::Irigb,
        DeviceKind::Xolock,
    ];

    /// Token used in canonical strings and channel suffixes
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Cfc => "CFC",
            DeviceKind::Duotone => "DUOTONE",
            DeviceKind::Fanout => "FANOUT",
            DeviceKind::Irigb => "IRIGB",
            DeviceKind::Xolock => "XOLOCK",
        }
    }

    /// Resolve the single-letter shorthand used on the command line
    /// (`c`, `d`, `f`, `i`, `x`), case-insensitively.
    pub fn from_shorthand(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'c' => Some(DeviceKind::Cfc),
            'd' => Some(DeviceKind::Duotone),
            'f' => Some(DeviceKind::Fanout),
            'i' => Some(DeviceKind::Irigb),
            'x' => Some(DeviceKind::Xolock),
            _ => None,
        }
    }

    /// Parse the exact canonical token. Canonical strings are case-sensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == token)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient parse for user input: full name or shorthand, any case
impl FromStr for DeviceKind {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(kind) = Self::from_shorthand(c) {
                return Ok(kind);
            }
        }

        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TopologyError::UnknownDeviceKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip() {
        for kind in DeviceKind::ALL {
            assert_eq!(DeviceKind::from_token(kind.as_str()), Some(kind));
        }
        assert_eq!(DeviceKind::from_token("irigb"), None);
    }

    #[test]
    fn test_parse_shorthand_and_name() {
        assert_eq!("i".parse::<DeviceKind>().unwrap(), DeviceKind::Irigb);
        assert_eq!("X".parse::<DeviceKind>().unwrap(), DeviceKind::Xolock);
        assert_eq!("duotone".parse::<DeviceKind>().unwrap(), DeviceKind::Duotone);
        assert_eq!("FANOUT".parse::<DeviceKind>().unwrap(), DeviceKind::Fanout);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "z".parse::<DeviceKind>().unwrap_err();
        assert!(matches!(err, TopologyError::UnknownDeviceKind(ref k) if k == "z"));
        assert!("GPS".parse::<DeviceKind>().is_err());
    }

    #[test]
    fn test_serde_uses_tokens() {
        let json = serde_json::to_string(&DeviceKind::Irigb).unwrap();
        assert_eq!(json, "\"IRIGB\"");
        let kind: DeviceKind = serde_json::from_str("\"XOLOCK\"").unwrap();
        assert_eq!(kind, DeviceKind::Xolock);
    }
}
