//! Static channel suffix catalog
//!
//! Channel names are composed from a device prefix and one of the suffix
//! lists below. Supporting a new device kind means adding a list here; the
//! generator in [`crate::channels`] has no per-kind logic.

use std::fmt;

use crate::device::DeviceKind;

/// Key into the suffix catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuffixCategory {
    /// Diagnostics of the hub itself
    HubCommon,
    /// Per-port diagnostics of the hub, repeated for every port
    HubPortRelated,
    /// Diagnostics shared by every child device
    ChildCommon,
    /// Diagnostics specific to one child kind
    Device(DeviceKind),
}

impl SuffixCategory {
    /// Every category, hub categories first, then child categories in catalog order
    pub fn all() -> impl Iterator<Item = SuffixCategory> {
        [
            SuffixCategory::HubCommon,
            SuffixCategory::HubPortRelated,
            SuffixCategory::ChildCommon,
        ]
        .into_iter()
        .chain(DeviceKind::ALL.into_iter().map(SuffixCategory::Device))
    }

    /// Catalog key, e.g. `hub-common` or `IRIGB`
    pub fn key(&self) -> &'static str {
        match self {
            SuffixCategory::HubCommon => "hub-common",
            SuffixCategory::HubPortRelated => "hub-port-related",
            SuffixCategory::ChildCommon => "child-common",
            SuffixCategory::Device(kind) => kind.as_str(),
        }
    }

    /// Ordered suffixes for this category
    pub fn suffixes(&self) -> &'static [&'static str] {
        suffixes(*self)
    }
}

impl fmt::Display for SuffixCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Ordered suffixes for a category
pub fn suffixes(category: SuffixCategory) -> &'static [&'static str] {
    match category {
        SuffixCategory::HubCommon => HUB_COMMON,
        SuffixCategory::HubPortRelated => HUB_PORT_RELATED,
        SuffixCategory::ChildCommon => CHILD_COMMON,
        SuffixCategory::Device(DeviceKind::Cfc) => CFC,
        SuffixCategory::Device(DeviceKind::Duotone) => DUOTONE,
        SuffixCategory::Device(DeviceKind::Fanout) => FANOUT,
        SuffixCategory::Device(DeviceKind::Irigb) => IRIGB,
        SuffixCategory::Device(DeviceKind::Xolock) => XOLOCK,
    }
}

/// Each suffix appears once. Older tables repeated `USEUPLINK`, `HASGPS` and
/// `HASOCXO`, which produced duplicate channel names.
const HUB_COMMON: &[&str] = &[
    "COMERR",
    "COMERRCOUNT",
    "CRCERR",
    "CRCERRCOUNT",
    "COMMISSING",
    "COMMISSCOUNT",
    "DOWNTIME",
    "COMCOUNT",
    "COMLENGTH",
    "DIP",
    "VCXOCTRL",
    "OCXOCTRL",
    "OCXOERR",
    "UPLINKDELAY",
    "EXTPPSDELAY",
    "GPSDELAY",
    "TIMINGTOLERANCE",
    "UPLINKUP",
    "USEUPLINK",
    "UPLINKLOS",
    "UPLINKERRCOUNT",
    "UPLINKCRCERRCOUNT",
    "BOARDID",
    "BOARDREV",
    "SERIAL",
    "CODEID",
    "CODEREV",
    "GPS",
    "STRADDR",
    "NAME",
    "ISMASTER",
    "HASFANOUT",
    "FANOUTPORTS",
    "HASOCXO",
    "HASEXTPPS",
    "HASGPS",
    "USEEXT",
    "USEGPS",
    "GPSLOCKED",
    "OCXOLOCKED",
];

const HUB_PORT_RELATED: &[&str] = &[
    "ACTIVE",
    "DELAYERR",
    "ERROR_FLAG",
    "LOS",
    "MEASUREDDELAY",
    "MISSING",
    "UP",
];

const CHILD_COMMON: &[&str] = &[
    "SLAVE_ADDR",
    "SLAVE_BOARDID",
    "SLAVE_BOARDREV",
    "SLAVE_CODEID",
    "SLAVE_CODEREV",
    "SLAVE_DIP",
    "SLAVE_ERROR_FLAG",
    "SLAVE_ERROR_MSG",
    "SLAVE_GPS",
    "SLAVE_ID",
    "SLAVE_ISCFC",
    "SLAVE_ISDUOTONE",
    "SLAVE_ISFANOUT",
    "SLAVE_ISIRIGB",
    "SLAVE_ISXOLOCKING",
    "SLAVE_NAME",
    "SLAVE_SERIAL",
    "SLAVE_STRADDR",
    "SLAVE_UPLINKCRCERRCOUNT",
    "SLAVE_UPLINKERRCOUNT",
    "SLAVE_UPLINKLOS",
    "SLAVE_UPLINKUP",
    "SLAVE_VCXOCTRL",
];

const CFC: &[&str] = &[
    "SLAVE_CFC_FREQUENCY_1",
    "SLAVE_CFC_FREQUENCY_2",
    "SLAVE_CFC_FREQUENCY_3",
    "SLAVE_CFC_FREQUENCY_4",
    "SLAVE_CFC_FREQUENCY_5",
    "SLAVE_CFC_FREQUENCY_6",
    "SLAVE_CFC_HASINPUT",
    "SLAVE_CFC_TIMEDIFF_1",
    "SLAVE_CFC_TIMEDIFF_2",
    "SLAVE_CFC_TIMEDIFF_3",
    "SLAVE_CFC_TIMEDIFF_4",
    "SLAVE_CFC_TIMEDIFF_5",
    "SLAVE_CFC_TIMEDIFF_6",
    "SLAVE_CFC_TIMEDIFF_7",
];

// DuoTone boards only expose the common child channels
const DUOTONE: &[&str] = &[];

const FANOUT: &[&str] = &[
    "SLAVE_FANOUT_DELAYERR",
    "SLAVE_FANOUT_EXTPPSDELAY",
    "SLAVE_FANOUT_FANOUTLOS",
    "SLAVE_FANOUT_FANOUTPORTS",
    "SLAVE_FANOUT_FANOUTUP",
    "SLAVE_FANOUT_GPSDELAY",
    "SLAVE_FANOUT_GPSERR",
    "SLAVE_FANOUT_GPSERRCOUNT",
    "SLAVE_FANOUT_GPSLOCKED",
    "SLAVE_FANOUT_HASEXTPPS",
    "SLAVE_FANOUT_HASFANOUT",
    "SLAVE_FANOUT_HASGPS",
    "SLAVE_FANOUT_HASOCXO",
    "SLAVE_FANOUT_ISMASTER",
    "SLAVE_FANOUT_MISSING",
    "SLAVE_FANOUT_OCXOCTRL",
    "SLAVE_FANOUT_OCXOERR",
    "SLAVE_FANOUT_OCXOLOCKED",
    "SLAVE_FANOUT_UPLINKDELAY",
    "SLAVE_FANOUT_USEEXT",
    "SLAVE_FANOUT_USEGPS",
    "SLAVE_FANOUT_USEUPLINK",
];

const IRIGB: &[&str] = &[
    "SLAVE_IRIGB_DST",
    "SLAVE_IRIGB_IRIGDIFFA",
    "SLAVE_IRIGB_IRIGDIFFB",
    "SLAVE_IRIGB_IRIGDIFFC",
    "SLAVE_IRIGB_IRIGERRCOUNTA",
    "SLAVE_IRIGB_IRIGERRCOUNTB",
    "SLAVE_IRIGB_IRIGERRCOUNTC",
    "SLAVE_IRIGB_LEAPPEND",
    "SLAVE_IRIGB_LEAPSEC",
    "SLAVE_IRIGB_LEAPSUB",
    "SLAVE_IRIGB_TIMEZONE",
];

const XOLOCK: &[&str] = &[
    "SLAVE_XOLOCK_HASOCXO",
    "SLAVE_XOLOCK_MEASUREDFREQ",
    "SLAVE_XOLOCK_OCXOCTRL",
    "SLAVE_XOLOCK_OCXOERR",
    "SLAVE_XOLOCK_OCXOLOCKED",
    "SLAVE_XOLOCK_PRESETFREQ",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_unique() {
        let keys: HashSet<&str> = SuffixCategory::all().map(|c| c.key()).collect();
        assert_eq!(keys.len(), SuffixCategory::all().count());
        assert_eq!(SuffixCategory::Device(DeviceKind::Irigb).to_string(), "IRIGB");
    }

    #[test]
    fn test_suffixes_unique_within_category() {
        for category in SuffixCategory::all() {
            let list = category.suffixes();
            let unique: HashSet<_> = list.iter().collect();
            assert_eq!(unique.len(), list.len(), "duplicate suffix in {}", category);
        }
    }

    #[test]
    fn test_duotone_catalog_is_empty() {
        assert!(SuffixCategory::Device(DeviceKind::Duotone).suffixes().is_empty());
        for kind in DeviceKind::ALL {
            if kind != DeviceKind::Duotone {
                assert!(!suffixes(SuffixCategory::Device(kind)).is_empty());
            }
        }
    }

    #[test]
    fn test_kind_suffixes_carry_kind_token() {
        for kind in DeviceKind::ALL {
            let marker = format!("SLAVE_{}_", kind.as_str());
            for suffix in suffixes(SuffixCategory::Device(kind)) {
                assert!(suffix.starts_with(&marker), "{} lacks {}", suffix, marker);
            }
        }
    }
}
