use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Mismatch, OfpError, Result};

/// The OpenFlow protocol generations this crate speaks, in wire order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProtocolVersion {
    V1_0,
    V1_1,
    V1_2,
    V1_3,
}

impl ProtocolVersion {
    /// Every supported version, oldest first.
    pub const ALL: [ProtocolVersion; 4] = [
        ProtocolVersion::V1_0,
        ProtocolVersion::V1_1,
        ProtocolVersion::V1_2,
        ProtocolVersion::V1_3,
    ];

    /// Index of this version into per-version tables.
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// The version byte carried in the OpenFlow header.
    pub const fn code(self) -> u8 {
        self as u8 + 1
    }

    /// Map a header version byte to a `ProtocolVersion`.
    pub fn decode(code: u8) -> Result<ProtocolVersion> {
        match code {
            0x01 => Ok(ProtocolVersion::V1_0),
            0x02 => Ok(ProtocolVersion::V1_1),
            0x03 => Ok(ProtocolVersion::V1_2),
            0x04 => Ok(ProtocolVersion::V1_3),
            c => Err(OfpError::UnknownVersion(c)),
        }
    }

    pub fn lt(self, other: ProtocolVersion) -> bool {
        self < other
    }

    pub fn le(self, other: ProtocolVersion) -> bool {
        self <= other
    }

    pub fn ge(self, other: ProtocolVersion) -> bool {
        self >= other
    }

    pub fn gt(self, other: ProtocolVersion) -> bool {
        self > other
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match *self {
            ProtocolVersion::V1_0 => "1.0",
            ProtocolVersion::V1_1 => "1.1",
            ProtocolVersion::V1_2 => "1.2",
            ProtocolVersion::V1_3 => "1.3",
        };
        f.write_str(text)
    }
}

// Version guards. Each one returns silently when `pv` qualifies and
// otherwise fails with a version mismatch naming `what`.

pub fn ver_min_since(pv: ProtocolVersion, since: ProtocolVersion, what: &'static str) -> Result<()> {
    if pv.lt(since) {
        return Err(OfpError::mismatch(what, pv, Mismatch::NotSupportedBefore(since)));
    }
    Ok(())
}

pub fn ver_min_11(pv: ProtocolVersion, what: &'static str) -> Result<()> {
    ver_min_since(pv, ProtocolVersion::V1_1, what)
}

pub fn ver_min_12(pv: ProtocolVersion, what: &'static str) -> Result<()> {
    ver_min_since(pv, ProtocolVersion::V1_2, what)
}

pub fn ver_min_13(pv: ProtocolVersion, what: &'static str) -> Result<()> {
    ver_min_since(pv, ProtocolVersion::V1_3, what)
}

pub fn ver_exactly(pv: ProtocolVersion, exact: ProtocolVersion, what: &'static str) -> Result<()> {
    if pv != exact {
        return Err(OfpError::mismatch(what, pv, Mismatch::NotExactly(exact)));
    }
    Ok(())
}

pub fn ver_range(pv: ProtocolVersion,
                 min: ProtocolVersion,
                 max: ProtocolVersion,
                 what: &'static str)
                 -> Result<()> {
    if pv.lt(min) || pv.gt(max) {
        return Err(OfpError::mismatch(what, pv, Mismatch::OutsideRange { min: min, max: max }));
    }
    Ok(())
}

pub fn not_deprecated(pv: ProtocolVersion,
                      deprecated_at: ProtocolVersion,
                      what: &'static str)
                      -> Result<()> {
    if pv.ge(deprecated_at) {
        return Err(OfpError::mismatch(what, pv, Mismatch::DeprecatedSince(deprecated_at)));
    }
    Ok(())
}

/// Fails unless every version in `versions` is identical.
pub fn same_version(versions: &[ProtocolVersion], what: &'static str) -> Result<()> {
    if let Some((&first, rest)) = versions.split_first() {
        if let Some(&other) = rest.iter().find(|&&v| v != first) {
            return Err(OfpError::mismatch(what, other, Mismatch::Mixed(first, other)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::ProtocolVersion::*;

    #[test]
    fn ordering_predicates() {
        assert!(V1_0.lt(V1_1));
        assert!(V1_3.gt(V1_2));
        assert!(V1_2.le(V1_2));
        assert!(V1_2.ge(V1_2));
        assert!(!V1_3.lt(V1_0));
    }

    #[test]
    fn wire_byte_round_trips() {
        for pv in ProtocolVersion::ALL.iter() {
            assert_eq!(ProtocolVersion::decode(pv.code()), Ok(*pv));
        }
        assert_eq!(ProtocolVersion::decode(0x05), Err(OfpError::UnknownVersion(0x05)));
        assert_eq!(ProtocolVersion::decode(0x00), Err(OfpError::UnknownVersion(0x00)));
    }

    #[test]
    fn min_version_guards() {
        assert!(ver_min_11(V1_1, "x").is_ok());
        assert!(ver_min_13(V1_3, "x").is_ok());
        let err = ver_min_12(V1_1, "role").unwrap_err();
        assert_eq!(err,
                   OfpError::VersionMismatch {
                       what: "role",
                       version: V1_1,
                       reason: Mismatch::NotSupportedBefore(V1_2),
                   });
    }

    #[test]
    fn exact_and_range_guards() {
        assert!(ver_exactly(V1_0, V1_0, "vendor").is_ok());
        assert!(ver_exactly(V1_1, V1_0, "vendor").unwrap_err().is_version_mismatch());
        assert!(ver_range(V1_2, V1_1, V1_2, "table miss").is_ok());
        assert!(ver_range(V1_3, V1_1, V1_2, "table miss").is_err());
        assert!(ver_range(V1_0, V1_1, V1_2, "table miss").is_err());
    }

    #[test]
    fn deprecation_and_mixing() {
        assert!(not_deprecated(V1_0, V1_1, "emerg").is_ok());
        assert!(not_deprecated(V1_1, V1_1, "emerg").is_err());
        assert!(same_version(&[V1_3, V1_3, V1_3], "hello").is_ok());
        assert!(same_version(&[], "hello").is_ok());
        let err = same_version(&[V1_3, V1_0], "hello").unwrap_err();
        assert_eq!(err.to_string(), "version mismatch at 1.0 for hello: mixed versions 1.3 / 1.0");
    }
}
