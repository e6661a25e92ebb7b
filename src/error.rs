use std::fmt;

use thiserror::Error;

use crate::openflow::MessageType;
use crate::structure::StructureType;
use crate::subtype::SubtypeKind;
use crate::version::ProtocolVersion;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, OfpError>;

/// Why a feature is not usable at a given protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    /// The feature first appears at the given version.
    NotSupportedBefore(ProtocolVersion),
    /// The feature was removed at the given version.
    DeprecatedSince(ProtocolVersion),
    /// Only the given version defines the feature.
    NotExactly(ProtocolVersion),
    /// The feature is defined for the inclusive range `min..=max` only.
    OutsideRange {
        min: ProtocolVersion,
        max: ProtocolVersion,
    },
    /// A bitmap carried bits the version does not define.
    UndefinedBits(u64),
    /// Two parts of one entity were built for different versions.
    Mixed(ProtocolVersion, ProtocolVersion),
    /// The enumerant has no wire code at any version.
    NotEncodable,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Mismatch::NotSupportedBefore(pv) => write!(f, "not supported before version {}", pv),
            Mismatch::DeprecatedSince(pv) => write!(f, "deprecated since version {}", pv),
            Mismatch::NotExactly(pv) => write!(f, "only supported at version {}", pv),
            Mismatch::OutsideRange { min, max } => {
                write!(f, "only supported from version {} to {}", min, max)
            }
            Mismatch::UndefinedBits(bits) => write!(f, "undefined bits {:#x}", bits),
            Mismatch::Mixed(a, b) => write!(f, "mixed versions {} / {}", a, b),
            Mismatch::NotEncodable => write!(f, "no wire encoding"),
        }
    }
}

/// Failures raised by the codec and the message lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OfpError {
    /// A wire value matches no known enumerant.
    #[error("cannot decode {what} from {code:#x} at version {version}")]
    Decode {
        what: &'static str,
        code: u64,
        version: ProtocolVersion,
    },
    /// A header carried a version byte outside the supported generations.
    #[error("unknown protocol version byte {0:#04x}")]
    UnknownVersion(u8),
    #[error("version mismatch at {version} for {what}: {reason}")]
    VersionMismatch {
        what: &'static str,
        version: ProtocolVersion,
        reason: Mismatch,
    },
    #[error("protocol version {0} is not supported by this factory")]
    VersionNotSupported(ProtocolVersion),
    /// A setter or freeze was attempted on an already frozen message.
    #[error("invalid mutable: {0}")]
    InvalidMutable(String),
    #[error("{msg_type} cannot carry a {subtype} subtype")]
    IllegalCombination {
        msg_type: MessageType,
        subtype: SubtypeKind,
    },
    /// A kind-specific editor was requested for a message of another kind.
    #[error("a {found} message has no {expected} body")]
    WrongMessageType {
        expected: &'static str,
        found: MessageType,
    },
    /// A kind-specific editor was requested for a structure of another kind.
    #[error("a {found} structure is not a {expected}")]
    WrongStructureType {
        expected: &'static str,
        found: StructureType,
    },
    #[error("not yet implemented: {0}")]
    NotYetImplemented(String),
    #[error("value {value:#x} out of range for {bits}-bit field {field}")]
    ValueOutOfRange {
        field: &'static str,
        value: u64,
        bits: u8,
    },
    #[error("cannot use reserved value {value:#x} for {field}")]
    Reserved { field: &'static str, value: u64 },
    /// A required field was never set.
    #[error("incomplete {0}: missing {1}")]
    Incomplete(MessageType, &'static str),
    #[error("buffer underflow: needed {needed} bytes, {remaining} remaining")]
    BufferUnderflow { needed: usize, remaining: usize },
    #[error("malformed message: {0}")]
    Malformed(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl OfpError {
    pub(crate) fn mismatch(what: &'static str, version: ProtocolVersion, reason: Mismatch) -> Self {
        OfpError::VersionMismatch {
            what: what,
            version: version,
            reason: reason,
        }
    }

    /// Names `msg_type` in an `Incomplete` raised by a body shared between
    /// message types.
    pub(crate) fn for_message(self, msg_type: MessageType) -> Self {
        match self {
            OfpError::Incomplete(_, field) => OfpError::Incomplete(msg_type, field),
            other => other,
        }
    }

    /// True for the version-mismatch family of failures.
    pub fn is_version_mismatch(&self) -> bool {
        match *self {
            OfpError::VersionMismatch { .. } => true,
            _ => false,
        }
    }
}
