//! Creation-time subtypes.
//!
//! Some message types are commonly created with their defining enumerant
//! already set (a flow mod's command, an error's type). Each such type
//! accepts exactly one enumeration as its subtype.

use std::fmt;

use crate::error::{OfpError, Result};
use crate::openflow::{ControllerRole, ErrorType, FlowModCommand, FlowRemovedReason,
                      GroupModCommand, MessageType, MeterModCommand, MultipartType,
                      PacketInReason, PortReason};
use crate::version::{self, ProtocolVersion};

/// The enumeration a subtype value belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SubtypeKind {
    ErrorType,
    FlowModCommand,
    GroupModCommand,
    MeterModCommand,
    ControllerRole,
    PacketInReason,
    FlowRemovedReason,
    PortReason,
    MultipartType,
}

impl fmt::Display for SubtypeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            SubtypeKind::ErrorType => "error type",
            SubtypeKind::FlowModCommand => "flow mod command",
            SubtypeKind::GroupModCommand => "group mod command",
            SubtypeKind::MeterModCommand => "meter mod command",
            SubtypeKind::ControllerRole => "controller role",
            SubtypeKind::PacketInReason => "packet-in reason",
            SubtypeKind::FlowRemovedReason => "flow-removed reason",
            SubtypeKind::PortReason => "port reason",
            SubtypeKind::MultipartType => "multipart type",
        };
        f.write_str(name)
    }
}

/// A subtype value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Subtype {
    ErrorType(ErrorType),
    FlowModCommand(FlowModCommand),
    GroupModCommand(GroupModCommand),
    MeterModCommand(MeterModCommand),
    ControllerRole(ControllerRole),
    PacketInReason(PacketInReason),
    FlowRemovedReason(FlowRemovedReason),
    PortReason(PortReason),
    MultipartType(MultipartType),
}

macro_rules! subtype_from {
    ($($kind:ident),+) => {
        $(
            impl From<$kind> for Subtype {
                fn from(value: $kind) -> Subtype {
                    Subtype::$kind(value)
                }
            }
        )+
    };
}

subtype_from!(ErrorType, FlowModCommand, GroupModCommand, MeterModCommand, ControllerRole,
              PacketInReason, FlowRemovedReason, PortReason, MultipartType);

impl Subtype {
    pub fn kind(self) -> SubtypeKind {
        match self {
            Subtype::ErrorType(_) => SubtypeKind::ErrorType,
            Subtype::FlowModCommand(_) => SubtypeKind::FlowModCommand,
            Subtype::GroupModCommand(_) => SubtypeKind::GroupModCommand,
            Subtype::MeterModCommand(_) => SubtypeKind::MeterModCommand,
            Subtype::ControllerRole(_) => SubtypeKind::ControllerRole,
            Subtype::PacketInReason(_) => SubtypeKind::PacketInReason,
            Subtype::FlowRemovedReason(_) => SubtypeKind::FlowRemovedReason,
            Subtype::PortReason(_) => SubtypeKind::PortReason,
            Subtype::MultipartType(_) => SubtypeKind::MultipartType,
        }
    }

    /// Fails unless the value has a wire code at `pv`.
    fn check_version(self, pv: ProtocolVersion) -> Result<()> {
        match self {
            Subtype::ErrorType(e) => e.encode(pv).map(|_| ()),
            Subtype::FlowModCommand(e) => e.encode(pv).map(|_| ()),
            Subtype::GroupModCommand(e) => e.encode(pv).map(|_| ()),
            Subtype::MeterModCommand(e) => e.encode(pv).map(|_| ()),
            Subtype::ControllerRole(e) => e.encode(pv).map(|_| ()),
            Subtype::PacketInReason(e) => e.encode(pv).map(|_| ()),
            Subtype::FlowRemovedReason(e) => e.encode(pv).map(|_| ()),
            Subtype::PortReason(e) => e.encode(pv).map(|_| ()),
            Subtype::MultipartType(e) => e.encode(pv).map(|_| ()),
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Subtype::ErrorType(e) => write!(f, "{}", e),
            Subtype::FlowModCommand(e) => write!(f, "{}", e),
            Subtype::GroupModCommand(e) => write!(f, "{}", e),
            Subtype::MeterModCommand(e) => write!(f, "{}", e),
            Subtype::ControllerRole(e) => write!(f, "{}", e),
            Subtype::PacketInReason(e) => write!(f, "{}", e),
            Subtype::FlowRemovedReason(e) => write!(f, "{}", e),
            Subtype::PortReason(e) => write!(f, "{}", e),
            Subtype::MultipartType(e) => write!(f, "{}", e),
        }
    }
}

/// The subtype enumeration `t` accepts, if any.
pub fn required_kind(t: MessageType) -> Option<SubtypeKind> {
    match t {
        MessageType::Error => Some(SubtypeKind::ErrorType),
        MessageType::FlowMod => Some(SubtypeKind::FlowModCommand),
        MessageType::GroupMod => Some(SubtypeKind::GroupModCommand),
        MessageType::MeterMod => Some(SubtypeKind::MeterModCommand),
        MessageType::RoleRequest | MessageType::RoleReply => Some(SubtypeKind::ControllerRole),
        MessageType::PacketIn => Some(SubtypeKind::PacketInReason),
        MessageType::FlowRemoved => Some(SubtypeKind::FlowRemovedReason),
        MessageType::PortStatus => Some(SubtypeKind::PortReason),
        MessageType::MultipartRequest | MessageType::MultipartReply => {
            Some(SubtypeKind::MultipartType)
        }
        _ => None,
    }
}

/// Checks that `t` may be created at `pv`, with `subtype` if given.
///
/// A type created without a subtype always passes the pairing check; a
/// subtype on a type that takes none, or of the wrong enumeration, is an
/// illegal combination.
pub fn validate_subtype(pv: ProtocolVersion, t: MessageType, subtype: Option<Subtype>) -> Result<()> {
    version::ver_min_since(pv, t.since(), "message type")?;
    let subtype = match subtype {
        Some(s) => s,
        None => return Ok(()),
    };
    if required_kind(t) != Some(subtype.kind()) {
        return Err(OfpError::IllegalCombination {
            msg_type: t,
            subtype: subtype.kind(),
        });
    }
    subtype.check_version(pv)
}
