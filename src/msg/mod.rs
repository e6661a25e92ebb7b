//! Message bodies, one module per message kind.
//!
//! `MessageBody` is a closed set of tagged variants. Kinds that share a wire
//! layout share a body type (echo request and reply, for instance); types
//! whose body is not implemented yet have no variant and fail at creation
//! and parse time.

use std::fmt;

use crate::error::{OfpError, Result};
use crate::openflow::MessageType;
use crate::subtype::Subtype;
use crate::version::ProtocolVersion;
use crate::wire::{PacketReader, PacketWriter};

pub mod async_config;
pub mod echo;
pub mod error_msg;
pub mod experimenter;
pub mod features;
pub mod flow_mod;
pub mod group_mod;
pub mod hello;
pub mod meter_mod;
pub mod port_mod;
pub mod role;
pub mod switch_config;
pub mod table_mod;

pub use self::async_config::{AsyncConfig, AsyncRole};
pub use self::echo::Echo;
pub use self::error_msg::ErrorMsg;
pub use self::experimenter::Experimenter;
pub use self::features::FeaturesReply;
pub use self::flow_mod::FlowMod;
pub use self::group_mod::GroupMod;
pub use self::hello::Hello;
pub use self::meter_mod::MeterMod;
pub use self::port_mod::PortMod;
pub use self::role::Role;
pub use self::switch_config::SwitchConfig;
pub use self::table_mod::TableMod;

/// Common functionality needed to encode and decode a message body.
///
/// The header is handled by the caller: `parse` is handed a reader over
/// exactly the body bytes, and `size_of` excludes the header.
pub trait OfpBody: Sized {
    /// Size of the encoded body at `pv`.
    fn size_of(&self, pv: ProtocolVersion) -> usize;
    /// Parse a body from the bytes following the header.
    fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<Self>;
    /// Marshal the body into `bytes`.
    fn marshal<W: PacketWriter>(&self, pv: ProtocolVersion, bytes: &mut W) -> Result<()>;

    /// Fails with `Incomplete` while a required field is unset.
    fn validate(&self, _pv: ProtocolVersion) -> Result<()> {
        Ok(())
    }

    /// Short field summary appended to the message's one-line form.
    fn summary(&self) -> String {
        String::new()
    }
}

/// A body type that `MutableMessage::edit` can hand out.
pub trait BodyKind: OfpBody {
    const NAME: &'static str;

    fn from_body(body: &MessageBody) -> Option<&Self>;
    fn from_body_mut(body: &mut MessageBody) -> Option<&mut Self>;
}

macro_rules! body_kind {
    ($ty:ty, $name:literal, $( $variant:ident )|+) => {
        impl BodyKind for $ty {
            const NAME: &'static str = $name;

            fn from_body(body: &MessageBody) -> Option<&$ty> {
                match *body {
                    $( MessageBody::$variant(ref b) )|+ => Some(b),
                    _ => None,
                }
            }

            fn from_body_mut(body: &mut MessageBody) -> Option<&mut $ty> {
                match *body {
                    $( MessageBody::$variant(ref mut b) )|+ => Some(b),
                    _ => None,
                }
            }
        }
    };
}

/// Body of an OpenFlow message, tagged by message type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageBody {
    Hello(Hello),
    Error(ErrorMsg),
    EchoRequest(Echo),
    EchoReply(Echo),
    Experimenter(Experimenter),
    FeaturesRequest,
    FeaturesReply(FeaturesReply),
    GetConfigRequest,
    GetConfigReply(SwitchConfig),
    SetConfig(SwitchConfig),
    FlowMod(FlowMod),
    GroupMod(GroupMod),
    PortMod(PortMod),
    TableMod(TableMod),
    BarrierRequest,
    BarrierReply,
    RoleRequest(Role),
    RoleReply(Role),
    GetAsyncRequest,
    GetAsyncReply(AsyncConfig),
    SetAsync(AsyncConfig),
    MeterMod(MeterMod),
}

body_kind!(Hello, "hello", Hello);
body_kind!(ErrorMsg, "error", Error);
body_kind!(Echo, "echo", EchoRequest | EchoReply);
body_kind!(Experimenter, "experimenter", Experimenter);
body_kind!(FeaturesReply, "features reply", FeaturesReply);
body_kind!(SwitchConfig, "switch config", GetConfigReply | SetConfig);
body_kind!(FlowMod, "flow mod", FlowMod);
body_kind!(GroupMod, "group mod", GroupMod);
body_kind!(PortMod, "port mod", PortMod);
body_kind!(TableMod, "table mod", TableMod);
body_kind!(Role, "role", RoleRequest | RoleReply);
body_kind!(AsyncConfig, "async config", GetAsyncReply | SetAsync);
body_kind!(MeterMod, "meter mod", MeterMod);

/// Runs `$with` against the body of any variant that has one, and `$empty`
/// for the header-only variants.
macro_rules! each_body {
    ($body:expr, $b:ident => $with:expr, empty => $empty:expr) => {
        match $body {
            MessageBody::Hello($b) => $with,
            MessageBody::Error($b) => $with,
            MessageBody::EchoRequest($b) | MessageBody::EchoReply($b) => $with,
            MessageBody::Experimenter($b) => $with,
            MessageBody::FeaturesReply($b) => $with,
            MessageBody::GetConfigReply($b) | MessageBody::SetConfig($b) => $with,
            MessageBody::FlowMod($b) => $with,
            MessageBody::GroupMod($b) => $with,
            MessageBody::PortMod($b) => $with,
            MessageBody::TableMod($b) => $with,
            MessageBody::RoleRequest($b) | MessageBody::RoleReply($b) => $with,
            MessageBody::GetAsyncReply($b) | MessageBody::SetAsync($b) => $with,
            MessageBody::MeterMod($b) => $with,
            MessageBody::FeaturesRequest |
            MessageBody::GetConfigRequest |
            MessageBody::BarrierRequest |
            MessageBody::BarrierReply |
            MessageBody::GetAsyncRequest => $empty,
        }
    };
}

fn not_implemented(t: MessageType) -> OfpError {
    OfpError::NotYetImplemented(format!("{} message body", t))
}

impl MessageBody {
    pub fn msg_type(&self) -> MessageType {
        match *self {
            MessageBody::Hello(_) => MessageType::Hello,
            MessageBody::Error(_) => MessageType::Error,
            MessageBody::EchoRequest(_) => MessageType::EchoRequest,
            MessageBody::EchoReply(_) => MessageType::EchoReply,
            MessageBody::Experimenter(_) => MessageType::Experimenter,
            MessageBody::FeaturesRequest => MessageType::FeaturesRequest,
            MessageBody::FeaturesReply(_) => MessageType::FeaturesReply,
            MessageBody::GetConfigRequest => MessageType::GetConfigRequest,
            MessageBody::GetConfigReply(_) => MessageType::GetConfigReply,
            MessageBody::SetConfig(_) => MessageType::SetConfig,
            MessageBody::FlowMod(_) => MessageType::FlowMod,
            MessageBody::GroupMod(_) => MessageType::GroupMod,
            MessageBody::PortMod(_) => MessageType::PortMod,
            MessageBody::TableMod(_) => MessageType::TableMod,
            MessageBody::BarrierRequest => MessageType::BarrierRequest,
            MessageBody::BarrierReply => MessageType::BarrierReply,
            MessageBody::RoleRequest(_) => MessageType::RoleRequest,
            MessageBody::RoleReply(_) => MessageType::RoleReply,
            MessageBody::GetAsyncRequest => MessageType::GetAsyncRequest,
            MessageBody::GetAsyncReply(_) => MessageType::GetAsyncReply,
            MessageBody::SetAsync(_) => MessageType::SetAsync,
            MessageBody::MeterMod(_) => MessageType::MeterMod,
        }
    }

    /// A freshly initialized body of type `t` for version `pv`.
    pub(crate) fn zeroed(t: MessageType, pv: ProtocolVersion) -> Result<MessageBody> {
        let body = match t {
            MessageType::Hello => MessageBody::Hello(Hello::default()),
            MessageType::Error => MessageBody::Error(ErrorMsg::default()),
            MessageType::EchoRequest => MessageBody::EchoRequest(Echo::default()),
            MessageType::EchoReply => MessageBody::EchoReply(Echo::default()),
            MessageType::Experimenter => MessageBody::Experimenter(Experimenter::default()),
            MessageType::FeaturesRequest => MessageBody::FeaturesRequest,
            MessageType::FeaturesReply => MessageBody::FeaturesReply(FeaturesReply::default()),
            MessageType::GetConfigRequest => MessageBody::GetConfigRequest,
            MessageType::GetConfigReply => MessageBody::GetConfigReply(SwitchConfig::default()),
            MessageType::SetConfig => MessageBody::SetConfig(SwitchConfig::default()),
            MessageType::FlowMod => MessageBody::FlowMod(FlowMod::new(pv)),
            MessageType::GroupMod => MessageBody::GroupMod(GroupMod::default()),
            MessageType::PortMod => MessageBody::PortMod(PortMod::default()),
            MessageType::TableMod => MessageBody::TableMod(TableMod::new(pv)),
            MessageType::BarrierRequest => MessageBody::BarrierRequest,
            MessageType::BarrierReply => MessageBody::BarrierReply,
            MessageType::RoleRequest => MessageBody::RoleRequest(Role::default()),
            MessageType::RoleReply => MessageBody::RoleReply(Role::default()),
            MessageType::GetAsyncRequest => MessageBody::GetAsyncRequest,
            MessageType::GetAsyncReply => MessageBody::GetAsyncReply(AsyncConfig::default()),
            MessageType::SetAsync => MessageBody::SetAsync(AsyncConfig::default()),
            MessageType::MeterMod => MessageBody::MeterMod(MeterMod::default()),
            MessageType::PacketIn |
            MessageType::FlowRemoved |
            MessageType::PortStatus |
            MessageType::PacketOut |
            MessageType::MultipartRequest |
            MessageType::MultipartReply |
            MessageType::QueueGetConfigRequest |
            MessageType::QueueGetConfigReply => return Err(not_implemented(t)),
        };
        Ok(body)
    }

    /// Parse the body of a `t` message from exactly the bytes after its header.
    pub(crate) fn parse<R: PacketReader>(t: MessageType,
                                         pv: ProtocolVersion,
                                         bytes: &mut R)
                                         -> Result<MessageBody> {
        let body = match t {
            MessageType::Hello => MessageBody::Hello(Hello::parse(bytes, pv)?),
            MessageType::Error => MessageBody::Error(ErrorMsg::parse(bytes, pv)?),
            MessageType::EchoRequest => MessageBody::EchoRequest(Echo::parse(bytes, pv)?),
            MessageType::EchoReply => MessageBody::EchoReply(Echo::parse(bytes, pv)?),
            MessageType::Experimenter => {
                MessageBody::Experimenter(Experimenter::parse(bytes, pv)?)
            }
            MessageType::FeaturesRequest => MessageBody::FeaturesRequest,
            MessageType::FeaturesReply => {
                MessageBody::FeaturesReply(FeaturesReply::parse(bytes, pv)?)
            }
            MessageType::GetConfigRequest => MessageBody::GetConfigRequest,
            MessageType::GetConfigReply => {
                MessageBody::GetConfigReply(SwitchConfig::parse(bytes, pv)?)
            }
            MessageType::SetConfig => MessageBody::SetConfig(SwitchConfig::parse(bytes, pv)?),
            MessageType::FlowMod => MessageBody::FlowMod(FlowMod::parse(bytes, pv)?),
            MessageType::GroupMod => MessageBody::GroupMod(GroupMod::parse(bytes, pv)?),
            MessageType::PortMod => MessageBody::PortMod(PortMod::parse(bytes, pv)?),
            MessageType::TableMod => MessageBody::TableMod(TableMod::parse(bytes, pv)?),
            MessageType::BarrierRequest => MessageBody::BarrierRequest,
            MessageType::BarrierReply => MessageBody::BarrierReply,
            MessageType::RoleRequest => MessageBody::RoleRequest(Role::parse(bytes, pv)?),
            MessageType::RoleReply => MessageBody::RoleReply(Role::parse(bytes, pv)?),
            MessageType::GetAsyncRequest => MessageBody::GetAsyncRequest,
            MessageType::GetAsyncReply => {
                MessageBody::GetAsyncReply(AsyncConfig::parse(bytes, pv)?)
            }
            MessageType::SetAsync => MessageBody::SetAsync(AsyncConfig::parse(bytes, pv)?),
            MessageType::MeterMod => MessageBody::MeterMod(MeterMod::parse(bytes, pv)?),
            _ => return Err(not_implemented(t)),
        };
        Ok(body)
    }

    pub fn size_of(&self, pv: ProtocolVersion) -> usize {
        each_body!(self, b => b.size_of(pv), empty => 0)
    }

    pub(crate) fn marshal<W: PacketWriter>(&self, pv: ProtocolVersion, bytes: &mut W) -> Result<()> {
        each_body!(self, b => b.marshal(pv, bytes), empty => Ok(()))
            .map_err(|e| e.for_message(self.msg_type()))
    }

    pub fn validate(&self, pv: ProtocolVersion) -> Result<()> {
        each_body!(self, b => b.validate(pv), empty => Ok(()))
            .map_err(|e| e.for_message(self.msg_type()))
    }

    /// Applies a creation-time subtype to the body. The subtype has already
    /// been checked against the message type.
    pub(crate) fn apply_subtype(&mut self, pv: ProtocolVersion, subtype: Subtype) -> Result<()> {
        match (self, subtype) {
            (MessageBody::Error(b), Subtype::ErrorType(t)) => b.set_error_type(pv, t),
            (MessageBody::FlowMod(b), Subtype::FlowModCommand(c)) => b.set_command(pv, c),
            (MessageBody::GroupMod(b), Subtype::GroupModCommand(c)) => b.set_command(pv, c),
            (MessageBody::MeterMod(b), Subtype::MeterModCommand(c)) => b.set_command(pv, c),
            (MessageBody::RoleRequest(b), Subtype::ControllerRole(r)) |
            (MessageBody::RoleReply(b), Subtype::ControllerRole(r)) => b.set_role(pv, r),
            (body, subtype) => {
                Err(OfpError::IllegalCombination {
                    msg_type: body.msg_type(),
                    subtype: subtype.kind(),
                })
            }
        }
    }
}

impl fmt::Display for MessageBody {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let summary = each_body!(self, b => b.summary(), empty => String::new());
        if summary.is_empty() {
            Ok(())
        } else {
            write!(f, ",{}", summary)
        }
    }
}
