//! Creation, copying, and parsing of OpenFlow messages.

use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{debug, info, trace, warn};

use crate::config::{FactoryConfig, LAST_XID};
use crate::error::{OfpError, Result};
use crate::msg::MessageBody;
use crate::ofp_header::Header;
use crate::ofp_message::{Message, MutableMessage, OfpEntity};
use crate::openflow::MessageType;
use crate::structure::{MutableStructure, Structure, StructureType};
use crate::subtype::{self, Subtype};
use crate::version::{self, ProtocolVersion};
use crate::wire::{PacketReader, PacketWriter};

/// Message types that may be created or parsed at any version, so that a
/// version negotiation can be answered even when it fails.
pub const ALL_VERSIONS_TYPES: [MessageType; 2] = [MessageType::Hello, MessageType::Error];

/// Which form a copy takes, and whether it keeps the original transaction id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CopyKind {
    /// Immutable, with a fresh transaction id.
    Immutable,
    /// Immutable, with the original transaction id.
    ImmutableExact,
    /// Writable, with a fresh transaction id.
    Mutable,
    /// Writable, with the original transaction id.
    MutableExact,
}

/// Form of an entity returned by `create_entity`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    Immutable,
    Mutable,
}

/// A message in either lifecycle state.
#[derive(Debug)]
pub enum Entity {
    Immutable(Message),
    Mutable(MutableMessage),
}

impl Entity {
    pub fn is_mutable(&self) -> bool {
        match *self {
            Entity::Mutable(_) => true,
            Entity::Immutable(_) => false,
        }
    }

    pub fn msg_type(&self) -> MessageType {
        match *self {
            Entity::Immutable(ref m) => m.msg_type(),
            Entity::Mutable(ref m) => m.msg_type(),
        }
    }

    pub fn xid(&self) -> u32 {
        match *self {
            Entity::Immutable(ref m) => m.xid(),
            Entity::Mutable(ref m) => m.xid(),
        }
    }

    pub fn into_immutable(self) -> Option<Message> {
        match self {
            Entity::Immutable(m) => Some(m),
            Entity::Mutable(_) => None,
        }
    }

    pub fn into_mutable(self) -> Option<MutableMessage> {
        match self {
            Entity::Mutable(m) => Some(m),
            Entity::Immutable(_) => None,
        }
    }
}

/// A structure in either lifecycle state.
#[derive(Debug)]
pub enum StructureEntity {
    Immutable(Structure),
    Mutable(MutableStructure),
}

impl StructureEntity {
    pub fn is_mutable(&self) -> bool {
        match *self {
            StructureEntity::Mutable(_) => true,
            StructureEntity::Immutable(_) => false,
        }
    }

    pub fn structure_type(&self) -> StructureType {
        match *self {
            StructureEntity::Immutable(ref s) => s.structure_type(),
            StructureEntity::Mutable(ref s) => s.structure_type(),
        }
    }

    pub fn into_immutable(self) -> Option<Structure> {
        match self {
            StructureEntity::Immutable(s) => Some(s),
            StructureEntity::Mutable(_) => None,
        }
    }

    pub fn into_mutable(self) -> Option<MutableStructure> {
        match self {
            StructureEntity::Mutable(s) => Some(s),
            StructureEntity::Immutable(_) => None,
        }
    }
}

/// Creates, copies, and parses messages.
///
/// Holds the parsing mode, the supported versions, and the transaction id
/// counter. Factories are independent; the counter is atomic so one factory
/// can be shared between threads.
#[derive(Debug)]
pub struct MessageFactory {
    config: FactoryConfig,
    next_xid: AtomicU32,
}

impl Default for MessageFactory {
    fn default() -> MessageFactory {
        MessageFactory {
            next_xid: AtomicU32::new(FactoryConfig::default().base_xid),
            config: FactoryConfig::default(),
        }
    }
}

impl MessageFactory {
    pub fn new(config: FactoryConfig) -> Result<MessageFactory> {
        config.validate()?;
        info!(strict = config.strict_parsing,
              versions = ?config.supported_versions,
              base_xid = config.base_xid,
              "message factory configured");
        Ok(MessageFactory {
            next_xid: AtomicU32::new(config.base_xid),
            config: config,
        })
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn strict_parsing(&self) -> bool {
        self.config.strict_parsing
    }

    /// Switches between strict and lenient parsing.
    pub fn set_strict_parsing(&mut self, strict: bool) {
        info!(strict, "message factory parsing mode changed");
        self.config.strict_parsing = strict;
    }

    fn check_version(&self, pv: ProtocolVersion, t: MessageType) -> Result<()> {
        if ALL_VERSIONS_TYPES.contains(&t) || self.config.supports(pv) {
            return Ok(());
        }
        Err(OfpError::VersionNotSupported(pv))
    }

    /// The next transaction id: `base + 1`, `base + 2`, ... up to `LAST_XID`,
    /// then back to `base + 1`.
    fn next_xid(&self) -> u32 {
        let base = self.config.base_xid;
        let step = |x: u32| if x >= LAST_XID || x < base { base + 1 } else { x + 1 };
        let prev = self.next_xid
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |x| Some(step(x)))
            .unwrap_or_else(|x| x);
        step(prev)
    }

    fn instantiate(&self,
                   pv: ProtocolVersion,
                   t: MessageType,
                   subtype: Option<Subtype>,
                   xid: u32)
                   -> Result<MutableMessage> {
        self.check_version(pv, t)?;
        subtype::validate_subtype(pv, t, subtype)?;
        let mut body = MessageBody::zeroed(t, pv)?;
        if let Some(s) = subtype {
            body.apply_subtype(pv, s)?;
        }
        let mm = MutableMessage::new(Header::new(pv, t, 0, xid), body);
        trace!(msg = %mm, "created message");
        Ok(mm)
    }

    /// Creates a writable message of type `t` with a fresh transaction id.
    pub fn create(&self, pv: ProtocolVersion, t: MessageType) -> Result<MutableMessage> {
        self.instantiate(pv, t, None, self.next_xid())
    }

    /// As `create`, with the type's defining enumerant preset.
    pub fn create_with_subtype<S: Into<Subtype>>(&self,
                                                 pv: ProtocolVersion,
                                                 t: MessageType,
                                                 subtype: S)
                                                 -> Result<MutableMessage> {
        self.instantiate(pv, t, Some(subtype.into()), self.next_xid())
    }

    /// Creates a message of type `t` answering `request`: same version,
    /// same transaction id.
    pub fn create_reply(&self, request: &Message, t: MessageType) -> Result<MutableMessage> {
        self.instantiate(request.version(), t, None, request.xid())
    }

    /// Creates a message in the requested form. The immutable form is the
    /// freshly created message, frozen.
    pub fn create_entity(&self, pv: ProtocolVersion, t: MessageType, variant: Variant) -> Result<Entity> {
        let mm = self.create(pv, t)?;
        match variant {
            Variant::Mutable => Ok(Entity::Mutable(mm)),
            Variant::Immutable => Ok(Entity::Immutable(mm.into_immutable()?)),
        }
    }

    /// Creates a writable structure of kind `st`, blank until edited.
    pub fn create_structure(&self, pv: ProtocolVersion, st: StructureType) -> Result<MutableStructure> {
        if !self.config.supports(pv) {
            return Err(OfpError::VersionNotSupported(pv));
        }
        let ms = MutableStructure::new(Structure::zeroed(st, pv)?);
        trace!(structure = %ms, "created structure");
        Ok(ms)
    }

    pub fn create_structure_entity(&self,
                                   pv: ProtocolVersion,
                                   st: StructureType,
                                   variant: Variant)
                                   -> Result<StructureEntity> {
        let ms = self.create_structure(pv, st)?;
        match variant {
            Variant::Mutable => Ok(StructureEntity::Mutable(ms)),
            Variant::Immutable => Ok(StructureEntity::Immutable(ms.into_immutable()?)),
        }
    }

    /// Writable copy of a structure.
    pub fn mutable_structure_copy(&self, structure: &Structure) -> MutableStructure {
        MutableStructure::new(structure.clone())
    }

    /// Gives a writable message the next transaction id.
    pub fn assign_xid(&self, msg: &mut MutableMessage) -> Result<()> {
        let xid = self.next_xid();
        msg.set_xid(xid)?;
        trace!(xid, "assigned xid");
        Ok(())
    }

    /// Gives `dst` the transaction id of `src`.
    pub fn copy_xid(src: &Message, dst: &mut MutableMessage) -> Result<()> {
        dst.set_xid(src.xid())
    }

    /// Copies `msg` into the form `kind` asks for.
    pub fn copy(&self, msg: &Message, kind: CopyKind) -> Entity {
        let xid = match kind {
            CopyKind::ImmutableExact | CopyKind::MutableExact => msg.xid(),
            CopyKind::Immutable | CopyKind::Mutable => self.next_xid(),
        };
        let header = Header::new(msg.version(), msg.msg_type(), msg.header().length, xid);
        let body = msg.body().clone();
        match kind {
            CopyKind::Immutable | CopyKind::ImmutableExact => {
                Entity::Immutable(Message::new(header, body))
            }
            CopyKind::Mutable | CopyKind::MutableExact => {
                Entity::Mutable(MutableMessage::new(header, body))
            }
        }
    }

    /// Immutable copy with a fresh transaction id.
    pub fn copy_message(&self, msg: &Message) -> Message {
        let xid = self.next_xid();
        let header = Header::new(msg.version(), msg.msg_type(), msg.header().length, xid);
        Message::new(header, msg.body().clone())
    }

    /// Immutable copy keeping the transaction id.
    pub fn exact_copy(&self, msg: &Message) -> Message {
        msg.clone()
    }

    /// Writable copy with a fresh transaction id.
    pub fn mutable_copy(&self, msg: &Message) -> MutableMessage {
        let xid = self.next_xid();
        let header = Header::new(msg.version(), msg.msg_type(), msg.header().length, xid);
        MutableMessage::new(header, msg.body().clone())
    }

    /// Writable copy keeping the transaction id.
    pub fn exact_mutable_copy(&self, msg: &Message) -> MutableMessage {
        MutableMessage::new(*msg.header(), msg.body().clone())
    }

    /// Writes `msg` with a header length recomputed from its body.
    pub fn encode_message<W: PacketWriter>(&self, msg: &Message, bytes: &mut W) -> Result<()> {
        self.check_version(msg.version(), msg.msg_type())?;
        msg.marshal(bytes)
    }

    pub fn encode_to_vec(&self, msg: &Message) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(msg.size_of());
        self.encode_message(msg, &mut bytes)?;
        Ok(bytes)
    }

    /// Reads one message: header, then exactly `length - 8` body bytes.
    ///
    /// Body bytes left over after parsing are an error in strict mode and
    /// are skipped with a warning otherwise.
    pub fn parse_message<R: PacketReader>(&self, bytes: &mut R) -> Result<Message> {
        let header = Header::parse(bytes)?;
        let (pv, t) = (header.version(), header.msg_type());
        if header.length() < Header::LEN {
            return Err(OfpError::Malformed(format!("{} header length {}", t, header.length())));
        }
        self.check_version(pv, t)?;

        let body_len = header.length() - Header::LEN;
        let mut body_bytes = Cursor::new(bytes.read_bytes(body_len)?);
        let body = MessageBody::parse(t, pv, &mut body_bytes)?;

        let leftover = body_bytes.readable_bytes();
        if leftover > 0 {
            if self.config.strict_parsing {
                return Err(OfpError::Malformed(format!("{} bytes left over in {} body",
                                                       leftover,
                                                       t)));
            }
            warn!(msg_type = %t, version = %pv, leftover, "skipping unparsed body bytes");
        }

        let msg = Message::new(header, body);
        debug!(msg = %msg, "parsed message");
        Ok(msg)
    }

    /// Reads the reply to `request`. The reply must carry the request's
    /// version and takes on its transaction id.
    pub fn parse_reply<R: PacketReader>(&self, bytes: &mut R, request: &Message) -> Result<Message> {
        let reply = self.parse_message(bytes)?;
        version::same_version(&[request.version(), reply.version()], "reply")?;
        let header = Header::new(reply.version(),
                                 reply.msg_type(),
                                 reply.header().length,
                                 request.xid());
        Ok(Message::new(header, reply.body().clone()))
    }
}
