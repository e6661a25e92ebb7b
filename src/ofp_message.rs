use std::fmt;

use tracing::{debug, trace};

use crate::error::{OfpError, Result};
use crate::msg::{BodyKind, MessageBody};
use crate::mutable::{Editor, Latch};
use crate::ofp_header::Header;
use crate::openflow::MessageType;
use crate::structure::{HelloElement, Match, MutableStructure, Structure};
use crate::version::ProtocolVersion;
use crate::wire::PacketWriter;

/// Contract shared by every OpenFlow entity, message or structure.
pub trait OfpEntity: fmt::Display {
    /// Protocol version the entity was built for.
    fn version(&self) -> ProtocolVersion;
    /// Fails with `Incomplete` if a required field is unset.
    fn validate(&self) -> Result<()>;
    /// Multi-line rendering with every field.
    fn to_debug_string(&self) -> String {
        self.to_string()
    }
}

/// The header a message with `body` will be encoded with.
fn header_of(header: &Header, body: &MessageBody) -> Result<Header> {
    let len = Header::LEN + body.size_of(header.version);
    if len > u16::max_value() as usize {
        return Err(OfpError::ValueOutOfRange {
            field: "message length",
            value: len as u64,
            bits: 16,
        });
    }
    Ok(Header::new(header.version, header.msg_type, len as u16, header.xid))
}

/// An immutable OpenFlow message.
///
/// Produced by freezing a `MutableMessage`, by copying, or by parsing. It has
/// no setters and is freely shareable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    header: Header,
    body: MessageBody,
}

impl Message {
    pub(crate) fn new(header: Header, body: MessageBody) -> Message {
        Message {
            header: header,
            body: body,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn msg_type(&self) -> MessageType {
        self.header.msg_type
    }

    pub fn xid(&self) -> u32 {
        self.header.xid
    }

    /// Length as recorded in the header.
    pub fn length(&self) -> usize {
        self.header.length()
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    /// The body as kind `B`, if the message is of that kind.
    pub fn body_as<B: BodyKind>(&self) -> Option<&B> {
        B::from_body(&self.body)
    }

    /// Byte-size of the encoded message, header included.
    pub fn size_of(&self) -> usize {
        Header::LEN + self.body.size_of(self.header.version)
    }

    /// Writes the header and body. The header length is recomputed from the
    /// body, so a message parsed leniently encodes canonically.
    pub fn marshal<W: PacketWriter>(&self, bytes: &mut W) -> Result<()> {
        self.validate()?;
        let header = header_of(&self.header, &self.body)?;
        header.marshal(bytes)?;
        self.body.marshal(header.version, bytes)?;
        debug!(msg = %self, len = header.length(), "encoded message");
        Ok(())
    }

    /// Returns a buffer containing the marshaled header and body.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.size_of());
        self.marshal(&mut bytes)?;
        Ok(bytes)
    }
}

impl OfpEntity for Message {
    fn version(&self) -> ProtocolVersion {
        self.header.version
    }

    fn validate(&self) -> Result<()> {
        self.body.validate(self.header.version)
    }

    fn to_debug_string(&self) -> String {
        format!("{}\n{:#?}", self, self.body)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}}}", self.header, self.body)
    }
}

/// A writable OpenFlow message.
///
/// Created by the factory. Body fields change through `edit`; once
/// `freeze` succeeds every further edit or freeze fails with
/// `InvalidMutable`. Not `Clone`: copies go through the factory and get their
/// own latch.
#[derive(Debug)]
pub struct MutableMessage {
    header: Header,
    body: MessageBody,
    latch: Latch,
}

impl MutableMessage {
    pub(crate) fn new(header: Header, body: MessageBody) -> MutableMessage {
        MutableMessage {
            header: header,
            body: body,
            latch: Latch::new(),
        }
    }

    pub fn msg_type(&self) -> MessageType {
        self.header.msg_type
    }

    pub fn xid(&self) -> u32 {
        self.header.xid
    }

    /// Length the message would have if frozen now.
    pub fn length(&self) -> usize {
        Header::LEN + self.body.size_of(self.header.version)
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    pub fn writable(&self) -> bool {
        self.latch.writable()
    }

    fn owner(&self) -> String {
        format!("{} xid={}", self.header.msg_type, self.header.xid)
    }

    /// Typed write access to the body.
    ///
    /// Fails with `InvalidMutable` once frozen and with `WrongMessageType`
    /// if the message is not of kind `B`.
    pub fn edit<B: BodyKind>(&mut self) -> Result<Editor<'_, B>> {
        self.latch.check_writable(&self.owner())?;
        let version = self.header.version;
        let found = self.header.msg_type;
        match B::from_body_mut(&mut self.body) {
            Some(body) => Ok(Editor::new(version, body)),
            None => {
                Err(OfpError::WrongMessageType {
                    expected: B::NAME,
                    found: found,
                })
            }
        }
    }

    /// Resets the transaction id to zero.
    pub fn clear_xid(&mut self) -> Result<()> {
        self.set_xid(0)
    }

    pub(crate) fn set_xid(&mut self, xid: u32) -> Result<()> {
        self.latch.check_writable(&self.owner())?;
        self.header.xid = xid;
        Ok(())
    }

    /// Snapshot the message as an immutable `Message` and freeze this one.
    ///
    /// Succeeds exactly once. The header length is computed here; a body too
    /// large for the length field fails without freezing.
    pub fn freeze(&mut self) -> Result<Message> {
        let owner = self.owner();
        self.latch.check_writable(&owner)?;
        let header = header_of(&self.header, &self.body)?;
        self.latch.invalidate(&owner)?;
        self.header = header;
        trace!(msg = %owner, len = header.length(), "froze mutable message");
        Ok(Message::new(header, self.body.clone()))
    }

    /// Consuming form of `freeze`.
    pub fn into_immutable(mut self) -> Result<Message> {
        self.freeze()
    }
}

impl OfpEntity for MutableMessage {
    fn version(&self) -> ProtocolVersion {
        self.header.version
    }

    fn validate(&self) -> Result<()> {
        self.body.validate(self.header.version)
    }

    fn to_debug_string(&self) -> String {
        format!("{}\n{:#?}", self, self.body)
    }
}

impl fmt::Display for MutableMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let header = header_of(&self.header, &self.body).unwrap_or(self.header);
        let text = format!("{}{}}}", header, self.body);
        f.write_str(&self.latch.tag_string(&text))
    }
}

impl OfpEntity for HelloElement {
    fn version(&self) -> ProtocolVersion {
        HelloElement::VERSION
    }

    fn validate(&self) -> Result<()> {
        HelloElement::validate(self)
    }
}

impl OfpEntity for Structure {
    fn version(&self) -> ProtocolVersion {
        Structure::version(self)
    }

    fn validate(&self) -> Result<()> {
        Structure::validate(self)
    }
}

impl OfpEntity for MutableStructure {
    fn version(&self) -> ProtocolVersion {
        self.structure().version()
    }

    fn validate(&self) -> Result<()> {
        self.structure().validate()
    }

    fn to_debug_string(&self) -> String {
        format!("{}\n{:#?}", self, self.structure())
    }
}

impl OfpEntity for Match {
    fn version(&self) -> ProtocolVersion {
        Match::version(self)
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::{Echo, FlowMod, Hello};
    use crate::openflow::FlowModCommand;
    use crate::version::ProtocolVersion::*;

    fn mutable(pv: ProtocolVersion, t: MessageType, xid: u32) -> MutableMessage {
        MutableMessage::new(Header::new(pv, t, 0, xid), MessageBody::zeroed(t, pv).unwrap())
    }

    #[test]
    fn freeze_computes_length_and_is_final() {
        let mut m = mutable(V1_0, MessageType::EchoRequest, 5);
        m.edit::<Echo>().unwrap().data(vec![1, 2, 3]);
        let msg = m.freeze().unwrap();
        assert_eq!(msg.length(), 11);
        assert_eq!(msg.xid(), 5);
        assert!(!m.writable());
        assert!(matches!(m.freeze(), Err(OfpError::InvalidMutable(_))));
        assert!(matches!(m.edit::<Echo>(), Err(OfpError::InvalidMutable(_))));
        assert!(m.clear_xid().is_err());
    }

    #[test]
    fn frozen_snapshot_is_isolated() {
        let mut m = mutable(V1_3, MessageType::EchoReply, 1);
        m.edit::<Echo>().unwrap().data(vec![7]);
        let msg = m.freeze().unwrap();
        assert_eq!(msg.body_as::<Echo>().map(|e| e.data().to_vec()), Some(vec![7]));
        assert!(m.edit::<Echo>().is_err());
        assert_eq!(msg.body_as::<Echo>().map(|e| e.data().len()), Some(1));
    }

    #[test]
    fn editor_kind_must_match() {
        let mut m = mutable(V1_3, MessageType::FlowMod, 1);
        match m.edit::<Hello>() {
            Err(OfpError::WrongMessageType { expected, found }) => {
                assert_eq!(expected, "hello");
                assert_eq!(found, MessageType::FlowMod);
            }
            _ => panic!("expected a wrong message type failure"),
        }
        m.edit::<FlowMod>().unwrap().command(FlowModCommand::Delete).unwrap();
        assert!(m.validate().is_ok());
    }

    #[test]
    fn display_tags_mutability() {
        let mut m = mutable(V1_3, MessageType::BarrierRequest, 42);
        assert_eq!(m.to_string(), "{ofm:[1.3,BARRIER_REQUEST,8,42]} [mutable]");
        let msg = m.freeze().unwrap();
        assert_eq!(m.to_string(), "{ofm:[1.3,BARRIER_REQUEST,8,42]} [frozen]");
        assert_eq!(msg.to_string(), "{ofm:[1.3,BARRIER_REQUEST,8,42]}");
    }

    #[test]
    fn marshal_requires_complete_body() {
        let mut m = mutable(V1_0, MessageType::FlowMod, 3);
        let msg = m.freeze().unwrap();
        assert!(msg.to_bytes().is_err());

        let mut m = mutable(V1_0, MessageType::BarrierRequest, 3);
        let bytes = m.freeze().unwrap().to_bytes().unwrap();
        assert_eq!(bytes, vec![0x01, 18, 0, 8, 0, 0, 0, 3]);
    }
}
