use std::fmt;

use crate::error::Result;
use crate::openflow::MessageType;
use crate::version::ProtocolVersion;
use crate::wire::{PacketReader, PacketWriter};

/// OpenFlow Header
///
/// The first fields of every OpenFlow message, no matter the protocol version.
/// This is parsed to determine version and length of the remaining message, so that
/// it can be properly handled.
///
/// A header belongs to exactly one message; copies get their own.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub(crate) version: ProtocolVersion,
    pub(crate) msg_type: MessageType,
    pub(crate) length: u16,
    pub(crate) xid: u32,
}

impl Header {
    /// Byte-size of an OpenFlow header.
    pub const LEN: usize = 8;

    /// Create a `Header` out of the arguments.
    pub fn new(version: ProtocolVersion, msg_type: MessageType, length: u16, xid: u32) -> Header {
        Header {
            version: version,
            msg_type: msg_type,
            length: length,
            xid: xid,
        }
    }

    /// Writes the header fields, encoding the type code for the header's version.
    pub fn marshal<W: PacketWriter>(&self, bytes: &mut W) -> Result<()> {
        bytes.write_u8(self.version.code())?;
        bytes.write_u8(self.msg_type.encode(self.version)? as u8)?;
        bytes.write_u16(self.length)?;
        bytes.write_u32(self.xid)
    }

    /// Reads a header, decoding version and message type.
    pub fn parse<R: PacketReader>(bytes: &mut R) -> Result<Header> {
        let version = ProtocolVersion::decode(bytes.read_u8()?)?;
        let msg_type = MessageType::decode(u32::from(bytes.read_u8()?), version)?;
        let length = bytes.read_u16()?;
        let xid = bytes.read_u32()?;
        Ok(Header::new(version, msg_type, length, xid))
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn msg_type(&self) -> MessageType {
        self.msg_type
    }

    /// Declared length of the whole message, header included.
    pub fn length(&self) -> usize {
        self.length as usize
    }

    /// Transaction id. Replies use the same id to facilitate pairing.
    pub fn xid(&self) -> u32 {
        self.xid
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{ofm:[{},{},{},{}]", self.version, self.msg_type, self.length, self.xid)
    }
}
