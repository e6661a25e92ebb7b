//! Small wire values shared by several message bodies.

use crate::error::{OfpError, Result};
use crate::version::ProtocolVersion;
use crate::wire::{PacketReader, PacketWriter};

/// Port behavior.
///
/// 1.0 carries ports as 16-bit values with the reserved ports at
/// `0xfff8..=0xffff`; 1.1+ widen them to 32 bits with the reserved ports at
/// `0xfffffff8..=0xffffffff`. The "any"/"none" port is `None` wherever an
/// `Option<PseudoPort>` appears.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PseudoPort {
    PhysicalPort(u32),
    InPort,
    Table,
    Normal,
    Flood,
    AllPorts,
    Controller,
    Local,
}

/// Highest physical port number at `pv`.
pub fn max_port(pv: ProtocolVersion) -> u32 {
    match pv {
        ProtocolVersion::V1_0 => 0xff00,
        _ => 0xffff_ff00,
    }
}

/// Offsets of the reserved ports above `max_port`.
#[repr(u32)]
enum OfpPort {
    OFPPInPort = 0xf8,
    OFPPTable = 0xf9,
    OFPPNormal = 0xfa,
    OFPPFlood = 0xfb,
    OFPPAll = 0xfc,
    OFPPController = 0xfd,
    OFPPLocal = 0xfe,
    OFPPNone = 0xff,
}

impl PseudoPort {
    /// Decode a port number read at `pv`. `OFPP_NONE`/`OFPP_ANY` yields `None`.
    pub fn of_int(p: u32, pv: ProtocolVersion) -> Result<Option<PseudoPort>> {
        let max = max_port(pv);
        if p <= max {
            return Ok(Some(PseudoPort::PhysicalPort(p)));
        }
        let port = match p - max {
            x if x == OfpPort::OFPPInPort as u32 => PseudoPort::InPort,
            x if x == OfpPort::OFPPTable as u32 => PseudoPort::Table,
            x if x == OfpPort::OFPPNormal as u32 => PseudoPort::Normal,
            x if x == OfpPort::OFPPFlood as u32 => PseudoPort::Flood,
            x if x == OfpPort::OFPPAll as u32 => PseudoPort::AllPorts,
            x if x == OfpPort::OFPPController as u32 => PseudoPort::Controller,
            x if x == OfpPort::OFPPLocal as u32 => PseudoPort::Local,
            x if x == OfpPort::OFPPNone as u32 => return Ok(None),
            _ => {
                return Err(OfpError::Decode {
                    what: "port number",
                    code: u64::from(p),
                    version: pv,
                })
            }
        };
        Ok(Some(port))
    }

    /// Port number of `pp` at `pv`. Physical ports beyond the version's
    /// range are rejected.
    pub fn to_int(pp: Option<PseudoPort>, pv: ProtocolVersion) -> Result<u32> {
        let max = max_port(pv);
        let offset = match pp {
            None => OfpPort::OFPPNone,
            Some(PseudoPort::PhysicalPort(p)) => {
                if p > max {
                    return Err(OfpError::ValueOutOfRange {
                        field: "port number",
                        value: u64::from(p),
                        bits: if pv == ProtocolVersion::V1_0 { 16 } else { 32 },
                    });
                }
                return Ok(p);
            }
            Some(PseudoPort::InPort) => OfpPort::OFPPInPort,
            Some(PseudoPort::Table) => OfpPort::OFPPTable,
            Some(PseudoPort::Normal) => OfpPort::OFPPNormal,
            Some(PseudoPort::Flood) => OfpPort::OFPPFlood,
            Some(PseudoPort::AllPorts) => OfpPort::OFPPAll,
            Some(PseudoPort::Controller) => OfpPort::OFPPController,
            Some(PseudoPort::Local) => OfpPort::OFPPLocal,
        };
        Ok(max + offset as u32)
    }

    /// Reads a 16-bit port at 1.0 and a 32-bit port at 1.1+.
    pub fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<Option<PseudoPort>> {
        let raw = match pv {
            ProtocolVersion::V1_0 => u32::from(bytes.read_u16()?),
            _ => bytes.read_u32()?,
        };
        PseudoPort::of_int(raw, pv)
    }

    pub fn marshal<W: PacketWriter>(pp: Option<PseudoPort>,
                                    pv: ProtocolVersion,
                                    bytes: &mut W)
                                    -> Result<()> {
        let raw = PseudoPort::to_int(pp, pv)?;
        match pv {
            ProtocolVersion::V1_0 => bytes.write_u16(raw as u16),
            _ => bytes.write_u32(raw),
        }
    }
}

/// How long before a flow entry expires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Timeout {
    Permanent,
    ExpiresAfter(u16),
}

impl Default for Timeout {
    fn default() -> Timeout {
        Timeout::Permanent
    }
}

impl Timeout {
    pub fn of_int(tm: u16) -> Timeout {
        match tm {
            0 => Timeout::Permanent,
            d => Timeout::ExpiresAfter(d),
        }
    }

    pub fn to_int(tm: Timeout) -> u16 {
        match tm {
            Timeout::Permanent => 0,
            Timeout::ExpiresAfter(d) => d,
        }
    }
}

/// Buffer id meaning "not buffered".
pub const NO_BUFFER: u32 = 0xffff_ffff;

pub fn buffer_of_int(id: u32) -> Option<u32> {
    match id {
        NO_BUFFER => None,
        n => Some(n),
    }
}

pub fn int_of_buffer(id: Option<u32>) -> u32 {
    id.unwrap_or(NO_BUFFER)
}

/// Group id meaning "any group"; 1.1+.
pub const GROUP_ANY: u32 = 0xffff_ffff;

/// Number of zero bytes that pad `len` up to a multiple of 8.
pub fn pad_to_8(len: usize) -> usize {
    (8 - len % 8) % 8
}
