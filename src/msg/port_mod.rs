use std::collections::BTreeSet;

use crate::error::{OfpError, Result};
use crate::msg::OfpBody;
use crate::mutable::Editor;
use crate::ofp_utils::PseudoPort;
use crate::openflow::{MessageType, PortConfig};
use crate::version::ProtocolVersion;
use crate::wire::{PacketReader, PacketWriter};

/// Modifies the behavior of a physical port.
///
/// `mask` selects which `config` bits to change. `advertise` is the raw
/// port-features bitmap; zero leaves advertisement unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortMod {
    port: Option<PseudoPort>,
    hw_addr: [u8; 6],
    config: BTreeSet<PortConfig>,
    mask: BTreeSet<PortConfig>,
    advertise: u32,
}

impl PortMod {
    pub fn port(&self) -> Option<PseudoPort> {
        self.port
    }

    pub fn hw_addr(&self) -> [u8; 6] {
        self.hw_addr
    }

    pub fn config(&self) -> &BTreeSet<PortConfig> {
        &self.config
    }

    pub fn mask(&self) -> &BTreeSet<PortConfig> {
        &self.mask
    }

    pub fn advertise(&self) -> u32 {
        self.advertise
    }
}

impl OfpBody for PortMod {
    fn size_of(&self, pv: ProtocolVersion) -> usize {
        match pv {
            ProtocolVersion::V1_0 => 24,
            _ => 32,
        }
    }

    fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<PortMod> {
        let port = PseudoPort::parse(bytes, pv)?;
        if port.is_none() {
            return Err(OfpError::Malformed("port mod for no port".to_string()));
        }
        if pv != ProtocolVersion::V1_0 {
            bytes.skip(4)?;
        }
        let mut hw_addr = [0u8; 6];
        hw_addr.copy_from_slice(&bytes.read_bytes(6)?);
        if pv != ProtocolVersion::V1_0 {
            bytes.skip(2)?;
        }
        let config = PortConfig::decode_bitmap(u64::from(bytes.read_u32()?), pv)?;
        let mask = PortConfig::decode_bitmap(u64::from(bytes.read_u32()?), pv)?;
        let advertise = bytes.read_u32()?;
        bytes.skip(4)?;
        Ok(PortMod {
            port: port,
            hw_addr: hw_addr,
            config: config,
            mask: mask,
            advertise: advertise,
        })
    }

    fn marshal<W: PacketWriter>(&self, pv: ProtocolVersion, bytes: &mut W) -> Result<()> {
        self.validate(pv)?;
        PseudoPort::marshal(self.port, pv, bytes)?;
        if pv != ProtocolVersion::V1_0 {
            bytes.write_zeros(4)?;
        }
        bytes.write_bytes(&self.hw_addr)?;
        if pv != ProtocolVersion::V1_0 {
            bytes.write_zeros(2)?;
        }
        bytes.write_u32(PortConfig::encode_bitmap(&self.config, pv)? as u32)?;
        bytes.write_u32(PortConfig::encode_bitmap(&self.mask, pv)? as u32)?;
        bytes.write_u32(self.advertise)?;
        bytes.write_zeros(4)
    }

    fn validate(&self, _pv: ProtocolVersion) -> Result<()> {
        if self.port.is_none() {
            return Err(OfpError::Incomplete(MessageType::PortMod, "port"));
        }
        Ok(())
    }

    fn summary(&self) -> String {
        let mac: Vec<String> = self.hw_addr.iter().map(|b| format!("{:02x}", b)).collect();
        match self.port {
            Some(p) => format!("port={:?},hw={}", p, mac.join(":")),
            None => format!("port=?,hw={}", mac.join(":")),
        }
    }
}

impl<'a> Editor<'a, PortMod> {
    pub fn port(&mut self, port: PseudoPort) -> Result<&mut Self> {
        PseudoPort::to_int(Some(port), self.version())?;
        self.body_mut().port = Some(port);
        Ok(self)
    }

    /// Must match the port's hardware address.
    pub fn hw_addr(&mut self, hw_addr: [u8; 6]) -> &mut Self {
        self.body_mut().hw_addr = hw_addr;
        self
    }

    pub fn config(&mut self, config: &[PortConfig], mask: &[PortConfig]) -> Result<&mut Self> {
        let pv = self.version();
        PortConfig::encode_bitmap(config, pv)?;
        PortConfig::encode_bitmap(mask, pv)?;
        let body = self.body_mut();
        body.config = config.iter().cloned().collect();
        body.mask = mask.iter().cloned().collect();
        Ok(self)
    }

    pub fn advertise(&mut self, advertise: u32) -> &mut Self {
        self.body_mut().advertise = advertise;
        self
    }
}
