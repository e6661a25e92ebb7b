use std::collections::BTreeSet;

use crate::code;
use crate::error::{OfpError, Result};
use crate::msg::OfpBody;
use crate::mutable::Editor;
use crate::openflow::{ActionType, Capability};
use crate::version::{self, ProtocolVersion};
use crate::wire::{PacketReader, PacketWriter};

/// Switch features.
///
/// Port descriptions are carried as encoded records; 1.3 moved them to the
/// port-description multipart reply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeaturesReply {
    datapath_id: u64,
    num_buffers: u32,
    num_tables: u8,
    auxiliary_id: u8,
    capabilities: BTreeSet<Capability>,
    supported_actions: BTreeSet<ActionType>,
    ports: Vec<Vec<u8>>,
}

/// Length of one port description at `pv`, if features replies carry them.
pub fn port_record_len(pv: ProtocolVersion) -> Option<usize> {
    match pv {
        ProtocolVersion::V1_0 => Some(48),
        ProtocolVersion::V1_1 | ProtocolVersion::V1_2 => Some(64),
        ProtocolVersion::V1_3 => None,
    }
}

const FIXED_LEN: usize = 24;

impl FeaturesReply {
    pub fn datapath_id(&self) -> u64 {
        self.datapath_id
    }

    pub fn num_buffers(&self) -> u32 {
        self.num_buffers
    }

    pub fn num_tables(&self) -> u8 {
        self.num_tables
    }

    /// 1.3 auxiliary connection id; zero for the main connection.
    pub fn auxiliary_id(&self) -> u8 {
        self.auxiliary_id
    }

    pub fn capabilities(&self) -> &BTreeSet<Capability> {
        &self.capabilities
    }

    /// Actions the switch supports; 1.0 only.
    pub fn supported_actions(&self) -> &BTreeSet<ActionType> {
        &self.supported_actions
    }

    pub fn ports(&self) -> &[Vec<u8>] {
        &self.ports
    }
}

impl OfpBody for FeaturesReply {
    fn size_of(&self, pv: ProtocolVersion) -> usize {
        FIXED_LEN + port_record_len(pv).map_or(0, |len| len * self.ports.len())
    }

    fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<FeaturesReply> {
        let datapath_id = bytes.read_u64()?;
        let num_buffers = bytes.read_u32()?;
        let num_tables = bytes.read_u8()?;
        let auxiliary_id = if pv == ProtocolVersion::V1_3 {
            bytes.read_u8()?
        } else {
            bytes.skip(1)?;
            0
        };
        bytes.skip(2)?;
        let capabilities = Capability::decode_bitmap(u64::from(bytes.read_u32()?), pv)?;
        let supported_actions = if pv == ProtocolVersion::V1_0 {
            code::decode_mask(bytes.read_u32()?, pv)?
        } else {
            // reserved
            bytes.skip(4)?;
            BTreeSet::new()
        };
        let mut ports = vec![];
        if let Some(len) = port_record_len(pv) {
            while bytes.readable_bytes() >= len {
                ports.push(bytes.read_bytes(len)?);
            }
        }
        Ok(FeaturesReply {
            datapath_id: datapath_id,
            num_buffers: num_buffers,
            num_tables: num_tables,
            auxiliary_id: auxiliary_id,
            capabilities: capabilities,
            supported_actions: supported_actions,
            ports: ports,
        })
    }

    fn marshal<W: PacketWriter>(&self, pv: ProtocolVersion, bytes: &mut W) -> Result<()> {
        bytes.write_u64(self.datapath_id)?;
        bytes.write_u32(self.num_buffers)?;
        bytes.write_u8(self.num_tables)?;
        bytes.write_u8(self.auxiliary_id)?;
        bytes.write_zeros(2)?;
        bytes.write_u32(Capability::encode_bitmap(&self.capabilities, pv)? as u32)?;
        if pv == ProtocolVersion::V1_0 {
            bytes.write_u32(code::encode_mask(&self.supported_actions, pv)?)?;
        } else {
            bytes.write_u32(0)?;
        }
        if port_record_len(pv).is_some() {
            for port in &self.ports {
                bytes.write_bytes(port)?;
            }
        }
        Ok(())
    }

    fn summary(&self) -> String {
        format!("dpid={:#018x},tables={},ports={}",
                self.datapath_id,
                self.num_tables,
                self.ports.len())
    }
}

impl<'a> Editor<'a, FeaturesReply> {
    pub fn datapath_id(&mut self, dpid: u64) -> &mut Self {
        self.body_mut().datapath_id = dpid;
        self
    }

    pub fn num_buffers(&mut self, n: u32) -> &mut Self {
        self.body_mut().num_buffers = n;
        self
    }

    pub fn num_tables(&mut self, n: u8) -> &mut Self {
        self.body_mut().num_tables = n;
        self
    }

    /// 1.3.
    pub fn auxiliary_id(&mut self, id: u8) -> Result<&mut Self> {
        version::ver_min_13(self.version(), "auxiliary id")?;
        self.body_mut().auxiliary_id = id;
        Ok(self)
    }

    pub fn capabilities(&mut self, caps: &[Capability]) -> Result<&mut Self> {
        Capability::encode_bitmap(caps, self.version())?;
        self.body_mut().capabilities = caps.iter().cloned().collect();
        Ok(self)
    }

    /// 1.0 only.
    pub fn supported_actions(&mut self, actions: &[ActionType]) -> Result<&mut Self> {
        let pv = self.version();
        version::ver_exactly(pv, ProtocolVersion::V1_0, "supported actions")?;
        code::encode_mask(actions, pv)?;
        self.body_mut().supported_actions = actions.iter().cloned().collect();
        Ok(self)
    }

    /// Appends an encoded port description; 1.0 to 1.2.
    pub fn add_port(&mut self, record: Vec<u8>) -> Result<&mut Self> {
        let pv = self.version();
        version::ver_range(pv, ProtocolVersion::V1_0, ProtocolVersion::V1_2, "features port")?;
        let expected = port_record_len(pv).unwrap_or(0);
        if record.len() != expected {
            return Err(OfpError::Malformed(format!("port record of {} bytes, expected {}",
                                                   record.len(),
                                                   expected)));
        }
        self.body_mut().ports.push(record);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::ProtocolVersion::*;
    use std::io::Cursor;

    fn reply_1_0() -> Vec<u8> {
        let mut bytes = vec![0, 0, 0, 0, 0, 0, 0, 0x2a, // dpid
                             0, 0, 1, 0, // buffers
                             4, 0, 0, 0, // tables, pad
                             0, 0, 0, 0x87, // flow, table, port stats, arp match
                             0, 0, 0, 0x03]; // output, set vlan vid
        bytes.extend(vec![0xab; 48]);
        bytes
    }

    #[test]
    fn parses_1_0_reply_with_one_port() {
        let mut r = Cursor::new(reply_1_0());
        let reply = FeaturesReply::parse(&mut r, V1_0).unwrap();
        assert_eq!(reply.datapath_id(), 0x2a);
        assert_eq!(reply.num_buffers(), 256);
        assert_eq!(reply.num_tables(), 4);
        assert_eq!(reply.capabilities().len(), 4);
        assert!(reply.capabilities().contains(&Capability::ArpMatchIp));
        let actions: Vec<ActionType> = reply.supported_actions().iter().cloned().collect();
        assert_eq!(actions, vec![ActionType::Output, ActionType::SetVlanVid]);
        assert_eq!(reply.ports().len(), 1);
        assert_eq!(r.readable_bytes(), 0);

        let mut out = vec![];
        reply.marshal(V1_0, &mut out).unwrap();
        assert_eq!(out, reply_1_0());
    }

    #[test]
    fn version_specific_fields() {
        let mut reply = FeaturesReply::default();
        let mut ed = Editor::new(V1_3, &mut reply);
        ed.auxiliary_id(2).unwrap();
        assert!(ed.supported_actions(&[ActionType::Output]).is_err());
        assert!(ed.add_port(vec![0; 64]).is_err());
        assert!(ed.capabilities(&[Capability::Stp]).is_err());
        ed.capabilities(&[Capability::PortBlocked]).unwrap();
        assert_eq!(reply.size_of(V1_3), 24);

        let mut reply = FeaturesReply::default();
        let mut ed = Editor::new(V1_1, &mut reply);
        assert!(ed.auxiliary_id(1).is_err());
        assert!(ed.add_port(vec![0; 48]).is_err());
        ed.add_port(vec![0; 64]).unwrap();
        assert_eq!(reply.size_of(V1_1), 88);
    }

    #[test]
    fn undefined_capability_bits_fail() {
        let mut bytes = reply_1_0();
        bytes[19] = 0x10;
        assert!(FeaturesReply::parse(&mut Cursor::new(bytes), V1_0).unwrap_err().is_version_mismatch());
    }
}
