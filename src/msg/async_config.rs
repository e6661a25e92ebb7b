use std::collections::BTreeSet;

use crate::code;
use crate::error::Result;
use crate::msg::OfpBody;
use crate::mutable::Editor;
use crate::openflow::{FlowRemovedReason, PacketInReason, PortReason};
use crate::version::ProtocolVersion;
use crate::wire::{PacketReader, PacketWriter};

/// Which half of an async mask pair a setting applies to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AsyncRole {
    /// Connections in the master or equal role.
    MasterOrEqual = 0,
    Slave = 1,
}

/// Asynchronous message filter of a controller connection; 1.3.
///
/// Each mask pair holds the reasons delivered to master/equal connections
/// and to slave connections. On the wire a reason with code `n` is bit `n`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AsyncConfig {
    packet_in: [BTreeSet<PacketInReason>; 2],
    port_status: [BTreeSet<PortReason>; 2],
    flow_removed: [BTreeSet<FlowRemovedReason>; 2],
}

impl AsyncConfig {
    pub fn packet_in_mask(&self, role: AsyncRole) -> &BTreeSet<PacketInReason> {
        &self.packet_in[role as usize]
    }

    pub fn port_status_mask(&self, role: AsyncRole) -> &BTreeSet<PortReason> {
        &self.port_status[role as usize]
    }

    pub fn flow_removed_mask(&self, role: AsyncRole) -> &BTreeSet<FlowRemovedReason> {
        &self.flow_removed[role as usize]
    }
}

impl OfpBody for AsyncConfig {
    fn size_of(&self, _pv: ProtocolVersion) -> usize {
        24
    }

    fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<AsyncConfig> {
        let mut config = AsyncConfig::default();
        for set in config.packet_in.iter_mut() {
            *set = code::decode_mask(bytes.read_u32()?, pv)?;
        }
        for set in config.port_status.iter_mut() {
            *set = code::decode_mask(bytes.read_u32()?, pv)?;
        }
        for set in config.flow_removed.iter_mut() {
            *set = code::decode_mask(bytes.read_u32()?, pv)?;
        }
        Ok(config)
    }

    fn marshal<W: PacketWriter>(&self, pv: ProtocolVersion, bytes: &mut W) -> Result<()> {
        for set in &self.packet_in {
            bytes.write_u32(code::encode_mask(set, pv)?)?;
        }
        for set in &self.port_status {
            bytes.write_u32(code::encode_mask(set, pv)?)?;
        }
        for set in &self.flow_removed {
            bytes.write_u32(code::encode_mask(set, pv)?)?;
        }
        Ok(())
    }
}

impl<'a> Editor<'a, AsyncConfig> {
    pub fn packet_in_mask(&mut self, role: AsyncRole, reasons: &[PacketInReason]) -> Result<&mut Self> {
        code::encode_mask(reasons, self.version())?;
        self.body_mut().packet_in[role as usize] = reasons.iter().cloned().collect();
        Ok(self)
    }

    pub fn port_status_mask(&mut self, role: AsyncRole, reasons: &[PortReason]) -> Result<&mut Self> {
        code::encode_mask(reasons, self.version())?;
        self.body_mut().port_status[role as usize] = reasons.iter().cloned().collect();
        Ok(self)
    }

    pub fn flow_removed_mask(&mut self,
                             role: AsyncRole,
                             reasons: &[FlowRemovedReason])
                             -> Result<&mut Self> {
        code::encode_mask(reasons, self.version())?;
        self.body_mut().flow_removed[role as usize] = reasons.iter().cloned().collect();
        Ok(self)
    }
}
