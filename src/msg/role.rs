use crate::error::{OfpError, Result};
use crate::msg::OfpBody;
use crate::mutable::Editor;
use crate::openflow::{ControllerRole, MessageType};
use crate::version::ProtocolVersion;
use crate::wire::{PacketReader, PacketWriter};

/// Role request or reply; 1.2+.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Role {
    role: Option<ControllerRole>,
    generation_id: u64,
}

impl Role {
    pub fn role(&self) -> Option<ControllerRole> {
        self.role
    }

    /// Master election generation id.
    pub fn generation_id(&self) -> u64 {
        self.generation_id
    }

    pub(crate) fn set_role(&mut self, pv: ProtocolVersion, role: ControllerRole) -> Result<()> {
        role.encode(pv)?;
        self.role = Some(role);
        Ok(())
    }
}

impl OfpBody for Role {
    fn size_of(&self, _pv: ProtocolVersion) -> usize {
        16
    }

    fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<Role> {
        let role = ControllerRole::decode(bytes.read_u32()?, pv)?;
        bytes.skip(4)?;
        Ok(Role {
            role: Some(role),
            generation_id: bytes.read_u64()?,
        })
    }

    fn marshal<W: PacketWriter>(&self, pv: ProtocolVersion, bytes: &mut W) -> Result<()> {
        let role = self.role.ok_or(OfpError::Incomplete(MessageType::RoleRequest, "role"))?;
        bytes.write_u32(u32::from(role.encode(pv)?))?;
        bytes.write_zeros(4)?;
        bytes.write_u64(self.generation_id)
    }

    fn validate(&self, _pv: ProtocolVersion) -> Result<()> {
        if self.role.is_none() {
            return Err(OfpError::Incomplete(MessageType::RoleRequest, "role"));
        }
        Ok(())
    }

    fn summary(&self) -> String {
        format!("role={},gen={}", self.role.map_or("?", ControllerRole::name), self.generation_id)
    }
}

impl<'a> Editor<'a, Role> {
    pub fn role(&mut self, role: ControllerRole) -> Result<&mut Self> {
        let pv = self.version();
        self.body_mut().set_role(pv, role)?;
        Ok(self)
    }

    pub fn generation_id(&mut self, generation_id: u64) -> &mut Self {
        self.body_mut().generation_id = generation_id;
        self
    }
}
