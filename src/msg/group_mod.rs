use crate::error::{OfpError, Result};
use crate::msg::OfpBody;
use crate::mutable::Editor;
use crate::openflow::{GroupModCommand, GroupType, MessageType};
use crate::version::ProtocolVersion;
use crate::wire::{PacketReader, PacketWriter};

/// Group table modification; 1.1+. Buckets are kept in encoded form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupMod {
    command: Option<GroupModCommand>,
    group_type: Option<GroupType>,
    group_id: u32,
    buckets: Vec<u8>,
}

/// Last usable group number.
pub const GROUP_MAX: u32 = 0xffff_ff00;
/// Wildcard for group deletion.
pub const GROUP_ALL: u32 = 0xffff_fffc;

impl GroupMod {
    pub fn command(&self) -> Option<GroupModCommand> {
        self.command
    }

    pub fn group_type(&self) -> Option<GroupType> {
        self.group_type
    }

    pub fn group_id(&self) -> u32 {
        self.group_id
    }

    pub fn buckets(&self) -> &[u8] {
        &self.buckets
    }

    pub(crate) fn set_command(&mut self, pv: ProtocolVersion, command: GroupModCommand) -> Result<()> {
        command.encode(pv)?;
        self.command = Some(command);
        Ok(())
    }
}

impl OfpBody for GroupMod {
    fn size_of(&self, _pv: ProtocolVersion) -> usize {
        8 + self.buckets.len()
    }

    fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<GroupMod> {
        let command = GroupModCommand::decode(u32::from(bytes.read_u16()?), pv)?;
        let group_type = GroupType::decode(u32::from(bytes.read_u8()?), pv)?;
        bytes.skip(1)?;
        let group_id = bytes.read_u32()?;
        let rest = bytes.readable_bytes();
        Ok(GroupMod {
            command: Some(command),
            group_type: Some(group_type),
            group_id: group_id,
            buckets: bytes.read_bytes(rest)?,
        })
    }

    fn marshal<W: PacketWriter>(&self, pv: ProtocolVersion, bytes: &mut W) -> Result<()> {
        self.validate(pv)?;
        if let (Some(command), Some(group_type)) = (self.command, self.group_type) {
            bytes.write_u16(command.encode(pv)?)?;
            bytes.write_u8(group_type.encode(pv)? as u8)?;
        }
        bytes.write_u8(0)?;
        bytes.write_u32(self.group_id)?;
        bytes.write_bytes(&self.buckets)
    }

    fn validate(&self, _pv: ProtocolVersion) -> Result<()> {
        if self.command.is_none() {
            return Err(OfpError::Incomplete(MessageType::GroupMod, "command"));
        }
        if self.group_type.is_none() {
            return Err(OfpError::Incomplete(MessageType::GroupMod, "group type"));
        }
        Ok(())
    }

    fn summary(&self) -> String {
        format!("cmd={},type={},group={:#x},buckets={}b",
                self.command.map_or("?", GroupModCommand::name),
                self.group_type.map_or("?", GroupType::name),
                self.group_id,
                self.buckets.len())
    }
}

impl<'a> Editor<'a, GroupMod> {
    pub fn command(&mut self, command: GroupModCommand) -> Result<&mut Self> {
        let pv = self.version();
        self.body_mut().set_command(pv, command)?;
        Ok(self)
    }

    pub fn group_type(&mut self, group_type: GroupType) -> Result<&mut Self> {
        group_type.encode(self.version())?;
        self.body_mut().group_type = Some(group_type);
        Ok(self)
    }

    /// Group numbers above `GROUP_MAX` are reserved, except `GROUP_ALL`.
    pub fn group_id(&mut self, group_id: u32) -> Result<&mut Self> {
        if group_id > GROUP_MAX && group_id != GROUP_ALL {
            return Err(OfpError::Reserved {
                field: "group id",
                value: u64::from(group_id),
            });
        }
        self.body_mut().group_id = group_id;
        Ok(self)
    }

    /// Encoded bucket list.
    pub fn buckets(&mut self, buckets: Vec<u8>) -> Result<&mut Self> {
        if buckets.len() % 8 != 0 {
            return Err(OfpError::Malformed(format!("bucket list of {} bytes", buckets.len())));
        }
        self.body_mut().buckets = buckets;
        Ok(self)
    }
}
