use std::collections::BTreeSet;

use crate::error::{OfpError, Result};
use crate::msg::OfpBody;
use crate::mutable::Editor;
use crate::openflow::{MessageType, MeterFlag, MeterModCommand};
use crate::version::ProtocolVersion;
use crate::wire::{PacketReader, PacketWriter};

/// Meter table modification; 1.3. Bands are kept in encoded form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MeterMod {
    command: Option<MeterModCommand>,
    flags: BTreeSet<MeterFlag>,
    meter_id: u32,
    bands: Vec<u8>,
}

/// Last usable meter number.
pub const METER_MAX: u32 = 0xffff_0000;
/// First of the virtual meters (slowpath, controller, all).
pub const METER_SLOWPATH: u32 = 0xffff_fffd;

impl MeterMod {
    pub fn command(&self) -> Option<MeterModCommand> {
        self.command
    }

    pub fn flags(&self) -> &BTreeSet<MeterFlag> {
        &self.flags
    }

    pub fn meter_id(&self) -> u32 {
        self.meter_id
    }

    pub fn bands(&self) -> &[u8] {
        &self.bands
    }

    pub(crate) fn set_command(&mut self, pv: ProtocolVersion, command: MeterModCommand) -> Result<()> {
        command.encode(pv)?;
        self.command = Some(command);
        Ok(())
    }
}

impl OfpBody for MeterMod {
    fn size_of(&self, _pv: ProtocolVersion) -> usize {
        8 + self.bands.len()
    }

    fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<MeterMod> {
        let command = MeterModCommand::decode(u32::from(bytes.read_u16()?), pv)?;
        let flags = MeterFlag::decode_bitmap(u64::from(bytes.read_u16()?), pv)?;
        let meter_id = bytes.read_u32()?;
        let rest = bytes.readable_bytes();
        Ok(MeterMod {
            command: Some(command),
            flags: flags,
            meter_id: meter_id,
            bands: bytes.read_bytes(rest)?,
        })
    }

    fn marshal<W: PacketWriter>(&self, pv: ProtocolVersion, bytes: &mut W) -> Result<()> {
        let command = self.command
            .ok_or(OfpError::Incomplete(MessageType::MeterMod, "command"))?;
        bytes.write_u16(command.encode(pv)?)?;
        bytes.write_u16(MeterFlag::encode_bitmap(&self.flags, pv)? as u16)?;
        bytes.write_u32(self.meter_id)?;
        bytes.write_bytes(&self.bands)
    }

    fn validate(&self, _pv: ProtocolVersion) -> Result<()> {
        if self.command.is_none() {
            return Err(OfpError::Incomplete(MessageType::MeterMod, "command"));
        }
        Ok(())
    }

    fn summary(&self) -> String {
        format!("cmd={},meter={:#x},bands={}b",
                self.command.map_or("?", MeterModCommand::name),
                self.meter_id,
                self.bands.len())
    }
}

impl<'a> Editor<'a, MeterMod> {
    pub fn command(&mut self, command: MeterModCommand) -> Result<&mut Self> {
        let pv = self.version();
        self.body_mut().set_command(pv, command)?;
        Ok(self)
    }

    pub fn flags(&mut self, flags: &[MeterFlag]) -> Result<&mut Self> {
        MeterFlag::encode_bitmap(flags, self.version())?;
        self.body_mut().flags = flags.iter().cloned().collect();
        Ok(self)
    }

    /// Ids between `METER_MAX` and the virtual meters are reserved.
    pub fn meter_id(&mut self, meter_id: u32) -> Result<&mut Self> {
        if meter_id > METER_MAX && meter_id < METER_SLOWPATH {
            return Err(OfpError::Reserved {
                field: "meter id",
                value: u64::from(meter_id),
            });
        }
        self.body_mut().meter_id = meter_id;
        Ok(self)
    }

    /// Encoded band list.
    pub fn bands(&mut self, bands: Vec<u8>) -> Result<&mut Self> {
        if bands.len() % 8 != 0 {
            return Err(OfpError::Malformed(format!("band list of {} bytes", bands.len())));
        }
        self.body_mut().bands = bands;
        Ok(self)
    }
}
