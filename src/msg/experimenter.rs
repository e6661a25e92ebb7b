use crate::error::Result;
use crate::msg::OfpBody;
use crate::mutable::Editor;
use crate::version::{self, ProtocolVersion};
use crate::wire::{PacketReader, PacketWriter};

/// Experimenter (1.0 "vendor") message. 1.0 has no experimenter type field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Experimenter {
    experimenter_id: u32,
    exp_type: u32,
    data: Vec<u8>,
}

impl Experimenter {
    pub fn experimenter_id(&self) -> u32 {
        self.experimenter_id
    }

    pub fn exp_type(&self) -> u32 {
        self.exp_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl OfpBody for Experimenter {
    fn size_of(&self, pv: ProtocolVersion) -> usize {
        let fixed = if pv == ProtocolVersion::V1_0 { 4 } else { 8 };
        fixed + self.data.len()
    }

    fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<Experimenter> {
        let experimenter_id = bytes.read_u32()?;
        let exp_type = if pv == ProtocolVersion::V1_0 {
            0
        } else {
            bytes.read_u32()?
        };
        let rest = bytes.readable_bytes();
        Ok(Experimenter {
            experimenter_id: experimenter_id,
            exp_type: exp_type,
            data: bytes.read_bytes(rest)?,
        })
    }

    fn marshal<W: PacketWriter>(&self, pv: ProtocolVersion, bytes: &mut W) -> Result<()> {
        bytes.write_u32(self.experimenter_id)?;
        if pv != ProtocolVersion::V1_0 {
            bytes.write_u32(self.exp_type)?;
        }
        bytes.write_bytes(&self.data)
    }

    fn summary(&self) -> String {
        format!("exp={:#x},type={},data={}b", self.experimenter_id, self.exp_type, self.data.len())
    }
}

impl<'a> Editor<'a, Experimenter> {
    pub fn experimenter_id(&mut self, id: u32) -> &mut Self {
        self.body_mut().experimenter_id = id;
        self
    }

    /// 1.1+.
    pub fn exp_type(&mut self, exp_type: u32) -> Result<&mut Self> {
        version::ver_min_11(self.version(), "experimenter type")?;
        self.body_mut().exp_type = exp_type;
        Ok(self)
    }

    pub fn data(&mut self, data: Vec<u8>) -> &mut Self {
        self.body_mut().data = data;
        self
    }
}
