use crate::error::{OfpError, Result};
use crate::msg::OfpBody;
use crate::mutable::Editor;
use crate::openflow::{ErrorType, MessageType};
use crate::version::{self, ProtocolVersion};
use crate::wire::{PacketReader, PacketWriter};

/// Error body.
///
/// The code is carried as the raw value; its meaning depends on the type.
/// From 1.2 an `EXPERIMENTER` error replaces the code with an experimenter
/// type and id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorMsg {
    error_type: Option<ErrorType>,
    code: u16,
    exp_type: u16,
    experimenter_id: u32,
    data: Vec<u8>,
}

impl ErrorMsg {
    pub fn error_type(&self) -> Option<ErrorType> {
        self.error_type
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn exp_type(&self) -> u16 {
        self.exp_type
    }

    pub fn experimenter_id(&self) -> u32 {
        self.experimenter_id
    }

    /// Usually the leading bytes of the offending request.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn is_experimenter(&self) -> bool {
        self.error_type == Some(ErrorType::Experimenter)
    }

    pub(crate) fn set_error_type(&mut self, pv: ProtocolVersion, t: ErrorType) -> Result<()> {
        t.encode(pv)?;
        self.error_type = Some(t);
        Ok(())
    }
}

impl OfpBody for ErrorMsg {
    fn size_of(&self, _pv: ProtocolVersion) -> usize {
        let fixed = if self.is_experimenter() { 8 } else { 4 };
        fixed + self.data.len()
    }

    fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<ErrorMsg> {
        let error_type = ErrorType::decode(u32::from(bytes.read_u16()?), pv)?;
        let mut msg = ErrorMsg {
            error_type: Some(error_type),
            ..ErrorMsg::default()
        };
        if msg.is_experimenter() {
            msg.exp_type = bytes.read_u16()?;
            msg.experimenter_id = bytes.read_u32()?;
        } else {
            msg.code = bytes.read_u16()?;
        }
        let rest = bytes.readable_bytes();
        msg.data = bytes.read_bytes(rest)?;
        Ok(msg)
    }

    fn marshal<W: PacketWriter>(&self, pv: ProtocolVersion, bytes: &mut W) -> Result<()> {
        let error_type = self.error_type
            .ok_or(OfpError::Incomplete(MessageType::Error, "error type"))?;
        bytes.write_u16(error_type.encode(pv)?)?;
        if self.is_experimenter() {
            bytes.write_u16(self.exp_type)?;
            bytes.write_u32(self.experimenter_id)?;
        } else {
            bytes.write_u16(self.code)?;
        }
        bytes.write_bytes(&self.data)
    }

    fn validate(&self, _pv: ProtocolVersion) -> Result<()> {
        if self.error_type.is_none() {
            return Err(OfpError::Incomplete(MessageType::Error, "error type"));
        }
        Ok(())
    }

    fn summary(&self) -> String {
        match self.error_type {
            Some(ErrorType::Experimenter) => {
                format!("type=EXPERIMENTER,exp={:#x}/{}", self.experimenter_id, self.exp_type)
            }
            Some(t) => format!("type={},code={}", t, self.code),
            None => "type=?".to_string(),
        }
    }
}

impl<'a> Editor<'a, ErrorMsg> {
    pub fn error_type(&mut self, t: ErrorType) -> Result<&mut Self> {
        let pv = self.version();
        self.body_mut().set_error_type(pv, t)?;
        Ok(self)
    }

    pub fn code(&mut self, code: u16) -> &mut Self {
        self.body_mut().code = code;
        self
    }

    /// Turns the error into an experimenter error; 1.2+.
    pub fn experimenter(&mut self, exp_type: u16, experimenter_id: u32) -> Result<&mut Self> {
        version::ver_min_12(self.version(), "experimenter error")?;
        let body = self.body_mut();
        body.error_type = Some(ErrorType::Experimenter);
        body.exp_type = exp_type;
        body.experimenter_id = experimenter_id;
        Ok(self)
    }

    pub fn data(&mut self, data: Vec<u8>) -> &mut Self {
        self.body_mut().data = data;
        self
    }
}
