use crate::error::Result;
use crate::msg::OfpBody;
use crate::mutable::Editor;
use crate::version::ProtocolVersion;
use crate::wire::{PacketReader, PacketWriter};

/// Arbitrary payload of an echo request, returned unchanged in the reply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Echo {
    data: Vec<u8>,
}

impl Echo {
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl OfpBody for Echo {
    fn size_of(&self, _pv: ProtocolVersion) -> usize {
        self.data.len()
    }

    fn parse<R: PacketReader>(bytes: &mut R, _pv: ProtocolVersion) -> Result<Echo> {
        let rest = bytes.readable_bytes();
        Ok(Echo { data: bytes.read_bytes(rest)? })
    }

    fn marshal<W: PacketWriter>(&self, _pv: ProtocolVersion, bytes: &mut W) -> Result<()> {
        bytes.write_bytes(&self.data)
    }

    fn summary(&self) -> String {
        if self.data.is_empty() {
            String::new()
        } else {
            format!("data={}b", self.data.len())
        }
    }
}

impl<'a> Editor<'a, Echo> {
    pub fn data(&mut self, data: Vec<u8>) -> &mut Self {
        self.body_mut().data = data;
        self
    }
}
