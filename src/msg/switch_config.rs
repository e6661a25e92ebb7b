use std::collections::BTreeSet;

use crate::error::Result;
use crate::msg::OfpBody;
use crate::mutable::Editor;
use crate::openflow::ConfigFlag;
use crate::version::ProtocolVersion;
use crate::wire::{PacketReader, PacketWriter};

/// Switch configuration, as set by `SET_CONFIG` and reported by
/// `GET_CONFIG_REPLY`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwitchConfig {
    flags: BTreeSet<ConfigFlag>,
    miss_send_len: u16,
}

impl SwitchConfig {
    pub fn flags(&self) -> &BTreeSet<ConfigFlag> {
        &self.flags
    }

    /// Max bytes of a table-miss packet sent to the controller.
    pub fn miss_send_len(&self) -> u16 {
        self.miss_send_len
    }
}

impl OfpBody for SwitchConfig {
    fn size_of(&self, _pv: ProtocolVersion) -> usize {
        4
    }

    fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<SwitchConfig> {
        let flags = ConfigFlag::decode_bitmap(u64::from(bytes.read_u16()?), pv)?;
        Ok(SwitchConfig {
            flags: flags,
            miss_send_len: bytes.read_u16()?,
        })
    }

    fn marshal<W: PacketWriter>(&self, pv: ProtocolVersion, bytes: &mut W) -> Result<()> {
        bytes.write_u16(ConfigFlag::encode_bitmap(&self.flags, pv)? as u16)?;
        bytes.write_u16(self.miss_send_len)
    }

    fn summary(&self) -> String {
        let flags: Vec<String> = self.flags.iter().map(|f| f.to_string()).collect();
        format!("flags=[{}],miss_send_len={}", flags.join(","), self.miss_send_len)
    }
}

impl<'a> Editor<'a, SwitchConfig> {
    pub fn flags(&mut self, flags: &[ConfigFlag]) -> Result<&mut Self> {
        ConfigFlag::encode_bitmap(flags, self.version())?;
        self.body_mut().flags = flags.iter().cloned().collect();
        Ok(self)
    }

    pub fn miss_send_len(&mut self, len: u16) -> &mut Self {
        self.body_mut().miss_send_len = len;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::ProtocolVersion::*;
    use std::io::Cursor;

    #[test]
    fn invalid_ttl_flag_is_1_1_and_1_2_only() {
        let mut config = SwitchConfig::default();
        assert!(Editor::new(V1_0, &mut config).flags(&[ConfigFlag::InvalidTtlToController]).is_err());
        assert!(Editor::new(V1_3, &mut config).flags(&[ConfigFlag::InvalidTtlToController]).is_err());
        Editor::new(V1_2, &mut config)
            .flags(&[ConfigFlag::FragDrop, ConfigFlag::InvalidTtlToController])
            .unwrap()
            .miss_send_len(128);
        let mut bytes = vec![];
        config.marshal(V1_2, &mut bytes).unwrap();
        assert_eq!(bytes, vec![0, 5, 0, 128]);
        assert_eq!(SwitchConfig::parse(&mut Cursor::new(bytes), V1_2), Ok(config));
    }

    #[test]
    fn empty_flags_mean_normal_fragments() {
        let config = SwitchConfig::parse(&mut Cursor::new(vec![0, 0, 0xff, 0xff]), V1_3).unwrap();
        assert!(config.flags().is_empty());
        assert_eq!(config.miss_send_len(), 0xffff);
        assert_eq!(config.summary(), "flags=[],miss_send_len=65535");
    }
}
