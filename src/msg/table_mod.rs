use tracing::warn;

use crate::error::Result;
use crate::msg::OfpBody;
use crate::mutable::Editor;
use crate::openflow::TableMiss;
use crate::version::{self, ProtocolVersion};
use crate::wire::{PacketReader, PacketWriter};

/// Table configuration; 1.1+.
///
/// 1.1 and 1.2 configure table-miss behaviour here. 1.3 deprecated those
/// bits, so `miss` is always `None` there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableMod {
    table_id: u8,
    miss: Option<TableMiss>,
}

/// Applies the mod to every table.
pub const TABLE_ALL: u8 = 0xff;

/// Config bits 1.3 reserves for the deprecated miss behaviour.
const DEPRECATED_MASK: u32 = 0x3;

impl TableMod {
    /// Zeroed config, which is "send to controller" where a miss is defined.
    pub fn new(pv: ProtocolVersion) -> TableMod {
        let miss = match pv {
            ProtocolVersion::V1_1 | ProtocolVersion::V1_2 => Some(TableMiss::Controller),
            _ => None,
        };
        TableMod {
            table_id: 0,
            miss: miss,
        }
    }

    pub fn table_id(&self) -> u8 {
        self.table_id
    }

    pub fn miss(&self) -> Option<TableMiss> {
        self.miss
    }
}

impl OfpBody for TableMod {
    fn size_of(&self, _pv: ProtocolVersion) -> usize {
        8
    }

    fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<TableMod> {
        let table_id = bytes.read_u8()?;
        bytes.skip(3)?;
        let config = bytes.read_u32()?;
        let miss = match pv {
            ProtocolVersion::V1_1 | ProtocolVersion::V1_2 => Some(TableMiss::decode(config, pv)?),
            _ => {
                if config & DEPRECATED_MASK != 0 {
                    warn!(version = %pv, config, "ignoring deprecated table-miss config bits");
                }
                None
            }
        };
        Ok(TableMod {
            table_id: table_id,
            miss: miss,
        })
    }

    fn marshal<W: PacketWriter>(&self, pv: ProtocolVersion, bytes: &mut W) -> Result<()> {
        bytes.write_u8(self.table_id)?;
        bytes.write_zeros(3)?;
        let config = match self.miss {
            Some(miss) => u32::from(miss.encode(pv)?),
            None => 0,
        };
        bytes.write_u32(config)
    }

    fn summary(&self) -> String {
        match self.miss {
            Some(miss) => format!("table={},miss={}", self.table_id, miss),
            None => format!("table={}", self.table_id),
        }
    }
}

impl<'a> Editor<'a, TableMod> {
    pub fn table_id(&mut self, table_id: u8) -> &mut Self {
        self.body_mut().table_id = table_id;
        self
    }

    /// 1.1 and 1.2 only.
    pub fn miss(&mut self, miss: TableMiss) -> Result<&mut Self> {
        let pv = self.version();
        version::ver_range(pv, ProtocolVersion::V1_1, ProtocolVersion::V1_2, "table miss")?;
        miss.encode(pv)?;
        self.body_mut().miss = Some(miss);
        Ok(self)
    }
}
