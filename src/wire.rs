//! Byte-level access used by every parser and encoder.
//!
//! Parsers read through `PacketReader` and encoders write through
//! `PacketWriter`, so the message layer never touches raw buffers. All
//! multi-byte values are big-endian on the wire.

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{OfpError, Result};

/// Sequential big-endian reads from a packet buffer.
pub trait PacketReader {
    /// Bytes left to read.
    fn readable_bytes(&self) -> usize;

    fn read_u8(&mut self) -> Result<u8>;
    fn read_u16(&mut self) -> Result<u16>;
    fn read_u32(&mut self) -> Result<u32>;
    fn read_u64(&mut self) -> Result<u64>;
    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>>;

    /// Skip `n` bytes, typically padding.
    fn skip(&mut self, n: usize) -> Result<()>;

    /// Fail unless at least `n` bytes remain.
    fn ensure(&self, n: usize) -> Result<()> {
        let remaining = self.readable_bytes();
        if remaining < n {
            return Err(OfpError::BufferUnderflow {
                needed: n,
                remaining: remaining,
            });
        }
        Ok(())
    }
}

/// Sequential big-endian writes into a packet buffer.
pub trait PacketWriter {
    fn write_u8(&mut self, v: u8) -> Result<()>;
    fn write_u16(&mut self, v: u16) -> Result<()>;
    fn write_u32(&mut self, v: u32) -> Result<()>;
    fn write_u64(&mut self, v: u64) -> Result<()>;
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Write `n` zero bytes of padding.
    fn write_zeros(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.write_u8(0)?;
        }
        Ok(())
    }
}

fn io_underflow(needed: usize) -> impl Fn(std::io::Error) -> OfpError {
    move |_| OfpError::BufferUnderflow {
        needed: needed,
        remaining: 0,
    }
}

impl<T: AsRef<[u8]>> PacketReader for Cursor<T> {
    fn readable_bytes(&self) -> usize {
        let len = self.get_ref().as_ref().len() as u64;
        len.saturating_sub(self.position()) as usize
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        ReadBytesExt::read_u8(self).map_err(io_underflow(1))
    }

    fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        ReadBytesExt::read_u16::<BigEndian>(self).map_err(io_underflow(2))
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        ReadBytesExt::read_u32::<BigEndian>(self).map_err(io_underflow(4))
    }

    fn read_u64(&mut self) -> Result<u64> {
        self.ensure(8)?;
        ReadBytesExt::read_u64::<BigEndian>(self).map_err(io_underflow(8))
    }

    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        self.ensure(n)?;
        let mut buf = vec![0; n];
        std::io::Read::read_exact(self, &mut buf).map_err(io_underflow(n))?;
        Ok(buf)
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        let pos = self.position();
        self.set_position(pos + n as u64);
        Ok(())
    }
}

impl PacketWriter for Vec<u8> {
    fn write_u8(&mut self, v: u8) -> Result<()> {
        WriteBytesExt::write_u8(self, v).map_err(|e| OfpError::Malformed(e.to_string()))
    }

    fn write_u16(&mut self, v: u16) -> Result<()> {
        WriteBytesExt::write_u16::<BigEndian>(self, v).map_err(|e| OfpError::Malformed(e.to_string()))
    }

    fn write_u32(&mut self, v: u32) -> Result<()> {
        WriteBytesExt::write_u32::<BigEndian>(self, v).map_err(|e| OfpError::Malformed(e.to_string()))
    }

    fn write_u64(&mut self, v: u64) -> Result<()> {
        WriteBytesExt::write_u64::<BigEndian>(self, v).map_err(|e| OfpError::Malformed(e.to_string()))
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}
