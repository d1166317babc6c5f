//! Byte cursor over a help file.
//!
//! All multi-byte fields are little-endian and unpadded.

use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// Sequential, seekable reader producing typed fields.
#[derive(Debug)]
pub struct RecordReader<R> {
    inner: R,
}

impl<R: Read + Seek> RecordReader<R> {
    /// Wraps a byte source.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Returns the current absolute position.
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Moves the cursor to an absolute offset.
    pub fn seek_absolute(&mut self, offset: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Reads exactly `N` bytes, failing with [`Error::ShortRead`] otherwise.
    pub fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N]> {
        let offset = self.position()?;
        let mut buffer = [0u8; N];
        let got = self.fill(&mut buffer)?;
        if got != N {
            return Err(Error::ShortRead {
                offset,
                expected: N,
                got,
            });
        }
        Ok(buffer)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_fixed::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(&self.read_fixed::<2>()?))
    }

    /// Reads a 24-bit signed integer (`b0 | b1 << 8 | (b2 as i8) << 16`).
    pub fn read_i24(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i24(&self.read_fixed::<3>()?))
    }

    /// Reads bytes up to a NUL terminator. The terminator is consumed but not returned.
    pub fn read_cstring(&mut self) -> Result<Vec<u8>> {
        let offset = self.position()?;
        let mut bytes = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            if self.fill(&mut byte)? == 0 {
                return Err(Error::ShortRead {
                    offset,
                    expected: bytes.len() + 1,
                    got: bytes.len(),
                });
            }
            if byte[0] == 0 {
                return Ok(bytes);
            }
            bytes.push(byte[0]);
        }
    }

    /// Reads up to `len` bytes, returning fewer only at end of input.
    pub fn read_up_to(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        let got = self.fill(&mut buffer)?;
        buffer.truncate(got);
        Ok(buffer)
    }

    /// Reads into `buffer` until it is full or the source is exhausted.
    fn fill(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buffer.len() {
            match self.inner.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}
