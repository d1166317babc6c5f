//! Record headers and the sequential record walk.
//!
//! After the stamp, signature and version fields a help file is a flat
//! sequence of records, each introduced by a 3-byte header: one type byte
//! followed by a little-endian `u16` payload length.

use super::reader::RecordReader;
use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;
use std::io::{Read, Seek};

/// Record type tags.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordType {
    FileHeader = 0,
    Context = 1,
    Text = 2,
    Keyword = 3,
    Index = 4,
    Compression = 5,
    /// Introduced by the newest format; recognized only to be skipped.
    IndexTags = 6,

    // Unknown tag
    Unknown = 0xFF,
}

impl From<u8> for RecordType {
    fn from(value: u8) -> Self {
        match value {
            0 => RecordType::FileHeader,
            1 => RecordType::Context,
            2 => RecordType::Text,
            3 => RecordType::Keyword,
            4 => RecordType::Index,
            5 => RecordType::Compression,
            6 => RecordType::IndexTags,
            _ => RecordType::Unknown,
        }
    }
}

/// Record header structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordHeader {
    /// Raw type byte as stored in the file
    pub type_id: u8,
    /// Payload length in bytes
    pub length: u16,
}

impl RecordHeader {
    /// Size of a record header in bytes.
    pub const SIZE: u64 = 3;

    /// Parses a header from its three raw bytes.
    pub fn parse(data: [u8; 3]) -> Self {
        Self {
            type_id: data[0],
            length: LittleEndian::read_u16(&data[1..3]),
        }
    }

    /// Reads the header at the current position.
    pub fn read<R: Read + Seek>(reader: &mut RecordReader<R>) -> Result<Self> {
        Ok(Self::parse(reader.read_fixed::<3>()?))
    }

    /// Reads the header at the current position, returning `None` at a clean end of input.
    pub fn read_opt<R: Read + Seek>(reader: &mut RecordReader<R>) -> Result<Option<Self>> {
        let offset = reader.position()?;
        let bytes = reader.read_up_to(Self::SIZE as usize)?;
        match bytes.len() {
            0 => Ok(None),
            3 => Ok(Some(Self::parse([bytes[0], bytes[1], bytes[2]]))),
            got => Err(Error::ShortRead {
                offset,
                expected: Self::SIZE as usize,
                got,
            }),
        }
    }

    /// Reads the header and checks that it carries the expected type.
    pub fn expect<R: Read + Seek>(
        reader: &mut RecordReader<R>,
        expected: RecordType,
    ) -> Result<Self> {
        let offset = reader.position()?;
        let header = Self::read(reader)?;
        if header.record_type() != expected {
            return Err(Error::UnexpectedRecordType {
                offset,
                expected,
                found: header.type_id,
            });
        }
        Ok(header)
    }

    /// Returns the type tag as an enum.
    pub fn record_type(&self) -> RecordType {
        RecordType::from(self.type_id)
    }

    /// Total on-disk size including the header itself.
    pub fn total_size(&self) -> u64 {
        Self::SIZE + u64::from(self.length)
    }
}

/// A record located by the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordInfo {
    /// Absolute offset of the record header
    pub offset: u64,
    /// The record header
    pub header: RecordHeader,
}

impl RecordInfo {
    /// Absolute offset of the first payload byte.
    pub fn payload_offset(&self) -> u64 {
        self.offset + RecordHeader::SIZE
    }
}

/// Iterator over every record from a starting offset to the end of input.
///
/// Payloads are skipped by their declared length; nothing is decoded.
pub struct RecordWalker<'a, R> {
    reader: &'a mut RecordReader<R>,
    next_offset: u64,
    finished: bool,
}

impl<'a, R: Read + Seek> RecordWalker<'a, R> {
    /// Creates a walker starting at `offset`.
    pub fn new(reader: &'a mut RecordReader<R>, offset: u64) -> Self {
        Self {
            reader,
            next_offset: offset,
            finished: false,
        }
    }

    fn read_next(&mut self) -> Result<Option<RecordInfo>> {
        let offset = self.next_offset;
        self.reader.seek_absolute(offset)?;

        let Some(header) = RecordHeader::read_opt(self.reader)? else {
            return Ok(None);
        };

        self.next_offset = offset + header.total_size();
        Ok(Some(RecordInfo { offset, header }))
    }
}

impl<R: Read + Seek> Iterator for RecordWalker<'_, R> {
    type Item = Result<RecordInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_next() {
            Ok(Some(info)) => Some(Ok(info)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
