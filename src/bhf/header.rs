//! Catalog parsing.
//!
//! The catalog is read once, front to back: stamp, end-of-stamp sentinel,
//! signature, version, then the FileHeader, Compression, Context and Index
//! records in that order, optionally followed by an IndexTags record.

use super::reader::RecordReader;
use super::record::{RecordHeader, RecordType};
use crate::codepage;
use crate::error::{Diagnostic, Error, Result};
use crate::model::{
    Compression, CompressionKind, ContextId, ContextOffset, Document, FileHeader, FormatVersion,
    IndexEntry, Version,
};
use crate::parse_options::ParseOptions;
use log::{debug, info, trace, warn};
use std::io::{Read, Seek};

/// Byte expected right after the stamp.
pub const STAMP_SENTINEL: u8 = 0x1A;

/// Single-pass catalog parser.
pub struct HeaderParser<'a, R> {
    reader: &'a mut RecordReader<R>,
    options: &'a ParseOptions,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, R: Read + Seek> HeaderParser<'a, R> {
    pub fn new(reader: &'a mut RecordReader<R>, options: &'a ParseOptions) -> Self {
        Self {
            reader,
            options,
            diagnostics: Vec::new(),
        }
    }

    /// Parses the catalog from the start of the input.
    ///
    /// Returns the document together with the diagnostics recorded for
    /// problems that were stepped over.
    pub fn parse(mut self) -> Result<(Document, Vec<Diagnostic>)> {
        self.reader.seek_absolute(0)?;

        let mut document = Document::new();

        // [Stamp]
        document.stamp = codepage::decode(&self.reader.read_cstring()?);
        self.check_sentinel()?;

        // [Signature]
        document.signature = self.reader.read_cstring()?;

        // [Version]
        let [format, text] = self.reader.read_fixed::<2>()?;
        document.version = Version {
            format: FormatVersion::from(format),
            text,
        };
        document.records_offset = self.reader.position()?;
        debug!(
            "Stamp {:?}, format {}, text {}",
            document.stamp, document.version.format, document.version.text
        );

        document.file_header = self.parse_file_header()?;
        document.compression = self.parse_compression()?;
        document.contexts = self.parse_contexts()?;
        document.index = self.parse_index()?;
        self.skip_index_tags(document.version.format)?;

        info!(
            "Catalog parsed: {} contexts, {} index entries, {} diagnostics",
            document.contexts.len(),
            document.index.len(),
            self.diagnostics.len()
        );

        Ok((document, self.diagnostics))
    }

    /// Records a recoverable problem, or fails in strict mode.
    fn report(&mut self, err: Error) -> Result<()> {
        if !self.options.is_lenient() {
            return Err(err);
        }
        warn!("{}", err);
        self.diagnostics.push(Diagnostic::from(&err));
        Ok(())
    }

    fn check_sentinel(&mut self) -> Result<()> {
        let found = self.reader.read_u8()?;
        if found != STAMP_SENTINEL {
            self.report(Error::InvalidSentinel { found })?;
        }
        Ok(())
    }

    /// Moves past whatever the declared length covers beyond the decoded fields.
    fn finish_record(&mut self, start: u64, header: RecordHeader) -> Result<()> {
        let end = start + header.total_size();
        let position = self.reader.position()?;

        if position > end {
            self.report(Error::InvalidData(format!(
                "{:?} record at offset {} overruns its declared length {} by {} bytes",
                header.record_type(),
                start,
                header.length,
                position - end
            )))?;
        } else if position < end {
            trace!("Skipping {} trailing bytes of {:?} record", end - position, header.record_type());
            self.reader.seek_absolute(end)?;
        }
        Ok(())
    }

    fn parse_file_header(&mut self) -> Result<FileHeader> {
        let start = self.reader.position()?;
        let header = RecordHeader::expect(self.reader, RecordType::FileHeader)?;

        let file_header = FileHeader {
            options: self.reader.read_u16()?,
            main_index: self.reader.read_u16()?,
            largest_record: self.reader.read_u16()?,
            height: self.reader.read_u8()?,
            width: self.reader.read_u8()?,
            left_margin: self.reader.read_u8()?,
        };
        debug!("File header: {:?}", file_header);

        self.finish_record(start, header)?;
        Ok(file_header)
    }

    fn parse_compression(&mut self) -> Result<Compression> {
        let start = self.reader.position()?;
        let header = RecordHeader::expect(self.reader, RecordType::Compression)?;

        let type_byte = self.reader.read_u8()?;
        let compression = Compression {
            kind: CompressionKind::from(type_byte),
            table: self.reader.read_fixed::<14>()?,
        };
        if let CompressionKind::Unknown(value) = compression.kind {
            self.report(Error::UnsupportedCompression(value))?;
        }
        debug!("Compression table: {:02x?}", compression.table);

        self.finish_record(start, header)?;
        Ok(compression)
    }

    fn parse_contexts(&mut self) -> Result<Vec<ContextOffset>> {
        let start = self.reader.position()?;
        let header = RecordHeader::expect(self.reader, RecordType::Context)?;

        let count = self.reader.read_u16()?;
        let mut contexts = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            contexts.push(self.reader.read_i24()?);
        }
        debug!("Context table: {} entries", contexts.len());

        self.finish_record(start, header)?;
        Ok(contexts)
    }

    fn parse_index(&mut self) -> Result<Vec<IndexEntry>> {
        let start = self.reader.position()?;
        let header = RecordHeader::expect(self.reader, RecordType::Index)?;

        let count = self.reader.read_u16()?;
        let mut entries = Vec::with_capacity(usize::from(count));
        let mut decoder = IndexDecoder::default();

        for position in 0..count {
            match self.read_index_entry(&mut decoder, position) {
                Ok(entry) => entries.push(entry),
                Err(err @ Error::ShortRead { .. }) => {
                    // Keep what was decoded so far
                    self.report(err)?;
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        debug!("Index: {} of {} entries decoded", entries.len(), count);

        self.finish_record(start, header)?;
        Ok(entries)
    }

    fn read_index_entry(&mut self, decoder: &mut IndexDecoder, position: u16) -> Result<IndexEntry> {
        let length = self.reader.read_u8()?;
        let wanted = usize::from(length & 0x1f);

        let offset = self.reader.position()?;
        let fresh = self.reader.read_up_to(wanted)?;
        if fresh.len() != wanted {
            return Err(Error::ShortRead {
                offset,
                expected: wanted,
                got: fresh.len(),
            });
        }
        let context = self.reader.read_u16()?;

        let (entry, clamped) = decoder.decode(length, &fresh, context);
        if clamped {
            self.report(Error::InvalidData(format!(
                "index entry {} carries {} characters from a shorter label",
                position,
                length >> 5
            )))?;
        }
        Ok(entry)
    }

    fn skip_index_tags(&mut self, format: FormatVersion) -> Result<()> {
        let start = self.reader.position()?;
        match RecordHeader::read_opt(self.reader) {
            Ok(Some(header)) if header.record_type() == RecordType::IndexTags => {
                if !format.has_index_tags() {
                    debug!("IndexTags record in a {} file", format);
                }
                debug!("Skipping IndexTags record ({} bytes)", header.length);
                self.reader.seek_absolute(start + header.total_size())
            }
            Ok(_) => self.reader.seek_absolute(start),
            Err(err) => {
                self.report(err)?;
                self.reader.seek_absolute(start)
            }
        }
    }
}

/// Prefix-compressed index label decoder.
///
/// Each entry reuses up to seven leading bytes of the previous label, so
/// entries must be fed in file order.
#[derive(Debug, Default)]
pub struct IndexDecoder {
    previous: Vec<u8>,
}

impl IndexDecoder {
    /// Decodes one entry from its length byte (carry in the top 3 bits),
    /// its new raw bytes and its context id.
    ///
    /// The second value is true if the carry exceeded the previous label
    /// and had to be clamped.
    pub fn decode(&mut self, length: u8, fresh: &[u8], context: ContextId) -> (IndexEntry, bool) {
        let carry = usize::from(length >> 5);
        let kept = carry.min(self.previous.len());

        let mut raw = Vec::with_capacity(kept + fresh.len());
        raw.extend_from_slice(&self.previous[..kept]);
        raw.extend_from_slice(fresh);

        let entry = IndexEntry::new(codepage::decode(&raw), context);
        self.previous = raw;
        (entry, kept != carry)
    }
}
