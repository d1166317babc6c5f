//! Help file decoder.
//!
//! This module handles the binary record layout: the catalog parsed at open
//! time and the Text and Keyword records decoded on demand.

mod header;
mod keyword;
pub mod nibble;
mod reader;
mod record;

#[cfg(test)]
pub(crate) mod fixture;

pub use header::{HeaderParser, IndexDecoder, STAMP_SENTINEL};
pub use keyword::{parse_keyword_payload, read_keyword_record, KeywordRead};
pub use nibble::{decompress, NibbleStream, Reflow};
pub use reader::RecordReader;
pub use record::{RecordHeader, RecordInfo, RecordType, RecordWalker};

use crate::error::{Diagnostic, Error, Result};
use crate::model::{
    Compression, ContextId, ContextOffset, Document, FileHeader, IndexEntry, TextRecord, Version,
};
use crate::parse_options::ParseOptions;
use crate::render::{self, RenderOptions, TextFormat};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// An open help file: one cursor, the parsed catalog and the diagnostics
/// recorded so far.
///
/// Topics are decoded on every request; nothing is cached. All decoding
/// methods take `&mut self` because they move the shared cursor.
pub struct BhfFile<R> {
    reader: RecordReader<R>,
    document: Document,
    options: ParseOptions,
    diagnostics: Vec<Diagnostic>,
}

impl BhfFile<BufReader<File>> {
    /// Opens a help file from a path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Opens a help file from a path with custom options.
    pub fn open_with_options(path: impl AsRef<Path>, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening {}", path.display());
        let file = File::open(path)?;
        Self::from_reader_with_options(BufReader::new(file), options)
    }
}

impl<R: Read + Seek> BhfFile<R> {
    /// Parses the catalog from a reader.
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parses the catalog from a reader with custom options.
    pub fn from_reader_with_options(reader: R, options: ParseOptions) -> Result<Self> {
        let mut reader = RecordReader::new(reader);
        let (document, diagnostics) = HeaderParser::new(&mut reader, &options).parse()?;
        Ok(Self {
            reader,
            document,
            options,
            diagnostics,
        })
    }

    /// Wraps a reader whose catalog was already parsed elsewhere.
    ///
    /// The reader must hold the same bytes the document was parsed from.
    pub fn with_document(reader: R, document: Document, options: ParseOptions) -> Self {
        Self {
            reader: RecordReader::new(reader),
            document,
            options,
            diagnostics: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Consumes the handle, returning the catalog.
    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn stamp(&self) -> &str {
        &self.document.stamp
    }

    pub fn signature(&self) -> &[u8] {
        &self.document.signature
    }

    pub fn version(&self) -> &Version {
        &self.document.version
    }

    pub fn file_header(&self) -> &FileHeader {
        &self.document.file_header
    }

    pub fn compression(&self) -> &Compression {
        &self.document.compression
    }

    /// Context table; the position of an offset is its context id.
    pub fn contexts(&self) -> &[ContextOffset] {
        &self.document.contexts
    }

    /// Index entries in file order.
    pub fn index(&self) -> &[IndexEntry] {
        &self.document.index
    }

    /// Most recently recorded problem.
    pub fn last_error(&self) -> Option<&Diagnostic> {
        self.diagnostics.last()
    }

    /// Every problem recorded since the file was opened.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Walks every record after the version field.
    pub fn records(&mut self) -> RecordWalker<'_, R> {
        RecordWalker::new(&mut self.reader, self.document.records_offset)
    }

    /// Decompresses the Text record at `offset`, without reflow.
    ///
    /// With `with_keywords` set, the Keyword record that follows is read too.
    pub fn decode_text(&mut self, offset: ContextOffset, with_keywords: bool) -> Result<TextRecord> {
        let result = self.decode(offset, with_keywords, false);
        self.record_failure(result)
    }

    /// Renders the topic whose Text record starts at `offset`.
    pub fn render_text(&mut self, offset: ContextOffset, format: TextFormat) -> Result<String> {
        self.render_text_with_options(offset, &RenderOptions::from(format))
    }

    /// Renders the topic whose Text record starts at `offset` with custom options.
    pub fn render_text_with_options(
        &mut self,
        offset: ContextOffset,
        options: &RenderOptions,
    ) -> Result<String> {
        let with_keywords = options.format == TextFormat::Html;
        let result = self.decode(offset, with_keywords, options.reflow).map(|text| {
            let keywords = text
                .keywords
                .as_ref()
                .map(|k| k.contexts.as_slice())
                .unwrap_or_default();
            render::render_stream(&text.stream, keywords, options)
        });
        self.record_failure(result)
    }

    /// Renders the topic a context id points to.
    pub fn render_context(&mut self, id: ContextId, format: TextFormat) -> Result<String> {
        self.render_context_with_options(id, &RenderOptions::from(format))
    }

    /// Renders the topic a context id points to with custom options.
    pub fn render_context_with_options(
        &mut self,
        id: ContextId,
        options: &RenderOptions,
    ) -> Result<String> {
        match self.document.context_offset(id) {
            Some(offset) => self.render_text_with_options(offset, options),
            None => self.record_failure(Err(Error::UnknownContext(id))),
        }
    }

    fn decode(&mut self, offset: ContextOffset, with_keywords: bool, reflow: bool) -> Result<TextRecord> {
        let start = u64::try_from(offset).map_err(|_| Error::InvalidContextOffset(offset))?;
        self.reader.seek_absolute(start)?;

        let header = RecordHeader::read(&mut self.reader)?;
        if header.record_type() != RecordType::Text {
            return Err(Error::NotTextRecord {
                offset: start,
                found: header.type_id,
            });
        }

        let expected = usize::from(header.length);
        let payload = self.reader.read_up_to(expected)?;
        if payload.len() < expected {
            self.report(Error::ShortRead {
                offset: start + RecordHeader::SIZE,
                expected,
                got: payload.len(),
            })?;
        }

        let reflow = if reflow {
            Reflow::new(self.document.file_header.max_width())
        } else {
            None
        };
        let stream = decompress(&payload, &self.document.compression.table, reflow);
        debug!(
            "Decoded text record at {}: {} payload bytes, {} stream bytes",
            start,
            payload.len(),
            stream.len()
        );

        let keywords = if with_keywords {
            match read_keyword_record(&mut self.reader)? {
                Some(read) => {
                    if let Some(problem) = read.problem {
                        self.report(problem)?;
                    }
                    Some(read.record)
                }
                None => None,
            }
        } else {
            None
        };

        Ok(TextRecord {
            offset: start,
            stream,
            keywords,
        })
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

    /// Records a failed call so that `last_error` reflects it.
    fn record_failure<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            warn!("{}", err);
            self.diagnostics.push(Diagnostic::from(err));
        }
        result
    }
}
