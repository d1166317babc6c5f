//! # unbhf
//!
//! A Rust library for decoding Borland-style hypertext help files (BHF):
//! the `.TPH` / `.HLP` files shipped with Turbo Pascal, Turbo C++ and
//! Borland Pascal.
//!
//! ## Supported Formats
//!
//! - **Turbo Pascal 2.0 / 4.0 / 6.0**
//! - **Turbo C++ 3.0** (shares the 4.0 layout)
//! - **Borland Pascal 7.0** (the extra IndexTags record is skipped)
//!
//! ## Quick Start
//!
//! ```no_run
//! use unbhf::TextFormat;
//!
//! fn main() -> unbhf::Result<()> {
//!     // Parse the catalog
//!     let mut file = unbhf::open("TURBO.TPH")?;
//!
//!     // Render the topic the first index entry points to
//!     if let Some(offset) = file.index().first().and_then(|e| file.document().resolve(e)) {
//!         println!("{}", file.render_text(offset, TextFormat::PlainText)?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `async`: Async I/O support with Tokio

pub mod bhf;
pub mod codepage;
pub mod error;
pub mod export;
pub mod model;
pub mod parse_options;
pub mod render;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use bhf::{BhfFile, RecordInfo, RecordType};
pub use error::{Diagnostic, Error, Result};
pub use model::{ContextId, ContextOffset, Document, IndexEntry, Topic};
pub use parse_options::{ErrorMode, ParseOptions};
pub use render::{RenderOptions, TextFormat};

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

/// Opens a help file and parses its catalog.
///
/// # Example
///
/// ```no_run
/// let file = unbhf::open("TURBO.TPH")?;
/// println!("{} contexts", file.contexts().len());
/// # Ok::<(), unbhf::Error>(())
/// ```
pub fn open(path: impl AsRef<Path>) -> Result<BhfFile<BufReader<File>>> {
    BhfFile::open(path)
}

/// Parses a help file held in memory.
pub fn open_bytes(data: &[u8]) -> Result<BhfFile<Cursor<&[u8]>>> {
    BhfFile::from_reader(Cursor::new(data))
}

/// Renders one context of a help file as plain text.
///
/// # Example
///
/// ```no_run
/// let text = unbhf::extract_text("TURBO.TPH", 0)?;
/// println!("{}", text);
/// # Ok::<(), unbhf::Error>(())
/// ```
pub fn extract_text(path: impl AsRef<Path>, id: ContextId) -> Result<String> {
    open(path)?.render_context(id, TextFormat::PlainText)
}

/// Renders one context of a help file as HTML.
///
/// # Example
///
/// ```no_run
/// let html = unbhf::to_html("TURBO.TPH", 0)?;
/// std::fs::write("topic.html", html)?;
/// # Ok::<(), unbhf::Error>(())
/// ```
pub fn to_html(path: impl AsRef<Path>, id: ContextId) -> Result<String> {
    open(path)?.render_context(id, TextFormat::Html)
}

/// Builder for opening and rendering help files.
///
/// Provides a fluent API for configuring parsing and rendering.
///
/// # Example
///
/// ```no_run
/// use unbhf::Unbhf;
///
/// let html = Unbhf::new()
///     .html()
///     .with_link_prefix("topic.html#")
///     .open("TURBO.TPH")?
///     .render_main_index()?;
/// # Ok::<(), unbhf::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Unbhf {
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl Unbhf {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails on any format problem instead of recording a diagnostic.
    pub fn strict(mut self) -> Self {
        self.parse_options = self.parse_options.strict();
        self
    }

    /// Renders HTML instead of plain text.
    pub fn html(mut self) -> Self {
        self.render_options = self.render_options.with_format(TextFormat::Html);
        self
    }

    /// Sets the output format.
    pub fn with_format(mut self, format: TextFormat) -> Self {
        self.render_options = self.render_options.with_format(format);
        self
    }

    /// Keeps stored line breaks instead of re-wrapping paragraphs.
    pub fn without_reflow(mut self) -> Self {
        self.render_options = self.render_options.without_reflow();
        self
    }

    /// Sets the HTML link target prefix.
    pub fn with_link_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.render_options = self.render_options.with_link_prefix(prefix);
        self
    }

    /// Returns the configured render options.
    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    /// Opens a help file from a path.
    pub fn open(self, path: impl AsRef<Path>) -> Result<HelpFile<BufReader<File>>> {
        let file = BhfFile::open_with_options(path, self.parse_options)?;
        Ok(HelpFile {
            file,
            render_options: self.render_options,
        })
    }

    /// Parses a help file held in memory.
    pub fn open_bytes(self, data: &[u8]) -> Result<HelpFile<Cursor<&[u8]>>> {
        let file = BhfFile::from_reader_with_options(Cursor::new(data), self.parse_options)?;
        Ok(HelpFile {
            file,
            render_options: self.render_options,
        })
    }
}

/// An open help file bound to a set of render options.
pub struct HelpFile<R> {
    file: BhfFile<R>,
    render_options: RenderOptions,
}

impl<R: std::io::Read + std::io::Seek> HelpFile<R> {
    /// Returns the underlying handle.
    pub fn file(&mut self) -> &mut BhfFile<R> {
        &mut self.file
    }

    /// Returns the catalog.
    pub fn document(&self) -> &Document {
        self.file.document()
    }

    /// Renders the topic a context id points to.
    pub fn render(&mut self, id: ContextId) -> Result<String> {
        self.file.render_context_with_options(id, &self.render_options)
    }

    /// Renders the topic an index label points to, ignoring ASCII case.
    pub fn render_label(&mut self, label: &str) -> Result<Option<String>> {
        let Some(id) = self.file.document().find_index(label).map(|e| e.context) else {
            return Ok(None);
        };
        self.render(id).map(Some)
    }

    /// Renders the main index topic named by the file header.
    pub fn render_main_index(&mut self) -> Result<String> {
        let id = self.file.file_header().main_index;
        self.render(id)
    }

    /// Consumes self and returns the underlying handle.
    pub fn into_inner(self) -> BhfFile<R> {
        self.file
    }
}
