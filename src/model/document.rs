//! Document catalog built when a help file is opened.

use super::{Compression, FileHeader, Version};
use crate::codepage;
use crate::error::Result;
use serde::Serialize;

/// Byte offset of a Text record, addressed by context id.
pub type ContextOffset = i32;

/// Identifier of a context: its position in the context table.
pub type ContextId = u16;

/// The catalog of a help file.
///
/// Everything here is decoded once at open time. Topic text is not part of
/// the catalog and is decoded on demand through [`crate::BhfFile`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    /// Identification stamp at the start of the file
    pub stamp: String,
    /// Raw signature bytes
    pub signature: Vec<u8>,
    /// Format version
    pub version: Version,
    /// File header record
    pub file_header: FileHeader,
    /// Text compression table
    pub compression: Compression,
    /// Context table; position is the context id
    pub contexts: Vec<ContextOffset>,
    /// Index entries in file order
    pub index: Vec<IndexEntry>,
    /// Absolute offset of the first record header
    pub records_offset: u64,
}

impl Document {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the signature translated through the code page.
    pub fn signature_text(&self) -> String {
        codepage::decode(&self.signature)
    }

    /// Returns the offset a context id points to.
    pub fn context_offset(&self, id: ContextId) -> Option<ContextOffset> {
        self.contexts.get(usize::from(id)).copied()
    }

    /// Resolves an index entry to the offset of its topic.
    pub fn resolve(&self, entry: &IndexEntry) -> Option<ContextOffset> {
        self.context_offset(entry.context)
    }

    /// Returns the offset of the main index topic.
    pub fn main_index_offset(&self) -> Option<ContextOffset> {
        self.context_offset(self.file_header.main_index)
    }

    /// Finds an index entry by label, ignoring ASCII case.
    pub fn find_index(&self, label: &str) -> Option<&IndexEntry> {
        self.index
            .iter()
            .find(|entry| entry.label.eq_ignore_ascii_case(label))
    }

    /// Returns the index entries whose label starts with `prefix`, ignoring ASCII case.
    pub fn search_index<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a IndexEntry> + 'a {
        self.index.iter().filter(move |entry| {
            entry
                .label
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
    }

    /// Returns every context id that points at `offset`.
    pub fn contexts_at(&self, offset: ContextOffset) -> Vec<ContextId> {
        self.contexts
            .iter()
            .enumerate()
            .filter(|(_, &o)| o == offset)
            .filter_map(|(id, _)| ContextId::try_from(id).ok())
            .collect()
    }

    /// Returns the distinct, addressable topic offsets in ascending order.
    pub fn topic_offsets(&self) -> Vec<ContextOffset> {
        let mut offsets: Vec<_> = self.contexts.iter().copied().filter(|&o| o >= 0).collect();
        offsets.sort_unstable();
        offsets.dedup();
        offsets
    }

    /// Returns the catalog as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One entry of the keyword index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    /// Decoded label
    pub label: String,
    /// Context id the label jumps to
    pub context: ContextId,
}

impl IndexEntry {
    pub fn new(label: impl Into<String>, context: ContextId) -> Self {
        Self {
            label: label.into(),
            context,
        }
    }
}
