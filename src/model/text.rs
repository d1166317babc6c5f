//! Decoded topic data: keyword links and text records.

use super::{ContextId, ContextOffset};
use crate::error::Diagnostic;
use serde::Serialize;

/// Payload of the Keyword record that follows a Text record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordRecord {
    /// Context of the previous topic
    pub up: ContextId,
    /// Context of the next topic
    pub down: ContextId,
    /// Link targets, in the order the keyword spans appear in the text
    pub contexts: Vec<ContextId>,
}

/// A decompressed Text record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecord {
    /// Absolute offset of the record header
    pub offset: u64,
    /// Control-coded byte stream
    pub stream: Vec<u8>,
    /// Adjacent keyword record, if it was requested and present
    pub keywords: Option<KeywordRecord>,
}

/// A rendered topic produced by the exporter.
#[derive(Debug, Clone, Serialize)]
pub struct Topic {
    /// Offset of the topic's Text record
    pub offset: ContextOffset,
    /// Contexts that resolve to this topic
    pub contexts: Vec<ContextId>,
    /// Rendered content
    pub content: String,
    /// Problems stepped over while decoding this topic
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}
