//! Plain text renderer.

use crate::bhf::nibble::{DOCUMENT_END, KEYWORD_TOGGLE, NEW_LINE, SOURCE_TOGGLE};
use crate::codepage;

/// Renders a control-coded stream as plain text.
#[derive(Debug, Default)]
pub struct PlainTextRenderer;

impl PlainTextRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Renders `stream`, stopping at the first document end marker.
    pub fn render(&self, stream: &[u8]) -> String {
        let mut output = String::with_capacity(stream.len());
        for &byte in stream {
            match byte {
                NEW_LINE => output.push('\n'),
                DOCUMENT_END => break,
                KEYWORD_TOGGLE | SOURCE_TOGGLE => {}
                _ => output.push(codepage::translate(byte)),
            }
        }
        output
    }
}
