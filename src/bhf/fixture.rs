//! Synthetic help file images for tests.

use super::record::RecordType;

/// Default substitution table: frequent bytes of English help text.
pub const DEFAULT_TABLE: [u8; 14] = [
    b' ', b'e', b't', b'a', b'o', b'i', b'n', b's', b'r', 0x00, b'h', b'l', 0x02, b'c',
];

enum Part {
    Topic { stream: Vec<u8>, keywords: Vec<u16> },
    Raw { type_id: u8, payload: Vec<u8> },
}

/// Assembles a help file byte image.
pub struct HelpFileBuilder {
    stamp: Vec<u8>,
    sentinel: u8,
    signature: Vec<u8>,
    format: u8,
    text_version: u8,
    width: u8,
    left_margin: u8,
    main_index: u16,
    file_header_padding: usize,
    compression_kind: u8,
    table: [u8; 14],
    contexts: Option<Vec<i32>>,
    index: Vec<(u8, Vec<u8>, u16)>,
    index_tags: Option<Vec<u8>>,
    swap_compression_and_contexts: bool,
    parts: Vec<Part>,
}

impl Default for HelpFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpFileBuilder {
    pub fn new() -> Self {
        Self {
            stamp: b"TURBO PASCAL HelpFile.".to_vec(),
            sentinel: 0x1A,
            signature: b"FBHF".to_vec(),
            format: 0x33,
            text_version: 0x01,
            width: 78,
            left_margin: 2,
            main_index: 0,
            file_header_padding: 0,
            compression_kind: 2,
            table: DEFAULT_TABLE,
            contexts: None,
            index: Vec::new(),
            index_tags: None,
            swap_compression_and_contexts: false,
            parts: Vec::new(),
        }
    }

    pub fn sentinel(mut self, sentinel: u8) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub fn format(mut self, format: u8) -> Self {
        self.format = format;
        self
    }

    pub fn screen(mut self, width: u8, left_margin: u8) -> Self {
        self.width = width;
        self.left_margin = left_margin;
        self
    }

    pub fn main_index(mut self, context: u16) -> Self {
        self.main_index = context;
        self
    }

    pub fn file_header_padding(mut self, padding: usize) -> Self {
        self.file_header_padding = padding;
        self
    }

    pub fn compression_kind(mut self, kind: u8) -> Self {
        self.compression_kind = kind;
        self
    }

    pub fn table(mut self, table: [u8; 14]) -> Self {
        self.table = table;
        self
    }

    /// Sets an explicit context table. Without one, context `i` points at topic `i`.
    pub fn contexts(mut self, contexts: &[i32]) -> Self {
        self.contexts = Some(contexts.to_vec());
        self
    }

    pub fn index_entry(mut self, carry: u8, fresh: &[u8], context: u16) -> Self {
        self.index.push((carry, fresh.to_vec(), context));
        self
    }

    pub fn index_tags(mut self, payload: &[u8]) -> Self {
        self.index_tags = Some(payload.to_vec());
        self
    }

    pub fn swap_compression_and_contexts(mut self) -> Self {
        self.swap_compression_and_contexts = true;
        self
    }

    /// Appends a Text record holding `stream` followed by its Keyword record.
    pub fn topic(mut self, stream: &[u8], keywords: &[u16]) -> Self {
        self.parts.push(Part::Topic {
            stream: stream.to_vec(),
            keywords: keywords.to_vec(),
        });
        self
    }

    /// Appends an arbitrary record.
    pub fn raw_record(mut self, record_type: RecordType, payload: &[u8]) -> Self {
        self.parts.push(Part::Raw {
            type_id: record_type as u8,
            payload: payload.to_vec(),
        });
        self
    }

    /// Builds the catalog only.
    pub fn build_catalog(&self) -> Vec<u8> {
        let contexts = self.contexts.clone().unwrap_or_default();
        self.catalog(&contexts)
    }

    /// Builds the complete file.
    pub fn build(&self) -> Vec<u8> {
        let topic_count = self
            .parts
            .iter()
            .filter(|p| matches!(p, Part::Topic { .. }))
            .count();

        // Context entries are fixed size, so the catalog length is known up front
        let placeholder = vec![0; topic_count];
        let catalog_len = match &self.contexts {
            Some(contexts) => self.catalog(contexts).len(),
            None => self.catalog(&placeholder).len(),
        };

        let mut body = Vec::new();
        let mut topic_offsets = Vec::new();
        for part in &self.parts {
            match part {
                Part::Topic { stream, keywords } => {
                    topic_offsets.push((catalog_len + body.len()) as i32);
                    push_record(&mut body, RecordType::Text as u8, &encode_nibbles(stream, &self.table));
                    push_record(&mut body, RecordType::Keyword as u8, &keyword_payload(keywords));
                }
                Part::Raw { type_id, payload } => push_record(&mut body, *type_id, payload),
            }
        }

        let contexts = self.contexts.clone().unwrap_or(topic_offsets);
        let mut data = self.catalog(&contexts);
        data.extend_from_slice(&body);
        data
    }

    fn catalog(&self, contexts: &[i32]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&self.stamp);
        data.push(0);
        data.push(self.sentinel);
        data.extend_from_slice(&self.signature);
        data.push(0);
        data.push(self.format);
        data.push(self.text_version);

        let mut file_header = Vec::new();
        file_header.extend_from_slice(&0u16.to_le_bytes());
        file_header.extend_from_slice(&self.main_index.to_le_bytes());
        file_header.extend_from_slice(&512u16.to_le_bytes());
        file_header.push(25);
        file_header.push(self.width);
        file_header.push(self.left_margin);
        file_header.extend(std::iter::repeat(0xAA).take(self.file_header_padding));
        push_record(&mut data, RecordType::FileHeader as u8, &file_header);

        let mut compression = vec![self.compression_kind];
        compression.extend_from_slice(&self.table);

        let mut context_payload = (contexts.len() as u16).to_le_bytes().to_vec();
        for offset in contexts {
            context_payload.extend_from_slice(&offset.to_le_bytes()[..3]);
        }

        if self.swap_compression_and_contexts {
            push_record(&mut data, RecordType::Context as u8, &context_payload);
            push_record(&mut data, RecordType::Compression as u8, &compression);
        } else {
            push_record(&mut data, RecordType::Compression as u8, &compression);
            push_record(&mut data, RecordType::Context as u8, &context_payload);
        }

        let mut index = (self.index.len() as u16).to_le_bytes().to_vec();
        for (carry, fresh, context) in &self.index {
            index.push((carry << 5) | fresh.len() as u8);
            index.extend_from_slice(fresh);
            index.extend_from_slice(&context.to_le_bytes());
        }
        push_record(&mut data, RecordType::Index as u8, &index);

        if let Some(tags) = &self.index_tags {
            push_record(&mut data, RecordType::IndexTags as u8, tags);
        }

        data
    }
}

fn push_record(data: &mut Vec<u8>, type_id: u8, payload: &[u8]) {
    data.push(type_id);
    data.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    data.extend_from_slice(payload);
}

fn keyword_payload(keywords: &[u16]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&0u16.to_le_bytes());
    payload.extend_from_slice(&0u16.to_le_bytes());
    payload.extend_from_slice(&(keywords.len() as u16).to_le_bytes());
    for id in keywords {
        payload.extend_from_slice(&id.to_le_bytes());
    }
    payload
}

/// Nibble-encodes a control-coded stream against `table`.
///
/// Runs of three or more identical bytes use the repeat escape. An odd
/// nibble count is padded with a dangling repeat escape, which decodes to
/// nothing.
pub fn encode_nibbles(stream: &[u8], table: &[u8; 14]) -> Vec<u8> {
    let mut nibbles = Vec::new();
    let mut i = 0;
    while i < stream.len() {
        let byte = stream[i];
        let run = stream[i..].iter().take(16).take_while(|&&b| b == byte).count();
        let count = if run >= 3 { run } else { 1 };
        if count > 1 {
            nibbles.push(0xE);
            nibbles.push((count - 1) as u8);
        }
        match table.iter().position(|&t| t == byte) {
            Some(index) => nibbles.push(index as u8),
            None => {
                nibbles.push(0xF);
                nibbles.push(byte & 0x0f);
                nibbles.push(byte >> 4);
            }
        }
        i += count;
    }
    if nibbles.len() % 2 == 1 {
        nibbles.push(0xE);
    }
    nibbles
        .chunks(2)
        .map(|pair| pair[0] | (pair[1] << 4))
        .collect()
}
