//! Nibble-coded text decompression and inline reflow.
//!
//! A Text record payload is read as a stream of 4-bit units, low nibble
//! first. Each unit is either an index into the 14-entry substitution table
//! or one of two escapes:
//!
//! - `0xF`: the next two nibbles `n1, n2` form the literal byte `(n2 << 4) | n1`
//! - `0xE`: the next nibble `n` sets the repeat count of the next symbol to `n + 1`
//!
//! The decoded stream keeps its control bytes; interpreting them is the
//! formatter's job.

use log::trace;

/// Line break.
pub const NEW_LINE: u8 = 0x00;
/// End of the topic; nothing after it is shown.
pub const DOCUMENT_END: u8 = 0x01;
/// Opens or closes a keyword (link) span.
pub const KEYWORD_TOGGLE: u8 = 0x02;
/// Opens or closes a source code span.
pub const SOURCE_TOGGLE: u8 = 0x05;

const RAW_ESCAPE: u8 = 0x0F;
const REPEAT_ESCAPE: u8 = 0x0E;

/// Returns true for bytes that occupy no screen column.
pub fn is_control(byte: u8) -> bool {
    matches!(byte, NEW_LINE | DOCUMENT_END | KEYWORD_TOGGLE | SOURCE_TOGGLE)
}

/// Iterator over the nibbles of a payload, low nibble first.
#[derive(Debug, Clone)]
pub struct NibbleStream<'a> {
    data: &'a [u8],
    index: usize,
}

impl<'a> NibbleStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, index: 0 }
    }

    /// Number of nibbles not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() * 2 - self.index
    }
}

impl Iterator for NibbleStream<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.index / 2)?;
        let nibble = if self.index % 2 == 0 {
            byte & 0x0f
        } else {
            byte >> 4
        };
        self.index += 1;
        Some(nibble)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

impl ExactSizeIterator for NibbleStream<'_> {}

/// Expands a Text record payload into its control-coded byte stream.
///
/// With `reflow` set, line breaks are rewritten as the bytes are produced
/// (see [`Reflow`]). Either way the output holds exactly one byte per
/// decoded symbol repetition.
pub fn decompress(payload: &[u8], table: &[u8; 14], mut reflow: Option<Reflow>) -> Vec<u8> {
    let mut nibbles = NibbleStream::new(payload);
    let mut output = Vec::with_capacity(payload.len() * 2);
    let mut repeat = 1;

    while let Some(nibble) = nibbles.next() {
        let byte = match nibble {
            RAW_ESCAPE => {
                let (Some(low), Some(high)) = (nibbles.next(), nibbles.next()) else {
                    trace!("Dropping truncated raw escape at end of stream");
                    break;
                };
                (high << 4) | low
            }
            REPEAT_ESCAPE => {
                let Some(count) = nibbles.next() else {
                    trace!("Dropping truncated repeat escape at end of stream");
                    break;
                };
                repeat = usize::from(count) + 1;
                continue;
            }
            index => table[usize::from(index)],
        };

        for _ in 0..repeat {
            match reflow.as_mut() {
                Some(reflow) => reflow.push(&mut output, byte),
                None => output.push(byte),
            }
        }
        repeat = 1;
    }

    if let Some(reflow) = reflow.as_mut() {
        reflow.finish(&mut output);
    }
    output
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    LineBreak,
    Space,
    Glyph,
}

/// Word-wrap state for one decompression call.
///
/// Columns are counted from the left margin, so a line may hold
/// `width - left_margin` printable bytes. A line whose first printable byte
/// is not a space arms the flow: a single line break inside such a line
/// joins it with the next one (emitted as a space), and two consecutive
/// breaks end the paragraph. Lines starting with a space are preformatted;
/// they keep their breaks and are never wrapped.
///
/// A space sitting left of the limit is a break candidate. When a glyph
/// pushes an armed line past the limit, the last candidate is rewritten
/// into a line break after the fact. Every rewrite replaces one byte with
/// one byte.
#[derive(Debug, Clone)]
pub struct Reflow {
    max_width: usize,
    column: usize,
    armed: bool,
    line_start: bool,
    last: Last,
    /// Spaces outside keyword spans on the current line: (position, column)
    spaces: Vec<(usize, usize)>,
    soft_break: Option<usize>,
    in_keyword: bool,
}

impl Reflow {
    /// Creates the state for lines of `max_width` printable columns.
    /// Returns `None` when no columns are available.
    pub fn new(max_width: usize) -> Option<Self> {
        if max_width == 0 {
            return None;
        }
        Some(Self {
            max_width,
            column: 0,
            armed: false,
            line_start: true,
            last: Last::LineBreak,
            spaces: Vec::new(),
            soft_break: None,
            in_keyword: false,
        })
    }

    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// Appends one decoded byte to `output`, rewriting it or earlier bytes as needed.
    pub fn push(&mut self, output: &mut Vec<u8>, byte: u8) {
        match byte {
            NEW_LINE => self.newline(output),
            KEYWORD_TOGGLE => {
                self.in_keyword = !self.in_keyword;
                output.push(byte);
            }
            DOCUMENT_END => {
                self.finish(output);
                output.push(byte);
            }
            SOURCE_TOGGLE => output.push(byte),
            b' ' => {
                self.line_start = false;
                self.space(output, false);
            }
            _ => self.glyph(output, byte),
        }
    }

    /// Ends the text: a soft break still pending becomes a line break again.
    pub fn finish(&mut self, output: &mut [u8]) {
        if let Some(position) = self.soft_break.take() {
            output[position] = NEW_LINE;
            self.end_line();
        }
    }

    fn newline(&mut self, output: &mut Vec<u8>) {
        if !self.armed || self.last != Last::Glyph {
            // Paragraph end: the pending joint becomes the paragraph's break
            if let Some(position) = self.soft_break.take() {
                output[position] = NEW_LINE;
            }
            output.push(NEW_LINE);
            self.end_line();
            return;
        }
        self.space(output, true);
    }

    fn space(&mut self, output: &mut Vec<u8>, soft: bool) {
        // Only a line with nowhere earlier to break wraps at the space itself
        if self.armed
            && !self.in_keyword
            && self.column >= self.max_width
            && self.last_candidate().is_none()
        {
            output.push(NEW_LINE);
            self.wrap();
            return;
        }

        output.push(b' ');
        let position = output.len() - 1;
        if !self.in_keyword {
            self.spaces.push((position, self.column));
        }
        self.column += 1;
        if soft {
            self.soft_break = Some(position);
        }
        self.last = Last::Space;
    }

    fn glyph(&mut self, output: &mut Vec<u8>, byte: u8) {
        if self.line_start {
            self.armed = true;
            self.line_start = false;
        }
        output.push(byte);
        self.column += 1;
        self.soft_break = None;
        self.last = Last::Glyph;

        if !self.armed {
            return;
        }
        while self.column > self.max_width {
            let Some(index) = self.last_candidate() else {
                break;
            };
            let (position, column) = self.spaces[index];
            output[position] = NEW_LINE;

            let shift = column + 1;
            self.column -= shift;
            self.spaces.drain(..=index);
            for (_, column) in &mut self.spaces {
                *column -= shift;
            }
        }
    }

    /// Index of the last space that was decoded before the line reached the limit.
    fn last_candidate(&self) -> Option<usize> {
        self.spaces
            .iter()
            .rposition(|&(_, column)| column < self.max_width)
    }

    /// Starts a new line inside the same paragraph.
    fn wrap(&mut self) {
        self.column = 0;
        self.spaces.clear();
        self.soft_break = None;
        self.last = Last::LineBreak;
    }

    /// Starts a new paragraph.
    fn end_line(&mut self) {
        self.wrap();
        self.armed = false;
        self.line_start = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bhf::fixture::{encode_nibbles, DEFAULT_TABLE};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TABLE_A: [u8; 14] = [
        0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4A, 0x4B, 0x4C, 0x4D, 0x4E,
    ];

    fn expand(stream: &[u8], reflow: Option<Reflow>) -> Vec<u8> {
        decompress(&encode_nibbles(stream, &DEFAULT_TABLE), &DEFAULT_TABLE, reflow)
    }

    fn lines(output: &[u8]) -> Vec<String> {
        output
            .split(|&b| b == NEW_LINE)
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect()
    }

    #[test]
    fn test_nibble_order_is_low_first() {
        let nibbles: Vec<_> = NibbleStream::new(&[0x21, 0x43]).collect();
        assert_eq!(nibbles, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_table_lookup() {
        // Nibble 0 then a dangling repeat escape
        assert_eq!(decompress(&[0xE0], &TABLE_A, None), b"A");
    }

    #[test]
    fn test_repeat_escape() {
        // E, 2, 0, then a dangling repeat escape
        assert_eq!(decompress(&[0x2E, 0xE0], &TABLE_A, None), b"AAA");
    }

    #[test]
    fn test_repeat_applies_to_next_symbol_only() {
        // E, 1, 0, 1
        assert_eq!(decompress(&[0x1E, 0x10], &TABLE_A, None), b"AAB");
    }

    #[test]
    fn test_raw_escape() {
        // F, 1, 7 -> 0x71, then table[2]
        assert_eq!(decompress(&[0x1F, 0x27], &TABLE_A, None), b"qC");
    }

    #[test]
    fn test_truncated_escapes_are_dropped() {
        assert_eq!(decompress(&[0xF0], &TABLE_A, None), b"A");
        assert_eq!(decompress(&[0x1F], &TABLE_A, None), b"");
        assert!(decompress(&[], &TABLE_A, None).is_empty());
    }

    #[test]
    fn test_control_bytes_survive() {
        let stream = b"See \x02Topic\x02\x00\x05code\x05\x01";
        assert_eq!(expand(stream, None), stream.to_vec());
    }

    /// Sums the repeat counts of every complete symbol in `payload`.
    fn repeat_total(payload: &[u8]) -> usize {
        let mut nibbles = NibbleStream::new(payload);
        let mut total = 0;
        let mut repeat = 1;
        while let Some(nibble) = nibbles.next() {
            match nibble {
                RAW_ESCAPE => {
                    if nibbles.next().is_none() || nibbles.next().is_none() {
                        break;
                    }
                }
                REPEAT_ESCAPE => match nibbles.next() {
                    Some(count) => {
                        repeat = usize::from(count) + 1;
                        continue;
                    }
                    None => break,
                },
                _ => {}
            }
            total += repeat;
            repeat = 1;
        }
        total
    }

    #[test]
    fn test_decompress_is_deterministic_and_reflow_preserves_length() {
        let mut rng = StdRng::seed_from_u64(0x1a);
        for _ in 0..200 {
            let len = rng.gen_range(0..64);
            let payload: Vec<u8> = (0..len).map(|_| rng.gen()).collect();

            let plain = decompress(&payload, &DEFAULT_TABLE, None);
            assert_eq!(plain, decompress(&payload, &DEFAULT_TABLE, None));
            assert_eq!(plain.len(), repeat_total(&payload));

            let reflowed = decompress(&payload, &DEFAULT_TABLE, Reflow::new(18));
            assert_eq!(plain.len(), reflowed.len());
        }
    }

    #[test]
    fn test_zero_width_disables_reflow() {
        assert!(Reflow::new(0).is_none());
        assert_eq!(Reflow::new(76).map(|r| r.max_width()), Some(76));
    }

    #[test]
    fn test_soft_break_joins_lines() {
        let out = expand(b"one\x00two", Reflow::new(40));
        assert_eq!(out, b"one two");
    }

    #[test]
    fn test_double_break_ends_paragraph() {
        let out = expand(b"one\x00\x00two", Reflow::new(40));
        assert_eq!(out, b"one\x00\x00two");
    }

    #[test]
    fn test_indented_lines_keep_breaks() {
        let out = expand(b"  a\x00  b\x00", Reflow::new(40));
        assert_eq!(out, b"  a\x00  b\x00");
    }

    #[test]
    fn test_long_line_wraps_at_last_space() {
        let out = expand(b"aaaa bbbb cccc", Reflow::new(10));
        assert_eq!(lines(&out), vec!["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn test_space_at_limit_is_not_a_break_point() {
        let out = expand(b"abcd efgh ij\x00", Reflow::new(9));
        assert_eq!(out, b"abcd\x00efgh ij\x00".to_vec());
    }

    #[test]
    fn test_space_at_limit_wraps_without_earlier_space() {
        let out = expand(b"abcdefghi jk", Reflow::new(9));
        assert_eq!(lines(&out), vec!["abcdefghi", "jk"]);
    }

    #[test]
    fn test_indented_line_is_never_wrapped() {
        let stream = b"  procedure Foo(a, b: Integer);\x00  begin\x00";
        assert_eq!(expand(stream, Reflow::new(20)), stream.to_vec());
    }

    #[test]
    fn test_trailing_soft_break_stays_a_line_break() {
        assert_eq!(expand(b"last line\x00", Reflow::new(40)), b"last line\x00".to_vec());
        assert_eq!(
            expand(b"last line\x00\x01", Reflow::new(40)),
            b"last line\x00\x01".to_vec()
        );
    }

    #[test]
    fn test_long_token_is_not_split() {
        let out = expand(b"abcdefghijkl mn", Reflow::new(6));
        assert_eq!(lines(&out), vec!["abcdefghijkl", "mn"]);
    }

    #[test]
    fn test_keyword_spaces_are_not_break_points() {
        let out = expand(b"ab \x02cd ef\x02", Reflow::new(6));
        assert_eq!(out, b"ab\x00\x02cd ef\x02".to_vec());
    }

    #[test]
    fn test_wrapped_lines_fit() {
        let mut rng = StdRng::seed_from_u64(7);
        let max = 24;
        for _ in 0..50 {
            let mut stream = Vec::new();
            for _ in 0..rng.gen_range(1..40) {
                let word_len = rng.gen_range(1..12);
                stream.extend((0..word_len).map(|_| rng.gen_range(b'a'..=b'z')));
                stream.push(if rng.gen_ratio(1, 8) { NEW_LINE } else { b' ' });
            }

            let out = expand(&stream, Reflow::new(max));
            for line in lines(&out) {
                assert!(
                    line.len() <= max || !line.contains(' '),
                    "line {:?} exceeds {} columns",
                    line,
                    max
                );
            }
        }
    }
}
