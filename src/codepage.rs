//! Code page 437 translation.
//!
//! Help files store text in the IBM PC 8-bit code page. Every byte value maps
//! to exactly one character: `0x00` is the line break, printable ASCII maps
//! to itself, and the remaining positions are the familiar smileys, box
//! drawing, accented Latin and Greek glyphs.

use std::borrow::Cow;

/// Full 256-entry mapping, indexed by byte value.
const CP437: [char; 256] = [
    // 0x00
    '\n', '\u{263a}', '\u{263b}', '\u{2665}', '\u{2666}', '\u{2663}', '\u{2660}', '\u{2022}',
    '\u{25d8}', '\u{25cb}', '\u{25d9}', '\u{2642}', '\u{2640}', '\u{266a}', '\u{266b}', '\u{263c}',
    // 0x10
    '\u{25ba}', '\u{25c4}', '\u{2195}', '\u{203c}', '\u{00b6}', '\u{00a7}', '\u{25ac}', '\u{21a8}',
    '\u{2191}', '\u{2193}', '\u{2192}', '\u{2190}', '\u{221f}', '\u{2194}', '\u{25b2}', '\u{25bc}',
    // 0x20
    ' ', '!', '"', '#', '$', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/',
    // 0x30
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?',
    // 0x40
    '@', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O',
    // 0x50
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '[', '\\', ']', '^', '_',
    // 0x60
    '`', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    // 0x70
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '{', '|', '}', '~', '\u{2302}',
    // 0x80
    '\u{00c7}', '\u{00fc}', '\u{00e9}', '\u{00e2}', '\u{00e4}', '\u{00e0}', '\u{00e5}', '\u{00e7}',
    '\u{00ea}', '\u{00eb}', '\u{00e8}', '\u{00ef}', '\u{00ee}', '\u{00ec}', '\u{00c4}', '\u{00c5}',
    // 0x90
    '\u{00c9}', '\u{00e6}', '\u{00c6}', '\u{00f4}', '\u{00f6}', '\u{00f2}', '\u{00fb}', '\u{00f9}',
    '\u{00ff}', '\u{00d6}', '\u{00dc}', '\u{00a2}', '\u{00a3}', '\u{00a5}', '\u{20a7}', '\u{0192}',
    // 0xa0
    '\u{00e1}', '\u{00ed}', '\u{00f3}', '\u{00fa}', '\u{00f1}', '\u{00d1}', '\u{00aa}', '\u{00ba}',
    '\u{00bf}', '\u{2310}', '\u{00ac}', '\u{00bd}', '\u{00bc}', '\u{00a1}', '\u{00ab}', '\u{00bb}',
    // 0xb0
    '\u{2591}', '\u{2592}', '\u{2593}', '\u{2502}', '\u{2524}', '\u{2561}', '\u{2562}', '\u{2556}',
    '\u{2555}', '\u{2563}', '\u{2551}', '\u{2557}', '\u{255d}', '\u{255c}', '\u{255b}', '\u{2510}',
    // 0xc0
    '\u{2514}', '\u{2534}', '\u{252c}', '\u{251c}', '\u{2500}', '\u{253c}', '\u{255e}', '\u{255f}',
    '\u{255a}', '\u{2554}', '\u{2569}', '\u{2566}', '\u{2560}', '\u{2550}', '\u{256c}', '\u{2567}',
    // 0xd0
    '\u{2568}', '\u{2564}', '\u{2565}', '\u{2559}', '\u{2558}', '\u{2552}', '\u{2553}', '\u{256b}',
    '\u{256a}', '\u{2518}', '\u{250c}', '\u{2588}', '\u{2584}', '\u{258c}', '\u{2590}', '\u{2580}',
    // 0xe0
    '\u{03b1}', '\u{00df}', '\u{0393}', '\u{03c0}', '\u{03a3}', '\u{03c3}', '\u{00b5}', '\u{03c4}',
    '\u{03a6}', '\u{0398}', '\u{03a9}', '\u{03b4}', '\u{221e}', '\u{03c6}', '\u{03b5}', '\u{2229}',
    // 0xf0
    '\u{2261}', '\u{00b1}', '\u{2265}', '\u{2264}', '\u{2320}', '\u{2321}', '\u{00f7}', '\u{2248}',
    '\u{00b0}', '\u{2219}', '\u{00b7}', '\u{221a}', '\u{207f}', '\u{00b2}', '\u{25a0}', '\u{00a0}',
];

/// Translates a single code page byte.
#[inline]
pub fn translate(byte: u8) -> char {
    CP437[byte as usize]
}

/// Decodes a run of code page bytes into a string.
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| translate(b)).collect()
}

/// Translates a byte for inclusion in HTML.
///
/// Markup-significant characters become entities and the space becomes
/// `&nbsp;` so that column positions survive whitespace collapsing.
pub fn translate_html(byte: u8) -> Cow<'static, str> {
    match byte {
        b' ' => Cow::Borrowed("&nbsp;"),
        b'"' => Cow::Borrowed("&quot;"),
        b'&' => Cow::Borrowed("&amp;"),
        b'\'' => Cow::Borrowed("&#39;"),
        b'/' => Cow::Borrowed("&#47;"),
        b'<' => Cow::Borrowed("&lt;"),
        b'>' => Cow::Borrowed("&gt;"),
        _ => Cow::Owned(translate(byte).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_is_identity() {
        for byte in 0x20u8..=0x7e {
            assert_eq!(translate(byte), byte as char);
        }
    }

    #[test]
    fn test_control_and_high_glyphs() {
        assert_eq!(translate(0x00), '\n');
        assert_eq!(translate(0x01), '☺');
        assert_eq!(translate(0x7f), '⌂');
        assert_eq!(translate(0x80), 'Ç');
        assert_eq!(translate(0xc4), '─');
        assert_eq!(translate(0xe1), 'ß');
        assert_eq!(translate(0xff), '\u{a0}');
    }

    #[test]
    fn test_every_byte_is_mapped() {
        for byte in 0u8..=0xff {
            assert!(!decode(&[byte]).is_empty());
        }
    }

    #[test]
    fn test_decode_box_drawing() {
        assert_eq!(decode(&[0xda, 0xc4, 0xbf]), "┌─┐");
        assert_eq!(decode(b"Turbo"), "Turbo");
    }

    #[test]
    fn test_translate_html_escapes() {
        assert_eq!(translate_html(b' '), "&nbsp;");
        assert_eq!(translate_html(b'<'), "&lt;");
        assert_eq!(translate_html(b'>'), "&gt;");
        assert_eq!(translate_html(b'&'), "&amp;");
        assert_eq!(translate_html(b'"'), "&quot;");
        assert_eq!(translate_html(b'\''), "&#39;");
        assert_eq!(translate_html(b'/'), "&#47;");
        assert_eq!(translate_html(b'a'), "a");
        assert_eq!(translate_html(0x82), "é");
    }
}
