//! Fixed header fields: version, file header and compression table.

use serde::Serialize;

/// Help compiler generation that produced the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormatVersion {
    /// Turbo Pascal 2.0
    Tp2,
    /// Turbo Pascal 4.0 / Turbo C++ 3.0
    Tp4,
    /// Turbo Pascal 6.0
    Tp6,
    /// Borland Pascal 7.0
    Bp7,
    /// Unrecognized format byte
    Unknown(u8),
}

impl From<u8> for FormatVersion {
    fn from(value: u8) -> Self {
        match value {
            0x02 => FormatVersion::Tp2,
            0x04 => FormatVersion::Tp4,
            0x33 => FormatVersion::Tp6,
            0x34 => FormatVersion::Bp7,
            other => FormatVersion::Unknown(other),
        }
    }
}

impl FormatVersion {
    /// Returns the raw format byte.
    pub fn as_byte(&self) -> u8 {
        match self {
            FormatVersion::Tp2 => 0x02,
            FormatVersion::Tp4 => 0x04,
            FormatVersion::Tp6 => 0x33,
            FormatVersion::Bp7 => 0x34,
            FormatVersion::Unknown(value) => *value,
        }
    }

    /// Returns true if the format may carry an IndexTags record.
    pub fn has_index_tags(&self) -> bool {
        matches!(self, FormatVersion::Bp7)
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatVersion::Tp2 => write!(f, "Turbo Pascal 2.0"),
            FormatVersion::Tp4 => write!(f, "Turbo Pascal 4.0 / Turbo C++ 3.0"),
            FormatVersion::Tp6 => write!(f, "Turbo Pascal 6.0"),
            FormatVersion::Bp7 => write!(f, "Borland Pascal 7.0"),
            FormatVersion::Unknown(value) => write!(f, "unknown ({:#04x})", value),
        }
    }
}

/// Version field following the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Version {
    pub format: FormatVersion,
    pub text: u8,
}

impl Default for Version {
    fn default() -> Self {
        Self {
            format: FormatVersion::Unknown(0),
            text: 0,
        }
    }
}

/// Payload of the FileHeader record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileHeader {
    pub options: u16,
    /// Context id of the main index topic
    pub main_index: u16,
    /// Size of the largest record in the file
    pub largest_record: u16,
    /// Screen height in rows
    pub height: u8,
    /// Screen width in columns
    pub width: u8,
    pub left_margin: u8,
}

impl FileHeader {
    /// Printable columns available to a line (`width - left_margin`).
    pub fn max_width(&self) -> usize {
        usize::from(self.width.saturating_sub(self.left_margin))
    }
}

/// Compression scheme of text records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompressionKind {
    /// Nibble coding with a 14-entry substitution table
    Nibble,
    /// Unrecognized scheme byte
    Unknown(u8),
}

impl From<u8> for CompressionKind {
    fn from(value: u8) -> Self {
        match value {
            2 => CompressionKind::Nibble,
            other => CompressionKind::Unknown(other),
        }
    }
}

/// Payload of the Compression record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Compression {
    pub kind: CompressionKind,
    /// Bytes substituted for nibble values 0 through 13
    pub table: [u8; 14],
}

impl Default for Compression {
    fn default() -> Self {
        Self {
            kind: CompressionKind::Unknown(0),
            table: [0; 14],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_version_bytes() {
        assert_eq!(FormatVersion::from(0x34), FormatVersion::Bp7);
        assert_eq!(FormatVersion::from(0x04), FormatVersion::Tp4);
        assert_eq!(FormatVersion::from(0x10), FormatVersion::Unknown(0x10));
        assert_eq!(FormatVersion::Tp6.as_byte(), 0x33);
        assert_eq!(FormatVersion::Unknown(7).as_byte(), 7);
    }

    #[test]
    fn test_format_version_display() {
        assert_eq!(FormatVersion::Bp7.to_string(), "Borland Pascal 7.0");
        assert_eq!(FormatVersion::Unknown(0x10).to_string(), "unknown (0x10)");
    }

    #[test]
    fn test_max_width() {
        let header = FileHeader {
            width: 78,
            left_margin: 2,
            ..Default::default()
        };
        assert_eq!(header.max_width(), 76);

        let narrow = FileHeader {
            width: 1,
            left_margin: 4,
            ..Default::default()
        };
        assert_eq!(narrow.max_width(), 0);
    }

    #[test]
    fn test_compression_kind() {
        assert_eq!(CompressionKind::from(2), CompressionKind::Nibble);
        assert_eq!(CompressionKind::from(3), CompressionKind::Unknown(3));
    }
}
