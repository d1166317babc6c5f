//! Parsing options for opening help files.

/// Options for controlling catalog parsing behavior.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// How to handle recoverable format problems.
    pub error_mode: ErrorMode,
}

impl ParseOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets lenient error handling (record a diagnostic and continue).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Sets strict error handling (fail on any problem).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Returns true if recoverable problems should only be recorded.
    pub fn is_lenient(&self) -> bool {
        matches!(self.error_mode, ErrorMode::Lenient)
    }
}

/// How to handle recoverable format problems.
///
/// Structural problems (a missing positional record, a truncated fixed
/// field) always abort. This setting only governs problems the decoder can
/// step over: a bad end-of-stamp sentinel, an unknown compression type, a
/// truncated index payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail immediately on any error.
    Strict,
    /// Record a diagnostic and continue with a best-effort value.
    #[default]
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_lenient() {
        assert!(ParseOptions::default().is_lenient());
        assert!(!ParseOptions::new().strict().is_lenient());
        assert!(ParseOptions::new().strict().lenient().is_lenient());
    }
}
