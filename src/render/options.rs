//! Rendering options for topic output.

/// Output format for a rendered topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    /// Plain text with `\n` line breaks.
    #[default]
    PlainText,
    /// A `<pre>` block with `<a>` links for keyword spans.
    Html,
}

impl TextFormat {
    /// File extension conventionally used for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            TextFormat::PlainText => "txt",
            TextFormat::Html => "html",
        }
    }
}

/// Options for topic rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Output format.
    pub format: TextFormat,

    /// Whether to re-wrap paragraphs to the screen width stored in the file.
    /// Default: true
    pub reflow: bool,

    /// Prefix placed before the context id in link targets.
    /// Default: "#context-"
    pub link_prefix: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: TextFormat::PlainText,
            reflow: true,
            link_prefix: "#context-".to_string(),
        }
    }
}

impl RenderOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output format.
    pub fn with_format(mut self, format: TextFormat) -> Self {
        self.format = format;
        self
    }

    /// Keeps the line breaks exactly as stored.
    pub fn without_reflow(mut self) -> Self {
        self.reflow = false;
        self
    }

    /// Sets the link target prefix for HTML output.
    pub fn with_link_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.link_prefix = prefix.into();
        self
    }
}

impl From<TextFormat> for RenderOptions {
    fn from(format: TextFormat) -> Self {
        Self::default().with_format(format)
    }
}
