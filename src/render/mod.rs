//! Topic rendering.
//!
//! Turns the control-coded byte stream produced by the decompressor into
//! plain text or HTML.

mod html;
mod options;
mod plain;

pub use html::HtmlRenderer;
pub use options::{RenderOptions, TextFormat};
pub use plain::PlainTextRenderer;

use crate::model::ContextId;

/// Renders a decoded stream in the format selected by `options`.
///
/// `keywords` are the link targets of the stream's keyword spans; they are
/// ignored for plain text.
pub fn render_stream(stream: &[u8], keywords: &[ContextId], options: &RenderOptions) -> String {
    match options.format {
        TextFormat::PlainText => PlainTextRenderer::new().render(stream),
        TextFormat::Html => HtmlRenderer::new(&options.link_prefix).render(stream, keywords),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_stream_dispatches_on_format() {
        let stream = b"\x02Go\x02\x00";
        let plain = render_stream(stream, &[1], &RenderOptions::default());
        let html = render_stream(stream, &[1], &TextFormat::Html.into());

        assert_eq!(plain, "Go\n");
        assert_eq!(html, "<pre><a href=\"#context-1\">Go</a><br></pre>");
    }
}
