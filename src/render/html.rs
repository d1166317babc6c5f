//! HTML renderer.
//!
//! The topic is emitted as a single `<pre>` block. Keyword spans become
//! anchors whose targets are taken, in order, from the topic's keyword
//! record; source code spans become `<code>` elements.

use crate::bhf::nibble::{DOCUMENT_END, KEYWORD_TOGGLE, NEW_LINE, SOURCE_TOGGLE};
use crate::codepage;
use crate::model::ContextId;
use log::debug;

/// Output positions of an open keyword span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Span {
    /// Where the first non-space glyph starts
    first_glyph: Option<usize>,
    /// Where the last non-space glyph ends
    glyph_end: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Keyword(Span),
    Code,
    CodeKeyword(Span),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    KeywordToggle,
    CodeToggle,
    End,
}

/// What the writer has to do on a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    OpenCode,
    CloseCode,
    CloseKeyword(Span),
    CloseKeywordAndCode(Span),
}

fn transition(state: State, event: Event) -> (State, Action) {
    match (state, event) {
        (State::Normal, Event::KeywordToggle) => (State::Keyword(Span::default()), Action::None),
        (State::Normal, Event::CodeToggle) => (State::Code, Action::OpenCode),
        (State::Normal, Event::End) => (State::Normal, Action::None),

        (State::Keyword(span), Event::KeywordToggle | Event::End) => {
            (State::Normal, Action::CloseKeyword(span))
        }
        (State::Keyword(span), Event::CodeToggle) => (State::Keyword(span), Action::None),

        (State::Code, Event::KeywordToggle) => (State::CodeKeyword(Span::default()), Action::None),
        (State::Code, Event::CodeToggle | Event::End) => (State::Normal, Action::CloseCode),

        (State::CodeKeyword(span), Event::KeywordToggle) => (State::Code, Action::CloseKeyword(span)),
        (State::CodeKeyword(span), Event::CodeToggle) => (State::CodeKeyword(span), Action::None),
        (State::CodeKeyword(span), Event::End) => {
            (State::Normal, Action::CloseKeywordAndCode(span))
        }
    }
}

/// HTML renderer.
#[derive(Debug)]
pub struct HtmlRenderer<'a> {
    link_prefix: &'a str,
}

impl<'a> HtmlRenderer<'a> {
    /// Creates a renderer producing links of the form `{link_prefix}{id}`.
    pub fn new(link_prefix: &'a str) -> Self {
        Self { link_prefix }
    }

    /// Renders `stream`, linking keyword spans to `keywords` in order.
    pub fn render(&self, stream: &[u8], keywords: &[ContextId]) -> String {
        let mut writer = HtmlWriter {
            output: String::with_capacity(stream.len() * 2 + 16),
            state: State::Normal,
            keywords: keywords.iter(),
            link_prefix: self.link_prefix,
        };

        writer.output.push_str("<pre>");
        for &byte in stream {
            match byte {
                NEW_LINE => writer.output.push_str("<br>"),
                DOCUMENT_END => break,
                KEYWORD_TOGGLE => writer.apply(Event::KeywordToggle),
                SOURCE_TOGGLE => writer.apply(Event::CodeToggle),
                _ => writer.push_glyph(byte),
            }
        }
        writer.apply(Event::End);
        writer.output.push_str("</pre>");

        if writer.keywords.len() > 0 {
            debug!("{} keyword targets left unused", writer.keywords.len());
        }
        writer.output
    }
}

struct HtmlWriter<'a> {
    output: String,
    state: State,
    keywords: std::slice::Iter<'a, ContextId>,
    link_prefix: &'a str,
}

impl HtmlWriter<'_> {
    fn apply(&mut self, event: Event) {
        if event == Event::CodeToggle
            && matches!(self.state, State::Keyword(_) | State::CodeKeyword(_))
        {
            debug!("Ignoring code toggle inside a keyword span");
        }
        let (state, action) = transition(self.state, event);
        self.state = state;

        match action {
            Action::None => {}
            Action::OpenCode => self.output.push_str("<code>"),
            Action::CloseCode => self.output.push_str("</code>"),
            Action::CloseKeyword(span) => self.close_keyword(span),
            Action::CloseKeywordAndCode(span) => {
                self.close_keyword(span);
                self.output.push_str("</code>");
            }
        }
    }

    fn push_glyph(&mut self, byte: u8) {
        let text = codepage::translate_html(byte);
        let start = self.output.len();
        self.output.push_str(&text);

        if byte == b' ' {
            return;
        }
        if let State::Keyword(span) | State::CodeKeyword(span) = &mut self.state {
            span.first_glyph.get_or_insert(start);
            span.glyph_end = Some(self.output.len());
        }
    }

    /// Wraps the span's glyphs in an anchor to the next keyword target.
    fn close_keyword(&mut self, span: Span) {
        // Every span takes a target, even one with nothing to wrap
        let target = self.keywords.next();
        let (Some(first), Some(end)) = (span.first_glyph, span.glyph_end) else {
            return;
        };
        let Some(id) = target else {
            debug!("Keyword span without a link target left unlinked");
            return;
        };

        self.output.insert_str(end, "</a>");
        self.output
            .insert_str(first, &format!("<a href=\"{}{}\">", self.link_prefix, id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(stream: &[u8], keywords: &[ContextId]) -> String {
        HtmlRenderer::new("#context-").render(stream, keywords)
    }

    #[test]
    fn test_plain_html() {
        assert_eq!(render(b"a<b\x00c", &[]), "<pre>a&lt;b<br>c</pre>");
    }

    #[test]
    fn test_keyword_anchor_wraps_glyphs_only() {
        let out = render(b"See\x02 Index \x02.", &[12]);
        assert_eq!(
            out,
            "<pre>See&nbsp;<a href=\"#context-12\">Index</a>&nbsp;.</pre>"
        );
    }

    #[test]
    fn test_keywords_are_linked_in_order() {
        let out = render(b"\x02A\x02 \x02B\x02", &[3, 4]);
        assert_eq!(
            out,
            "<pre><a href=\"#context-3\">A</a>&nbsp;<a href=\"#context-4\">B</a></pre>"
        );
    }

    #[test]
    fn test_empty_span_consumes_target() {
        let out = render(b"\x02 \x02\x02B\x02", &[3, 4]);
        assert_eq!(out, "<pre>&nbsp;<a href=\"#context-4\">B</a></pre>");
    }

    #[test]
    fn test_span_without_target_is_unlinked() {
        let out = render(b"\x02A\x02", &[]);
        assert_eq!(out, "<pre>A</pre>");
    }

    #[test]
    fn test_code_span() {
        let out = render(b"\x05x\x05y", &[]);
        assert_eq!(out, "<pre><code>x</code>y</pre>");
    }

    #[test]
    fn test_code_toggle_inside_keyword_is_ignored() {
        let out = render(b"\x02a\x05b\x02", &[1]);
        assert_eq!(out, "<pre><a href=\"#context-1\">ab</a></pre>");
    }

    #[test]
    fn test_keyword_inside_code() {
        let out = render(b"\x05\x02f\x02\x05", &[9]);
        assert_eq!(
            out,
            "<pre><code><a href=\"#context-9\">f</a></code></pre>"
        );
    }

    #[test]
    fn test_open_spans_are_closed_at_end() {
        let out = render(b"\x05\x02f\x01ignored", &[2]);
        assert_eq!(
            out,
            "<pre><code><a href=\"#context-2\">f</a></code></pre>"
        );
    }

    #[test]
    fn test_custom_link_prefix() {
        let out = HtmlRenderer::new("topic-").render(b"\x02T\x02", &[5]);
        assert_eq!(out, "<pre><a href=\"topic-5\">T</a></pre>");
    }

    #[test]
    fn test_render_is_repeatable() {
        let stream = b"\x02one\x02 two \x05three\x05\x00";
        assert_eq!(render(stream, &[1]), render(stream, &[1]));
    }
}
