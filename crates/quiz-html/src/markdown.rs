//! Markdown renderer built on pulldown-cmark events.
//!
//! Newlines inside paragraphs become `<br>`, fenced code blocks and tables are
//! supported. Code elements are styled fixed-width and table elements get a
//! solid border, since the import target drops stylesheets.

use std::fmt::Write;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::render::{Block, LINE_BREAK, Renderer, escape_html};

const CODE_STYLE: &str = "font-family: Courier New;";
const BORDER_STYLE: &str = "border: 1px solid black; border-collapse: collapse;";

/// CommonMark renderer with tables, strikethrough and break-on-newline
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    /// Paired delimiter translated to inline code before parsing
    code_delimiter: Option<char>,
}

impl MarkdownRenderer {
    pub fn new(code_delimiter: Option<char>) -> Self {
        Self { code_delimiter }
    }

    fn options() -> Options {
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, text: &str, _block: Block) -> String {
        let source = match self.code_delimiter {
            Some(delimiter) => delimited_to_inline_code(text, delimiter),
            None => text.to_string(),
        };
        let parser = Parser::new_ext(&source, Self::options());
        HtmlWriter::default().render(parser)
    }

    fn code_delimiter(&self) -> Option<char> {
        self.code_delimiter
    }
}

/// Turn delimiter pairs into backtick code spans
///
/// Fenced code blocks and existing backtick spans are copied unchanged. A
/// span whose content contains a backtick uses a double-backtick fence.
fn delimited_to_inline_code(text: &str, delimiter: char) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prose = String::new();
    let mut open_fence: Option<(char, usize)> = None;

    for line in text.split_inclusive('\n') {
        match open_fence {
            Some((marker, len)) => {
                result.push_str(line);
                if fence(line).is_some_and(|(c, n)| c == marker && n >= len) {
                    open_fence = None;
                }
            }
            None => match fence(line) {
                Some(opening) => {
                    result.push_str(&inline_spans(&prose, delimiter));
                    prose.clear();
                    result.push_str(line);
                    open_fence = Some(opening);
                }
                None => prose.push_str(line),
            },
        }
    }
    result.push_str(&inline_spans(&prose, delimiter));
    result
}

/// Fence marker and run length of a code fence line
fn fence(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = trimmed.len() - trimmed.trim_start_matches(marker).len();
    (len >= 3).then_some((marker, len))
}

/// Convert delimiter pairs outside backtick spans
fn inline_spans(text: &str, delimiter: char) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(i) = rest.find(|c| c == '`' || c == delimiter) {
        result.push_str(&rest[..i]);
        rest = &rest[i..];

        if rest.starts_with('`') {
            let run = rest.len() - rest.trim_start_matches('`').len();
            match find_backtick_run(&rest[run..], run) {
                Some(end) => {
                    let span_len = run + end + run;
                    result.push_str(&rest[..span_len]);
                    rest = &rest[span_len..];
                }
                None => {
                    result.push_str(&rest[..run]);
                    rest = &rest[run..];
                }
            }
            continue;
        }

        let after = &rest[delimiter.len_utf8()..];
        match after.find(delimiter) {
            Some(end) => {
                let code = &after[..end];
                if code.contains('`') {
                    write!(result, "`` {code} ``").unwrap();
                } else {
                    write!(result, "`{code}`").unwrap();
                }
                rest = &after[end + delimiter.len_utf8()..];
            }
            None => {
                result.push(delimiter);
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

/// Offset of the next run of exactly `len` backticks
fn find_backtick_run(text: &str, len: usize) -> Option<usize> {
    let mut offset = 0;
    loop {
        let start = offset + text[offset..].find('`')?;
        let run = text[start..].len() - text[start..].trim_start_matches('`').len();
        if run == len {
            return Some(start);
        }
        offset = start + run;
    }
}

/// State for tracking code block rendering.
#[derive(Default)]
struct CodeBlockState {
    active: bool,
    buffer: String,
}

/// Writes pulldown-cmark events as compact HTML.
#[derive(Default)]
struct HtmlWriter {
    output: String,
    code: CodeBlockState,
    /// Whether we're inside the table header row.
    in_table_head: bool,
    /// Whether we're inside an image tag (alt text capture).
    in_image: bool,
    alt_text: String,
}

impl HtmlWriter {
    fn render<'a, I>(mut self, events: I) -> String
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }
        self.output
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                write!(
                    self.output,
                    r#"<code style="{CODE_STYLE}">{}</code>"#,
                    escape_html(&code)
                )
                .unwrap();
            }
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            Event::SoftBreak | Event::HardBreak => {
                if self.code.active {
                    self.code.buffer.push('\n');
                } else {
                    self.output.push_str(LINE_BREAK);
                }
            }
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => {
                self.output.push_str(if checked { "[x] " } else { "[ ] " });
            }
            // Footnotes and math have no meaning in a single import field
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                write!(self.output, "<h{}>", heading_level_to_num(level)).unwrap();
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(_) => {
                self.code.active = true;
                self.code.buffer.clear();
            }
            Tag::List(Some(1)) => self.output.push_str("<ol>"),
            Tag::List(Some(start)) => write!(self.output, r#"<ol start="{start}">"#).unwrap(),
            Tag::List(None) => self.output.push_str("<ul>"),
            Tag::Item => self.output.push_str("<li>"),
            Tag::Table(_) => write!(self.output, r#"<table style="{BORDER_STYLE}">"#).unwrap(),
            Tag::TableHead => {
                self.in_table_head = true;
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => self.output.push_str("<tr>"),
            Tag::TableCell => {
                let cell = if self.in_table_head { "th" } else { "td" };
                write!(self.output, r#"<{cell} style="{BORDER_STYLE}">"#).unwrap();
            }
            Tag::Emphasis => self.output.push_str("<em>"),
            Tag::Strong => self.output.push_str("<strong>"),
            Tag::Strikethrough => self.output.push_str("<del>"),
            Tag::Link { dest_url, .. } => {
                write!(self.output, r#"<a href="{}">"#, escape_html(&dest_url)).unwrap();
            }
            Tag::Image { dest_url, .. } => {
                self.in_image = true;
                self.alt_text.clear();
                write!(self.output, r#"<img src="{}""#, escape_html(&dest_url)).unwrap();
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(level) => {
                write!(self.output, "</h{}>", heading_level_to_num(level)).unwrap();
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                self.code.active = false;
                let buffer = std::mem::take(&mut self.code.buffer);
                write!(
                    self.output,
                    r#"<pre><code style="{CODE_STYLE}">{}</code></pre>"#,
                    escape_html(buffer.trim_end_matches(['\n', '\r']))
                )
                .unwrap();
            }
            TagEnd::List(true) => self.output.push_str("</ol>"),
            TagEnd::List(false) => self.output.push_str("</ul>"),
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.output.push_str("</tr></thead><tbody>");
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output
                    .push_str(if self.in_table_head { "</th>" } else { "</td>" });
            }
            TagEnd::Emphasis => self.output.push_str("</em>"),
            TagEnd::Strong => self.output.push_str("</strong>"),
            TagEnd::Strikethrough => self.output.push_str("</del>"),
            TagEnd::Link => self.output.push_str("</a>"),
            TagEnd::Image => {
                self.in_image = false;
                let alt_text = std::mem::take(&mut self.alt_text);
                write!(self.output, r#" alt="{}">"#, escape_html(&alt_text)).unwrap();
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.active {
            self.code.buffer.push_str(text);
        } else if self.in_image {
            self.alt_text.push_str(text);
        } else {
            self.output.push_str(&escape_html(text));
        }
    }
}

/// Convert heading level enum to number.
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str) -> String {
        MarkdownRenderer::default().render(markdown, Block::Question)
    }

    #[test]
    fn test_paragraph() {
        assert_eq!(render("What is 2+2?\n"), "<p>What is 2+2?</p>");
    }

    #[test]
    fn test_break_on_newline() {
        assert_eq!(render("first\nsecond\n"), "<p>first<br>second</p>");
    }

    #[test]
    fn test_inline_code_styled() {
        insta::assert_snapshot!(
            render("Call `main()` first"),
            @r#"<p>Call <code style="font-family: Courier New;">main()</code> first</p>"#
        );
    }

    #[test]
    fn test_fenced_code_block() {
        let html = render("Output?\n\n```\nfn main() {\n\tprintln!(\"a < b\");\n}\n```\n");
        assert_eq!(
            html,
            "<p>Output?</p><pre><code style=\"font-family: Courier New;\">fn main() {\n\tprintln!(&quot;a &lt; b&quot;);\n}</code></pre>"
        );
    }

    #[test]
    fn test_table_borders() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.starts_with(&format!(r#"<table style="{BORDER_STYLE}"><thead><tr><th style="{BORDER_STYLE}">a</th>"#)));
        assert!(html.contains(&format!(r#"<td style="{BORDER_STYLE}">2</td>"#)));
        assert!(html.ends_with("</tr></tbody></table>"));
    }

    #[test]
    fn test_emphasis_and_lists() {
        assert_eq!(
            render("- **bold**\n- *em*\n"),
            "<ul><li><strong>bold</strong></li><li><em>em</em></li></ul>"
        );
    }

    #[test]
    fn test_delimiter_becomes_inline_code() {
        let html = MarkdownRenderer::new(Some('#')).render("a #b# c", Block::Answer);
        assert_eq!(
            html,
            r#"<p>a <code style="font-family: Courier New;">b</code> c</p>"#
        );
    }

    #[test]
    fn test_delimiter_inside_fenced_code_kept() {
        let html = MarkdownRenderer::new(Some('#'))
            .render("Output?\n\n```\nx = 1 # a\ny = 2 # b\n```\n", Block::Question);
        assert_eq!(
            html,
            "<p>Output?</p><pre><code style=\"font-family: Courier New;\">x = 1 # a\ny = 2 # b</code></pre>"
        );
    }

    #[test]
    fn test_delimiter_around_fence_converted() {
        let html = MarkdownRenderer::new(Some('#'))
            .render("Use #sum#:\n\n```\ntotal # x #\n```\n\nor #add#", Block::Question);
        assert!(html.starts_with(r#"<p>Use <code style="font-family: Courier New;">sum</code>:</p>"#));
        assert!(html.contains(">total # x #</code></pre>"));
        assert!(html.ends_with(r#"<p>or <code style="font-family: Courier New;">add</code></p>"#));
    }

    #[test]
    fn test_delimiter_inside_backtick_span_kept() {
        let html = MarkdownRenderer::new(Some('#')).render("`a # b #` and #c#", Block::Answer);
        assert_eq!(
            html,
            r#"<p><code style="font-family: Courier New;">a # b #</code> and <code style="font-family: Courier New;">c</code></p>"#
        );
    }

    #[test]
    fn test_delimited_span_with_backtick() {
        assert_eq!(delimited_to_inline_code("say #a`b#", '#'), "say `` a`b ``");
    }

    #[test]
    fn test_fence_detection() {
        assert_eq!(fence("```rust\n"), Some(('`', 3)));
        assert_eq!(fence("  ~~~~\n"), Some(('~', 4)));
        assert_eq!(fence("    ```\n"), None);
        assert_eq!(fence("``x``\n"), None);
    }

    #[test]
    fn test_escapes_text() {
        assert_eq!(render("1 < 2 & 3"), "<p>1 &lt; 2 &amp; 3</p>");
    }
}
