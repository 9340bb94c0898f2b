use crate::escape::escape_html;
use crate::inline::InlineRenderer;
use regex::Regex;

/// Render a full Markdown document to block HTML with the built-in renderer.
///
/// One forward pass over the lines, no lookahead beyond the current line.
/// Emits only headings, paragraphs, lists, blockquotes and fenced code
/// blocks; every piece of raw text is escaped before inline rendering, and
/// code block content is escaped but never inline-rendered.
pub fn render_blocks(text: &str) -> String {
    BlockRenderer::new().render(text)
}

struct BlockRenderer {
    inline: InlineRenderer,
    fence: Regex,
    heading: Regex,
    unordered: Regex,
    ordered: Regex,
    out: String,
    in_code: bool,
    code_lang: String,
    code_lines: Vec<String>,
    in_unordered: bool,
    in_ordered: bool,
    in_quote: bool,
}

impl BlockRenderer {
    fn new() -> Self {
        Self {
            inline: InlineRenderer::new(),
            fence: Regex::new(r"^```([A-Za-z0-9_+.#-]*)\s*$").unwrap(),
            heading: Regex::new(r"^(#{1,6}) +(.*)$").unwrap(),
            unordered: Regex::new(r"^\s*[-*] +(.*)$").unwrap(),
            ordered: Regex::new(r"^\s*[0-9]+\. +(.*)$").unwrap(),
            out: String::new(),
            in_code: false,
            code_lang: String::new(),
            code_lines: Vec::new(),
            in_unordered: false,
            in_ordered: false,
            in_quote: false,
        }
    }

    fn render(mut self, text: &str) -> String {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        for line in text.split('\n') {
            self.line(line);
        }
        self.finish();
        self.out
    }

    fn line(&mut self, line: &str) {
        if self.in_code {
            if self.fence.is_match(line) {
                self.flush_code();
                self.in_code = false;
            } else {
                self.code_lines.push(line.to_string());
            }
            return;
        }

        if let Some(caps) = self.fence.captures(line) {
            self.close_list();
            self.close_quote();
            self.in_code = true;
            self.code_lang = caps[1].to_string();
            return;
        }

        if line.trim().is_empty() {
            self.close_list();
            self.close_quote();
            return;
        }

        if let Some(rest) = line.strip_prefix('>') {
            self.close_list();
            let content = rest.strip_prefix(' ').unwrap_or(rest);
            if !self.in_quote {
                self.out.push_str("<blockquote>");
                self.in_quote = true;
            }
            let html = self.inline.render(&escape_html(content));
            self.out.push_str("<p>");
            self.out.push_str(&html);
            self.out.push_str("</p>");
            return;
        }

        if let Some(caps) = self.heading.captures(line) {
            self.close_list();
            self.close_quote();
            let level = caps[1].len();
            let content = self.inline.render(&escape_html(caps[2].trim()));
            self.out.push_str(&format!("<h{level}>{content}</h{level}>"));
            return;
        }

        if let Some(caps) = self.unordered.captures(line) {
            self.close_quote();
            if self.in_ordered {
                self.out.push_str("</ol>");
                self.in_ordered = false;
            }
            if !self.in_unordered {
                self.out.push_str("<ul>");
                self.in_unordered = true;
            }
            self.push_item(&caps[1]);
            return;
        }

        if let Some(caps) = self.ordered.captures(line) {
            self.close_quote();
            if self.in_unordered {
                self.out.push_str("</ul>");
                self.in_unordered = false;
            }
            if !self.in_ordered {
                // The marker's numeric value is not preserved; the browser
                // re-numbers sequentially.
                self.out.push_str("<ol>");
                self.in_ordered = true;
            }
            self.push_item(&caps[1]);
            return;
        }

        self.close_list();
        self.close_quote();
        let content = self.inline.render(&escape_html(line.trim()));
        self.out.push_str("<p>");
        self.out.push_str(&content);
        self.out.push_str("</p>");
    }

    fn push_item(&mut self, content: &str) {
        let html = self.inline.render(&escape_html(content.trim()));
        self.out.push_str("<li>");
        self.out.push_str(&html);
        self.out.push_str("</li>");
    }

    fn flush_code(&mut self) {
        let code = escape_html(&self.code_lines.join("\n"));
        if self.code_lang.is_empty() {
            self.out.push_str(&format!("<pre><code>{code}</code></pre>"));
        } else {
            self.out.push_str(&format!(
                "<pre><code class=\"language-{}\">{}</code></pre>",
                self.code_lang, code
            ));
        }
        self.code_lines.clear();
        self.code_lang.clear();
    }

    fn close_list(&mut self) {
        if self.in_unordered {
            self.out.push_str("</ul>");
            self.in_unordered = false;
        }
        if self.in_ordered {
            self.out.push_str("</ol>");
            self.in_ordered = false;
        }
    }

    fn close_quote(&mut self) {
        if self.in_quote {
            self.out.push_str("</blockquote>");
            self.in_quote = false;
        }
    }

    fn finish(&mut self) {
        // An unterminated fence still flushes its buffered content.
        if self.in_code {
            self.flush_code();
            self.in_code = false;
        }
        self.close_list();
        self.close_quote();
    }
}
