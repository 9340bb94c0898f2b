use crate::escape::{escape_html, sanitize_url};
use regex::{Captures, Regex};

/// Renders the inline markers of a single line: code spans, bold, italic and
/// links, in that order.
///
/// The input must already be HTML-escaped; nothing here re-escapes it. Link
/// labels are emitted verbatim for the same reason: the whole line was
/// escaped upstream. Markers without a matching close stay literal.
pub struct InlineRenderer {
    code: Regex,
    bold: Regex,
    italic: Regex,
    link: Regex,
}

impl Default for InlineRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl InlineRenderer {
    pub fn new() -> Self {
        Self {
            code: Regex::new(r"`([^`\n]+)`").unwrap(),
            bold: Regex::new(r"\*\*([^*\n]+)\*\*").unwrap(),
            italic: Regex::new(r"\*([^*\n]+)\*").unwrap(),
            link: Regex::new(r"\[([^\]\n]+)\]\(([^)\n]+)\)").unwrap(),
        }
    }

    pub fn render(&self, line: &str) -> String {
        // Code spans first: their content is literal, so the remaining
        // substitutions only ever see the text between them.
        let mut out = String::with_capacity(line.len());
        let mut last = 0;
        for caps in self.code.captures_iter(line) {
            let whole = caps.get(0).unwrap();
            out.push_str(&self.render_text(&line[last..whole.start()]));
            out.push_str("<code>");
            out.push_str(&caps[1]);
            out.push_str("</code>");
            last = whole.end();
        }
        out.push_str(&self.render_text(&line[last..]));
        out
    }

    /// Bold, italic and links over a segment with no code spans.
    fn render_text(&self, segment: &str) -> String {
        let bolded = self
            .bold
            .replace_all(segment, "<strong>$1</strong>")
            .into_owned();

        // The regex crate has no lookaround, so the single-asterisk boundary
        // rules are checked against the characters surrounding each match.
        let italicized = self
            .italic
            .replace_all(&bolded, |caps: &Captures| {
                let m = caps.get(0).unwrap();
                let before = bolded[..m.start()].chars().next_back();
                let after = bolded[m.end()..].chars().next();
                if before == Some('*') || after == Some('*') {
                    caps[0].to_string()
                } else {
                    format!("<em>{}</em>", &caps[1])
                }
            })
            .into_owned();

        self.link
            .replace_all(&italicized, |caps: &Captures| {
                let href = escape_html(&sanitize_url(&caps[2]));
                format!(
                    "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                    href, &caps[1]
                )
            })
            .into_owned()
    }
}
