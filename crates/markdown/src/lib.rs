//! Markdown rendering for untrusted model output.
//!
//! The entry point is [`render_markdown_to_safe_html`]. With the `rich`
//! feature (default) it renders through pulldown-cmark and sanitizes the
//! result with ammonia; when the feature is disabled, or when the rich path
//! fails for any reason, it falls back to the built-in renderer, which only
//! ever emits a fixed set of tags and escapes all raw text before embedding
//! it.

mod block;
mod escape;
mod inline;
#[cfg(feature = "rich")]
mod rich;

pub use block::render_blocks;
pub use escape::{escape_html, sanitize_url};
pub use inline::InlineRenderer;

/// Convert raw Markdown to HTML that is safe to embed regardless of input.
pub fn render_markdown_to_safe_html(text: &str) -> String {
    #[cfg(feature = "rich")]
    if let Some(html) = rich::try_render(text) {
        return html;
    }
    block::render_blocks(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facade_neutralizes_script_tags() {
        let html = render_markdown_to_safe_html("<script>alert(1)</script>");
        assert!(!html.contains("<script"));
    }

    #[test]
    fn facade_renders_plain_paragraph() {
        let html = render_markdown_to_safe_html("hello");
        assert!(html.contains("hello"));
    }

    #[test]
    fn facade_never_emits_javascript_hrefs() {
        let html = render_markdown_to_safe_html("[x](javascript:alert(1))");
        assert!(!html.contains("javascript:"));
    }
}
