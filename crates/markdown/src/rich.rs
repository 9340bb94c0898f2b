use pulldown_cmark::{html, Options, Parser};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Render through the external parser/sanitizer pair.
///
/// Returns `None` when either library panics, so the caller can fall back to
/// the built-in renderer without surfacing anything.
pub(crate) fn try_render(text: &str) -> Option<String> {
    catch_unwind(AssertUnwindSafe(|| {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        let parser = Parser::new_ext(text, options);
        let mut raw = String::new();
        html::push_html(&mut raw, parser);
        ammonia::clean(&raw)
    }))
    .ok()
}
