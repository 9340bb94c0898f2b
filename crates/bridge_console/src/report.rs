//! Self-contained HTML report of one session: query, backend metadata, the
//! full transcript and the rendered answer.
//!
//! Every piece of dynamic text goes through `escape_html`; only the final
//! answer is turned into markup, and only via the safe-render façade.

use crate::session::{ConnectionStatus, Session};
use anyhow::{Context, Result};
use markdown::{escape_html, render_markdown_to_safe_html};
use std::path::Path;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem;color:#1a1a1a}\
h1{font-size:1.3rem}h2{font-size:1.1rem;margin-top:2rem}\
.meta,.transcript li{color:#555;font-size:.9rem}\
.transcript{list-style:none;padding-left:0}\
.transcript li{border-left:3px solid #ddd;padding:.2rem .6rem;margin:.2rem 0;font-family:ui-monospace,monospace;white-space:pre-wrap}\
.answer{border:1px solid #ddd;border-radius:6px;padding:1rem}\
.answer pre{background:#f6f6f6;padding:.6rem;overflow-x:auto}\
.error{color:#b00020}";

pub fn write_report(session: &Session, path: &Path) -> Result<()> {
    std::fs::write(path, render_report(session))
        .with_context(|| format!("failed to write report to {}", path.display()))
}

pub fn render_report(session: &Session) -> String {
    let mut html = String::new();
    html.push_str("<!doctype html><html><head><meta charset=\"utf-8\">");
    html.push_str("<title>bridge-console session</title>");
    html.push_str(&format!("<style>{STYLE}</style>"));
    html.push_str("</head><body>");

    html.push_str(&format!("<h1>{}</h1>", escape_html(session.query())));
    html.push_str(&format!(
        "<p class=\"meta\">generated {} · status: {}</p>",
        chrono::Utc::now().format("%Y-%m-%d %H:%M UTC"),
        session.status()
    ));

    if let Some(meta) = session.meta() {
        html.push_str(&format!(
            "<p class=\"meta\">model {} · server {} · max_steps {}</p>",
            escape_html(&meta.model),
            escape_html(&meta.server_url),
            meta.max_steps
        ));
    }
    if let Some(count) = session.tools_count() {
        html.push_str(&format!("<p class=\"meta\">{count} tools available</p>"));
    }

    html.push_str("<h2>Transcript</h2><ol class=\"transcript\">");
    for event in session.events() {
        html.push_str(&format!("<li>{}</li>", escape_html(&event.to_string())));
    }
    html.push_str("</ol>");

    match session.status() {
        ConnectionStatus::Done => {
            html.push_str("<h2>Answer</h2><div class=\"answer\">");
            html.push_str(&render_markdown_to_safe_html(session.final_text()));
            html.push_str("</div>");
        }
        ConnectionStatus::Error => {
            html.push_str(&format!(
                "<p class=\"error\">{}</p>",
                escape_html(session.error_text())
            ));
        }
        _ => {}
    }

    html.push_str("</body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::AgentEvent;

    #[test]
    fn report_escapes_query_and_renders_answer() {
        let mut session = Session::new();
        session.start("<script>q</script>").unwrap();
        session.ingest(AgentEvent::Tools { count: 2, tools: None });
        session.ingest(AgentEvent::Final {
            content: "# Verdict\n\n*fine*".to_string(),
        });

        let html = render_report(&session);
        assert!(html.contains("&lt;script&gt;q&lt;/script&gt;"));
        assert!(!html.contains("<script>q"));
        assert!(html.contains("<em>fine</em>"));
        assert!(html.contains("2 tools available"));
    }

    #[test]
    fn failed_session_reports_the_error() {
        let mut session = Session::new();
        session.start("q").unwrap();
        session.ingest(AgentEvent::Error {
            message: Some("backend <down>".to_string()),
        });

        let html = render_report(&session);
        assert!(html.contains("backend &lt;down&gt;"));
        assert!(!html.contains("<div class=\"answer\">"));
    }

    #[test]
    fn adversarial_answer_cannot_inject_markup() {
        let mut session = Session::new();
        session.start("q").unwrap();
        session.ingest(AgentEvent::Final {
            content: "<img src=x onerror=alert(1)>".to_string(),
        });

        let html = render_report(&session);
        // Whichever rendering path is compiled in, the raw tag must not make
        // it into the document.
        assert!(!html.contains("<img src=x onerror"));
    }
}
