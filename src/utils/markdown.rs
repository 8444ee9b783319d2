use pulldown_cmark::{Event, Options, Parser, html};

/// Renders a Markdown summary to HTML for display. Raw HTML in the source is
/// emitted as escaped text, never as markup.
#[must_use]
pub fn render_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_summary_sections() {
        let html = render_html("# Core Message\nHello\n\n## Key Points\n- one\n- two\n");
        assert!(html.contains("<h1>Core Message</h1>"));
        assert!(html.contains("<h2>Key Points</h2>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn raw_html_is_rendered_as_text() {
        let html = render_html("Summary <img src=x onerror=alert(1)> done");
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));

        let html = render_html("<script>alert(1)</script>\n\n# Core Message\n");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<h1>Core Message</h1>"));
    }

    #[test]
    fn escapes_inline_html_text() {
        let html = render_html("a < b & c");
        assert!(html.contains("a &lt; b &amp; c"));
    }
}
