use pulldown_cmark::{html, Options, Parser};

/// Render a markdown document to HTML.
///
/// Invalid UTF-8 sequences are replaced with U+FFFD before rendering.
pub fn render_html(source: &[u8]) -> String {
    let text = String::from_utf8_lossy(source);
    let parser = Parser::new_ext(&text, Options::empty());
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
