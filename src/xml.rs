//! Minimal XML text helpers shared by the assembler and the response composer.

/// Indentation unit for nested elements
pub const INDENT: &str = "  ";

/// Escape text content for use between tags
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// `<name>text</name>` with the text escaped
pub fn element(name: &str, text: &str) -> String {
    format!("<{name}>{}</{name}>", escape_text(text))
}

/// Wrap already-rendered children in `<name>...</name>`
pub fn wrap(name: &str, children: &str) -> String {
    format!("<{name}>{children}</{name}>")
}
