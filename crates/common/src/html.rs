//! Minimal HTML builders for job summaries

/// Escape text for use inside HTML element content or attributes
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

/// Inline code span; the text is escaped
pub fn code(text: &str) -> String {
    format!("<code>{}</code>", escape(text))
}

pub fn list_element(html: &str) -> String {
    format!("<li>{html}</li>")
}

pub fn unordered_list(html: &str) -> String {
    format!("<ul>{html}</ul>")
}

/// Collapsible block with a plain-text label
pub fn details(label: &str, html: &str) -> String {
    format!("<details><summary>{label}</summary>{html}</details>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code() {
        assert_eq!(code("some html"), "<code>some html</code>");
    }

    #[test]
    fn test_code_escapes_markup() {
        assert_eq!(
            code("<b>\"a\" & 'b'</b>"),
            "<code>&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;</code>"
        );
    }

    #[test]
    fn test_list_element() {
        assert_eq!(list_element("some html"), "<li>some html</li>");
    }

    #[test]
    fn test_unordered_list() {
        assert_eq!(unordered_list("some html"), "<ul>some html</ul>");
    }

    #[test]
    fn test_details() {
        assert_eq!(
            details("2 failed tests", "<ul></ul>"),
            "<details><summary>2 failed tests</summary><ul></ul></details>"
        );
    }
}
