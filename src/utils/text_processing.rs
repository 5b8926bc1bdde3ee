const NEUTRAL_COLOR: &str = "#A0A0A0";

/// Escapes text for use in HTML element content and quoted attributes.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Returns `color` if it is a `#rrggbb` value, otherwise a neutral grey.
pub fn css_color(color: &str) -> &str {
    let is_hex = color.len() == 7
        && color.starts_with('#')
        && color[1..].bytes().all(|b| b.is_ascii_hexdigit());
    if is_hex { color } else { NEUTRAL_COLOR }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#039;Jerry&#039;&lt;/b&gt;"
        );
        assert_eq!(html_escape("plain \u{1F600}"), "plain \u{1F600}");
    }

    #[test]
    fn only_hex_colors_pass() {
        assert_eq!(css_color("#1e90FF"), "#1e90FF");
        assert_eq!(css_color(""), NEUTRAL_COLOR);
        assert_eq!(css_color("red;background:url(x)"), NEUTRAL_COLOR);
        assert_eq!(css_color("#12345G"), NEUTRAL_COLOR);
    }
}
