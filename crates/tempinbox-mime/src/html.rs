//! Plain-text approximation of an HTML body.

const ENTITIES: [(&str, char); 7] = [
    ("&nbsp;", ' '),
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
    ("&apos;", '\''),
];

/// Strips an HTML document down to readable text.
///
/// `<style>` and `<script>` blocks are removed with their content, every
/// other tag becomes a space, common entities are unescaped, and runs of
/// whitespace collapse to a single space.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let without_blocks = remove_tag_block(&remove_tag_block(html, "style"), "script");
    let text = decode_entities(&replace_tags(&without_blocks));
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes `<tag ...>...</tag>` blocks. An unclosed block is left in place.
fn remove_tag_block(html: &str, tag: &str) -> String {
    // ASCII lower-casing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut result = String::with_capacity(html.len());
    let mut pos = 0;

    while let Some(start) = lower[pos..].find(&open).map(|i| pos + i) {
        let Some(end) = lower[start..].find(&close).map(|i| start + i + close.len()) else {
            break;
        };
        result.push_str(&html[pos..start]);
        pos = end;
    }

    result.push_str(&html[pos..]);
    result
}

fn replace_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        match after.find('>') {
            Some(end) if end > 0 => {
                result.push_str(&rest[..start]);
                result.push(' ');
                rest = &after[end + 1..];
            }
            _ => {
                result.push_str(&rest[..=start]);
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}

fn decode_entities(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        result.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some((entity, ch)) = ENTITIES.iter().find(|(entity, _)| tail.starts_with(entity)) {
            result.push(*ch);
            rest = &tail[entity.len()..];
        } else {
            result.push('&');
            rest = &tail[1..];
        }
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        let html = "<html><body><h1>Hello</h1>\n<p>World &amp; friends</p></body></html>";
        assert_eq!(strip_html(html), "Hello World & friends");
    }

    #[test]
    fn test_strip_style_and_script() {
        let html = concat!(
            "<STYLE type=\"text/css\">p { color: red; }</STYLE>",
            "<p>Visible</p>",
            "<script>alert('x')</script>",
            "<p>Also visible</p>"
        );
        assert_eq!(strip_html(html), "Visible Also visible");
    }

    #[test]
    fn test_entities() {
        assert_eq!(
            strip_html("a&nbsp;b &lt;tag&gt; &quot;q&quot; &copy;"),
            "a b <tag> \"q\" &copy;"
        );
        assert_eq!(strip_html("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_stray_angle_brackets() {
        assert_eq!(strip_html("1 < 2"), "1 < 2");
        assert_eq!(strip_html("a <> b"), "a <> b");
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        assert_eq!(strip_html("  <div>\r\n\t one   two </div>  "), "one two");
        assert_eq!(strip_html(""), "");
    }
}
