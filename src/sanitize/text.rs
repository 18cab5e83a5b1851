// src/sanitize/text.rs
use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_OR_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>")
        .expect("script/style pattern")
});

// A closed tag, or an unterminated one running to the end of the input.
static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<[^>]*>|<[a-zA-Z/!?][^>]*$").expect("tag pattern"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\r\n\t ]+").expect("whitespace pattern"));

static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").expect("space pattern"));

static OCTET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%[a-fA-F0-9]{2}").expect("octet pattern"));

static NOT_CLASS_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]").expect("class char pattern"));

/// Remove every tag, dropping `<script>` and `<style>` blocks with their content.
pub fn strip_all_tags(input: &str) -> String {
    let without_blocks = SCRIPT_OR_STYLE.replace_all(input, "");
    TAG.replace_all(&without_blocks, "").trim().to_string()
}

/// Plain single-line text: no markup, no line breaks, no percent-encoded
/// octets, collapsed whitespace.
pub fn sanitize_text_field(input: &str) -> String {
    let stripped = if input.contains('<') {
        strip_all_tags(input)
    } else {
        input.to_string()
    };

    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");
    let mut filtered = collapsed.trim().to_string();

    // Removing one octet can splice two halves into a new one ("%2%414").
    let mut found = false;
    while OCTET.is_match(&filtered) {
        filtered = OCTET.replace_all(&filtered, "").into_owned();
        found = true;
    }
    if found {
        filtered = SPACE_RUN.replace_all(filtered.trim(), " ").into_owned();
    }

    filtered
}

/// Reduce a value to the characters allowed in an HTML id or class name.
pub fn sanitize_html_class(input: &str) -> String {
    let without_octets = OCTET.replace_all(input, "");
    NOT_CLASS_CHAR.replace_all(&without_octets, "").into_owned()
}

/// Escape a value for use inside a double- or single-quoted HTML attribute.
pub fn esc_attr(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_block_is_removed_with_content() {
        assert_eq!(sanitize_text_field("<script>alert(1)</script>ok"), "ok");
        assert_eq!(strip_all_tags("<STYLE>p{}</STYLE>text"), "text");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(sanitize_text_field("How can I help you today?"), "How can I help you today?");
    }

    #[test]
    fn whitespace_is_collapsed_and_trimmed() {
        assert_eq!(sanitize_text_field("  a\n\tb   c \r\n"), "a b c");
    }

    #[test]
    fn unterminated_tag_is_removed() {
        assert_eq!(sanitize_text_field("hello <img src=x onerror=alert(1)"), "hello");
    }

    #[test]
    fn percent_octets_are_stripped() {
        assert_eq!(sanitize_text_field("a%3Cb c"), "ab c");
        assert_eq!(sanitize_text_field("x%2%414y"), "xy");
    }

    #[test]
    fn html_class_keeps_safe_characters_only() {
        assert_eq!(sanitize_html_class("my chat<script>"), "mychatscript");
        assert_eq!(sanitize_html_class("my-custom_chat2"), "my-custom_chat2");
        assert_eq!(sanitize_html_class("%22x"), "x");
    }

    #[test]
    fn attribute_values_are_escaped() {
        assert_eq!(esc_attr(r#"a"b'<c>&"#), "a&quot;b&#039;&lt;c&gt;&amp;");
    }
}
