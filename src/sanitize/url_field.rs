// src/sanitize/url_field.rs
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static ENCODED_LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)%0[ad]").expect("line break pattern"));

const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

fn is_url_char(c: char) -> bool {
    !c.is_ascii()
        || c.is_ascii_alphanumeric()
        || "-~+_.?#=!&;,/:%@$|*'()[]".contains(c)
}

/// Normalize an admin-entered URL.
///
/// Returns an empty string when the input cannot be turned into an absolute
/// `http`/`https` URL with a host.
pub fn sanitize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut cleaned: String = trimmed
        .replace(' ', "%20")
        .chars()
        .filter(|c| is_url_char(*c))
        .collect();

    // Encoded CR/LF would otherwise survive into header values. Removing one
    // can splice its neighbours into another ("%0%0Ad").
    while ENCODED_LINE_BREAK.is_match(&cleaned) {
        cleaned = ENCODED_LINE_BREAK.replace_all(&cleaned, "").into_owned();
    }

    if !cleaned.contains(':') && !cleaned.starts_with(&['/', '#', '?'][..]) {
        cleaned.insert_str(0, "http://");
    }

    match Url::parse(&cleaned) {
        Ok(url) if ALLOWED_SCHEMES.contains(&url.scheme()) && url.host_str().is_some() => cleaned,
        _ => String::new(),
    }
}
