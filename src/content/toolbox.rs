//! Text helpers used on the save path.

use regex::Regex;

lazy_static::lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_ALPHANUMERIC_RUN: Regex = Regex::new(r"[^a-zA-Z0-9]+").unwrap();
}

/// Strip tags from an HTML fragment and truncate the plain text to `characters`
/// without splitting a word. A single word longer than the budget yields "".
pub fn truncate_html_text(text: &str, characters: usize) -> String {
    let text = HTML_TAG.replace_all(text, " ");
    let text = text.replace('\r', "");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() <= characters {
        return text.to_string();
    }

    let head: String = text.chars().take(characters).collect();

    // The character right after the budget being a space means the last word fits
    if text.chars().nth(characters).is_some_and(char::is_whitespace) {
        return head;
    }

    match head.rfind(' ') {
        Some(pos) => head[..pos].to_string(),
        None => String::new(),
    }
}

/// Turn free text into a URL slug.
pub fn clean_url(value: &str) -> String {
    let value = value.replace('&', "and").replace('/', "-").replace('\'', "");
    let value = NON_ALPHANUMERIC_RUN.replace_all(&value, "-");

    value.to_lowercase().trim_matches('-').to_string()
}
