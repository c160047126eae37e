//! Identifier conversion for generated library symbols.

use std::sync::LazyLock;

use regex::Regex;

/// Anything that is not a letter or digit separates words.
static WORD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid separator pattern"));

/// Split an identifier into lowercase words.
///
/// Words break on separators and on lower-to-upper case humps, so
/// `my-addon`, `my_addon` and `myAddon` all give `["my", "addon"]`.
fn words(input: &str) -> Vec<String> {
    let mut words = Vec::new();

    for chunk in WORD_SEPARATOR.split(input).filter(|c| !c.is_empty()) {
        let mut current = String::new();
        let mut prev_lower = false;
        for ch in chunk.chars() {
            if ch.is_ascii_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
            current.push(ch.to_ascii_lowercase());
        }
        if !current.is_empty() {
            words.push(current);
        }
    }

    words
}

/// Convert an identifier to camelCase.
pub fn camel_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (i, word) in words(input).iter().enumerate() {
        if i == 0 {
            out.push_str(word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// The global symbol a library export group is published under.
pub fn library_symbol(addon_key: &str, group: &str) -> String {
    format!("{}_{}", camel_case(addon_key), camel_case(group))
}
