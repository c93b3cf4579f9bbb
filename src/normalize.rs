//! Turns the language model's comma-separated answer into landmark names.

use crate::{Error, Result};

const WRAPPING: &[char] = &['"', '\'', '`', '“', '”', '‘', '’', '«', '»'];
const BULLETS: &[char] = &['*', '-', '•', '·', '–'];

/// Split `raw_text` on commas, clean every entry and keep at most `max_count`.
///
/// Duplicates are kept. Fails with [`Error::EmptyResult`] when nothing usable
/// is left.
pub fn normalize(raw_text: &str, max_count: usize) -> Result<Vec<String>> {
    let names: Vec<String> = raw_text
        .split(',')
        .map(clean_name)
        .filter(|name| !name.is_empty())
        .take(max_count)
        .map(str::to_owned)
        .collect();

    if names.is_empty() {
        return Err(Error::EmptyResult);
    }
    log::debug!("normalized {} landmark names", names.len());
    Ok(names)
}

/// Strip whitespace, quotes, bullets and list numbering until nothing changes.
fn clean_name(entry: &str) -> &str {
    let mut current = entry;
    loop {
        let next = strip_enumerator(
            current
                .trim()
                .trim_matches(WRAPPING)
                .trim_start_matches(BULLETS)
                .trim(),
        );
        if next == current {
            return next;
        }
        current = next;
    }
}

/// `"3. Louvre"` or `"3) Louvre"` becomes `"Louvre"`.
fn strip_enumerator(entry: &str) -> &str {
    let digits = entry.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return entry;
    }
    let rest = &entry[digits..];
    match rest.strip_prefix(['.', ')']) {
        Some(after) if after.starts_with(char::is_whitespace) => after.trim_start(),
        _ => entry,
    }
}
