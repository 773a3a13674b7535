//! Token naming per transform group.

use crate::config::TransformGroup;
use crate::tree::TokenPath;

/// Output name of the token at `path` under `group`.
pub fn token_name(group: TransformGroup, path: &TokenPath) -> String {
    match group {
        TransformGroup::Css => kebab_case(path),
        TransformGroup::Js => pascal_case(path),
    }
}

/// `colors.borderRadius.700` -> `colors-border-radius-700`
pub fn kebab_case(path: &TokenPath) -> String {
    words(path).join("-")
}

/// `colors.borderRadius.700` -> `ColorsBorderRadius700`. A name that would start with a digit
/// gets a leading `_` so it stays a valid identifier.
pub fn pascal_case(path: &TokenPath) -> String {
    let name: String = words(path)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}

/// Lowercased words of every segment. Words break on any non-alphanumeric character and on
/// case changes (`borderRadius`, `XMLHttp`).
fn words(path: &TokenPath) -> Vec<String> {
    let mut words = Vec::new();
    for segment in path.segments() {
        let chars: Vec<char> = segment.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            if !c.is_alphanumeric() {
                flush(&mut current, &mut words);
                continue;
            }
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = c.is_uppercase()
                && prev.is_some_and(|p| {
                    p.is_lowercase()
                        || p.is_ascii_digit()
                        || (p.is_uppercase() && next.is_some_and(char::is_lowercase))
                });
            if boundary {
                flush(&mut current, &mut words);
            }
            current.extend(c.to_lowercase());
        }
        flush(&mut current, &mut words);
    }
    words
}

fn flush(current: &mut String, words: &mut Vec<String>) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}
