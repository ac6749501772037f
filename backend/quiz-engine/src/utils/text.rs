/// Placeholder stored in results and log events when a question was left blank.
pub const NO_ANSWER: &str = "(Non hai risposto)";

/// Answer comparison shared by every quiz mode: surrounding whitespace is
/// ignored and the comparison is case-insensitive. Punctuation is significant.
pub fn answers_match(given: &str, expected: &str) -> bool {
    given.trim().to_lowercase() == expected.trim().to_lowercase()
}

/// Turns a bank file name into a human readable module name,
/// e.g. `radio_protezione_final.json` -> `Radio Protezione`.
pub fn module_display_name(file: &str) -> String {
    module_key(file)
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strips the bank file suffix, e.g. `farmacologia_final.json` -> `farmacologia`.
pub fn module_key(file: &str) -> &str {
    let stem = file.strip_suffix(".json").unwrap_or(file);
    stem.strip_suffix("_final").unwrap_or(stem)
}
