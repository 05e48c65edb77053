//! JSON repair pipeline (C3): recovers a well-formed JSON value from raw LLM
//! text output. Applies an ordered sequence of repair passes, re-attempting
//! a strict parse after each one, before giving up.

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::domain::error::ExtractionError;

/// Strip leading/trailing whitespace and markdown code fences, with or
/// without a language tag. Does not yet locate the JSON payload within the
/// remaining text - that is [`locate_candidate`]'s job, run after the
/// quoted-string-unwrap check.
fn strip_fences(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Some(rest) = trimmed.strip_prefix("```json") {
        if let Some(end) = rest.rfind("```") {
            return rest[..end].trim().to_string();
        }
    }
    if let Some(rest) = trimmed.strip_prefix("```") {
        if let Some(end) = rest.rfind("```") {
            return rest[..end].trim().to_string();
        }
    }

    trimmed.to_string()
}

/// Locate the first `{` or `[` and treat the substring up to the matching
/// last `}`/`]` as the JSON payload, discarding surrounding prose.
fn locate_candidate(text: &str) -> String {
    let looks_like_object = text.starts_with('{') && text.ends_with('}');
    let looks_like_array = text.starts_with('[') && text.ends_with(']');
    if looks_like_object || looks_like_array {
        return text.to_string();
    }

    let object_span = text.find('{').zip(text.rfind('}'));
    let array_span = text.find('[').zip(text.rfind(']'));
    match (object_span, array_span) {
        (Some((os, oe)), Some((as_, ae))) if os <= as_ => {
            if oe > os { text[os..=oe].to_string() } else if ae > as_ { text[as_..=ae].to_string() } else { text.to_string() }
        }
        (Some((os, oe)), _) if oe > os => text[os..=oe].to_string(),
        (_, Some((as_, ae))) if ae > as_ => text[as_..=ae].to_string(),
        _ => text.to_string(),
    }
}

/// Replace raw control characters that appear inside string literals with
/// their escaped equivalents, since a literal newline or tab inside a JSON
/// string is invalid.
fn sanitize_control_chars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;
    for ch in input.chars() {
        if in_string {
            match ch {
                '\\' if !escaped => {
                    escaped = true;
                    out.push(ch);
                    continue;
                }
                '"' if !escaped => in_string = false,
                '\n' if !escaped => {
                    out.push_str("\\n");
                    continue;
                }
                '\r' if !escaped => {
                    out.push_str("\\r");
                    continue;
                }
                '\t' if !escaped => {
                    out.push_str("\\t");
                    continue;
                }
                _ => {}
            }
        } else if ch == '"' {
            in_string = true;
        }
        escaped = false;
        out.push(ch);
    }
    out
}

/// Double a backslash that precedes a character that isn't a valid JSON
/// escape, so the parser treats it as a literal backslash rather than
/// failing. `\uXXXX` is only accepted when exactly four hex digits follow;
/// a bare `\u` from, say, a Windows path fragment is doubled like any other
/// invalid escape.
fn fix_invalid_escapes(input: &str) -> String {
    let simple_valid = ['"', '\\', '/', 'b', 'f', 'n', 'r', 't'];
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' && i + 1 < chars.len() {
            let next = chars[i + 1];
            if simple_valid.contains(&next) {
                out.push(ch);
                out.push(next);
                i += 2;
                continue;
            }
            if next == 'u' && i + 5 < chars.len() && chars[i + 2..i + 6].iter().all(|c| c.is_ascii_hexdigit()) {
                out.push(ch);
                out.push(next);
                i += 2;
                continue;
            }
            out.push('\\');
            out.push('\\');
            i += 1;
            continue;
        }
        out.push(ch);
        i += 1;
    }
    out
}

/// Fix a stray space inside a decimal literal, e.g. `0. 9` -> `0.9`.
fn fix_decimal_typo(input: &str) -> String {
    let re = Regex::new(r"(\d)\.\s+(\d)").expect("static regex");
    re.replace_all(input, "$1.$2").into_owned()
}

/// Insert a missing comma between two values separated only by whitespace
/// across a line break, a common truncated-generation artifact.
fn insert_missing_commas(input: &str) -> String {
    let re = Regex::new(r#"([\]}"\d])(\s*\n\s*)(["\{\[])"#).expect("static regex");
    re.replace_all(input, "$1,$2$3").into_owned()
}

/// Remove a trailing comma immediately before a closing bracket or brace.
fn remove_trailing_commas(input: &str) -> String {
    let re = Regex::new(r",(\s*[\]}])").expect("static regex");
    re.replace_all(input, "$1").into_owned()
}

/// Convert single-quoted strings to double-quoted, only when the payload
/// carries no double quotes at all (otherwise converting risks corrupting
/// apostrophes inside already-valid double-quoted strings).
fn convert_single_quotes(input: &str) -> String {
    if input.contains('"') {
        return input.to_string();
    }
    input.replace('\'', "\"")
}

/// Quote a bare identifier used as an object key, e.g. `{status: "ok"}` ->
/// `{"status": "ok"}`.
fn quote_bare_words(input: &str) -> String {
    let re = Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)(\s*:)").expect("static regex");
    re.replace_all(input, "$1\"$2\"$3").into_owned()
}

/// Quote a bare-word or semver-range *value* that isn't `true`/`false`/
/// `null`, e.g. `{"status": ok}` -> `{"status": "ok"}` and
/// `{"range": ^1.0.0}` -> `{"range": "^1.0.0"}`.
fn quote_bare_values(input: &str) -> String {
    let re = Regex::new(r#"(:\s*)([A-Za-z\^~<>=][A-Za-z0-9_.\->=^~]*)(\s*[,}\]])"#).expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let word = &caps[2];
        if word == "true" || word == "false" || word == "null" {
            return caps[0].to_string();
        }
        let is_plain_word = Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("static regex").is_match(word);
        let is_semver_range = Regex::new(r"^[\^~]?[><=]*\d+(\.\d+)*(-[A-Za-z0-9.]+)?$")
            .expect("static regex")
            .is_match(word);
        if is_plain_word || is_semver_range {
            format!("{}\"{word}\"{}", &caps[1], &caps[3])
        } else {
            caps[0].to_string()
        }
    })
    .into_owned()
}

const REPAIR_PASSES: &[fn(&str) -> String] = &[
    sanitize_control_chars,
    fix_invalid_escapes,
    fix_decimal_typo,
    insert_missing_commas,
    remove_trailing_commas,
    convert_single_quotes,
    quote_bare_words,
    quote_bare_values,
];

/// Balance unmatched quotes and brackets left by a truncated generation, by
/// closing whatever was left open at the point the text ends.
fn fix_truncation(input: &str) -> Option<String> {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for ch in input.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.pop().is_none() {
                    return None;
                }
            }
            _ => {}
        }
    }

    if !in_string && stack.is_empty() {
        // Nothing was left open - this input isn't a truncation case, so
        // say so rather than hand back an unchanged (still unparseable)
        // string that the caller would mistake for a truncation failure.
        return None;
    }

    let mut repaired = input.to_string();
    if in_string {
        repaired.push('"');
    }
    while let Some(closer) = stack.pop() {
        repaired.push(closer);
    }
    Some(repaired)
}

/// Recover and deserialize a `T` from raw, possibly malformed, LLM text
/// output. Tries a strict parse first, then applies repair passes
/// cumulatively, then attempts a truncation fix as a last resort.
pub fn extract<T: DeserializeOwned>(raw: &str) -> Result<T, ExtractionError> {
    extract_inner(raw, true)
}

fn extract_inner<T: DeserializeOwned>(raw: &str, allow_unquote_recursion: bool) -> Result<T, ExtractionError> {
    let fence_stripped = strip_fences(raw);
    if fence_stripped.is_empty() {
        return Err(ExtractionError::NoJsonFound);
    }

    // The whole cleaned payload is itself a JSON-quoted string (the model
    // wrapped its JSON answer in an extra layer of string quoting) - unwrap
    // once and recurse into the unquoted content, before brace-locating
    // would otherwise strip the outer quotes and leave stray backslashes.
    if allow_unquote_recursion && fence_stripped.starts_with('"') && fence_stripped.ends_with('"') && fence_stripped.len() >= 2
    {
        if let Ok(unquoted) = serde_json::from_str::<String>(&fence_stripped) {
            if let Ok(value) = extract_inner(&unquoted, false) {
                return Ok(value);
            }
        }
    }

    let located = locate_candidate(&fence_stripped);
    if located.is_empty() {
        return Err(ExtractionError::NoJsonFound);
    }

    if let Ok(value) = serde_json::from_str(&located) {
        return Ok(value);
    }

    let mut candidate = located.clone();
    for pass in REPAIR_PASSES {
        candidate = pass(&candidate);
        if let Ok(value) = serde_json::from_str(&candidate) {
            return Ok(value);
        }
    }

    let mut truncation_failed = false;
    if let Some(balanced) = fix_truncation(&candidate) {
        if let Ok(value) = serde_json::from_str(&balanced) {
            return Ok(value);
        }
        truncation_failed = true;
    }

    // Last resort: some generations escape quotes/newlines as if the whole
    // JSON body were itself embedded in a string literal. Unescape and
    // retry, both as-is and through the repair pipeline.
    let unescaped = located.replace("\\\"", "\"").replace("\\n", "\n");
    if unescaped != located {
        if let Ok(value) = serde_json::from_str(&unescaped) {
            return Ok(value);
        }
        let mut candidate = unescaped;
        for pass in REPAIR_PASSES {
            candidate = pass(&candidate);
            if let Ok(value) = serde_json::from_str(&candidate) {
                return Ok(value);
            }
        }
    }

    if truncation_failed {
        return Err(ExtractionError::TruncatedBeyondRepair);
    }
    Err(ExtractionError::UnrepairableJson(candidate))
}
