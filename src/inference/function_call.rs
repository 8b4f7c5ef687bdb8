//! Function-call argument decoding.
//!
//! Argument text produced by models is not always valid JSON, so
//! [`decode_arguments`] applies a short list of client-side repairs before
//! giving up.

use serde_json::Value;

// ─── Argument decoding ───────────────────────────────────────────────────────

/// Decode JSON-encoded function arguments.
///
/// Empty argument text decodes to an empty object. Malformed text is run
/// through [`repair_malformed_json`]; `None` means it could not be salvaged.
pub fn decode_arguments(raw: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return Some(Value::Object(serde_json::Map::new()));
    }
    repair_malformed_json(raw)
}

/// Attempt to parse, repairing common model mistakes one at a time.
pub fn repair_malformed_json(raw: &str) -> Option<Value> {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        return Some(v);
    }

    let repairs: [fn(&str) -> String; 4] = [
        collapse_doubled_quotes,
        strip_trailing_commas,
        close_unbalanced_braces,
        strip_control_characters,
    ];

    // Each repair alone on the raw text first, so one repair cannot undo
    // text another would have accepted. Then all of them stacked.
    let single = repairs.iter().map(|repair| repair(raw));
    let stacked = std::iter::once(repairs.iter().fold(raw.to_string(), |acc, r| r(&acc)));

    let repaired = single
        .chain(stacked)
        .find_map(|candidate| serde_json::from_str::<Value>(&candidate).ok());
    if repaired.is_some() {
        tracing::debug!(raw_len = raw.len(), "repaired malformed function arguments");
    }
    repaired
}

/// `"key":""value"` → `"key":"value"`. A genuine empty string (`:""`
/// followed by whitespace, `,`, `}` or `]`) is left alone.
fn collapse_doubled_quotes(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let doubled = bytes[i] == b':'
            && bytes.get(i + 1) == Some(&b'"')
            && bytes.get(i + 2) == Some(&b'"')
            && matches!(
                bytes.get(i + 3),
                Some(b) if !matches!(b, b',' | b'}' | b']') && !b.is_ascii_whitespace()
            );
        if doubled {
            out.extend_from_slice(b":\"");
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(out).unwrap_or_else(|_| input.to_string())
}

/// Drop commas that directly precede `}` or `]`.
fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());

    for (i, &ch) in chars.iter().enumerate() {
        if ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(ch);
    }

    out
}

/// Append `}` for every `{` left open outside of string literals.
fn close_unbalanced_braces(input: &str) -> String {
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for ch in input.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => depth -= 1,
            _ => {}
        }
    }

    let mut out = input.to_string();
    for _ in 0..depth.max(0) {
        out.push('}');
    }
    out
}

/// Remove control characters other than `\n`, `\r`, `\t`.
fn strip_control_characters(input: &str) -> String {
    input
        .chars()
        .filter(|&c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
