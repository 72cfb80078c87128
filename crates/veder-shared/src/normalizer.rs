//! Response normalizer: tolerant repair of model text into a JSON document.
//!
//! The model is asked for single-line JSON but routinely returns it wrapped in
//! code fences or prose, with missing commas, trailing commas, or `...`
//! placeholders. Normalization is an ordered pipeline of pure text passes
//! followed by one parse:
//!
//! 1. strip code fences
//! 2. slice from the first `{` to the last `}`
//! 3. collapse newlines, carriage returns and tabs to spaces
//! 4. insert missing commas between adjacent structural tokens
//! 5. strip trailing commas before `}` or `]`
//! 6. elide `...` placeholders
//! 7. parse
//!
//! Multi-line string values are not supported: step 3 flattens them.
//! Step 4 can misfire on string values that end in a structural pair such as
//! `]"`; the passes are heuristic and kept that way.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::error::{Result, VederError};

/// A named text-repair pass
#[derive(Clone, Copy)]
pub struct RepairPass {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

/// Passes applied after slicing, in order
pub const REPAIR_PASSES: &[RepairPass] = &[
    RepairPass {
        name: "collapse_control_whitespace",
        apply: collapse_control_whitespace,
    },
    RepairPass {
        name: "insert_missing_delimiters",
        apply: insert_missing_delimiters,
    },
    RepairPass {
        name: "strip_trailing_commas",
        apply: strip_trailing_commas,
    },
    RepairPass {
        name: "elide_ellipses",
        apply: elide_ellipses,
    },
];

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_+\-]*").unwrap());

/// Adjacent structural tokens that need a comma between them
static MISSING_DELIMITERS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"\}(\s*)\{").unwrap(), "}, ${1}{"),
        (Regex::new(r"\](\s*)\[").unwrap(), "], ${1}["),
        (Regex::new(r"\](\s*)\{").unwrap(), "], ${1}{"),
        (Regex::new(r"\}(\s*)\[").unwrap(), "}, ${1}["),
        (Regex::new(r#"\](\s*)""#).unwrap(), r#"], ${1}""#),
        (Regex::new(r#"\}(\s*)""#).unwrap(), r#"}, ${1}""#),
        (Regex::new(r#""(\s*)\{"#).unwrap(), r#"", ${1}{"#),
        (Regex::new(r#""(\s*)\["#).unwrap(), r#"", ${1}["#),
    ]
});

static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",(\s*[}\]])").unwrap());

static QUOTED_ELLIPSIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""\.\.\.""#).unwrap());
static LISTED_ELLIPSIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*\.\.\.").unwrap());
static BARE_ELLIPSIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\.\.").unwrap());

/// Normalize raw model text into a parsed JSON value.
///
/// Fails only with `VederError::MalformedResponse`.
pub fn normalize(raw: &str) -> Result<Value> {
    let repaired = repair(raw)?;
    parse_document(&repaired)
}

/// Run every text pass and return the repaired JSON text without parsing
pub fn repair(raw: &str) -> Result<String> {
    let unfenced = strip_code_fences(raw);
    let sliced = slice_outer_object(&unfenced).ok_or_else(|| {
        warn!("Normalizer: no JSON object boundaries in {} bytes", raw.len());
        VederError::malformed("no JSON object found", raw)
    })?;

    let mut text = sliced.to_string();
    for pass in REPAIR_PASSES {
        let next = (pass.apply)(&text);
        if next != text {
            debug!("Normalizer: pass {} rewrote {} -> {} bytes", pass.name, text.len(), next.len());
        }
        text = next;
    }
    Ok(text)
}

/// Delete code-fence markers, with or without a language tag
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").into_owned()
}

/// Slice from the first `{` to the last `}` inclusive
pub fn slice_outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}

pub fn collapse_control_whitespace(text: &str) -> String {
    text.chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .collect()
}

/// Insert commas between adjacent `}{`, `][`, `]{`, `}[`, `]"`, `}"`, `"{`, `"[`
pub fn insert_missing_delimiters(text: &str) -> String {
    MISSING_DELIMITERS
        .iter()
        .fold(text.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}

pub fn strip_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

/// Replace `"..."` with `null` and drop bare `...` placeholders
pub fn elide_ellipses(text: &str) -> String {
    let text = QUOTED_ELLIPSIS.replace_all(text, "null");
    let text = LISTED_ELLIPSIS.replace_all(&text, "");
    BARE_ELLIPSIS.replace_all(&text, "").into_owned()
}

/// Parse repaired text.
///
/// Two top-level objects joined by the delimiter pass (`{..}, {..}`) are not
/// a JSON document on their own; they are recovered as an array.
pub fn parse_document(text: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(first) => match serde_json::from_str::<Value>(&format!("[{}]", text)) {
            Ok(value @ Value::Array(_)) => {
                debug!("Normalizer: recovered top-level object sequence as array");
                Ok(value)
            }
            _ => {
                warn!("Normalizer: parse failed: {}", first);
                Err(VederError::malformed(first.to_string(), text))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_fences_with_and_without_tag() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "\n{}\n");
        assert_eq!(strip_code_fences("```\n{}\n```"), "\n{}\n");
        assert_eq!(strip_code_fences("{}"), "{}");
    }

    #[test]
    fn test_slice_requires_ordered_braces() {
        assert_eq!(slice_outer_object("note: {\"a\":1} end"), Some("{\"a\":1}"));
        assert_eq!(slice_outer_object("} backwards {"), None);
        assert_eq!(slice_outer_object("no braces"), None);
    }

    #[test]
    fn test_collapse_control_whitespace() {
        assert_eq!(collapse_control_whitespace("a\nb\r\nc\td"), "a b  c d");
    }

    #[test]
    fn test_insert_missing_delimiters_each_pair() {
        assert_eq!(insert_missing_delimiters("}{"), "}, {");
        assert_eq!(insert_missing_delimiters("]["), "], [");
        assert_eq!(insert_missing_delimiters("]{"), "], {");
        assert_eq!(insert_missing_delimiters("}["), "}, [");
        assert_eq!(insert_missing_delimiters("]\"a\""), "], \"a\"");
        assert_eq!(insert_missing_delimiters("} \"a\""), "},  \"a\"");
        assert_eq!(insert_missing_delimiters("\"a\"{"), "\"a\", {");
        assert_eq!(insert_missing_delimiters("\"a\"["), "\"a\", [");
    }

    #[test]
    fn test_insert_missing_delimiters_leaves_valid_json() {
        let valid = r#"{"a":[{"b":1},{"c":[1,2]}],"d":{"e":"f"}}"#;
        assert_eq!(insert_missing_delimiters(valid), valid);
    }

    #[test]
    fn test_strip_trailing_commas() {
        assert_eq!(strip_trailing_commas(r#"{"a":[1,2,],}"#), r#"{"a":[1,2]}"#);
        assert_eq!(strip_trailing_commas("[1, ]"), "[1 ]");
    }

    #[test]
    fn test_elide_ellipses() {
        assert_eq!(elide_ellipses(r#"{"price":"..."}"#), r#"{"price":null}"#);
        assert_eq!(elide_ellipses("[1, 2, ...]"), "[1, 2]");
    }

    #[test]
    fn test_missing_comma_between_array_items() {
        let value = normalize(r#"{"items":[{"a":1}{"a":2}]}"#).unwrap();
        assert_eq!(value, json!({"items":[{"a":1},{"a":2}]}));
    }

    #[test]
    fn test_missing_comma_after_nested_object() {
        let value = normalize(r#"{"a":{"b":1} "c":2}"#).unwrap();
        assert_eq!(value, json!({"a":{"b":1},"c":2}));
    }

    #[test]
    fn test_no_brace_is_malformed() {
        let err = normalize("the model refused").unwrap_err();
        assert!(matches!(err, VederError::MalformedResponse { .. }));
    }

    #[test]
    fn test_unparseable_is_malformed_with_snippet() {
        let err = normalize(r#"{"a": tru}"#).unwrap_err();
        match err {
            VederError::MalformedResponse { snippet, .. } => assert!(snippet.contains("tru")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_adjacent_top_level_objects_become_array() {
        let value = normalize(r#"{"a":1}{"b":2}"#).unwrap();
        assert_eq!(value, json!([{"a":1},{"b":2}]));
    }
}
