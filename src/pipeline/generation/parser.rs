//! Response extraction: turn raw model text into a parsed JSON object.
//!
//! Models often wrap the document in prose or Markdown fences despite being
//! told not to. Extraction is two-stage: parse the whole text, then fall back
//! to scanning for a balanced `{...}` region. No attempt is made to repair
//! broken JSON.

use serde_json::{Map, Value};

use super::GenerationError;

/// Upper bound on balanced regions tried before giving up on the scanner.
const MAX_CANDIDATES: usize = 16;

/// Parse a model response into a JSON object.
///
/// Returns `GenerationError::Extraction` when the text contains no
/// brace-delimited region at all, and `GenerationError::Parse` when a region
/// was found but none of the candidates is valid JSON.
pub fn extract_document(raw: &str) -> Result<Map<String, Value>, GenerationError> {
    let trimmed = raw.trim();

    if let Ok(Value::Object(doc)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(doc);
    }

    let mut first_error: Option<serde_json::Error> = None;

    for candidate in balanced_objects(trimmed).take(MAX_CANDIDATES) {
        match parse_object(candidate) {
            Ok(doc) => return Ok(doc),
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    if let Some(candidate) = greedy_object_slice(trimmed) {
        match parse_object(candidate) {
            Ok(doc) => {
                tracing::debug!("Recovered model output with greedy brace slice");
                return Ok(doc);
            }
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(GenerationError::Parse(e.to_string())),
        None => Err(GenerationError::Extraction),
    }
}

fn parse_object(candidate: &str) -> Result<Map<String, Value>, serde_json::Error> {
    serde_json::from_str::<Map<String, Value>>(candidate)
}

/// Iterate top-level balanced `{...}` regions, left to right.
///
/// Scanning resumes after each region's closing brace, so objects nested
/// inside a region are never offered on their own. An opening brace that
/// never closes is skipped. Brace depth ignores braces inside JSON string
/// literals, honouring backslash escapes, so `"}"` inside a value does not
/// end the region early.
fn balanced_objects(text: &str) -> impl Iterator<Item = &str> {
    let mut pos = 0;
    std::iter::from_fn(move || {
        while let Some(found) = text[pos..].find('{') {
            let start = pos + found;
            match balanced_object_at(text, start) {
                Some(region) => {
                    pos = start + region.len();
                    return Some(region);
                }
                None => pos = start + 1,
            }
        }
        None
    })
}

fn balanced_object_at(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// First `{` to last `}`, inclusive.
fn greedy_object_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc_json() -> &'static str {
        r#"{"templateSlug":"startup","pages":[{"slug":"index","title":"Home","sections":[]}]}"#
    }

    #[test]
    fn pure_json_passes_through_unchanged() {
        let doc = extract_document(doc_json()).unwrap();
        let expected: Map<String, Value> = serde_json::from_str(doc_json()).unwrap();
        assert_eq!(doc, expected);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let doc = extract_document(&format!("\n\n  {}  \n", doc_json())).unwrap();
        assert_eq!(doc["templateSlug"], "startup");
    }

    #[test]
    fn prose_prefix_is_stripped() {
        let raw = format!("Sure! {}", doc_json());
        let doc = extract_document(&raw).unwrap();
        assert_eq!(
            Value::Object(doc),
            json!({
                "templateSlug": "startup",
                "pages": [{"slug": "index", "title": "Home", "sections": []}]
            })
        );
    }

    #[test]
    fn prose_on_both_sides_matches_direct_parse() {
        let raw = format!(
            "Here is your site:\n\n{}\n\nLet me know if you want changes.",
            doc_json()
        );
        let direct: Map<String, Value> = serde_json::from_str(doc_json()).unwrap();
        assert_eq!(extract_document(&raw).unwrap(), direct);
    }

    #[test]
    fn markdown_fence_is_stripped() {
        let raw = format!("```json\n{}\n```", doc_json());
        let doc = extract_document(&raw).unwrap();
        assert_eq!(doc["pages"][0]["slug"], "index");
    }

    #[test]
    fn no_brace_is_extraction_error() {
        let err = extract_document("I cannot help with that request.").unwrap_err();
        assert!(matches!(err, GenerationError::Extraction));
    }

    #[test]
    fn empty_output_is_extraction_error() {
        assert!(matches!(
            extract_document("").unwrap_err(),
            GenerationError::Extraction
        ));
    }

    #[test]
    fn unclosed_object_is_extraction_error() {
        let err = extract_document("Here you go: {\"templateSlug\": \"startup\"").unwrap_err();
        assert!(matches!(err, GenerationError::Extraction));
    }

    #[test]
    fn malformed_region_is_parse_error() {
        let err = extract_document("Result: {templateSlug: startup, pages: []}").unwrap_err();
        assert!(matches!(err, GenerationError::Parse(_)));
    }

    #[test]
    fn closing_brace_inside_string_does_not_end_region() {
        let raw = r#"Output: {"templateSlug":"a}b","pages":[{"slug":"x\"}","title":"T","sections":[]}]} done"#;
        let doc = extract_document(raw).unwrap();
        assert_eq!(doc["templateSlug"], "a}b");
        assert_eq!(doc["pages"][0]["slug"], "x\"}");
    }

    #[test]
    fn stray_brace_in_prose_before_json_is_skipped() {
        let raw = format!("Use {{placeholders}} sparingly. {}", doc_json());
        let doc = extract_document(&raw).unwrap();
        assert_eq!(doc["templateSlug"], "startup");
    }

    #[test]
    fn stray_closing_brace_after_json_is_ignored() {
        let raw = format!("{} }} trailing", doc_json());
        let doc = extract_document(&raw).unwrap();
        assert_eq!(doc["templateSlug"], "startup");
    }

    #[test]
    fn first_of_multiple_objects_wins() {
        let raw = r#"{"templateSlug":"first","pages":[]} and also {"templateSlug":"second","pages":[]}"#;
        let doc = extract_document(raw).unwrap();
        assert_eq!(doc["templateSlug"], "first");
    }

    #[test]
    fn top_level_array_is_not_a_document() {
        let err = extract_document("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, GenerationError::Extraction));
    }

    #[test]
    fn array_wrapping_an_object_yields_the_object() {
        let doc = extract_document(r#"[{"templateSlug":"startup","pages":[]}]"#).unwrap();
        assert_eq!(doc["templateSlug"], "startup");
    }

    #[test]
    fn balanced_scanner_handles_nested_objects() {
        let text = r#"x {"a":{"b":{"c":1}}} y"#;
        let regions: Vec<&str> = balanced_objects(text).collect();
        assert_eq!(regions, vec![r#"{"a":{"b":{"c":1}}}"#]);
    }

    #[test]
    fn scanner_resumes_after_each_region() {
        let text = r#"{"a":{"b":1}} then {"c":2}"#;
        let regions: Vec<&str> = balanced_objects(text).collect();
        assert_eq!(regions, vec![r#"{"a":{"b":1}}"#, r#"{"c":2}"#]);
    }

    #[test]
    fn malformed_outer_object_is_parse_error_not_inner_object() {
        let raw = r#"Here: {"templateSlug":"startup","pages":[{"slug":"index","title":"Home","sections":[]}],} done"#;
        let err = extract_document(raw).unwrap_err();
        assert!(matches!(err, GenerationError::Parse(_)));
    }

    #[test]
    fn greedy_slice_requires_ordered_braces() {
        assert_eq!(greedy_object_slice("} then {"), None);
        assert_eq!(greedy_object_slice("a {b} c"), Some("{b}"));
    }

    #[test]
    fn non_ascii_prose_is_handled() {
        let raw = format!("물론입니다! 다음은 사양입니다: {} 감사합니다", doc_json());
        let doc = extract_document(&raw).unwrap();
        assert_eq!(doc["pages"][0]["title"], "Home");
    }
}
