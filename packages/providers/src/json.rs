use crate::error::AiError;

/// Strip markdown code fences, stray control characters and surrounding
/// noise from a model completion so it can be parsed as JSON.
///
/// Models regularly wrap their answer in ```json fences or emit raw control
/// bytes; both break serde_json.
pub fn clean_response(raw: &str) -> String {
    let mut text = raw.trim();

    for prefix in ["```json", "```JSON", "```"] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest;
            break;
        }
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
        .collect()
}

/// Parse a completion into a JSON object.
///
/// Cleans first, then parses; when the object is embedded in surrounding
/// prose, falls back to the window between the first `{` and the last `}`.
pub fn parse_json_object(raw: &str) -> Result<serde_json::Value, AiError> {
    let cleaned = clean_response(raw);

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&cleaned) {
        if value.is_object() {
            return Ok(value);
        }
    }

    let start = cleaned.find('{');
    let end = cleaned.rfind('}');
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&cleaned[start..=end]) {
                if value.is_object() {
                    return Ok(value);
                }
            }
        }
    }

    Err(AiError::Validation(format!(
        "completion was not a JSON object: {}",
        snippet(&cleaned)
    )))
}

/// First 120 characters, for error messages.
fn snippet(text: &str) -> String {
    const LEN: usize = 120;
    if text.chars().count() <= LEN {
        text.to_string()
    } else {
        let cut: String = text.chars().take(LEN).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_object_passes_through() {
        let value = parse_json_object(r#"{"topics": []}"#).unwrap();
        assert!(value["topics"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_fenced_object_is_unwrapped() {
        let raw = "```json\n{\"title\": \"Hello\"}\n```";
        let value = parse_json_object(raw).unwrap();
        assert_eq!(value["title"], "Hello");
    }

    #[test]
    fn test_bare_fence_is_unwrapped() {
        let raw = "```\n{\"title\": \"Hello\"}\n```";
        let value = parse_json_object(raw).unwrap();
        assert_eq!(value["title"], "Hello");
    }

    #[test]
    fn test_control_characters_are_scrubbed() {
        let raw = "{\"title\": \"He\u{0001}llo\"}";
        let value = parse_json_object(raw).unwrap();
        assert_eq!(value["title"], "Hello");
    }

    #[test]
    fn test_embedded_object_is_extracted() {
        let raw = "Sure! Here is the JSON you asked for:\n{\"title\": \"X\"}\nHope it helps.";
        let value = parse_json_object(raw).unwrap();
        assert_eq!(value["title"], "X");
    }

    #[test]
    fn test_newlines_inside_strings_survive_cleaning() {
        let raw = "{\"content\": \"line one\\nline two\"}";
        let value = parse_json_object(raw).unwrap();
        assert_eq!(value["content"], "line one\nline two");
    }

    #[test]
    fn test_non_object_fails_validation() {
        let err = parse_json_object("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, AiError::Validation(_)));
    }

    #[test]
    fn test_prose_fails_validation() {
        let err = parse_json_object("I could not produce topics today.").unwrap_err();
        assert!(matches!(err, AiError::Validation(_)));
    }
}
