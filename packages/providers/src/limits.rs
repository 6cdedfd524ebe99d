use common::status::SIMPLE_POST_CHAR_LIMIT;

use crate::error::AiError;

/// Truncate `content` to at most `limit` characters, preferring the last
/// sentence boundary (`.`, `!`, `?` or a newline) that fits. Falls back to a
/// hard cut when no boundary exists. Content already within the limit is
/// returned unchanged.
pub fn truncate_at_sentence(content: &str, limit: usize) -> String {
    if content.chars().count() <= limit {
        return content.to_string();
    }
    match boundary_within(content, 0, limit) {
        Some(prefix) => prefix,
        None => hard_cut(content, limit),
    }
}

/// Enforce the simple-post cap on freshly generated content.
pub fn enforce_simple_cap(content: &str) -> String {
    truncate_at_sentence(content, SIMPLE_POST_CHAR_LIMIT)
}

/// Enforce the simple-post cap on improved content without shrinking it
/// below the original length.
///
/// Improvement is monotonic for simple posts: the result always has at
/// least `original_len` and at most [`SIMPLE_POST_CHAR_LIMIT`] characters.
/// A provider response already shorter than the original is rejected as a
/// validation failure so the attempt can be retried.
pub fn enforce_improved_cap(content: &str, original_len: usize) -> Result<String, AiError> {
    let limit = SIMPLE_POST_CHAR_LIMIT;
    let floor = original_len.min(limit);
    let len = content.chars().count();

    if len < floor {
        return Err(AiError::Validation(format!(
            "improved content shrank from {floor} to {len} characters"
        )));
    }
    if len <= limit {
        return Ok(content.to_string());
    }
    match boundary_within(content, floor, limit) {
        Some(prefix) => Ok(prefix),
        None => Ok(hard_cut(content, limit)),
    }
}

/// Longest prefix ending at a sentence boundary whose trimmed length lies
/// in `[floor, limit]`.
fn boundary_within(content: &str, floor: usize, limit: usize) -> Option<String> {
    let mut best: Option<String> = None;
    for (count, (idx, ch)) in content.char_indices().enumerate() {
        let chars_inclusive = count + 1;
        if chars_inclusive > limit {
            break;
        }
        if matches!(ch, '.' | '!' | '?' | '\n') {
            let prefix = content[..idx + ch.len_utf8()].trim_end();
            let prefix_len = prefix.chars().count();
            if prefix_len >= floor && prefix_len <= limit && !prefix.is_empty() {
                best = Some(prefix.to_string());
            }
        }
    }
    best
}

fn hard_cut(content: &str, limit: usize) -> String {
    content.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content_is_unchanged() {
        assert_eq!(truncate_at_sentence("Short post.", 1300), "Short post.");
    }

    #[test]
    fn test_truncates_at_last_fitting_sentence() {
        let content = format!("First. Second. {}", "x".repeat(2000));
        let out = truncate_at_sentence(&content, 1300);
        assert_eq!(out, "First. Second.");
    }

    #[test]
    fn test_hard_cut_without_boundaries() {
        let content = "y".repeat(2000);
        let out = truncate_at_sentence(&content, 1300);
        assert_eq!(out.chars().count(), 1300);
    }

    #[test]
    fn test_newline_counts_as_boundary() {
        let content = format!("Intro line\n{}", "z".repeat(2000));
        let out = truncate_at_sentence(&content, 1300);
        assert_eq!(out, "Intro line");
    }

    #[test]
    fn test_generated_cap_is_exactly_1300() {
        let out = enforce_simple_cap(&"a".repeat(5000));
        assert_eq!(out.chars().count(), SIMPLE_POST_CHAR_LIMIT);
    }

    #[test]
    fn test_improve_rejects_shrunk_content() {
        let err = enforce_improved_cap("tiny", 100).unwrap_err();
        assert!(matches!(err, AiError::Validation(_)));
    }

    #[test]
    fn test_improve_keeps_content_within_cap() {
        let improved = "b".repeat(1200);
        let out = enforce_improved_cap(&improved, 100).unwrap();
        assert_eq!(out.chars().count(), 1200);
    }

    #[test]
    fn test_improve_never_lands_below_the_original_length() {
        // The only boundary sits below the floor, forcing the hard cut.
        let improved = format!("Short. {}", "c".repeat(3000));
        let out = enforce_improved_cap(&improved, 1250).unwrap();
        let len = out.chars().count();
        assert!(len >= 1250, "len {len} fell below the floor");
        assert!(len <= SIMPLE_POST_CHAR_LIMIT);
    }

    #[test]
    fn test_improve_prefers_boundary_inside_the_window() {
        let head = "d".repeat(1100);
        let improved = format!("{head}. {}", "e".repeat(1000));
        let out = enforce_improved_cap(&improved, 800).unwrap();
        assert_eq!(out.chars().count(), 1101);
        assert!(out.ends_with('.'));
    }

    #[test]
    fn test_floor_above_limit_is_clamped() {
        let improved = "f".repeat(2000);
        let out = enforce_improved_cap(&improved, 1400).unwrap();
        assert_eq!(out.chars().count(), SIMPLE_POST_CHAR_LIMIT);
    }
}
