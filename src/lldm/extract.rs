//! # Response Extraction
//!
//! Pulls JSON payloads out of chatty model responses. Models like to wrap
//! their JSON in prose or markdown fences, so these helpers slice out the
//! outermost (or first flat) structure before it is handed to serde.

/// Slices from the first `{` to the last `}` inclusive.
///
/// # Examples
///
/// ```
/// use arcade_hub::lldm::extract::extract_json_object;
///
/// let text = "Sure! ```json\n{\"size\": 10, \"walls\": []}\n```";
/// assert_eq!(extract_json_object(text), Some("{\"size\": 10, \"walls\": []}"));
/// assert_eq!(extract_json_object("no json here"), None);
/// ```
pub fn extract_json_object(text: &str) -> Option<&str> {
    extract_between(text, '{', '}')
}

/// Slices from the first `[` to the last `]` inclusive.
pub fn extract_json_array(text: &str) -> Option<&str> {
    extract_between(text, '[', ']')
}

fn extract_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Finds the first object that contains no nested braces.
pub fn extract_flat_json_object(text: &str) -> Option<&str> {
    let mut open: Option<usize> = None;
    for (idx, ch) in text.char_indices() {
        match ch {
            '{' => open = Some(idx),
            '}' => {
                if let Some(start) = open {
                    return Some(&text[start..=idx]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Removes C0 and C1 control characters.
pub fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| {
            let code = *c as u32;
            !(code <= 0x1F || (0x7F..=0x9F).contains(&code))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_object_spans_nested() {
        let text = "prefix {\"a\": {\"b\": 1}} suffix";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn test_extract_array() {
        let text = "here you go: [{\"type\": \"banana\"}] enjoy";
        assert_eq!(extract_json_array(text), Some("[{\"type\": \"banana\"}]"));
        assert_eq!(extract_json_array("] backwards ["), None);
    }

    #[test]
    fn test_flat_object_skips_outer() {
        let text = "{\"outer\": {\"inner\": 1}, \"x\": 2}";
        assert_eq!(extract_flat_json_object(text), Some("{\"inner\": 1}"));
    }

    #[test]
    fn test_strip_control_chars() {
        assert_eq!(strip_control_chars("a\nb\tc\u{7f}d"), "abcd");
    }
}
