use once_cell::sync::Lazy;
use regex::Regex;

/// Header that opens the summary section of a structured reason.
pub const SUMMARY_MARKER: &str = "1. 요약문:";
/// Prefix put in front of an extracted summary.
pub const SUMMARY_PREFIX: &str = "요약문: ";
/// A line starting with any of these ends the summary section.
pub const SECTION_BOUNDARY_PREFIXES: &[&str] = &["2.", "3."];

static DEBUG_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[디버그 모드\]\s*").expect("debug marker pattern is valid"));

/// Reduce a category `reason` to its display form.
///
/// Debug annotations are removed everywhere. When the text carries a numbered
/// layout, only the summary section is kept; otherwise the cleaned text is
/// returned as is. Applying this to its own output is a no-op.
pub fn extract_summary(reason: &str) -> String {
    let cleaned = strip_debug_markers(reason);
    let Some(mut content) = summary_section(&cleaned) else {
        return cleaned;
    };
    while let Some(inner) = summary_section(content) {
        content = inner;
    }
    format!("{SUMMARY_PREFIX}{}", content.trim())
}

/// Remove every debug marker, including ones formed by an earlier removal.
pub fn strip_debug_markers(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = DEBUG_MARKER.replace_all(&current, "");
        if next.len() == current.len() {
            return current;
        }
        current = next.into_owned();
    }
}

fn summary_section(text: &str) -> Option<&str> {
    let start = text.find(SUMMARY_MARKER)? + SUMMARY_MARKER.len();
    let rest = &text[start..];

    let mut end = rest.len();
    let mut offset = 0;
    for (idx, line) in rest.split_inclusive('\n').enumerate() {
        if idx > 0 && starts_new_section(line) {
            end = offset;
            break;
        }
        offset += line.len();
    }
    Some(&rest[..end])
}

fn starts_new_section(line: &str) -> bool {
    let line = line.trim_start();
    SECTION_BOUNDARY_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}
