//! Response Cleaner
//!
//! Normalizes raw model output before further use: strips wrapping code
//! fences, leading answer labels, and wrapping quotes. Total and
//! deterministic over any input; repeated application is a fixpoint, so
//! `clean(clean(x)) == clean(x)`.

/// Labels models sometimes prefix to an answer despite instructions.
const ANSWER_LABELS: &[&str] = &["markdown:", "answer:", "output:", "response:", "result:"];

/// Normalize raw model output. Never fails; worst case returns the
/// trimmed input.
pub fn clean(raw: &str) -> String {
    let mut text = raw.trim().to_string();

    // Iterate to a fixpoint: stripping one wrapper can expose another
    // (a fenced block inside quotes, a label above a fence).
    loop {
        let stripped = strip_once(&text);
        if stripped == text {
            return text;
        }
        text = stripped;
    }
}

fn strip_once(text: &str) -> String {
    let mut out = text.trim();

    out = strip_label(out);
    let fenced = strip_fence(out);
    let quoted = strip_quotes(&fenced);

    quoted.trim().to_string()
}

/// Strip a single leading answer label line or prefix.
fn strip_label(text: &str) -> &str {
    let lower = text.to_lowercase();
    for label in ANSWER_LABELS {
        if lower.starts_with(label) {
            return text[label.len()..].trim_start();
        }
    }
    text
}

/// Strip a code fence that wraps the entire payload, tolerating an
/// optional language tag on the opening fence. Fences wrapping only part
/// of the text are left alone.
fn strip_fence(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() < 2 {
        return trimmed.to_string();
    }

    // Closing fence must be the final line, otherwise the fence is interior
    let last = lines[lines.len() - 1].trim();
    if last != "```" {
        return trimmed.to_string();
    }

    // Interior closing fences mean the payload holds its own code blocks
    let interior_fences = lines[1..lines.len() - 1]
        .iter()
        .filter(|l| l.trim().starts_with("```"))
        .count();
    if interior_fences > 0 {
        return trimmed.to_string();
    }

    lines.pop();
    lines.remove(0);
    lines.join("\n")
}

/// Strip one pair of quotes wrapping the whole payload.
fn strip_quotes(text: &str) -> String {
    let trimmed = text.trim();
    let bytes = trimmed.as_bytes();
    if trimmed.len() >= 2 {
        let first = bytes[0];
        let last = bytes[trimmed.len() - 1];
        if first == last && (first == b'"' || first == b'\'') {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(clean("A simple overview."), "A simple overview.");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(clean("  text  \n"), "text");
    }

    #[test]
    fn test_strips_wrapping_fence() {
        assert_eq!(clean("```\nhello\n```"), "hello");
        assert_eq!(clean("```markdown\n# Title\nBody\n```"), "# Title\nBody");
    }

    #[test]
    fn test_keeps_interior_fences() {
        let text = "Intro\n```python\nprint('hi')\n```\nOutro";
        assert_eq!(clean(text), text);
    }

    #[test]
    fn test_keeps_payload_with_own_code_blocks() {
        let text = "```markdown\nUse:\n```sh\nrun\n```\n```";
        // Whole-payload fence is ambiguous here; leave untouched
        assert_eq!(clean(text), text);
    }

    #[test]
    fn test_strips_answer_label() {
        assert_eq!(clean("Answer: the project does X"), "the project does X");
        assert_eq!(clean("markdown:\n# Title"), "# Title");
    }

    #[test]
    fn test_strips_wrapping_quotes() {
        assert_eq!(clean("\"quoted text\""), "quoted text");
    }

    #[test]
    fn test_strips_nested_wrappers() {
        assert_eq!(clean("Output:\n```\n\"payload\"\n```"), "payload");
    }

    #[test]
    fn test_empty_and_degenerate_input() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("```"), "```");
        assert_eq!(clean("\"\""), "");
    }

    proptest! {
        #[test]
        fn prop_idempotent(input in ".{0,400}") {
            let once = clean(&input);
            let twice = clean(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
