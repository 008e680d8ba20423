pub const THINK_OPEN: &str = "<think>";
pub const THINK_CLOSE: &str = "</think>";

/// Frame a reasoning block in think tags unless it already carries both.
pub fn wrap_reasoning(block: &str) -> String {
    let trimmed = block.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.contains(THINK_OPEN) && trimmed.contains(THINK_CLOSE) {
        return trimmed.to_string();
    }
    format!("{THINK_OPEN}\n{trimmed}\n{THINK_CLOSE}")
}

/// Serialize a classified pair into the final output string.
///
/// Returns `None` when there is no answer text left after repair and
/// promotion; the caller must surface that as a failure instead of printing
/// an empty line.
pub fn compose(answer: &str, reasoning: &str) -> Option<String> {
    let mut answer = answer.trim().to_string();
    let mut reasoning = reasoning.trim().to_string();

    // Some servers drop the opening tag and only emit the closing one.
    if answer.starts_with(THINK_CLOSE) {
        answer = format!("{THINK_OPEN}{answer}");
    }

    if answer.is_empty() && !reasoning.is_empty() {
        answer = std::mem::take(&mut reasoning);
    }
    if answer.is_empty() {
        return None;
    }

    let wrapped = wrap_reasoning(&reasoning);
    let output = if wrapped.is_empty() {
        answer
    } else {
        format!("{wrapped}\n\n{answer}")
    };
    Some(output.trim().to_string())
}
