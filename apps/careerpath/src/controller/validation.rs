use crate::errors::ErrorInfo;
use crate::flows::FlowConfig;

pub const MIN_INPUT_CHARS: usize = 2;
pub const MAX_INPUT_CHARS: usize = 100;

/// Validates free-text input for a flow and returns it trimmed.
///
/// PASS: trimmed length (in characters) within `[MIN_INPUT_CHARS, MAX_INPUT_CHARS]`.
///
/// FAIL (all `Validation`, not retryable):
/// - blank or whitespace-only
/// - shorter than `MIN_INPUT_CHARS`
/// - longer than `MAX_INPUT_CHARS`
pub fn validate_input(flow: &FlowConfig, raw: &str) -> Result<String, ErrorInfo> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ErrorInfo::validation(flow.empty_input_message));
    }

    let len = trimmed.chars().count();

    if len < MIN_INPUT_CHARS {
        return Err(ErrorInfo::validation(format!(
            "Please enter at least {} characters for your {}.",
            MIN_INPUT_CHARS, flow.input_label
        )));
    }

    if len > MAX_INPUT_CHARS {
        return Err(ErrorInfo::validation(format!(
            "{} should be less than {} characters.",
            capitalize(flow.input_label),
            MAX_INPUT_CHARS
        )));
    }

    Ok(trimmed.to_string())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
