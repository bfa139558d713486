use serde::Serialize;

/// Hands a pretty-printed JSON rendering of `value` to `log_action`, but only when DEBUG is on,
/// so large remote pages are never serialized twice in normal operation.
pub(crate) fn with_pretty_json_debug<T, F>(value: &T, log_action: F)
where
    T: Serialize,
    F: FnOnce(&str),
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let pretty_json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|error| format!("<pretty serialize failed: {error}>"));
    log_action(pretty_json.as_str());
}

/// First `max_chars` characters of `text`, with a trailing `...` when something was cut.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::preview;

    #[test]
    fn preview_cuts_on_char_boundary() {
        assert_eq!(preview("Kampala", 3), "Kam...");
        assert_eq!(preview("Mbarara ü", 20), "Mbarara ü");
        assert_eq!(preview("üüüü", 2), "üü...");
    }
}
