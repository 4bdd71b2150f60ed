/// Normalizes an optional form field: trims it and maps blank input to `None`.
#[must_use]
pub fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Trims a required field, returning `None` when nothing remains.
pub(crate) fn required_text(raw: &str) -> Option<String> {
    optional_text(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_becomes_none() {
        assert_eq!(optional_text("   \n"), None);
        assert_eq!(optional_text(""), None);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(optional_text("  cover.png "), Some("cover.png".to_string()));
    }
}
