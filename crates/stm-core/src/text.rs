//! Normalisation of user-supplied project text.

use crate::errors::CoreError;

/// Cut `name` at its first line break and reject blank results.
///
/// Multi-line project names are not supported: `"foo\nbar"` becomes `"foo"`.
///
/// # Errors
///
/// Returns `CoreError::Validation` if nothing but whitespace is left.
pub fn normalize_name(name: &str) -> Result<String, CoreError> {
    let first_line = name.split(['\n', '\r']).next().unwrap_or_default();
    if first_line.trim().is_empty() {
        return Err(CoreError::Validation("project name must not be blank".into()));
    }
    Ok(first_line.to_string())
}

/// Reject blank descriptions. Line breaks are kept.
///
/// # Errors
///
/// Returns `CoreError::Validation` if `description` is empty or whitespace only.
pub fn normalize_description(description: &str) -> Result<String, CoreError> {
    if description.trim().is_empty() {
        return Err(CoreError::Validation(
            "project description must not be blank".into(),
        ));
    }
    Ok(description.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("flubby dubby", "flubby dubby")]
    #[case("foo\nbar\nwhatever", "foo")]
    #[case("foo\r\nbar", "foo")]
    #[case("  padded  ", "  padded  ")]
    fn name_keeps_first_line(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_name(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("  ")]
    #[case("\nsecond line only")]
    #[case(" \t\nfoo")]
    fn blank_name_rejected(#[case] input: &str) {
        assert!(matches!(normalize_name(input), Err(CoreError::Validation(_))));
    }

    #[test]
    fn description_keeps_line_breaks() {
        let text = "flubby dubby\n foo bar";
        assert_eq!(normalize_description(text).unwrap(), text);
    }

    #[test]
    fn blank_description_rejected() {
        assert!(matches!(
            normalize_description(" \n "),
            Err(CoreError::Validation(_))
        ));
    }
}
