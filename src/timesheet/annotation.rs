use regex::Regex;
use std::sync::LazyLock;

/// `{H:MM}`: one or more hour digits, exactly two minute digits. ASCII only.
static ANNOTATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([0-9]+):([0-9]{2})\}").unwrap());

/// Time declared by an author in a PR description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpent {
    pub hours: u32,
    /// Two digits as written; may be 60 or more.
    pub minutes: u32,
}

impl TimeSpent {
    pub fn decimal_hours(&self) -> f64 {
        f64::from(self.hours) + f64::from(self.minutes) / 60.0
    }
}

/// Find the first `{H:MM}` annotation in `text`.
///
/// Later annotations are ignored. An hour count too large for `u32` is
/// treated as no annotation.
pub fn extract_duration(text: &str) -> Option<TimeSpent> {
    let captures = ANNOTATION_REGEX.captures(text)?;
    let hours = captures[1].parse().ok()?;
    let minutes = captures[2].parse().ok()?;
    Some(TimeSpent { hours, minutes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple() {
        let spent = extract_duration("{2:30}").unwrap();
        assert_eq!(spent, TimeSpent { hours: 2, minutes: 30 });
        assert_eq!(spent.decimal_hours(), 2.5);
    }

    #[test]
    fn test_extract_embedded_in_text() {
        let body = "Refactors the parser.\n\nTime: {12:05}\nCloses #3";
        assert_eq!(
            extract_duration(body),
            Some(TimeSpent { hours: 12, minutes: 5 })
        );
    }

    #[test]
    fn test_only_first_annotation_counts() {
        let body = "{1:00} for the fix, {3:00} for tests";
        assert_eq!(
            extract_duration(body),
            Some(TimeSpent { hours: 1, minutes: 0 })
        );
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(extract_duration(""), None);
        assert_eq!(extract_duration("took 2:30"), None);
        assert_eq!(extract_duration("{2:3}"), None);
        assert_eq!(extract_duration("{2:300}"), None);
        assert_eq!(extract_duration("{:30}"), None);
        assert_eq!(extract_duration("{2.5}"), None);
        assert_eq!(extract_duration("{ 2:30 }"), None);
    }

    #[test]
    fn test_skips_malformed_then_matches() {
        assert_eq!(
            extract_duration("{2:3} then {0:45}"),
            Some(TimeSpent { hours: 0, minutes: 45 })
        );
    }

    #[test]
    fn test_non_ascii_digits_are_not_annotations() {
        assert_eq!(extract_duration("{\u{0662}:30}"), None);
        assert_eq!(
            extract_duration("{\u{0662}:30} then {1:00}"),
            Some(TimeSpent { hours: 1, minutes: 0 })
        );
    }

    #[test]
    fn test_minutes_above_sixty_are_kept() {
        let spent = extract_duration("{1:75}").unwrap();
        assert_eq!(spent.minutes, 75);
        assert_eq!(spent.decimal_hours(), 2.25);
    }

    #[test]
    fn test_hour_overflow_is_no_match() {
        assert_eq!(extract_duration("{99999999999:00}"), None);
    }
}
