use chrono::NaiveDate;

use super::tag::{ParsedTag, TagFormat};
use crate::error::{DrcleanError, Result};

/// Compute the next tag to issue.
///
/// `sorted_full` must hold only well-formed tags in full (lexical) order.
/// If the newest tag is from an earlier day, today's first revision is
/// returned. Otherwise the newest tag's revision is incremented.
///
/// # Returns
/// * `Ok(String)` - The next tag (e.g., "20240115RC02")
/// * `Err` - `NoValidTags` if the list is empty, or a revision error if the
///   newest tag's revision is not a number
///
/// # Example
/// ```ignore
/// let next = next_version(&["20240115RC01"], today, &TagFormat::default())?;
/// assert_eq!(next, "20240115RC02");
/// ```
pub fn next_version<S: AsRef<str>>(
    sorted_full: &[S],
    today: NaiveDate,
    format: &TagFormat,
) -> Result<String> {
    let last = sorted_full.last().ok_or(DrcleanError::NoValidTags)?;
    let last = ParsedTag::parse(last.as_ref(), format)?;

    if last.date != today {
        return Ok(format.render(today, 1));
    }

    let revision = last.revision()?;
    let next = revision
        .checked_add(1)
        .ok_or_else(|| DrcleanError::revision(format!("revision {} overflows", revision)))?;
    Ok(format.render(last.date, next))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_same_day_increments_revision() {
        let tags = ["20240114RC03", "20240115RC01"];
        let next = next_version(&tags, date(2024, 1, 15), &TagFormat::default()).unwrap();
        assert_eq!(next, "20240115RC02");
    }

    #[test]
    fn test_new_day_starts_at_first_revision() {
        let tags = ["20240114RC03"];
        let next = next_version(&tags, date(2024, 1, 15), &TagFormat::default()).unwrap();
        assert_eq!(next, "20240115RC01");
    }

    #[test]
    fn test_revision_past_two_digits() {
        let tags = ["20240115RC99"];
        let next = next_version(&tags, date(2024, 1, 15), &TagFormat::default()).unwrap();
        assert_eq!(next, "20240115RC100");
    }

    #[test]
    fn test_unpadded_revision_is_padded() {
        let tags = ["20240115RC7"];
        let next = next_version(&tags, date(2024, 1, 15), &TagFormat::default()).unwrap();
        assert_eq!(next, "20240115RC08");
    }

    #[test]
    fn test_bad_revision_fails_only_on_same_day() {
        let tags = ["20240115RCxx"];
        let format = TagFormat::default();

        let err = next_version(&tags, date(2024, 1, 15), &format).unwrap_err();
        assert!(matches!(err, DrcleanError::Revision(_)));

        let next = next_version(&tags, date(2024, 1, 16), &format).unwrap();
        assert_eq!(next, "20240116RC01");
    }

    #[test]
    fn test_empty_list_has_no_valid_tags() {
        let tags: [&str; 0] = [];
        let err = next_version(&tags, date(2024, 1, 15), &TagFormat::default()).unwrap_err();
        assert!(matches!(err, DrcleanError::NoValidTags));
    }

    #[test]
    fn test_custom_format() {
        let format = TagFormat::new("-r", "2006-01-02").unwrap();
        let tags = ["2024-01-15-r04"];
        let next = next_version(&tags, date(2024, 1, 15), &format).unwrap();
        assert_eq!(next, "2024-01-15-r05");
    }
}
