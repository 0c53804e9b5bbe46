use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use log::debug;

use crate::error::{DrcleanError, Result};

/// Default literal between the date and revision parts of a tag.
pub const DEFAULT_SEPARATOR: &str = "RC";

/// Default date pattern: an 8 digit `YYYYMMDD` date.
pub const DEFAULT_DATE_FORMAT: &str = "%Y%m%d";

/// Dates in chronological order, with one- and two-digit months and days,
/// used to check that a pattern renders fixed-width sortable text.
const LAYOUT_CHECK_DATES: [(i32, u32, u32); 5] = [
    (2006, 1, 2),
    (2006, 2, 1),
    (2006, 10, 9),
    (2006, 12, 25),
    (2007, 1, 1),
];

/// Tag naming format (e.g., `20240115RC02` for separator "RC" and `%Y%m%d`)
///
/// Built once from configuration and passed by reference into every
/// classification, ordering and generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFormat {
    separator: String,
    date_format: String,
}

impl TagFormat {
    /// Create a tag format, validating both parts.
    ///
    /// Patterns containing `%` are chrono strftime patterns. Anything else is
    /// read as a reference layout (`20060102`, `2006-01-02`) and translated.
    /// The pattern must render every date at the same width and in
    /// chronological text order, since tags are compared as plain strings.
    ///
    /// # Returns
    /// * `Ok(TagFormat)` - Usable format
    /// * `Err` - If the separator is empty, the pattern cannot round-trip a
    ///   date, or it renders dates at varying widths or out of order
    pub fn new(separator: impl Into<String>, date_format: impl Into<String>) -> Result<Self> {
        let separator = separator.into();
        if separator.is_empty() {
            return Err(DrcleanError::config("tag separator must not be empty"));
        }

        let raw_format = date_format.into();
        let date_format = translate_reference_layout(&raw_format);
        if StrftimeItems::new(&date_format).any(|item| matches!(item, Item::Error)) {
            return Err(DrcleanError::config(format!(
                "invalid date format '{}'",
                raw_format
            )));
        }

        let format = TagFormat {
            separator,
            date_format,
        };

        let mut previous: Option<String> = None;
        for (y, m, d) in LAYOUT_CHECK_DATES {
            let date = NaiveDate::from_ymd_opt(y, m, d)
                .ok_or_else(|| DrcleanError::config("invalid layout check date"))?;
            let mut rendered = String::new();
            if write!(rendered, "{}", date.format(&format.date_format)).is_err()
                || format.parse_date(&rendered) != Some(date)
            {
                return Err(DrcleanError::config(format!(
                    "date format '{}' does not describe a calendar date",
                    raw_format
                )));
            }

            if let Some(previous) = &previous {
                if previous.len() != rendered.len() {
                    return Err(DrcleanError::config(format!(
                        "date format '{}' renders dates at varying widths ('{}' vs '{}')",
                        raw_format, previous, rendered
                    )));
                }
                if *previous >= rendered {
                    return Err(DrcleanError::config(format!(
                        "date format '{}' does not sort chronologically ('{}' vs '{}')",
                        raw_format, previous, rendered
                    )));
                }
            }
            previous = Some(rendered);
        }

        Ok(format)
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Parse the date part of a tag.
    ///
    /// Only text that renders back identically is accepted, so every date
    /// part has the fixed width the lexical ordering relies on.
    pub fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(text, &self.date_format)
            .ok()
            .filter(|date| self.render_date(*date) == text)
    }

    /// Render a date with this format's pattern.
    pub fn render_date(&self, date: NaiveDate) -> String {
        date.format(&self.date_format).to_string()
    }

    /// Render a full tag, zero-padding the revision to two digits.
    pub fn render(&self, date: NaiveDate, revision: u32) -> String {
        format!("{}{}{:02}", self.render_date(date), self.separator, revision)
    }

    /// Date part of a tag, if the tag splits cleanly on the separator.
    pub(crate) fn date_part<'a>(&self, raw: &'a str) -> Option<&'a str> {
        split_tag(raw, &self.separator).map(|(date, _)| date)
    }
}

impl Default for TagFormat {
    fn default() -> Self {
        TagFormat {
            separator: DEFAULT_SEPARATOR.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// Translate a reference layout ("20060102") into a strftime pattern.
fn translate_reference_layout(layout: &str) -> String {
    if layout.contains('%') {
        return layout.to_string();
    }
    layout
        .replace("2006", "%Y")
        .replace("01", "%m")
        .replace("02", "%d")
}

/// Split a tag into its date and revision text.
///
/// The separator must occur exactly once and both sides must be non-empty.
fn split_tag<'a>(raw: &'a str, separator: &str) -> Option<(&'a str, &'a str)> {
    let parts: Vec<&str> = raw.split(separator).collect();
    match parts.as_slice() {
        [date, revision] if !date.is_empty() && !revision.is_empty() => Some((*date, *revision)),
        _ => None,
    }
}

/// Structured view of a well-formed tag.
///
/// The revision is kept as text: it is only parsed when a caller needs the
/// number, so a tag with an odd revision still counts as well-formed for
/// retention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTag {
    pub raw: String,
    pub date: NaiveDate,
    revision: String,
}

impl ParsedTag {
    /// Parse a raw tag string.
    ///
    /// # Returns
    /// * `Ok(ParsedTag)` - Tag splits into two parts and the date parses
    /// * `Err` - Tag error describing why the tag is malformed
    pub fn parse(raw: &str, format: &TagFormat) -> Result<Self> {
        Self::from_parts(raw, format)
            .map_err(|reason| DrcleanError::tag(format!("'{}' {}", raw, reason)))
    }

    fn from_parts(raw: &str, format: &TagFormat) -> std::result::Result<Self, String> {
        let (date_text, revision) = split_tag(raw, format.separator()).ok_or_else(|| {
            format!("does not split into <date>{}<revision>", format.separator())
        })?;

        let date = format.parse_date(date_text).ok_or_else(|| {
            format!(
                "has date '{}' not matching '{}'",
                date_text,
                format.date_format()
            )
        })?;

        Ok(ParsedTag {
            raw: raw.to_string(),
            date,
            revision: revision.to_string(),
        })
    }

    /// Parse the revision number.
    pub fn revision(&self) -> Result<u32> {
        self.revision.parse::<u32>().map_err(|e| {
            DrcleanError::revision(format!(
                "tag '{}' has revision '{}': {}",
                self.raw, self.revision, e
            ))
        })
    }
}

/// A tag that does not follow the tag format, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadTag {
    pub tag: String,
    pub reason: String,
}

/// Tags partitioned into well-formed and malformed, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    pub good: Vec<String>,
    pub bad: Vec<BadTag>,
}

impl TagSet {
    /// Names of the malformed tags, in input order.
    pub fn bad_names(&self) -> Vec<String> {
        self.bad.iter().map(|bad| bad.tag.clone()).collect()
    }
}

/// Separate well-formed tags from malformed ones.
///
/// Malformed tags are data, not failures: one odd tag never stops the rest of
/// the repository from being processed.
pub fn classify<S: AsRef<str>>(tags: &[S], format: &TagFormat) -> TagSet {
    let mut set = TagSet::default();
    for tag in tags {
        let raw = tag.as_ref();
        match ParsedTag::from_parts(raw, format) {
            Ok(_) => set.good.push(raw.to_string()),
            Err(reason) => {
                debug!("classified '{}' as bad: {}", raw, reason);
                set.bad.push(BadTag {
                    tag: raw.to_string(),
                    reason,
                });
            }
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_format() {
        let format = TagFormat::default();
        assert_eq!(format.separator(), "RC");
        assert_eq!(format.date_format(), "%Y%m%d");
    }

    #[test]
    fn test_reference_layout_is_translated() {
        let format = TagFormat::new("RC", "20060102").unwrap();
        assert_eq!(format.date_format(), "%Y%m%d");

        let dashed = TagFormat::new("-r", "2006-01-02").unwrap();
        assert_eq!(dashed.date_format(), "%Y-%m-%d");
    }

    #[test]
    fn test_empty_separator_rejected() {
        assert!(TagFormat::new("", "%Y%m%d").is_err());
    }

    #[test]
    fn test_time_only_format_rejected() {
        assert!(TagFormat::new("RC", "%H%M").is_err());
        assert!(TagFormat::new("RC", "%m%d").is_err());
    }

    #[test]
    fn test_variable_width_format_rejected() {
        let err = TagFormat::new("RC", "%Y%m%-d").unwrap_err();
        assert!(err.to_string().contains("varying widths"));
        assert!(TagFormat::new("RC", "%Y%-m%d").is_err());
        assert!(TagFormat::new("RC", "%Y%B%d").is_err());
    }

    #[test]
    fn test_unsortable_format_rejected() {
        let err = TagFormat::new("RC", "%d%m%Y").unwrap_err();
        assert!(err.to_string().contains("does not sort chronologically"));
        assert!(TagFormat::new("RC", "%Y%b%d").is_err());
    }

    #[test]
    fn test_parse_date_requires_fixed_width() {
        let format = TagFormat::default();
        assert_eq!(format.parse_date("20240115"), Some(date(2024, 1, 15)));
        assert_eq!(format.parse_date("2024115"), None);
        assert_eq!(format.parse_date("20241301"), None);
    }

    #[test]
    fn test_render() {
        let format = TagFormat::default();
        assert_eq!(format.render(date(2024, 1, 15), 2), "20240115RC02");
        assert_eq!(format.render(date(2024, 1, 15), 123), "20240115RC123");
    }

    #[test]
    fn test_parsed_tag() {
        let tag = ParsedTag::parse("20240115RC02", &TagFormat::default()).unwrap();
        assert_eq!(tag.raw, "20240115RC02");
        assert_eq!(tag.date, date(2024, 1, 15));
        assert_eq!(tag.revision().unwrap(), 2);
    }

    #[test]
    fn test_revision_is_parsed_lazily() {
        let tag = ParsedTag::parse("20240115RCxx", &TagFormat::default()).unwrap();
        let err = tag.revision().unwrap_err();
        assert!(err.to_string().contains("Revision parsing error"));
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        let format = TagFormat::default();
        assert!(ParsedTag::parse("latest", &format).is_err());
        assert!(ParsedTag::parse("20240115RC01RC02", &format).is_err());
        assert!(ParsedTag::parse("20240115RC", &format).is_err());
        assert!(ParsedTag::parse("RC01", &format).is_err());
        assert!(ParsedTag::parse("2024011xRC01", &format).is_err());
    }

    #[test]
    fn test_parse_error_names_the_tag() {
        let err = ParsedTag::parse("latest", &TagFormat::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Tag error: 'latest' does not split into <date>RC<revision>"
        );
    }

    #[test]
    fn test_classify_keeps_input_order() {
        let tags = vec![
            "20240102RC01",
            "latest",
            "20240101RC03",
            "v1.2.3",
            "20240101RC01",
        ];
        let set = classify(&tags, &TagFormat::default());
        assert_eq!(set.good, vec!["20240102RC01", "20240101RC03", "20240101RC01"]);
        assert_eq!(set.bad_names(), vec!["latest", "v1.2.3"]);
    }

    #[test]
    fn test_classify_records_reasons() {
        let set = classify(&["latest", "2024011xRC01"], &TagFormat::default());
        assert_eq!(
            set.bad,
            vec![
                BadTag {
                    tag: "latest".to_string(),
                    reason: "does not split into <date>RC<revision>".to_string(),
                },
                BadTag {
                    tag: "2024011xRC01".to_string(),
                    reason: "has date '2024011x' not matching '%Y%m%d'".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_classify_custom_separator() {
        let format = TagFormat::new("-rev", "%Y%m%d").unwrap();
        let set = classify(&["20240101-rev1", "20240101RC01"], &format);
        assert_eq!(set.good, vec!["20240101-rev1"]);
        assert_eq!(set.bad_names(), vec!["20240101RC01"]);
    }

    #[test]
    fn test_classify_empty() {
        let tags: Vec<String> = Vec::new();
        assert_eq!(classify(&tags, &TagFormat::default()), TagSet::default());
    }
}
