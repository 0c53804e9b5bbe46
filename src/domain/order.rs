//! Orderings over well-formed tags.
//!
//! Both orders are ascending (oldest first). Callers wanting newest-first
//! reverse the result.

use chrono::NaiveDate;

use super::tag::TagFormat;

/// Sort tags by their full text.
///
/// Date and revision are fixed-width and zero-padded, so plain string order
/// is chronological order with revisions ordered inside each day.
pub fn sort_full<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut sorted: Vec<String> = tags.iter().map(|t| t.as_ref().to_string()).collect();
    sorted.sort();
    sorted
}

/// Sort tags by their date part only, ignoring the revision.
///
/// The sort is stable: tags sharing a date keep their input order. Tags whose
/// date does not parse sort first; callers are expected to pass only tags that
/// survived classification.
pub fn sort_by_date<S: AsRef<str>>(tags: &[S], format: &TagFormat) -> Vec<String> {
    let mut keyed: Vec<(Option<NaiveDate>, String)> = tags
        .iter()
        .map(|t| {
            let raw = t.as_ref();
            let date = format.date_part(raw).and_then(|d| format.parse_date(d));
            (date, raw.to_string())
        })
        .collect();
    keyed.sort_by_key(|(date, _)| *date);
    keyed.into_iter().map(|(_, raw)| raw).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_order() {
        let tags = ["20240101RC01", "20240101RC02", "20231231RC05"];
        assert_eq!(
            sort_full(&tags),
            vec!["20231231RC05", "20240101RC01", "20240101RC02"]
        );
    }

    #[test]
    fn test_full_order_orders_revisions_within_day() {
        let tags = ["20240101RC10", "20240101RC09", "20240101RC01"];
        assert_eq!(
            sort_full(&tags),
            vec!["20240101RC01", "20240101RC09", "20240101RC10"]
        );
    }

    #[test]
    fn test_date_order_ignores_revision() {
        let tags = ["20240101RC09", "20231231RC01", "20240101RC01"];
        let sorted = sort_by_date(&tags, &TagFormat::default());
        assert_eq!(sorted[0], "20231231RC01");
        // Same-day tags stay adjacent and in input order.
        assert_eq!(&sorted[1..], &["20240101RC09", "20240101RC01"]);
    }

    #[test]
    fn test_date_order_is_stable_across_runs() {
        let tags = ["20240102RC03", "20240102RC01", "20240101RC07", "20240102RC02"];
        let format = TagFormat::default();
        let first = sort_by_date(&tags, &format);
        for _ in 0..10 {
            assert_eq!(sort_by_date(&tags, &format), first);
        }
        assert_eq!(
            first,
            vec!["20240101RC07", "20240102RC03", "20240102RC01", "20240102RC02"]
        );
    }

    #[test]
    fn test_date_order_with_custom_format() {
        let format = TagFormat::new("_", "2006-01-02").unwrap();
        let tags = ["2024-01-15_9", "2023-12-31_4", "2024-01-15_1"];
        assert_eq!(
            sort_by_date(&tags, &format),
            vec!["2023-12-31_4", "2024-01-15_9", "2024-01-15_1"]
        );
    }

    #[test]
    fn test_empty_input() {
        let tags: [&str; 0] = [];
        assert!(sort_full(&tags).is_empty());
        assert!(sort_by_date(&tags, &TagFormat::default()).is_empty());
    }
}
