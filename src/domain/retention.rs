//! Retention policy: which tags to keep and which to remove.
//!
//! Anything older than the maximum age is removed, except that the cutoff is
//! pushed back in whole days until at least `keep_min` tags survive. The
//! widening stops once the cutoff reaches the oldest tag, at which point every
//! tag is kept. The cutoff is computed directly from the tag dates, so the
//! cost does not depend on how far back the oldest tag lies.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::debug;

use super::tag::TagFormat;

/// Age and count limits for retained tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_age: Duration,
    pub keep_min: usize,
}

/// Partition of tags into those to keep and those to remove
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionResult {
    pub keep: Vec<String>,
    pub toss: Vec<String>,
    /// Tags dated before this instant were tossed.
    pub cutoff: DateTime<Utc>,
    /// False when there were fewer tags than `keep_min` to begin with.
    pub min_satisfied: bool,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy {
            max_age: Duration::days(5),
            keep_min: 10,
        }
    }
}

impl RetentionPolicy {
    pub fn new(max_age: Duration, keep_min: usize) -> Self {
        RetentionPolicy { max_age, keep_min }
    }

    /// Compute the keep/toss partition of date-ordered tags at instant `now`.
    ///
    /// Tag dates are taken as midnight UTC. Input order is preserved inside
    /// both halves, so passing tags sorted by date yields date-sorted output.
    pub fn compute<S: AsRef<str>>(
        &self,
        tags: &[S],
        format: &TagFormat,
        now: DateTime<Utc>,
    ) -> RetentionResult {
        let dated: Vec<(DateTime<Utc>, &str)> = tags
            .iter()
            .map(|t| {
                let raw = t.as_ref();
                (tag_instant(raw, format), raw)
            })
            .collect();

        let start = now
            .checked_sub_signed(self.max_age)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let cutoff = match widening_target(&dated, start, self.keep_min) {
            Some(target) => {
                let cutoff = widen_to(start, target);
                debug!(
                    "fewer than {} tags since {}, widened cutoff to {}",
                    self.keep_min, start, cutoff
                );
                cutoff
            }
            None => start,
        };

        let (keep, toss) = partition(&dated, cutoff);
        RetentionResult {
            min_satisfied: keep.len() >= self.keep_min,
            keep,
            toss,
            cutoff,
        }
    }
}

/// Instant the cutoff has to reach back to, if `start` keeps too few tags.
///
/// That is the `keep_min`-th newest tag, or the oldest tag when there are
/// fewer than `keep_min` of them.
fn widening_target(
    dated: &[(DateTime<Utc>, &str)],
    start: DateTime<Utc>,
    keep_min: usize,
) -> Option<DateTime<Utc>> {
    let kept = dated.iter().filter(|(instant, _)| *instant >= start).count();
    if kept >= keep_min || dated.is_empty() {
        return None;
    }

    let mut newest_first: Vec<DateTime<Utc>> = dated.iter().map(|(instant, _)| *instant).collect();
    newest_first.sort_unstable_by(|a, b| b.cmp(a));
    let index = keep_min.min(newest_first.len()) - 1;
    Some(newest_first[index])
}

/// Step back from `start` in whole days until at or before `target`.
fn widen_to(start: DateTime<Utc>, target: DateTime<Utc>) -> DateTime<Utc> {
    let back = |days: i64| {
        Duration::try_days(days)
            .and_then(|step| start.checked_sub_signed(step))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    };

    let days = start.signed_duration_since(target).num_days();
    let cutoff = back(days);
    if cutoff > target {
        back(days + 1)
    } else {
        cutoff
    }
}

/// Midnight UTC of the tag's date.
///
/// Tags without a parseable date count as infinitely old; classification
/// keeps them out of here in practice.
fn tag_instant(raw: &str, format: &TagFormat) -> DateTime<Utc> {
    format
        .date_part(raw)
        .and_then(|d| format.parse_date(d))
        .unwrap_or(NaiveDate::MIN)
        .and_time(chrono::NaiveTime::MIN)
        .and_utc()
}
