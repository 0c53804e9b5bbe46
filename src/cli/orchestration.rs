//! Command workflow orchestration
//!
//! The `next` and `prune` workflows, kept apart from argument parsing and
//! printing so they can run against any [Registry] with an explicit clock.

use chrono::{DateTime, NaiveDate, Utc};
use log::info;

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::{classify, next_version, sort_by_date, sort_full, BadTag};
use crate::error::Result;
use crate::registry::{remove_tags, DeletionOutcome, Registry};

/// Result of the `next` workflow
#[derive(Debug, Clone, PartialEq)]
pub struct NextOutcome {
    /// The tag to publish next
    pub tag: String,

    /// Tags ignored because they do not follow the tag format
    pub bad: Vec<String>,

    /// One `BadTag` warning per ignored tag, with the reason
    pub warnings: Vec<BoundaryWarning>,
}

/// Result of the `prune` workflow
#[derive(Debug, Clone, PartialEq)]
pub struct PruneReport {
    pub bad: Vec<String>,
    pub keep: Vec<String>,
    pub toss: Vec<String>,

    /// One entry per tossed tag; empty on a dry run
    pub deletions: Vec<DeletionOutcome>,

    pub warnings: Vec<BoundaryWarning>,
}

impl PruneReport {
    pub fn removed_count(&self) -> usize {
        self.deletions.iter().filter(|d| d.is_removed()).count()
    }
}

/// Compute the next version tag for a repository.
///
/// # Arguments
/// * `registry` - Registry to list tags from
/// * `repo` - Repository name (e.g., "team/app")
/// * `config` - Loaded configuration
/// * `today` - The calendar date the new tag is for
///
/// # Returns
/// * `Ok(NextOutcome)` - The next tag and any malformed tags seen
/// * `Err` - If listing fails, no well-formed tag exists (`NoValidTags`), or
///   the newest tag's revision is not a number
pub fn run_next<R: Registry + ?Sized>(
    registry: &R,
    repo: &str,
    config: &Config,
    today: NaiveDate,
) -> Result<NextOutcome> {
    let format = config.tag_format()?;
    let tags = registry.list_tags(repo)?;
    let set = classify(&tags, &format);
    let bad = set.bad_names();
    let warnings = bad_tag_warnings(set.bad);

    let sorted = sort_full(&set.good);
    let tag = next_version(&sorted, today, &format)?;
    info!("{}: next tag {} ({} tag(s) ignored)", repo, tag, bad.len());
    Ok(NextOutcome { tag, bad, warnings })
}

/// Work out which tags of a repository to keep and which to remove.
///
/// Nothing is deleted; pass the report to [execute_prune] for that.
pub fn plan_prune<R: Registry + ?Sized>(
    registry: &R,
    repo: &str,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<PruneReport> {
    let format = config.tag_format()?;
    let policy = config.retention_policy()?;
    let tags = registry.list_tags(repo)?;
    let set = classify(&tags, &format);
    let bad = set.bad_names();
    let mut warnings = bad_tag_warnings(set.bad);

    let sorted = sort_by_date(&set.good, &format);
    let retention = policy.compute(&sorted, &format, now);
    if !retention.min_satisfied {
        warnings.push(BoundaryWarning::KeepMinUnreachable {
            keep_min: policy.keep_min,
            available: sorted.len(),
        });
    }
    info!(
        "{}: keeping {}, removing {} (cutoff {})",
        repo,
        retention.keep.len(),
        retention.toss.len(),
        retention.cutoff
    );

    Ok(PruneReport {
        bad,
        keep: retention.keep,
        toss: retention.toss,
        deletions: Vec::new(),
        warnings,
    })
}

fn bad_tag_warnings(bad: Vec<BadTag>) -> Vec<BoundaryWarning> {
    bad.into_iter().map(BoundaryWarning::from).collect()
}

/// Delete every tag the plan marked for removal.
///
/// Failures are recorded per tag, both as deletion outcomes and as
/// warnings, and never abort the remaining deletions.
pub fn execute_prune<R: Registry + ?Sized>(registry: &R, repo: &str, report: &mut PruneReport) {
    let deletions = remove_tags(registry, repo, &report.toss);
    report
        .warnings
        .extend(deletions.iter().filter_map(|d| match d {
            DeletionOutcome::Failed { tag, reason } => Some(BoundaryWarning::DeletionFailed {
                tag: tag.clone(),
                reason: reason.clone(),
            }),
            DeletionOutcome::Removed { .. } => None,
        }));
    report.deletions = deletions;
}

/// Plan a prune and, unless `dry_run` is set, carry it out.
pub fn run_prune<R: Registry + ?Sized>(
    registry: &R,
    repo: &str,
    config: &Config,
    now: DateTime<Utc>,
    dry_run: bool,
) -> Result<PruneReport> {
    let mut report = plan_prune(registry, repo, config, now)?;
    if !dry_run {
        execute_prune(registry, repo, &mut report);
    }
    Ok(report)
}
