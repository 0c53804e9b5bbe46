//! Domain logic - pure tag rules independent of any registry

pub mod order;
pub mod retention;
pub mod tag;
pub mod version;

pub use order::{sort_by_date, sort_full};
pub use retention::{RetentionPolicy, RetentionResult};
pub use tag::{classify, BadTag, ParsedTag, TagFormat, TagSet};
pub use version::next_version;
