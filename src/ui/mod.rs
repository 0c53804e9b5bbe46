//! User interface module - terminal output for the commands.

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_deletion_summary, display_error, display_prune_plan,
    display_status, display_success, format_prune_plan, format_tag_section,
};
