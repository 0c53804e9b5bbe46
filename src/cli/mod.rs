//! Command-line surface: argument definitions and workflows.

pub mod orchestration;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "drclean",
    version,
    about = "drclean cleans repos and computes versions",
    long_about = "drclean can clean your repo, and can suggest new sequential versions for you to run."
)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Summon the next sequential version number for a repository
    Next {
        /// Repository name, e.g. team/app
        repo: String,
    },

    /// Remove versions that fall outside the retention policy
    Prune {
        /// Repository name, e.g. team/app
        repo: String,

        #[arg(long, help = "Show what would be removed without deleting anything")]
        dry_run: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_next() {
        let cli = Cli::try_parse_from(["drclean", "next", "team/app"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Next {
                repo: "team/app".to_string()
            }
        );
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_parse_prune_with_flags() {
        let cli =
            Cli::try_parse_from(["drclean", "prune", "--dry-run", "team/app", "-c", "x.toml"])
                .unwrap();
        assert_eq!(
            cli.command,
            Command::Prune {
                repo: "team/app".to_string(),
                dry_run: true
            }
        );
        assert_eq!(cli.config.as_deref(), Some("x.toml"));
    }

    #[test]
    fn test_repo_is_required() {
        assert!(Cli::try_parse_from(["drclean", "next"]).is_err());
        assert!(Cli::try_parse_from(["drclean", "prune"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
