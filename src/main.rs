use anyhow::Result;
use chrono::{Local, Utc};
use clap::Parser;

use drclean::cli::orchestration::{execute_prune, plan_prune, run_next};
use drclean::cli::{Cli, Command};
use drclean::config;
use drclean::registry::HttpRegistry;
use drclean::ui;

fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    let registry = match HttpRegistry::new(&config.registry) {
        Ok(registry) => registry,
        Err(e) => {
            ui::display_error(&format!("Error during initialization: {}", e));
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Next { repo } => {
            let today = Local::now().date_naive();
            let outcome = match run_next(&registry, &repo, &config, today) {
                Ok(outcome) => outcome,
                Err(e) => {
                    ui::display_error(&format!("{}: {}", repo, e));
                    std::process::exit(1);
                }
            };

            for warning in &outcome.warnings {
                ui::display_boundary_warning(warning);
            }
            println!("{}", outcome.tag);
        }
        Command::Prune { repo, dry_run } => {
            let mut report = match plan_prune(&registry, &repo, &config, Utc::now()) {
                Ok(report) => report,
                Err(e) => {
                    ui::display_error(&e.to_string());
                    std::process::exit(1);
                }
            };

            ui::display_prune_plan(&report);
            if !dry_run {
                execute_prune(&registry, &repo, &mut report);
            }
            for warning in &report.warnings {
                ui::display_boundary_warning(warning);
            }
            ui::display_deletion_summary(&report, dry_run);
        }
    }

    Ok(())
}
