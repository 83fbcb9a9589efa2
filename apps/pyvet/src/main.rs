//! pyvet CLI binary entry point.
//! Delegates to the library for discovery and checking and prints results.

use clap::Parser;
use pyvet::cli::{Cli, Commands};
use pyvet::config;
use pyvet::error::Result;
use pyvet::lint::Linter;
use pyvet::output::{self, OutputFormat};
use std::path::PathBuf;

/// Exit status for bad flags, bad configuration and other usage errors.
const USAGE_ERROR: i32 = 32;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { USAGE_ERROR } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {}", output::error_prefix(), e);
            std::process::exit(USAGE_ERROR);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Commands::Check {
            paths,
            repo_root,
            output: out,
            disable,
            enable,
            jobs,
            exit_zero,
        } => {
            let eff = config::resolve_effective(repo_root.as_deref())?;
            let mut linter = Linter::new()?;
            linter.load_configuration(&eff.config)?;
            // CLI flags win over the file
            if let Some(o) = out.as_deref() {
                linter.set_option("main", "output-format", o)?;
            }
            if let Some(j) = jobs.as_deref() {
                linter.set_option("main", "jobs", j)?;
            }
            if exit_zero {
                linter.set_option("main", "exit-zero", "yes")?;
            }
            if let Some(ids) = disable.as_deref() {
                linter.set_option("main", "disable", ids)?;
            }
            if let Some(ids) = enable.as_deref() {
                linter.set_option("main", "enable", ids)?;
            }

            let format = linter.settings().output_format;
            if eff.config_path.is_none() && format == OutputFormat::Human {
                eprintln!("{} No pyvet.toml found; using defaults.", output::note_prefix());
            }
            let paths: Vec<PathBuf> = if paths.is_empty() {
                vec![PathBuf::from(".")]
            } else {
                paths.into_iter().map(PathBuf::from).collect()
            };
            let res = linter.check(&paths)?;
            output::print_lint(&res, format);
            Ok(res.stats.exit_code(linter.settings().exit_zero))
        }
        Commands::ListMsgs { output: out } => {
            let format = out
                .as_deref()
                .map(|s| s.parse::<OutputFormat>())
                .transpose()?
                .unwrap_or_default();
            let linter = Linter::new()?;
            output::print_msgs(linter.registry(), format);
            Ok(0)
        }
        Commands::ListOptions => {
            let linter = Linter::new()?;
            output::print_options(&linter.options());
            Ok(0)
        }
    }
}
