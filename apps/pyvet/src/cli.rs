//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pyvet",
    version,
    about = "pyvet: a static checker for Python source trees",
    long_about = "pyvet walks Python packages and modules, applies the enabled checkers and reports messages.\n\nConfiguration precedence: CLI > pyvet.toml > defaults.",
    after_help = "Examples:\n  pyvet check src/\n  pyvet check pkg/ --disable C0303,line-too-long --output json\n  pyvet list-msgs",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current pyvet version.")]
    Version,
    /// Check Python files and packages
    #[command(
        about = "Run checks",
        long_about = "Discover modules under the given paths and run every enabled checker. The exit status is a bit mask of the message categories emitted (fatal=1, error=2, warning=4, refactor=8, convention=16); usage errors exit with 32.",
        after_help = "Examples:\n  pyvet check\n  pyvet check pkg/ tools/script.py --jobs 0"
    )]
    Check {
        #[arg(help = "Files or directories to check (default: current dir)")]
        paths: Vec<String>,
        #[arg(long, help = "Repository root used to find pyvet.toml (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Comma-separated messages, categories or checkers to disable")]
        disable: Option<String>,
        #[arg(long, help = "Comma-separated messages, categories or checkers to enable")]
        enable: Option<String>,
        #[arg(long, help = "Threads used to load modules; 0 uses one per CPU")]
        jobs: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Always exit with status 0")]
        exit_zero: bool,
    },
    /// List known messages
    #[command(
        about = "List messages",
        long_about = "Print every registered message grouped by checker."
    )]
    ListMsgs {
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// List configuration options
    #[command(
        about = "List options",
        long_about = "Print the options of every checker with their defaults, by config section."
    )]
    ListOptions,
}
