//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Alias Hub - manage shell alias packages
#[derive(Parser, Debug)]
#[command(name = "ah")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// State root (defaults to ~/.ah)
    #[arg(long, global = true, env = "AH_ROOT")]
    pub root: Option<PathBuf>,

    /// Answer every prompt with its default
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Install packages from the registry
    ///
    /// Shows each package's aliases and asks before enabling it. When a
    /// package collides with enabled aliases, offers a browser session to
    /// resolve the collisions.
    ///
    /// Examples:
    ///   ah install git
    ///   ah install git docker --yes
    Install {
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Enable packages that are in the registry but not active
    Enable {
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Disable active packages (the registry copy stays)
    Disable {
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Remove packages from the active set
    Remove {
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// List enabled packages
    List {
        /// Include every package in the registry
        #[arg(short, long)]
        all: bool,
    },

    /// Search the registry by name or description
    Search { query: String },

    /// Fetch the registry and recompile aliases
    Update,

    /// Create the state directory and hook it into the shell profile
    Init,

    /// Check the installation for problems
    Doctor {
        /// Attempt to fix found issues
        #[arg(long)]
        fix: bool,
    },

    /// Remove Alias Hub state and the shell profile hook
    Uninstall,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_multiple_packages() {
        let cli = Cli::try_parse_from(["ah", "install", "git", "docker"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Install {
                packages: vec!["git".into(), "docker".into()]
            })
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ah", "list", "--all", "-y", "--root", "/tmp/x"]).unwrap();
        assert!(cli.yes);
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cli.command, Some(Commands::List { all: true }));
    }

    #[test]
    fn install_requires_a_package() {
        assert!(Cli::try_parse_from(["ah", "install"]).is_err());
    }
}
