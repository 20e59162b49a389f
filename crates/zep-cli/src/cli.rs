use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI parser for the `zep` binary.
#[derive(Debug, Parser)]
#[command(
    name = "zep",
    version,
    about = "Zephyrus - retry-migrate failed Zephyr Squad executions from a CSV export"
)]
pub struct Cli {
    /// Path to the Zephyr execution export CSV
    #[arg(long)]
    pub csv: PathBuf,

    /// Path to the JSON migration config
    #[arg(long)]
    pub config: PathBuf,

    /// Target Jira project key (e.g. GCTEST)
    #[arg(long)]
    pub target_project_key: String,

    /// Optional JSON mapping of display name to account id
    #[arg(long)]
    pub user_mapping: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory as _, Parser as _};

    use super::Cli;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn required_args_parse() {
        let cli = Cli::try_parse_from([
            "zep",
            "--csv",
            "export.csv",
            "--config",
            "config.json",
            "--target-project-key",
            "GCTEST",
        ])
        .expect("cli should parse");

        assert_eq!(cli.csv.to_str(), Some("export.csv"));
        assert_eq!(cli.target_project_key, "GCTEST");
        assert!(cli.user_mapping.is_none());
        assert!(!cli.quiet);
        assert!(!cli.verbose);
    }

    #[test]
    fn user_mapping_and_flags_parse() {
        let cli = Cli::try_parse_from([
            "zep",
            "--csv",
            "export.csv",
            "--config",
            "config.json",
            "--target-project-key",
            "GCTEST",
            "--user-mapping",
            "users.json",
            "--verbose",
        ])
        .expect("cli should parse");

        assert_eq!(cli.user_mapping.as_deref().and_then(|p| p.to_str()), Some("users.json"));
        assert!(cli.verbose);
    }

    #[test]
    fn missing_required_arg_is_rejected() {
        let parsed = Cli::try_parse_from(["zep", "--csv", "export.csv"]);
        assert!(parsed.is_err());
    }
}
