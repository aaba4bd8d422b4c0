// Command-line argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "poisonproof")]
#[command(version)]
#[command(about = "Detect poisoned rows in datasets and manipulated images")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Detection config file (YAML); defaults to the config hierarchy
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Upload limits file (YAML); defaults to the config hierarchy
    #[arg(long, global = true, value_name = "FILE")]
    pub ingest_config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan CSV datasets and images for anomalies
    Scan {
        /// Files to scan
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Report training readiness of a CSV dataset
    Profile {
        /// CSV file
        #[arg(value_name = "CSV")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Write a synthetic employee dataset with planted anomalies
    Generate {
        /// Number of rows
        #[arg(long, default_value_t = 1000)]
        rows: usize,

        /// Number of rows to tamper with
        #[arg(long, default_value_t = 50)]
        anomalies: usize,

        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output CSV path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Print the effective detection config as YAML
    Config,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_multiple_paths() {
        let cli = Cli::try_parse_from([
            "poisonproof",
            "scan",
            "a.csv",
            "b.png",
            "--format",
            "text",
            "--config",
            "custom.yaml",
            "--ingest-config",
            "limits.yaml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
        assert_eq!(cli.ingest_config, Some(PathBuf::from("limits.yaml")));
        match cli.command {
            Commands::Scan { paths, format } => {
                assert_eq!(paths.len(), 2);
                assert_eq!(format, OutputFormat::Text);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_scan_requires_a_path() {
        assert!(Cli::try_parse_from(["poisonproof", "scan"]).is_err());
    }

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::try_parse_from(["poisonproof", "generate", "-o", "out.csv"]).unwrap();
        match cli.command {
            Commands::Generate {
                rows,
                anomalies,
                seed,
                ..
            } => {
                assert_eq!((rows, anomalies, seed), (1000, 50, 42));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["poisonproof", "-v", "-q", "config"]).is_err());
    }
}
