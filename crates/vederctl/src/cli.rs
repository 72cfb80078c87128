//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use veder_shared::Language;

/// Veder X crypto research engine
#[derive(Parser, Debug)]
#[command(name = "vederctl")]
#[command(about = "Veder X - Crypto research reports from a generative model", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Config file (overrides $VEDER_CONFIG and the default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a token by name, symbol or contract address
    Report {
        query: String,

        /// Report language (defaults to the configured language)
        #[arg(long, value_parser = parse_language)]
        lang: Option<Language>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Newly listed and upcoming tokens
    Market {
        #[arg(long, value_parser = parse_language)]
        lang: Option<Language>,
    },

    /// Repair raw model output offline and print the materialized report
    Repair {
        /// File with raw model text (stdin when omitted)
        file: Option<PathBuf>,

        #[arg(long, value_parser = parse_language)]
        lang: Option<Language>,
    },
}

fn parse_language(tag: &str) -> Result<Language, String> {
    Language::parse(tag).ok_or_else(|| format!("unsupported language '{}' (expected en or zh)", tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_command() {
        let cli = Cli::try_parse_from(["vederctl", "report", "PEPE", "--lang", "en", "--json"]).unwrap();
        match cli.command {
            Commands::Report { query, lang, json } => {
                assert_eq!(query, "PEPE");
                assert_eq!(lang, Some(Language::En));
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["vederctl", "market", "--debug", "--config", "/tmp/v.toml"]).unwrap();
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/v.toml")));
        assert!(matches!(cli.command, Commands::Market { lang: None }));
    }

    #[test]
    fn test_repair_reads_stdin_by_default() {
        let cli = Cli::try_parse_from(["vederctl", "repair"]).unwrap();
        assert!(matches!(cli.command, Commands::Repair { file: None, lang: None }));
    }

    #[test]
    fn test_unknown_language_rejected() {
        assert!(Cli::try_parse_from(["vederctl", "market", "--lang", "fr"]).is_err());
    }

    #[test]
    fn test_report_requires_query() {
        assert!(Cli::try_parse_from(["vederctl", "report"]).is_err());
    }
}
