mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use saved_core::{
    authenticate, export_saved, ClientOptions, CredentialStore, ExportOptions, ExportResult,
    DEFAULT_PROFILE, FIELDNAMES,
};
use tracing::{debug, info};

use logging::LogLevel;

#[derive(Parser, Debug)]
#[command(author, version, about = "Tool to save down an account's saved posts on reddit", long_about = None)]
struct Cli {
    /// The file to write the results to
    #[arg(long = "target_file")]
    target_file: PathBuf,

    /// Log verbosity
    #[arg(long = "log_level", value_enum, default_value = "INFO")]
    log_level: LogLevel,

    /// Credentials profile to log in with
    #[arg(long = "profile", default_value = DEFAULT_PROFILE)]
    profile: String,

    /// Custom credentials file path
    #[arg(long = "config_path")]
    config_path: Option<PathBuf>,

    /// Export at most this many saved items
    #[arg(long = "limit")]
    limit: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level)?;
    debug!("Finished parsing CLI arguments");

    let store = CredentialStore::load(cli.config_path.clone())
        .with_context(|| "failed to load credentials store")?;
    let session = authenticate(&cli.profile, &store, ClientOptions::default())
        .with_context(|| format!("failed to log in with profile `{}`", cli.profile))?;
    info!("Logged in");

    let options = ExportOptions {
        target_file: cli.target_file.clone(),
        limit: cli.limit,
    };
    let result =
        export_saved(&session, &options).with_context(|| "failed to export saved items")?;
    print_summary(&result);
    Ok(())
}

fn print_summary(result: &ExportResult) {
    println!(
        "{} {} saved items to {}",
        style("Exported").green().bold(),
        result.written,
        result.target_file.display()
    );
    println!("{} {}", style("Columns:").dim(), FIELDNAMES.join(", "));
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn target_file_is_required() {
        let err = Cli::try_parse_from(["reddit_saver"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn log_level_defaults_to_info() {
        let cli = Cli::try_parse_from(["reddit_saver", "--target_file", "saved.csv"]).unwrap();
        assert_eq!(cli.target_file, PathBuf::from("saved.csv"));
        assert_eq!(cli.log_level, LogLevel::Info);
        assert_eq!(cli.profile, DEFAULT_PROFILE);
        assert!(cli.config_path.is_none());
        assert!(cli.limit.is_none());
    }

    #[test]
    fn accepts_every_log_level() {
        for (name, expected) in [
            ("DEBUG", LogLevel::Debug),
            ("INFO", LogLevel::Info),
            ("WARNING", LogLevel::Warning),
            ("ERROR", LogLevel::Error),
            ("CRITICAL", LogLevel::Critical),
        ] {
            let cli = Cli::try_parse_from([
                "reddit_saver",
                "--target_file",
                "out.csv",
                "--log_level",
                name,
            ])
            .unwrap();
            assert_eq!(cli.log_level, expected);
        }
    }

    #[test]
    fn rejects_unknown_log_level() {
        let err = Cli::try_parse_from([
            "reddit_saver",
            "--target_file",
            "out.csv",
            "--log_level",
            "VERBOSE",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn log_level_names_are_case_sensitive() {
        let result = Cli::try_parse_from([
            "reddit_saver",
            "--target_file",
            "out.csv",
            "--log_level",
            "debug",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn critical_maps_to_error_filter() {
        use tracing::level_filters::LevelFilter;
        assert_eq!(LogLevel::Critical.as_filter(), LevelFilter::ERROR);
        assert_eq!(LogLevel::Warning.as_filter(), LevelFilter::WARN);
    }

    #[test]
    fn parses_optional_flags() {
        let cli = Cli::try_parse_from([
            "reddit_saver",
            "--target_file",
            "out.csv",
            "--profile",
            "alt",
            "--config_path",
            "/tmp/creds.json",
            "--limit",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.profile, "alt");
        assert_eq!(cli.config_path, Some(PathBuf::from("/tmp/creds.json")));
        assert_eq!(cli.limit, Some(5));
    }
}
