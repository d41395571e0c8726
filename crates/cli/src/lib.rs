pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Once;

use clap::{Parser, Subcommand};

use skillrank_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};

use crate::commands::autocomplete::CatalogKind;
use crate::commands::recommend::RecommendArgs;

#[derive(Debug, Parser)]
#[command(
    name = "skillrank",
    about = "Skillrank recommendation CLI",
    long_about = "Rank learning resources for a learner, prioritize job categories, and search the catalog.",
    after_help = "Examples:\n  skillrank recommend --user ada\n  skillrank recommend --user ada --category 2 --category 5\n  skillrank autocomplete --query jav\n  skillrank prioritize --rating 1:3:5 --rating 2:4:2 --max 1"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Read configuration from this TOML file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override the catalog snapshot path")]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Rank resources for a learner, evidence-backed picks first")]
    Recommend {
        #[arg(long = "user", help = "Learner identifier")]
        user_id: String,
        #[arg(long = "category", help = "Restrict to a category id (repeatable)")]
        categories: Vec<i64>,
        #[arg(long, help = "Cap the list with the interest-weighted dashboard selection")]
        dashboard: bool,
    },
    #[command(about = "Score category:skill:importance triples and keep the best")]
    Prioritize {
        #[arg(long = "rating", required = true, help = "A `category:skill:importance` triple")]
        ratings: Vec<String>,
        #[arg(long = "max", default_value_t = 0, help = "Maximum categories to keep (0 keeps all)")]
        max_categories: usize,
    },
    #[command(about = "Suggest catalog entries closest to a typed query")]
    Autocomplete {
        #[arg(long, help = "Text typed so far")]
        query: String,
        #[arg(long, value_enum, default_value_t = CatalogKind::Resources)]
        kind: CatalogKind,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                snapshot_path: self.catalog.clone(),
                ..ConfigOverrides::default()
            },
        }
    }
}

/// Installs the global subscriber once. Output goes to stderr so stdout stays machine readable.
pub fn init_logging(config: &AppConfig) {
    static INIT: Once = Once::new();
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let format = config.logging.format;

    INIT.call_once(|| match format {
        LogFormat::Compact => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_max_level(log_level)
                .compact()
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_max_level(log_level)
                .pretty()
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_max_level(log_level)
                .json()
                .init();
        }
    });
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    // Config errors are reported by the command itself.
    if let Ok(config) = AppConfig::load(options.clone()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Recommend { user_id, categories, dashboard } => {
            commands::recommend::run(options, RecommendArgs { user_id, categories, dashboard })
        }
        Command::Prioritize { ratings, max_categories } => {
            commands::prioritize::run(&ratings, max_categories)
        }
        Command::Autocomplete { query, kind } => commands::autocomplete::run(options, &query, kind),
        Command::Config => commands::config::run(options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
