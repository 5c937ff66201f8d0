//! # FAQ Harness CLI (`faqctl`)
//!
//! ```bash
//! faqctl --config ./config/faq.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `faqctl init` | Create the SQLite database and run schema migrations |
//! | `faqctl import <file>` | Import FAQs from JSON and refit the matcher |
//! | `faqctl fit` | Refit the matcher and refresh the embedding cache |
//! | `faqctl ask "<question>"` | Answer a question |
//! | `faqctl faqs` | List stored FAQs |
//! | `faqctl history` | Show recent chat exchanges |
//! | `faqctl serve` | Start the HTTP chat server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use faq_harness::{commands, config, migrate, server, MatchMethod};

/// FAQ Harness CLI: answer questions from a stored FAQ corpus.
#[derive(Parser)]
#[command(
    name = "faqctl",
    about = "FAQ Harness: hybrid TF-IDF and embedding FAQ matching",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/faq.toml")]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent; running it multiple times is safe.
    Init,

    /// Import FAQs from a JSON file.
    ///
    /// Accepts an array of `{question, answer, category?}` objects or an
    /// object with a `faqs` array. Refits the matcher afterwards.
    Import {
        /// Path to the JSON file.
        file: PathBuf,

        /// Skip the refit (embedding cache stays stale until `faqctl fit`).
        #[arg(long)]
        no_fit: bool,
    },

    /// Refit the matcher and refresh the embedding cache.
    Fit,

    /// Answer a question against the stored FAQs.
    Ask {
        /// The question text.
        question: String,

        /// Matching method: `lexical`, `semantic`, or `hybrid`.
        #[arg(long, default_value = "hybrid")]
        method: MatchMethod,
    },

    /// List stored FAQs.
    Faqs {
        /// Only show FAQs whose question or answer contains this text.
        #[arg(long)]
        keyword: Option<String>,
    },

    /// Show recent chat history.
    History {
        /// Maximum number of exchanges to show.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Start the HTTP chat server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "faq_harness=debug,faq_harness_core=debug,tower_http=debug"
    } else {
        "faq_harness=info,faq_harness_core=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Import { file, no_fit } => {
            commands::run_import(&cfg, &file, no_fit).await?;
        }
        Commands::Fit => {
            commands::run_fit(&cfg).await?;
        }
        Commands::Ask { question, method } => {
            commands::run_ask(&cfg, &question, method).await?;
        }
        Commands::Faqs { keyword } => {
            commands::run_faqs(&cfg, keyword.as_deref()).await?;
        }
        Commands::History { limit } => {
            commands::run_history(&cfg, limit).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
