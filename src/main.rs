//! # Note Linker CLI (`nlink`)
//!
//! ## Usage
//!
//! ```bash
//! nlink --config ./config/nlink.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `nlink init` | Create the state directory and database |
//! | `nlink status` | Compare the vault with the index |
//! | `nlink index` | Incrementally index the vault |
//! | `nlink candidates` | List suggested links, best first |
//! | `nlink decide <a> <b> <yes\|no>` | Record a review verdict |
//! | `nlink completions <shell>` | Print shell completions |

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use note_linker::progress::ProgressMode;
use note_linker::{
    candidates_cmd, config, decide_cmd, index_cmd, logging, migrate, scanner, status_cmd,
};

/// Note Linker: suggests links between related notes in a Markdown vault.
#[derive(Parser)]
#[command(name = "nlink", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/nlink.toml")]
    config: PathBuf,

    /// Debug logging on stderr (RUST_LOG takes precedence).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the state directory and database. Safe to run repeatedly.
    Init,

    /// Show how many notes are indexed and how many need indexing.
    Status,

    /// Index new and changed notes, reusing cached embeddings.
    ///
    /// Fails immediately if another index run holds the lock.
    Index {
        /// Progress output on stderr. Defaults to human on a TTY, else off.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// List candidate note pairs, best first.
    Candidates {
        /// Maximum pairs to print (default: ranking.limit).
        #[arg(long)]
        limit: Option<usize>,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Record a verdict for a pair of notes.
    ///
    /// The verdict holds until either note's content changes.
    Decide {
        /// Vault-relative path of the first note.
        a: String,
        /// Vault-relative path of the second note.
        b: String,
        /// `yes` or `no`.
        verdict: String,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "nlink", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = match config::load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            logging::init(cli.verbose, None);
            return Err(e);
        }
    };
    logging::init(cli.verbose, Some(&cfg.logging.level));

    match cli.command {
        Commands::Init => {
            scanner::ensure_vault(&cfg.vault.path)?;
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized at {}", cfg.db_path().display());
        }
        Commands::Status => {
            status_cmd::run_status(&cfg).await?;
        }
        Commands::Index { progress } => {
            let mode = progress.unwrap_or_else(ProgressMode::default_for_tty);
            index_cmd::run_index(&cfg, mode).await?;
        }
        Commands::Candidates { limit, json } => {
            candidates_cmd::run_candidates(&cfg, limit, json).await?;
        }
        Commands::Decide { a, b, verdict } => {
            decide_cmd::run_decide(&cfg, &a, &b, &verdict).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
