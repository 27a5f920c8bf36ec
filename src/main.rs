//! # Snippet Collector CLI (`scc`)
//!
//! The `scc` binary saves code snippets, searches and lists them, and
//! exports the collection. It stands in for the browser UI: every command
//! goes through the same collection engine a capture does.
//!
//! ## Usage
//!
//! ```bash
//! scc --config ./config/scc.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scc init` | Create the store and write default settings |
//! | `scc add` | Save a snippet (from `--code`, `--file`, or stdin) |
//! | `scc list` | List saved snippets, newest first |
//! | `scc search [QUERY]` | Filter by text and tags |
//! | `scc get <id>` | Show one snippet |
//! | `scc copy <id>` | Print the clipboard text for a snippet |
//! | `scc tag <id> <tags>` | Replace a snippet's tags (comma-separated) |
//! | `scc tags` | List every tag in use |
//! | `scc delete <id>` | Delete one snippet |
//! | `scc clear` | Delete every snippet |
//! | `scc export <json\|markdown>` | Export the collection |
//! | `scc settings ...` | Show, change, or reset settings |
//! | `scc completions <shell>` | Generate shell completions |

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use snippet_collector::add::{self, Capture};
use snippet_collector::config;
use snippet_collector::export::{self, ExportFormat};
use snippet_collector::get;
use snippet_collector::search;
use snippet_collector::settings_cmd;
use snippet_collector::tag;

/// Snippet Collector CLI: save, search, and export code snippets.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file does not exist, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "scc",
    about = "Snippet Collector: save, de-duplicate, search, and export code snippets",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/scc.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Create the store and write (or upgrade) the settings record.
    ///
    /// Idempotent: running it again only fills in settings fields that
    /// a newer version added.
    Init,

    /// Save a snippet.
    ///
    /// The code is sanitized with the current settings unless `--raw` is
    /// given. Re-saving identical code replaces the older entry.
    Add {
        /// Code text. Read from stdin when neither --code nor --file is given.
        #[arg(long, conflicts_with = "file")]
        code: Option<String>,

        /// Read the code from a file.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Snippet id. A new UUID is generated when omitted.
        #[arg(long)]
        id: Option<String>,

        /// URL of the page the code came from.
        #[arg(long)]
        url: Option<String>,

        /// Title of the page the code came from.
        #[arg(long)]
        title: Option<String>,

        /// Language tag. Detected from --class or the code when omitted.
        #[arg(long)]
        lang: Option<String>,

        /// `class` attribute of the source element (repeatable, innermost first).
        #[arg(long = "class")]
        classes: Vec<String>,

        /// Tag to attach (repeatable).
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Cap the collection at this many snippets for this save.
        #[arg(long)]
        max_history: Option<i64>,

        /// Store the code exactly as given.
        #[arg(long)]
        raw: bool,
    },

    /// List saved snippets, newest first.
    List {
        /// Print JSON instead of the summary layout.
        #[arg(long)]
        json: bool,
    },

    /// Search saved snippets.
    ///
    /// The query matches code, page title, URL, language, and tags,
    /// case-insensitively. Every --tag must be present on a result.
    Search {
        /// Text to look for. Empty matches everything.
        #[arg(default_value = "")]
        query: String,

        /// Required tag (repeatable).
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Print JSON instead of the summary layout.
        #[arg(long)]
        json: bool,
    },

    /// Show a snippet by id.
    Get {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Print the clipboard text for a snippet.
    Copy { id: String },

    /// Replace a snippet's tags.
    ///
    /// The snippet is re-saved with the new tags and moves to the front.
    Tag {
        id: String,

        /// Comma-separated tags, e.g. `rust, cli`. Empty clears them.
        tags: String,
    },

    /// List every tag in use, sorted.
    Tags,

    /// Delete a snippet by id.
    Delete { id: String },

    /// Delete every snippet.
    Clear,

    /// Export the collection.
    Export {
        /// `json` or `markdown`.
        format: String,

        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show or change settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Generate shell completions.
    Completions {
        shell: Shell,
    },
}

/// Settings subcommands.
#[derive(Subcommand)]
enum SettingsAction {
    /// Print the effective settings.
    Show,
    /// Deep-merge a JSON patch into the stored settings.
    Set {
        /// e.g. `{"sanitize": {"stripComments": true}}`
        patch: String,
    },
    /// Set the history cap (clamped to 50..=1000).
    SetHistory { value: usize },
    /// Restore default settings.
    Reset,
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "scc", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config_or_default(&cli.config)?;
    init_tracing(&cfg.logging.level);

    match cli.command {
        Commands::Init => {
            settings_cmd::run_init(&cfg).await?;
        }
        Commands::Add {
            code,
            file,
            id,
            url,
            title,
            lang,
            classes,
            tags,
            max_history,
            raw,
        } => {
            let capture = Capture {
                code: add::read_code(code, file)?,
                id,
                source_url: url,
                page_title: title,
                language: lang,
                class_names: classes,
                tags,
                raw,
            };
            add::run_add(&cfg, capture, max_history).await?;
        }
        Commands::List { json } => {
            search::run_list(&cfg, json).await?;
        }
        Commands::Search { query, tags, json } => {
            search::run_search(&cfg, &query, &tags, json).await?;
        }
        Commands::Get { id, json } => {
            get::run_get(&cfg, &id, json).await?;
        }
        Commands::Copy { id } => {
            get::run_copy(&cfg, &id).await?;
        }
        Commands::Tag { id, tags } => {
            tag::run_tag(&cfg, &id, &tags).await?;
        }
        Commands::Tags => {
            tag::run_tags(&cfg).await?;
        }
        Commands::Delete { id } => {
            add::run_delete(&cfg, &id).await?;
        }
        Commands::Clear => {
            add::run_clear(&cfg).await?;
        }
        Commands::Export { format, output } => {
            let format = ExportFormat::parse(&format)?;
            export::run_export(&cfg, format, output.as_deref()).await?;
        }
        Commands::Settings { action } => match action {
            SettingsAction::Show => settings_cmd::run_show(&cfg).await?,
            SettingsAction::Set { patch } => settings_cmd::run_set(&cfg, &patch).await?,
            SettingsAction::SetHistory { value } => {
                settings_cmd::run_set_history(&cfg, value).await?
            }
            SettingsAction::Reset => settings_cmd::run_reset(&cfg).await?,
        },
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
