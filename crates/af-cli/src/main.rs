//! AutoFiller CLI
//!
//! Manage a rules file in the extension's storage layout and check which
//! rules would fire on a given URL.

mod store;
mod view;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use af_core::{RuleEditor, RuleStore};

use store::FileStore;
use view::{format_rule, TerminalView};

#[derive(Parser)]
#[command(name = "af-cli")]
#[command(about = "AutoFiller rule file tools")]
struct Cli {
    /// Rules file ({"autoFillRules": [...]})
    #[arg(short, long, global = true, default_value = "rules.json")]
    file: String,

    /// Print debug diagnostics to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved rules
    List,

    /// Append a rule
    Add {
        /// Substring matched against the page URL
        #[arg(short, long)]
        url_pattern: String,

        /// CSS selector of the fields to fill
        #[arg(short, long)]
        selector: String,

        /// Value written into empty matching fields
        #[arg(short = 'v', long)]
        default_value: String,
    },

    /// Delete the rule at a position
    Delete {
        #[arg(short, long)]
        index: usize,
    },

    /// Remove every rule
    Clear,

    /// Show which rules would apply to a URL
    Check {
        #[arg(short, long)]
        url: String,
    },

    /// Report rules with empty fields
    Validate,
}

fn main() {
    let cli = Cli::parse();

    let result = init_logging(cli.verbose).and_then(|()| {
        tokio::runtime::Runtime::new()
            .map_err(|e| format!("Failed to start tokio runtime: {}", e))
            .and_then(|runtime| runtime.block_on(run(cli)))
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Install the stderr subscriber. `log` records from af-core are forwarded
/// to it.
fn init_logging(verbose: bool) -> Result<(), String> {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("Failed to install logger: {}", e))
}

async fn run(cli: Cli) -> Result<(), String> {
    let editor = RuleEditor::new(FileStore::new(&cli.file), TerminalView);

    match cli.command {
        Commands::List => {
            editor.load_and_render().await;
            Ok(())
        }
        Commands::Add {
            url_pattern,
            selector,
            default_value,
        } => editor
            .add_rule(&url_pattern, &selector, &default_value)
            .await
            .map_err(|e| e.to_string()),
        Commands::Delete { index } => {
            let removed = editor.delete_rule(index).await.map_err(|e| e.to_string())?;
            match removed {
                Some(rule) => println!("Deleted {}", format_rule(index, &rule).trim_start()),
                None => println!("No rule at index {}", index),
            }
            Ok(())
        }
        Commands::Clear => editor.clear_all_rules().await.map_err(|e| e.to_string()),
        Commands::Check { url } => cmd_check(editor.store(), &url).await,
        Commands::Validate => cmd_validate(editor.store()).await,
    }
}

async fn cmd_check(store: &FileStore, url: &str) -> Result<(), String> {
    let rules = store.load().await.map_err(|e| e.to_string())?;

    let applying: Vec<_> = rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.applies_to(url))
        .collect();

    println!("{} of {} rules apply to {}", applying.len(), rules.len(), url);
    for (index, rule) in applying {
        println!("{}", format_rule(index, rule));
    }
    Ok(())
}

async fn cmd_validate(store: &FileStore) -> Result<(), String> {
    let rules = store.load().await.map_err(|e| e.to_string())?;

    let invalid: Vec<_> = rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| !rule.is_valid())
        .collect();

    if invalid.is_empty() {
        println!("'{}' is valid ({} rules)", store.path().display(), rules.len());
        return Ok(());
    }

    for (index, rule) in &invalid {
        println!("{}", format_rule(*index, rule));
    }
    Err(format!("{} of {} rules are invalid", invalid.len(), rules.len()))
}
