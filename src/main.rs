use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

use jotpad::config::{RcConfig, RcLoader};
use jotpad::controller::{
    EditorApp, EditorSession, MENU_ITEMS, MenuCommand, apply_menu_command, checked_items,
};
use jotpad::document_model::Options;
use jotpad::export::{ClipboardDownloader, DirectoryDownloader, Downloader, export_filename};
use jotpad::library::{delete_document, format_entry, new_document_id, sorted_documents};
use jotpad::storage::DocumentStore;

/// jotpad - plain-text notes with list continuation and bracket pairing
#[derive(Parser, Debug)]
#[command(name = "jotpad")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Store file (overrides .jotpadrc)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Directory exports are written to (overrides .jotpadrc)
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    /// Show verbose output (debug information)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a new document (the default)
    New,
    /// Open a saved document
    Edit { id: String },
    /// List saved documents in the configured sort order
    List,
    /// Delete a document
    Delete { id: String },
    /// Export a document as a text file
    Export {
        id: String,
        /// Copy to the clipboard instead of writing a file
        #[arg(long)]
        clipboard: bool,
    },
    /// Change a setting by menu id, e.g. `lineLength_wide` or `spellCheck=false`
    Set { command: MenuCommand },
    /// Show the current settings
    Options,
    /// Print a sample .jotpadrc
    SampleRc,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = RcLoader::load_config();
    if let Some(store) = args.store {
        config.store_path = store;
    }
    if let Some(export_dir) = args.export_dir {
        config.export_dir = export_dir;
    }

    let command = args.command.unwrap_or(Command::New);
    if let Command::SampleRc = command {
        print!("{}", RcLoader::generate_sample_rc());
        return Ok(());
    }

    // The editor owns the terminal, so its log goes to a file.
    let interactive = matches!(command, Command::New | Command::Edit { .. });
    let log_level = if args.verbose { "debug" } else { config.log_level.as_str() };
    let log_file = interactive.then(|| config.log_path());
    init_logging(log_level, log_file.as_deref())?;

    let store = DocumentStore::open_file(config.store_path.clone())
        .await
        .with_context(|| format!("Failed to open store {}", config.store_path.display()))?;

    match command {
        Command::New => run_editor(&config, store, &new_document_id()).await,
        Command::Edit { id } => run_editor(&config, store, &id).await,
        Command::List => {
            for doc in sorted_documents(&store).await {
                println!("{}", format_entry(&doc));
            }
            Ok(())
        }
        Command::Delete { id } => {
            delete_document(&store, &id).await?;
            println!("Deleted {id}");
            Ok(())
        }
        Command::Export { id, clipboard } => export(&config, &store, &id, clipboard).await,
        Command::Set { command } => {
            let options = apply_menu_command(&store, command).await;
            print_options(&options);
            Ok(())
        }
        Command::Options => {
            print_options(&store.load_options().await);
            Ok(())
        }
        Command::SampleRc => Ok(()),
    }
}

fn init_logging(level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(format!("jotpad={level}").parse()?);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
    Ok(())
}

async fn run_editor(config: &RcConfig, store: DocumentStore, id: &str) -> Result<()> {
    let downloader = Arc::new(DirectoryDownloader::new(config.export_dir.clone()));
    let session = EditorSession::new(store.clone(), downloader, Some(id), config.session_settings());

    EditorApp::new(session, store.clone())
        .with_watch_interval(config.watch_interval())
        .with_tab_stop(config.tab_stop)
        .run()
        .await?;

    if store.load_document(id).await.is_some() {
        println!("Saved as {id} (reopen with `jotpad edit {id}`)");
    }
    Ok(())
}

async fn export(config: &RcConfig, store: &DocumentStore, id: &str, clipboard: bool) -> Result<()> {
    let doc = store
        .load_document(id)
        .await
        .with_context(|| format!("No document with id {id}"))?;
    let filename = export_filename(&doc.text, config.filename_length);

    let downloader: Box<dyn Downloader> = if clipboard {
        Box::new(ClipboardDownloader::new())
    } else {
        Box::new(DirectoryDownloader::new(config.export_dir.clone()))
    };
    downloader.download_file(&doc.text, &filename).await?;

    if clipboard {
        println!("Copied {id} to the clipboard");
    } else {
        println!("Exported {id} as {filename} into {}", config.export_dir.display());
    }
    Ok(())
}

fn print_options(options: &Options) {
    let checked = checked_items(options);
    for item in MENU_ITEMS {
        let mark = if checked.contains(&item) { "x" } else { " " };
        println!("[{mark}] {item}");
    }
}
