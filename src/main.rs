use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;

use pagecraft::canvas::outline;
use pagecraft::config::{ConfigError, EditorConfig};
use pagecraft::doc::{NewComponent, Page, StoreError};
use pagecraft::engine::EngineCore;
use pagecraft::inspector::literal::{self, DecodeError};
use pagecraft::registry::Registry;
use pagecraft::tree::format_rows;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("page rejected: {0}")]
    Store(#[from] StoreError),
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
}

#[derive(Parser, Debug)]
#[command(name = "pagecraft", about = "Inspect component catalogs and page definitions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in components grouped by category.
    Catalog,
    /// Print a page definition as an indented tree.
    Tree { page: PathBuf },
    /// Print a page definition as a canvas outline.
    Canvas { page: PathBuf },
    /// Decode structured-field text and print the value.
    Decode { text: String },
    /// Build a small example page and print its definition.
    Demo,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = EditorConfig::from_env()?;

    match cli.command {
        Command::Catalog => run_catalog(),
        Command::Tree { page } => {
            let core = load_engine(&config, &page)?;
            print!("{}", format_rows(&core.tree_rows()));
            Ok(())
        }
        Command::Canvas { page } => {
            let core = load_engine(&config, &page)?;
            print!("{}", outline(&core.render_canvas()));
            Ok(())
        }
        Command::Decode { text } => {
            let decoded = literal::decode(&text, &config.literal_limits)?;
            eprintln!("decoded at {:?} stage", decoded.stage);
            println!("{}", literal::encode(&decoded.value));
            Ok(())
        }
        Command::Demo => run_demo(&config),
    }
}

fn run_catalog() -> Result<(), CliError> {
    let registry = Registry::builtin();
    for (category, definitions) in registry.list() {
        println!("{}", category.label());
        for def in definitions {
            let container = if def.is_container() { " (container)" } else { "" };
            println!("  {:<10} {}{container}", def.kind.as_str(), def.label);
        }
    }
    Ok(())
}

fn load_engine(config: &EditorConfig, path: &Path) -> Result<EngineCore, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_owned(), source })?;
    let page: Page = serde_json::from_str(&raw)?;
    let mut core = EngineCore::new(Arc::new(Registry::builtin()), config);
    let page_id = core.load_page(page)?;
    tracing::debug!(%page_id, path = %path.display(), "page loaded");
    Ok(core)
}

fn run_demo(config: &EditorConfig) -> Result<(), CliError> {
    let mut core = EngineCore::new(Arc::new(Registry::builtin()), config);
    let page_id = core.create_page("Demo", "/");
    let row = core.doc.add_component(&page_id, NewComponent::new("row"))?;
    let column = core.doc.add_component(&page_id, NewComponent::new("column").child_of(row))?;
    core.doc.add_component(&page_id, NewComponent::new("button").child_of(column))?;

    if let Some(page) = core.doc.export_page(&page_id) {
        print_json(&page)?;
    }
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
