use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use navigator_common::{logger, AppConfig};
use navigator_data::{clean_csv, RecordStore};
use navigator_vector::SemanticSearch;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "navigator")]
#[command(about = "AI Use Case Navigator - browse and semantically search AI adoption case studies", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./navigator.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        /// Use case CSV
        #[arg(long)]
        data_path: Option<PathBuf>,
    },

    /// Semantic search from the command line
    Search {
        /// Query text
        query: String,

        /// Number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Delete the embedding cache and rebuild it
    Rebuild {
        /// Use case CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Clean a raw use case CSV
    Clean {
        /// Raw CSV file
        input: PathBuf,

        /// Output file (defaults to <input>_cleaned_<timestamp>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            data_path,
        }) => serve(cli.config, host, port, data_path),
        None => serve(cli.config, None, None, None),
        Some(Commands::Search { query, top_k }) => search(cli.config, &query, top_k),
        Some(Commands::Rebuild { csv }) => rebuild(cli.config, csv),
        Some(Commands::Clean { input, output }) => clean(&input, output),
    }
}

fn load_config(file: Option<PathBuf>) -> Result<AppConfig> {
    AppConfig::load(file.as_deref()).context("failed to load configuration")
}

fn serve(
    file: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    data_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(file)?;

    // Override with CLI arguments
    if let Some(host) = host {
        config.server_host = host;
    }
    if let Some(port) = port {
        config.server_port = port;
    }
    if let Some(data_path) = data_path {
        config.data_path = data_path;
    }
    config.validate()?;

    logger::setup_logging(&config.log_dir, &config.log_level)?;

    tracing::info!("Navigator starting...");
    tracing::info!("Configuration loaded:");
    tracing::info!("  Bind: {}", config.server_bind_address());
    tracing::info!("  Data: {}", config.data_path.display());
    tracing::info!("  Cache: {}", config.cache_dir.display());
    tracing::info!("  Embedding model: {}", config.embedding_model);

    println!("Server listening on http://{}", config.server_bind_address());

    actix_web::rt::System::new().block_on(navigator_server::start_server(config))?;
    Ok(())
}

fn open_search(config: &AppConfig) -> Result<SemanticSearch> {
    let store = RecordStore::load(&config.data_path)
        .with_context(|| format!("failed to load {}", config.data_path.display()))?;
    Ok(SemanticSearch::from_config(config, Arc::new(store)))
}

fn search(file: Option<PathBuf>, query: &str, top_k: Option<usize>) -> Result<()> {
    let config = load_config(file)?;
    logger::setup_console_logging(&config.log_level)?;

    let search = open_search(&config)?;
    let results = match top_k {
        Some(k) => search.search(query, k),
        None => search.search_default(query),
    }
    .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if results.is_empty() {
        println!("No results for \"{}\"", query.trim());
        return Ok(());
    }

    for (rank, hit) in results.iter().enumerate() {
        let record = &hit.record;
        println!(
            "{:>2}. [{:.3}] {} - {}",
            rank + 1,
            hit.score,
            record.company,
            record.use_case_name
        );
        println!(
            "    {} | {}",
            record.business_function_label(),
            record.ai_type_label()
        );
        if !record.outcome.is_empty() {
            println!("    {}", record.outcome);
        }
        if let Some(url) = record.source_url() {
            println!("    {}", url);
        }
    }

    Ok(())
}

fn rebuild(file: Option<PathBuf>, csv: Option<PathBuf>) -> Result<()> {
    let mut config = load_config(file)?;
    if let Some(csv) = csv {
        config.data_path = csv;
    }
    logger::setup_console_logging(&config.log_level)?;

    let search = open_search(&config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!(
        "Embedding {} use cases with {}...",
        search.store().count(),
        config.embedding_model
    ));
    pb.enable_steady_tick(Duration::from_millis(120));

    let result = search.force_rebuild();
    pb.finish_and_clear();

    let status = result.map_err(|e| anyhow::anyhow!(e.user_message()))?;
    println!(
        "Rebuilt embedding cache: {} records, dimension {}",
        status.indexed,
        status.dimension.unwrap_or(0)
    );
    println!("Cache directory: {}", config.cache_dir.display());

    Ok(())
}

fn clean(input: &std::path::Path, output: Option<PathBuf>) -> Result<()> {
    logger::setup_console_logging("info")?;

    let report = clean_csv(input, output.as_deref())
        .with_context(|| format!("failed to clean {}", input.display()))?;

    println!("Cleaned data saved to {}", report.output.display());
    println!(
        "  Rows: {} -> {} ({} duplicates removed)",
        report.original_rows, report.final_rows, report.duplicates_removed
    );
    println!(
        "  Columns: {} -> {}",
        report.original_columns, report.final_columns
    );
    if !report.added_columns.is_empty() {
        println!("  Added columns: {}", report.added_columns.join(", "));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from(["navigator", "--config", "nav.toml", "search", "hiring", "-k", "3"]);
        assert_eq!(cli.config, Some(PathBuf::from("nav.toml")));
        match cli.command {
            Some(Commands::Search { query, top_k }) => {
                assert_eq!(query, "hiring");
                assert_eq!(top_k, Some(3));
            }
            _ => panic!("expected search"),
        }

        let cli = Cli::parse_from(["navigator"]);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["navigator", "clean", "raw.csv", "-o", "out.csv"]);
        assert!(matches!(cli.command, Some(Commands::Clean { output: Some(_), .. })));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
