//! Hybrid RAG CLI - main entry point

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tokio::io::BufReader;

use hybrid_rag::{run_chat, Services};
use hybridrag_config::AppConfig;
use hybridrag_observability::{init_tracing, LogFormat, TracingConfig};

#[derive(Parser)]
#[command(name = "hybrid-rag")]
#[command(about = "Hybrid vector + knowledge graph retrieval over your documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormatArg::Pretty)]
    log_format: LogFormatArg,

    /// More log detail (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log span open/close events
    #[arg(long, env = "LOG_SPANS", default_value_t = false)]
    log_spans: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk, embed and extract every file in the raw data folder
    Ingest {
        /// Folder to ingest (defaults to RAW_DATA_FOLDER)
        #[arg(short, long)]
        folder: Option<PathBuf>,
    },

    /// Answer a single question and print the result as JSON
    Ask {
        question: String,
    },

    /// Interactive question loop
    Chat,

    /// Show vector store, graph store and model server status
    Stats,

    /// Delete the vector collection and every graph node
    Wipe {
        /// Confirm the deletion
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(
        TracingConfig::for_service("hybrid-rag")
            .with_format(cli.log_format.into())
            .with_verbosity(cli.verbose)
            .with_spans(cli.log_spans),
    );

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let services = Services::from_config(config)?;

    match cli.command {
        Commands::Ingest { folder } => {
            let folder = folder.unwrap_or_else(|| services.config.ingestion.raw_data_folder.clone());
            tracing::info!("📥 Ingesting {}", folder.display());

            let pipeline = services.ingestion_pipeline().await?;
            let report = pipeline
                .run(&folder)
                .await
                .context("Ingestion failed")?;
            print_json(&report)?;
        }
        Commands::Ask { question } => {
            let agent = services.answering_agent().await?;
            let answer = agent.answer(&question).await?;
            print_json(&answer)?;
        }
        Commands::Chat => {
            let agent = services.answering_agent().await?;
            println!("Hybrid RAG chat. Type 'exit' or 'quit' to leave.");
            run_chat(&agent, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
        }
        Commands::Stats => {
            let admin = services.admin().await;
            print_json(&admin.stats().await)?;
        }
        Commands::Wipe { yes } => {
            if !yes {
                bail!("Refusing to wipe both stores without --yes");
            }
            let admin = services.admin().await;
            let report = admin.wipe().await;
            print_json(&report)?;

            if !report.vector_store.success || !report.graph_store.success {
                bail!("Wipe did not complete on every store");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        let result = Cli::try_parse_from(["hybrid-rag", "--log-format", "xml", "stats"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_logging_flags_parse() {
        let cli = Cli::try_parse_from(["hybrid-rag", "--log-format", "json", "stats", "-vv"]).unwrap();

        assert_eq!(LogFormat::from(cli.log_format), LogFormat::Json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Stats));
    }
}
