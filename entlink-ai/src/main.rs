//! entlink-ai - entity linking service
//!
//! `serve` runs the HTTP API; `analyze` runs the pipeline once over a file and
//! prints the export to stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use entlink_ai::config::{load_config, TomlConfig};
use entlink_ai::export::{render_document, to_jsonld, Summary};
use entlink_ai::{AnalysisOptions, AppState, EntityPipeline};
use entlink_common::logging::{init_tracing, with_bootstrap_logging};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "entlink-ai", version, about = "Entity extraction, knowledge linking and geocoding")]
struct Cli {
    /// Config file (overrides ENTLINK_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Listen port (overrides [server] port)
        #[arg(short, long, env = "ENTLINK_PORT")]
        port: Option<u16>,
    },
    /// Analyse a text file and print the result
    Analyze {
        file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Analysis title (defaults to the file stem)
        #[arg(short, long)]
        title: Option<String>,

        /// Skip knowledge linking
        #[arg(long)]
        no_link: bool,

        /// Skip geocoding
        #[arg(long)]
        no_geocode: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Jsonld,
    Html,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = with_bootstrap_logging(|| load_config(cli.config.as_deref()))
        .context("Failed to load configuration")?;
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Command::Serve { port } => serve(config, port).await,
        Command::Analyze {
            file,
            format,
            title,
            no_link,
            no_geocode,
        } => {
            let title = title.unwrap_or_else(|| {
                file.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| entlink_ai::pipeline::DEFAULT_TITLE.to_string())
            });
            let options = AnalysisOptions {
                title,
                link: !no_link,
                geocode: !no_geocode,
            };
            analyze_file(&config, &file, format, &options).await
        }
    }
}

async fn serve(config: TomlConfig, port_override: Option<u16>) -> Result<()> {
    info!("Starting entlink-ai");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let pipeline = EntityPipeline::from_config(&config).context("Failed to build pipeline")?;
    let state = AppState::new(Arc::new(pipeline));
    let app = entlink_ai::build_router(state);

    let port = port_override.unwrap_or(config.server.port);
    let addr = format!("{}:{}", config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn analyze_file(
    config: &TomlConfig,
    file: &Path,
    format: OutputFormat,
    options: &AnalysisOptions,
) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let pipeline = EntityPipeline::from_config(config).context("Failed to build pipeline")?;
    let analysis = pipeline.analyze(&text, options).await?;

    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "analysis": analysis,
            "summary": Summary::from_entities(&analysis.entities),
        }))?,
        OutputFormat::Jsonld => serde_json::to_string_pretty(&to_jsonld(&analysis))?,
        OutputFormat::Html => render_document(&analysis),
    };
    println!("{}", output);

    Ok(())
}
