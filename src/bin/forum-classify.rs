use anyhow::bail;
use clap::Parser;
use forum_harvest::core::config::load_harvest_config;
use forum_harvest::core::logging::init_tracing;
use forum_harvest::nlp::llm::LlmClient;
use forum_harvest::nlp::{classify_file, ClassifyOptions};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "forum-classify")]
#[command(about = "Annotate harvested forum rows with product, topic and sentiment labels", long_about = None)]
struct Args {
    /// CSV file produced by forum-harvest (or any CSV with a text column)
    input: PathBuf,

    /// Output CSV (default: <input>_classified_ai.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Rows per LLM request
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// LLM model name
    #[arg(short, long)]
    model: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if !args.input.exists() {
        bail!("Input file not found: {}", args.input.display());
    }

    let cfg = load_harvest_config().classifier;
    if cfg.resolve_api_key().is_none() {
        bail!("no API key: set OPENAI_API_KEY, or classifier.llm_api_key (\"\" for key-less endpoints)");
    }
    let client = LlmClient::from_config(&cfg, args.model)?;

    let options = ClassifyOptions {
        input: args.input,
        output: args.output,
        batch_size: args.batch_size.unwrap_or_else(|| cfg.resolve_batch_size()).max(1),
        pause: Duration::from_millis(cfg.resolve_pause_ms()),
    };

    let summary = classify_file(&options, &client).await?;
    if summary.batches_failed > 0 {
        warn!("{} batches fell back to default labels", summary.batches_failed);
    }
    info!("📦 Saved: {} ({} rows)", summary.output.display(), summary.rows);
    Ok(())
}
