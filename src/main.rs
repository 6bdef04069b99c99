use clap::Parser;
use forum_harvest::core::config::load_harvest_config;
use forum_harvest::core::logging::init_tracing;
use forum_harvest::scraping::browser_manager::ChromeSessionFactory;
use forum_harvest::scraping::pacing::RequestDelay;
use forum_harvest::tools::export::{desktop_candidates, output_file_name, resolve_output_dir, write_csv};
use forum_harvest::{run_harvest, HarvestError, HarvestOptions, SessionTimeouts};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "forum-harvest")]
#[command(about = "Crawl community forum listings and harvest post and reply text to CSV", long_about = None)]
struct Args {
    /// Market code (sg, my, ph, th, vn, id, in)
    #[arg(short, long)]
    market: String,

    /// First listing page (inclusive)
    #[arg(long, default_value = "1")]
    start: u32,

    /// Last listing page (inclusive)
    #[arg(long, default_value = "1")]
    stop: u32,

    /// Detail-fetch workers, each with its own browser
    #[arg(short, long)]
    workers: Option<usize>,

    /// Show browser windows
    #[arg(long)]
    headed: bool,

    /// Output CSV file, or a directory to place it in
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let cfg = load_harvest_config();
    let scrape = &cfg.scrape;
    let (delay_min, delay_max) = scrape.resolve_delay_range_ms();
    let options = HarvestOptions {
        market: args.market.clone(),
        start_page: args.start,
        stop_page: args.stop,
        workers: args.workers.unwrap_or_else(|| scrape.resolve_workers()),
        timeouts: SessionTimeouts {
            navigation: Duration::from_millis(scrape.resolve_page_load_timeout_ms()),
            selector_wait: Duration::from_millis(scrape.resolve_wait_timeout_ms()),
        },
        delay: RequestDelay::new(delay_min, delay_max),
    };
    let market = options.validate()?;

    let headless = !args.headed && scrape.resolve_headless();
    let factory = ChromeSessionFactory::new_auto(headless, options.timeouts.navigation).ok_or_else(|| {
        HarvestError::BrowserUnavailable(
            "no Chromium-family browser found; install Chrome/Chromium or set CHROME_EXECUTABLE"
                .to_string(),
        )
    })?;

    let report = run_harvest(&options, Arc::new(factory)).await?;

    let file_name = output_file_name(market.code, args.start, args.stop, chrono::Local::now());
    let path = match args.output {
        Some(p) if p.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv")) => p,
        Some(dir) => dir.join(&file_name),
        None => resolve_output_dir(scrape.resolve_output_dir(), &desktop_candidates()).join(&file_name),
    };
    write_csv(&report.rows, &path)?;

    if !report.pages_skipped.is_empty() {
        warn!("pages skipped: {:?}", report.pages_skipped);
    }
    info!(
        "🎉 {} rows ({} pages ok, {} tiles dropped) → {}",
        report.rows.len(),
        report.pages_crawled,
        report.tiles_dropped,
        path.display()
    );
    Ok(())
}
