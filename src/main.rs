use anyhow::Result;
use clap::Parser;
use practice_scraper::{
    output::{save, OutputFormat},
    pipeline::DEFAULT_URL,
    record::{DelimitedSchema, Delimiter},
    ProblemScraperBuilder,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "practice-scraper", about = "Scrape practice problems by category")]
struct Cli {
    /// Listing page to scrape
    #[arg(long, env = "SCRAPER_URL", default_value = DEFAULT_URL)]
    url: String,
    /// Index of the listing tab to open
    #[arg(long, default_value = "2")]
    tab: usize,
    /// Number of linked rows to enrich with detail markup
    #[arg(short = 'n', long, default_value = "3")]
    batch_size: usize,
    /// Path appended to each problem link before fetching its detail page
    #[arg(long)]
    detail_suffix: Option<String>,
    /// Wait timeout for page elements, in milliseconds
    #[arg(long, env = "SCRAPER_TIMEOUT_MS", default_value = "10000")]
    timeout_ms: u64,
    /// Show the browser window
    #[arg(long)]
    headed: bool,
    #[arg(short, long, env = "SCRAPER_OUT_DIR", default_value = "./data")]
    out_dir: PathBuf,
    /// Output file name (default depends on format)
    #[arg(long)]
    filename: Option<String>,
    /// json or delimited
    #[arg(short, long, default_value = "delimited")]
    format: OutputFormat,
    /// comma or pipe
    #[arg(short, long, default_value = "pipe")]
    delimiter: Delimiter,
    /// standard or legacy column layout
    #[arg(long, default_value = "standard")]
    schema: DelimitedSchema,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut builder = ProblemScraperBuilder::default();
    builder
        .url(cli.url)
        .tab_index(cli.tab)
        .batch_size(cli.batch_size)
        .timeout_ms(cli.timeout_ms)
        .headless(!cli.headed);
    if let Some(suffix) = cli.detail_suffix {
        builder.detail_suffix(suffix);
    }
    let scraper = builder.build()?;

    let report = scraper.scrape().await?;
    info!(
        records = report.records.len(),
        failures = report.failures.len(),
        "scrape finished"
    );
    for failure in &report.failures {
        warn!(
            index = failure.index,
            title = failure.title.as_str(),
            "no detail: {}",
            failure.reason
        );
    }

    let contents = cli.format.render(&report.records, cli.schema, cli.delimiter)?;
    let filename = cli
        .filename
        .unwrap_or_else(|| cli.format.default_filename().to_string());
    save(&cli.out_dir, &filename, &contents)?;

    Ok(())
}
