use clap::Parser;
use review_harvest::logging;
use review_harvest::{CompanyReport, HarvestConfig, Harvester};
use std::error::Error;

mod args;
use args::{Args, convert_category};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Parse command-line arguments
    let args = Args::parse();

    // Configuration file first, command line on top
    let config = match &args.config {
        Some(path) => HarvestConfig::from_file(path)?,
        None => HarvestConfig::default(),
    };

    let log_dir = args.log_dir.clone().unwrap_or_else(|| config.log_dir.clone());
    if let Some(path) = logging::init(&log_dir, args.log_stderr)? {
        println!("Logging to {}", path.display());
    }

    let mut harvester = Harvester::new(config);
    if let Some(dir) = args.output_dir {
        harvester = harvester.with_output_dir(dir);
    }
    if let Some(url) = args.webdriver_url {
        harvester = harvester.with_webdriver_url(url);
    }
    if !args.categories.is_empty() {
        let categories: Vec<_> = args.categories.into_iter().map(convert_category).collect();
        harvester = harvester.with_categories(&categories);
    }
    if let Some(max_pages) = args.max_pages {
        harvester = harvester.with_max_pages(max_pages);
    }
    if args.headed {
        harvester = harvester.with_headless(false);
    }

    ::log::info!(
        "Starting harvest of {} via {}",
        args.roster.display(),
        harvester.config().webdriver_url
    );
    let start_time = std::time::Instant::now();

    let reports = harvester.run(&args.roster).await.inspect_err(|e| {
        ::log::error!("Harvest stopped: {}", e);
    })?;

    for report in &reports {
        log_report(report);
    }

    let duration = start_time.elapsed();
    ::log::info!(
        "Harvest complete - {} companies, {} rows in {:.2} seconds",
        reports.len(),
        reports.iter().map(CompanyReport::rows_written).sum::<usize>(),
        duration.as_secs_f64()
    );
    Ok(())
}

fn log_report(report: &CompanyReport) {
    ::log::info!(
        "{}: {} rows, {} failed pages",
        report.company,
        report.rows_written(),
        report.pages_failed()
    );
    for category in &report.categories {
        ::log::debug!(
            "  {}: {}/{} pages ok, {} rows{}",
            category.category,
            category.pages_ok,
            category.pages_planned,
            category.rows_written,
            category
                .aborted
                .as_deref()
                .map(|reason| format!(", aborted: {reason}"))
                .unwrap_or_default()
        );
    }
}
