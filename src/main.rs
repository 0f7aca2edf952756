use anyhow::{Context, Result};
use tracing::{info, warn};

use cloudsmith_check::{load_config, CloudsmithCheck, DogStatsdSink, HttpClient};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cfg = load_config().context("Invalid Cloudsmith instance configuration")?;
    info!("org = {}, url = {}", cfg.instance.org, cfg.instance.url);

    let api = HttpClient::new(cfg.timeout).context("Failed to build HTTP client")?;
    let mut sink = DogStatsdSink::connect(&cfg.dogstatsd_addr).await?;

    let check = CloudsmithCheck::new(cfg.instance.clone(), api);
    let report = check.run(&mut sink).await?;

    let summary = report.summary();
    info!(
        "storage {:.3}% ({}), bandwidth {:.3}% ({}), {} vulnerabilities across {} packages",
        summary.storage_used,
        summary.storage_status,
        summary.bandwidth_used,
        summary.bandwidth_status,
        summary.total_vulnerabilities,
        summary.package_count,
    );
    if summary.has_issues() {
        warn!(
            "Cloudsmith reports issues: storage {}, bandwidth {}, {} scans at High or worse",
            summary.storage_status, summary.bandwidth_status, summary.high_or_worse
        );
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
