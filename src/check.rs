use thiserror::Error;
use tracing::{info, warn};

use crate::client::{CloudsmithApi, FetchError};
use crate::config::{ConfigError, InstanceConfig, RawInstance};
use crate::metrics::{BANDWIDTH_CHECK, CAN_CONNECT_CHECK, STORAGE_CHECK};
use crate::report::CheckReport;
use crate::sink::{EmitError, MetricSink};
use crate::types::ServiceCheckStatus;

pub const CHECK_NAME: &str = "cloudsmith";

/// Service checks marked CRITICAL when the API cannot be read
const UNREACHABLE_CHECKS: [&str; 3] = [CAN_CONNECT_CHECK, STORAGE_CHECK, BANDWIDTH_CHECK];

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// One configured Cloudsmith instance and the client used to query it.
pub struct CloudsmithCheck<A> {
    instance: InstanceConfig,
    api: A,
}

impl<A: CloudsmithApi> CloudsmithCheck<A> {
    pub fn new(instance: InstanceConfig, api: A) -> Self {
        Self { instance, api }
    }

    /// Validates the raw instance before anything touches the network.
    pub fn from_raw(raw: &RawInstance, api: A) -> Result<Self, CheckError> {
        let instance = raw.validate()?;
        Ok(Self::new(instance, api))
    }

    /// Fetch both payloads, then emit every gauge and service check.
    ///
    /// When a fetch fails no gauge is emitted; the service checks go CRITICAL
    /// and the fetch error is returned even if reporting it fails.
    pub async fn run(&self, sink: &mut dyn MetricSink) -> Result<CheckReport, CheckError> {
        let tags = self.instance.emission_tags();

        let fetched = async {
            let usage = self.api.get_usage_info(&self.instance).await?;
            let scans = self.api.get_vulnerability_info(&self.instance).await?;
            Ok::<_, FetchError>((usage, scans))
        }
        .await;

        let (usage, scans) = match fetched {
            Ok(v) => v,
            Err(e) => {
                warn!("Cloudsmith check for org {} failed: {}", self.instance.org, e);
                self.report_unreachable(sink, &tags, &e).await;
                return Err(e.into());
            }
        };

        let report = CheckReport::build(usage, &scans, &self.instance.thresholds);
        emit(&report, &tags, sink).await?;

        let summary = report.summary();
        info!(
            "{} check for org {}: storage {} bandwidth {}",
            CHECK_NAME, self.instance.org, summary.storage_status, summary.bandwidth_status
        );
        Ok(report)
    }

    async fn report_unreachable(
        &self,
        sink: &mut dyn MetricSink,
        tags: &[String],
        err: &FetchError,
    ) {
        let message = err.to_string();
        for name in UNREACHABLE_CHECKS {
            let sent = sink
                .service_check(name, ServiceCheckStatus::Critical, tags, Some(message.as_str()))
                .await;
            if let Err(emit_err) = sent {
                warn!("Failed to report {} for org {}: {}", name, self.instance.org, emit_err);
            }
        }
    }
}

pub async fn emit(
    report: &CheckReport,
    tags: &[String],
    sink: &mut dyn MetricSink,
) -> Result<(), EmitError> {
    for g in &report.gauges {
        sink.gauge(g.name, g.value, tags).await?;
    }
    for sc in &report.service_checks {
        sink.service_check(sc.name, sc.status, tags, sc.message.as_deref()).await?;
    }
    Ok(())
}
