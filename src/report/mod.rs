use crate::metrics;
use crate::thresholds::Thresholds;
use crate::types::*;

/// Everything one check run produces, ready to hand to a sink.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub usage: UsageInfo,
    pub vulnerabilities: VulnerabilitySummary,
    pub gauges: Vec<Gauge>,
    pub service_checks: Vec<ServiceCheck>,
}

impl CheckReport {
    pub fn build(usage: UsageInfo, scans: &[ScanResult], thresholds: &Thresholds) -> Self {
        let vulnerabilities = VulnerabilitySummary::from_scans(scans);

        let mut gauges = metrics::map_vulnerabilities(&vulnerabilities);
        gauges.extend(metrics::map_usage(&usage));

        let mut service_checks = metrics::evaluate_usage(&usage, thresholds);
        service_checks.push(ServiceCheck {
            name: metrics::CAN_CONNECT_CHECK,
            status: ServiceCheckStatus::Ok,
            message: None,
        });

        Self {
            usage,
            vulnerabilities,
            gauges,
            service_checks,
        }
    }

    pub fn status_of(&self, name: &str) -> Option<ServiceCheckStatus> {
        self.service_checks.iter().find(|s| s.name == name).map(|s| s.status)
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            storage_used: self.usage.storage_percent(),
            bandwidth_used: self.usage.bandwidth_percent(),
            storage_status: self
                .status_of(metrics::STORAGE_CHECK)
                .unwrap_or(ServiceCheckStatus::Ok),
            bandwidth_status: self
                .status_of(metrics::BANDWIDTH_CHECK)
                .unwrap_or(ServiceCheckStatus::Ok),
            package_count: self.vulnerabilities.package_count,
            total_vulnerabilities: self.vulnerabilities.total_vulnerabilities,
            high_or_worse: self.vulnerabilities.vulnerability_at_least_high_count,
        }
    }
}

pub struct ReportSummary {
    pub storage_used: f64,
    pub bandwidth_used: f64,
    pub storage_status: ServiceCheckStatus,
    pub bandwidth_status: ServiceCheckStatus,
    pub package_count: u64,
    pub total_vulnerabilities: u64,
    pub high_or_worse: u64,
}

impl ReportSummary {
    pub fn has_issues(&self) -> bool {
        self.storage_status != ServiceCheckStatus::Ok
            || self.bandwidth_status != ServiceCheckStatus::Ok
            || self.high_or_worse > 0
    }
}
