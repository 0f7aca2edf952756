use crate::thresholds::Thresholds;
use crate::types::{Gauge, ServiceCheck, UsageInfo, VulnerabilitySummary};

pub const TOTAL_VULNERABILITIES: &str = "cloudsmith.total_vulnerabilities";
pub const VULNERABILITY_AT_LEAST_HIGH_COUNT: &str = "cloudsmith.vulnerability_at_least_high_count";
pub const PACKAGE_COUNT: &str = "cloudsmith.package_count";
pub const STORAGE_USED: &str = "cloudsmith.storage_used";
pub const BANDWIDTH_USED: &str = "cloudsmith.bandwidth_used";

pub const STORAGE_CHECK: &str = "cloudsmith.storage";
pub const BANDWIDTH_CHECK: &str = "cloudsmith.bandwidth";
pub const CAN_CONNECT_CHECK: &str = "cloudsmith.can_connect";

/// Every gauge name the check may emit.
pub const ALL_GAUGES: [&str; 5] = [
    TOTAL_VULNERABILITIES,
    VULNERABILITY_AT_LEAST_HIGH_COUNT,
    PACKAGE_COUNT,
    STORAGE_USED,
    BANDWIDTH_USED,
];

pub fn map_usage(usage: &UsageInfo) -> Vec<Gauge> {
    vec![
        Gauge {
            name: STORAGE_USED,
            value: usage.storage_percent(),
        },
        Gauge {
            name: BANDWIDTH_USED,
            value: usage.bandwidth_percent(),
        },
    ]
}

pub fn map_vulnerabilities(summary: &VulnerabilitySummary) -> Vec<Gauge> {
    vec![
        Gauge {
            name: TOTAL_VULNERABILITIES,
            value: summary.total_vulnerabilities as f64,
        },
        Gauge {
            name: VULNERABILITY_AT_LEAST_HIGH_COUNT,
            value: summary.vulnerability_at_least_high_count as f64,
        },
        Gauge {
            name: PACKAGE_COUNT,
            value: summary.package_count as f64,
        },
    ]
}

fn usage_check(
    name: &'static str,
    resource: &str,
    percent: f64,
    thresholds: &Thresholds,
) -> ServiceCheck {
    ServiceCheck {
        name,
        status: thresholds.evaluate(percent),
        message: Some(format!("{} usage at {:.2}%", resource, percent)),
    }
}

/// Storage and bandwidth health derived from the current usage sample.
pub fn evaluate_usage(usage: &UsageInfo, thresholds: &Thresholds) -> Vec<ServiceCheck> {
    vec![
        usage_check(STORAGE_CHECK, "storage", usage.storage_percent(), thresholds),
        usage_check(BANDWIDTH_CHECK, "bandwidth", usage.bandwidth_percent(), thresholds),
    ]
}
