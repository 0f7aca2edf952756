use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;

/// Response body of `GET /quota/{org}/`
#[derive(Debug, Clone, Deserialize)]
pub struct UsageInfo {
    pub usage: Usage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub raw: RawUsage,
    #[serde(default)]
    pub display: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUsage {
    pub storage: ResourceUsage,
    pub bandwidth: ResourceUsage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceUsage {
    #[serde(default)]
    pub used: Option<f64>,
    #[serde(default)]
    pub configured: Option<f64>,
    #[serde(default)]
    pub plan_limit: Option<f64>,
    pub percentage_used: f64,
}

impl UsageInfo {
    pub fn storage_percent(&self) -> f64 {
        self.usage.raw.storage.percentage_used
    }

    pub fn bandwidth_percent(&self) -> f64 {
        self.usage.raw.bandwidth.percentage_used
    }
}

/// Severity levels reported by the vulnerability scanner, ordered lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Unknown,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScannedPackage {
    pub identifier: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// One entry of `GET /vulnerabilities/{org}/`
#[derive(Debug, Clone, Deserialize)]
pub struct ScanResult {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub package: Option<ScannedPackage>,
    #[serde(default)]
    pub num_vulnerabilities: u64,
    #[serde(default)]
    pub max_severity: Option<String>,
}

impl ScanResult {
    pub fn severity(&self) -> Severity {
        self.max_severity.as_deref().map(Severity::parse).unwrap_or(Severity::Unknown)
    }

    pub fn is_at_least_high(&self) -> bool {
        self.severity() >= Severity::High
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VulnerabilitySummary {
    pub package_count: u64,
    pub total_vulnerabilities: u64,
    pub vulnerability_at_least_high_count: u64,
}

impl VulnerabilitySummary {
    pub fn from_scans(scans: &[ScanResult]) -> Self {
        let packages: BTreeSet<&str> = scans
            .iter()
            .filter_map(|s| s.package.as_ref())
            .map(|p| p.identifier.as_str())
            .collect();

        Self {
            package_count: packages.len() as u64,
            total_vulnerabilities: scans.iter().map(|s| s.num_vulnerabilities).sum(),
            vulnerability_at_least_high_count: scans
                .iter()
                .filter(|s| s.is_at_least_high())
                .count() as u64,
        }
    }
}

/// Health state of a service check, encoded the way DogStatsD expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCheckStatus {
    Ok,
    Warning,
    Critical,
}

impl ServiceCheckStatus {
    pub fn code(self) -> u8 {
        match self {
            ServiceCheckStatus::Ok => 0,
            ServiceCheckStatus::Warning => 1,
            ServiceCheckStatus::Critical => 2,
        }
    }
}

impl fmt::Display for ServiceCheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceCheckStatus::Ok => "OK",
            ServiceCheckStatus::Warning => "WARNING",
            ServiceCheckStatus::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    pub name: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCheck {
    pub name: &'static str,
    pub status: ServiceCheckStatus,
    pub message: Option<String>,
}
