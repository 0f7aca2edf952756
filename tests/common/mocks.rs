//! In-memory stand-ins for the Cloudsmith API and the metric sink

use async_trait::async_trait;
use cloudsmith_check::{
    CloudsmithApi, EmitError, FetchError, InstanceConfig, MetricSink, ScanResult,
    ServiceCheckStatus, UsageInfo,
};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Serves canned payloads and counts how often it is asked for them.
/// A payload that was never set answers with a 503.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct StaticApi {
    usage: Option<UsageInfo>,
    scans: Option<Vec<ScanResult>>,
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl StaticApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_usage(mut self, usage: UsageInfo) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_scans(mut self, scans: Vec<ScanResult>) -> Self {
        self.scans = Some(scans);
        self
    }

    /// Shared call counter, still readable once the api moved into a check
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    fn canned<T: Clone>(&self, value: &Option<T>, what: &str) -> Result<T, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        value.clone().ok_or_else(|| FetchError::Status {
            url: format!("static://{}", what),
            status: 503,
            body: "no canned response".to_string(),
        })
    }
}

#[async_trait]
impl CloudsmithApi for StaticApi {
    async fn get_usage_info(&self, _instance: &InstanceConfig) -> Result<UsageInfo, FetchError> {
        self.canned(&self.usage, "quota")
    }

    async fn get_vulnerability_info(
        &self,
        _instance: &InstanceConfig,
    ) -> Result<Vec<ScanResult>, FetchError> {
        self.canned(&self.scans, "vulnerabilities")
    }
}

/// Sink whose every submission fails, counting the attempts
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct FailingSink {
    pub attempts: usize,
}

#[async_trait]
impl MetricSink for FailingSink {
    async fn gauge(&mut self, _name: &str, _value: f64, _tags: &[String]) -> Result<(), EmitError> {
        self.attempts += 1;
        Err(EmitError::Io(io::Error::new(io::ErrorKind::Other, "sink closed")))
    }

    async fn service_check(
        &mut self,
        _name: &str,
        _status: ServiceCheckStatus,
        _tags: &[String],
        _message: Option<&str>,
    ) -> Result<(), EmitError> {
        self.attempts += 1;
        Err(EmitError::Io(io::Error::new(io::ErrorKind::Other, "sink closed")))
    }
}
