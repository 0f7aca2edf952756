//! Emission of gauges and service checks to the host agent.
//!
//! [`DogStatsdSink`] writes DogStatsD datagrams to the local agent over UDP.
//! [`Aggregator`] keeps everything in memory so tests can inspect a run.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeSet;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::debug;

use crate::types::ServiceCheckStatus;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to reach DogStatsD at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to send datagram: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait MetricSink: Send {
    async fn gauge(&mut self, name: &str, value: f64, tags: &[String]) -> Result<(), EmitError>;

    async fn service_check(
        &mut self,
        name: &str,
        status: ServiceCheckStatus,
        tags: &[String],
        message: Option<&str>,
    ) -> Result<(), EmitError>;
}

pub fn format_gauge(name: &str, value: f64, tags: &[String]) -> String {
    let mut line = format!("{}:{}|g", name, value);
    if !tags.is_empty() {
        line.push_str("|#");
        line.push_str(&tags.join(","));
    }
    line
}

pub fn format_service_check(
    name: &str,
    status: ServiceCheckStatus,
    timestamp: i64,
    tags: &[String],
    message: Option<&str>,
) -> String {
    let mut line = format!("_sc|{}|{}|d:{}", name, status.code(), timestamp);
    if !tags.is_empty() {
        line.push_str("|#");
        line.push_str(&tags.join(","));
    }
    // m: has to be the last field
    if let Some(msg) = message {
        line.push_str("|m:");
        line.push_str(&msg.replace('\n', "\\n"));
    }
    line
}

pub struct DogStatsdSink {
    socket: UdpSocket,
}

impl DogStatsdSink {
    pub async fn connect(addr: &str) -> Result<Self, EmitError> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|source| EmitError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        socket
            .connect(addr)
            .await
            .map_err(|source| EmitError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self { socket })
    }

    async fn send(&self, line: String) -> Result<(), EmitError> {
        debug!("dogstatsd <- {}", line);
        self.socket.send(line.as_bytes()).await?;
        Ok(())
    }
}

#[async_trait]
impl MetricSink for DogStatsdSink {
    async fn gauge(&mut self, name: &str, value: f64, tags: &[String]) -> Result<(), EmitError> {
        self.send(format_gauge(name, value, tags)).await
    }

    async fn service_check(
        &mut self,
        name: &str,
        status: ServiceCheckStatus,
        tags: &[String],
        message: Option<&str>,
    ) -> Result<(), EmitError> {
        let line = format_service_check(name, status, Utc::now().timestamp(), tags, message);
        self.send(line).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeSample {
    pub name: String,
    pub value: f64,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCheckSample {
    pub name: String,
    pub status: ServiceCheckStatus,
    pub tags: Vec<String>,
    pub message: Option<String>,
}

/// In-memory sink recording every submission
#[derive(Debug, Default)]
pub struct Aggregator {
    gauges: Vec<GaugeSample>,
    service_checks: Vec<ServiceCheckSample>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gauges(&self) -> &[GaugeSample] {
        &self.gauges
    }

    pub fn service_checks(&self) -> &[ServiceCheckSample] {
        &self.service_checks
    }

    pub fn metric_values(&self, name: &str) -> Vec<f64> {
        self.gauges.iter().filter(|g| g.name == name).map(|g| g.value).collect()
    }

    pub fn metric_names(&self) -> BTreeSet<&str> {
        self.gauges.iter().map(|g| g.name.as_str()).collect()
    }

    /// Most recent status submitted for a service check
    pub fn service_check_status(&self, name: &str) -> Option<ServiceCheckStatus> {
        self.service_checks.iter().rev().find(|s| s.name == name).map(|s| s.status)
    }

    pub fn reset(&mut self) {
        self.gauges.clear();
        self.service_checks.clear();
    }
}

#[async_trait]
impl MetricSink for Aggregator {
    async fn gauge(&mut self, name: &str, value: f64, tags: &[String]) -> Result<(), EmitError> {
        self.gauges.push(GaugeSample {
            name: name.to_string(),
            value,
            tags: tags.to_vec(),
        });
        Ok(())
    }

    async fn service_check(
        &mut self,
        name: &str,
        status: ServiceCheckStatus,
        tags: &[String],
        message: Option<&str>,
    ) -> Result<(), EmitError> {
        self.service_checks.push(ServiceCheckSample {
            name: name.to_string(),
            status,
            tags: tags.to_vec(),
            message: message.map(str::to_string),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_gauge() {
        assert_eq!(
            format_gauge("cloudsmith.storage_used", 0.914, &[]),
            "cloudsmith.storage_used:0.914|g"
        );
        let tags = vec!["env:prod".to_string(), "cloudsmith_org:acme".to_string()];
        assert_eq!(
            format_gauge("cloudsmith.package_count", 3.0, &tags),
            "cloudsmith.package_count:3|g|#env:prod,cloudsmith_org:acme"
        );
    }

    #[test]
    fn test_format_service_check() {
        let tags = vec!["cloudsmith_org:acme".to_string()];
        assert_eq!(
            format_service_check(
                "cloudsmith.storage",
                ServiceCheckStatus::Warning,
                1700000000,
                &tags,
                Some("storage usage at 80.00%")
            ),
            "_sc|cloudsmith.storage|1|d:1700000000|#cloudsmith_org:acme\
             |m:storage usage at 80.00%"
        );
        assert_eq!(
            format_service_check(
                "cloudsmith.can_connect",
                ServiceCheckStatus::Critical,
                1,
                &[],
                Some("line one\nline two")
            ),
            "_sc|cloudsmith.can_connect|2|d:1|m:line one\\nline two"
        );
    }

    #[tokio::test]
    async fn test_dogstatsd_sink_sends_datagrams() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = receiver.local_addr().unwrap().to_string();

        let mut sink = DogStatsdSink::connect(&addr).await.unwrap();
        sink.gauge("cloudsmith.bandwidth_used", 12.5, &["a:b".to_string()])
            .await
            .unwrap();

        let mut buf = [0u8; 512];
        let (n, _) = receiver.recv_from(&mut buf).await.unwrap();
        assert_eq!(
            std::str::from_utf8(&buf[..n]).unwrap(),
            "cloudsmith.bandwidth_used:12.5|g|#a:b"
        );

        sink.service_check("cloudsmith.bandwidth", ServiceCheckStatus::Ok, &[], None)
            .await
            .unwrap();
        let (n, _) = receiver.recv_from(&mut buf).await.unwrap();
        let line = std::str::from_utf8(&buf[..n]).unwrap();
        assert!(line.starts_with("_sc|cloudsmith.bandwidth|0|d:"));
    }

    #[tokio::test]
    async fn test_aggregator_records_and_resets() {
        let mut agg = Aggregator::new();
        agg.gauge("x", 1.0, &[]).await.unwrap();
        agg.gauge("x", 2.0, &[]).await.unwrap();
        agg.service_check("sc", ServiceCheckStatus::Ok, &[], None).await.unwrap();
        agg.service_check("sc", ServiceCheckStatus::Critical, &[], Some("down"))
            .await
            .unwrap();

        assert_eq!(agg.metric_values("x"), vec![1.0, 2.0]);
        assert_eq!(
            agg.service_check_status("sc"),
            Some(ServiceCheckStatus::Critical)
        );
        assert_eq!(agg.metric_names().len(), 1);

        agg.reset();
        assert!(agg.gauges().is_empty());
        assert!(agg.service_checks().is_empty());
        assert_eq!(agg.service_check_status("sc"), None);
    }
}
