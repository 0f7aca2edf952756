use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::thresholds::Thresholds;

pub const DEFAULT_DOGSTATSD_ADDR: &str = "127.0.0.1:8125";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required instance field `{0}`")]
    MissingField(&'static str),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("warning threshold {warning} must not exceed critical threshold {critical}")]
    InvalidThresholds { warning: f64, critical: f64 },
    #[error("failed to read API key file {path:?}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Instance settings as handed over by the host, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInstance {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub warning_threshold: Option<f64>,
    #[serde(default)]
    pub critical_threshold: Option<f64>,
}

/// Validated instance settings. Construct through [`RawInstance::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceConfig {
    pub api_key: String,
    pub org: String,
    pub url: String,
    pub tags: Vec<String>,
    pub thresholds: Thresholds,
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, ConfigError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::MissingField(field)),
    }
}

/// Characters with a meaning of their own in a DogStatsD datagram
fn is_datagram_delimiter(c: char) -> bool {
    matches!(c, '|' | '#' | ',' | '\n' | '\r')
}

fn check_datagram_safe(value: &str, field: &'static str) -> Result<(), ConfigError> {
    match value.chars().find(|c| is_datagram_delimiter(*c)) {
        Some(c) => Err(ConfigError::InvalidValue {
            field,
            reason: format!("{:?} contains reserved character {:?}", value, c),
        }),
        None => Ok(()),
    }
}

impl RawInstance {
    pub fn validate(&self) -> Result<InstanceConfig, ConfigError> {
        let api_key = required(&self.api_key, "api_key")?;
        let org = required(&self.org, "org")?;
        check_datagram_safe(&org, "org")?;

        let url = self.url.as_deref().map(|u| u.trim().trim_end_matches('/').to_string());
        let url = required(&url, "url")?;

        let defaults = Thresholds::default();
        let thresholds = Thresholds::new(
            self.warning_threshold.unwrap_or(defaults.warning),
            self.critical_threshold.unwrap_or(defaults.critical),
        )?;

        let tags: Vec<String> = self
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        for tag in &tags {
            check_datagram_safe(tag, "tags")?;
        }

        Ok(InstanceConfig {
            api_key,
            org,
            url,
            tags,
            thresholds,
        })
    }
}

impl InstanceConfig {
    /// Tags attached to every gauge and service check of this instance.
    pub fn emission_tags(&self) -> Vec<String> {
        let mut tags = self.tags.clone();
        tags.push(format!("cloudsmith_org:{}", self.org));
        tags
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub instance: InstanceConfig,
    pub dogstatsd_addr: String,
    pub timeout: Duration,
}

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

fn parse_threshold<E: EnvironmentProvider>(
    env: &E,
    key: &'static str,
) -> Result<Option<f64>, ConfigError> {
    match env.get_var(key) {
        None => Ok(None),
        Some(v) => v
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                field: key,
                reason: e.to_string(),
            }),
    }
}

fn read_api_key<E: EnvironmentProvider>(env: &E) -> Result<Option<String>, ConfigError> {
    if let Some(key) = env.get_var("CLOUDSMITH_API_KEY") {
        return Ok(Some(key));
    }
    match env.get_var("CLOUDSMITH_API_KEY_FILE") {
        Some(path) => {
            let path = PathBuf::from(path);
            let contents = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::KeyFile { path, source })?;
            Ok(Some(contents.trim().to_string()))
        }
        None => Ok(None),
    }
}

/// Build the raw instance from the environment without validating it.
pub fn raw_instance_from_env<E: EnvironmentProvider>(env: &E) -> Result<RawInstance, ConfigError> {
    let tags = env
        .get_var("CLOUDSMITH_TAGS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(RawInstance {
        api_key: read_api_key(env)?,
        org: env.get_var("CLOUDSMITH_ORG"),
        url: env.get_var("CLOUDSMITH_URL"),
        tags,
        warning_threshold: parse_threshold(env, "CLOUDSMITH_WARNING_THRESHOLD")?,
        critical_threshold: parse_threshold(env, "CLOUDSMITH_CRITICAL_THRESHOLD")?,
    })
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_with_env(&SystemEnvironment)
}

pub fn load_config_with_env<E: EnvironmentProvider>(env: &E) -> Result<Config, ConfigError> {
    let instance = raw_instance_from_env(env)?.validate()?;

    let dogstatsd_addr = env
        .get_var("DOGSTATSD_ADDR")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_DOGSTATSD_ADDR.to_string());

    let timeout_secs: u64 = env
        .get_var("CLOUDSMITH_TIMEOUT_SECS")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(Config {
        instance,
        dogstatsd_addr,
        timeout: Duration::from_secs(timeout_secs),
    })
}
