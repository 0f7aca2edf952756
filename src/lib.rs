// Public modules
pub mod types;
pub mod config;
pub mod thresholds;
pub mod metrics;
pub mod client;
pub mod sink;
pub mod report;
pub mod check;

// Re-export commonly used items
pub use types::*;
pub use config::{
    load_config, load_config_with_env, Config, ConfigError, EnvironmentProvider, InstanceConfig,
    MockEnvironment, RawInstance, SystemEnvironment,
};
pub use thresholds::Thresholds;
pub use client::{CloudsmithApi, FetchError, HttpClient};
pub use sink::{Aggregator, DogStatsdSink, EmitError, MetricSink};
pub use report::{CheckReport, ReportSummary};
pub use check::{CheckError, CloudsmithCheck, CHECK_NAME};
