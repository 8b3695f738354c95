//! Circuit-breaker policy configuration.
//!
//! A circuit breaker limits the load a proxy places on an upstream cluster (connection limits)
//! and ejects misbehaving endpoints from load balancing (outlier detection).

use crate::{Duration, IntOrString};
use serde::{Deserialize, Serialize};

/// The policy kind, as written in policy documents.
pub const KIND: &str = "CircuitBreaker";

/// The merged configuration of every circuit-breaker policy that applies to a target.
///
/// Unset fields leave the corresponding cluster settings untouched.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conf {
    pub connection_limits: Option<ConnectionLimits>,
    pub outlier_detection: Option<OutlierDetection>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionLimits {
    pub max_connections: Option<u32>,
    pub max_connection_pools: Option<u32>,
    pub max_pending_requests: Option<u32>,
    pub max_requests: Option<u32>,
    pub max_retries: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlierDetection {
    /// Removes outlier detection from the cluster entirely.
    pub disabled: Option<bool>,

    /// The time between ejection sweeps.
    pub interval: Option<Duration>,

    /// The base time an endpoint is ejected for. The real time is this value multiplied by the
    /// number of times the endpoint has been ejected.
    pub base_ejection_time: Option<Duration>,

    /// The maximum percentage of endpoints that may be ejected at once.
    pub max_ejection_percent: Option<u32>,

    /// Tracks locally originated errors (e.g. connection resets) separately from errors returned
    /// by the upstream.
    pub split_external_and_local_errors: Option<bool>,

    pub detectors: Option<Detectors>,

    /// The percentage of healthy endpoints below which the cluster ignores health and balances
    /// across all endpoints, written as a decimal (e.g. `"50.5"`).
    pub healthy_panic_threshold: Option<IntOrString>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detectors {
    pub total_failures: Option<ConsecutiveFailures>,
    pub gateway_failures: Option<ConsecutiveFailures>,
    pub local_origin_failures: Option<ConsecutiveFailures>,
    pub success_rate: Option<SuccessRate>,
    pub failure_percentage: Option<FailurePercentage>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsecutiveFailures {
    pub consecutive: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessRate {
    pub minimum_hosts: Option<u32>,
    pub request_volume: Option<u32>,

    /// Endpoints whose success rate is below `mean - (stdev * factor)` are ejected.
    pub standard_deviation_factor: Option<IntOrString>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailurePercentage {
    pub minimum_hosts: Option<u32>,
    pub request_volume: Option<u32>,
    pub threshold: Option<u32>,
}
