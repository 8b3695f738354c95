//! The cluster payload: a load-balanced group of upstream endpoints.
//!
//! Only the settings that traffic policies configure are modeled.

use serde::{Deserialize, Serialize};
use std::time;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cluster {
    pub name: String,
    pub circuit_breakers: Option<CircuitBreakers>,
    pub outlier_detection: Option<OutlierDetection>,
    pub common_lb_config: Option<CommonLbConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CircuitBreakers {
    pub thresholds: Vec<Thresholds>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Thresholds {
    pub priority: RoutingPriority,
    pub max_connections: Option<u32>,
    pub max_pending_requests: Option<u32>,
    pub max_requests: Option<u32>,
    pub max_retries: Option<u32>,
    pub max_connection_pools: Option<u32>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingPriority {
    #[default]
    Default,
    High,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutlierDetection {
    pub interval: Option<ProtoDuration>,
    pub base_ejection_time: Option<ProtoDuration>,
    pub max_ejection_percent: Option<u32>,
    pub split_external_local_origin_errors: bool,

    pub consecutive_5xx: Option<u32>,
    pub enforcing_consecutive_5xx: Option<u32>,
    pub consecutive_gateway_failure: Option<u32>,
    pub enforcing_consecutive_gateway_failure: Option<u32>,
    pub consecutive_local_origin_failure: Option<u32>,
    pub enforcing_consecutive_local_origin_failure: Option<u32>,

    pub success_rate_minimum_hosts: Option<u32>,
    pub success_rate_request_volume: Option<u32>,
    /// The ejection factor multiplied by 1000, e.g. 1900 for 1.9.
    pub success_rate_stdev_factor: Option<u32>,
    pub enforcing_success_rate: Option<u32>,

    pub failure_percentage_minimum_hosts: Option<u32>,
    pub failure_percentage_request_volume: Option<u32>,
    pub failure_percentage_threshold: Option<u32>,
    pub enforcing_failure_percentage: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommonLbConfig {
    pub healthy_panic_threshold: Option<Percent>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Percent {
    pub value: f64,
}

/// A duration in the form used on the wire: whole seconds plus nanoseconds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProtoDuration {
    pub seconds: i64,
    pub nanos: i32,
}

// === impl Cluster ===

impl Cluster {
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Returns the default-priority thresholds, creating them if needed.
    pub fn default_thresholds_mut(&mut self) -> &mut Thresholds {
        let thresholds = &mut self
            .circuit_breakers
            .get_or_insert_with(CircuitBreakers::default)
            .thresholds;
        let idx = match thresholds
            .iter()
            .position(|t| t.priority == RoutingPriority::Default)
        {
            Some(idx) => idx,
            None => {
                thresholds.push(Thresholds::default());
                thresholds.len() - 1
            }
        };
        &mut thresholds[idx]
    }
}

// === impl ProtoDuration ===

impl From<time::Duration> for ProtoDuration {
    fn from(d: time::Duration) -> Self {
        Self {
            seconds: i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
            nanos: d.subsec_nanos() as i32,
        }
    }
}
