//! Writes circuit-breaker configurations onto clusters.

use crate::{Configure, InvalidConf};
use mesh_policy_controller_api::{
    policy::circuit_breaker::{self, ConnectionLimits, Detectors, OutlierDetection},
    Duration, IntOrString,
};
use mesh_policy_controller_xds::cluster::{self as xds, Cluster, Percent, ProtoDuration};

/// Detectors that are configured always eject the outliers they find.
const ENFORCING_ALWAYS: u32 = 100;

/// Clusters store the success-rate ejection factor in thousandths.
const STDEV_FACTOR_SCALE: f64 = 1000.0;

impl Configure for circuit_breaker::Conf {
    const KIND: &'static str = circuit_breaker::KIND;

    fn configure_cluster(&self, cluster: &mut Cluster) -> Result<(), InvalidConf> {
        // Everything is validated before the cluster is modified.
        let mut outlier_detection = cluster.outlier_detection.clone();
        let mut panic_threshold = None;
        if let Some(od) = self.outlier_detection.as_ref() {
            if od.disabled == Some(true) {
                outlier_detection = None;
            } else {
                let mut updated = outlier_detection.unwrap_or_default();
                configure_outlier_detection(od, &mut updated)?;
                outlier_detection = Some(updated);
                panic_threshold = healthy_panic_threshold(od)?;
            }
        }

        if let Some(limits) = self.connection_limits.as_ref() {
            configure_connection_limits(limits, cluster);
        }
        cluster.outlier_detection = outlier_detection;
        if let Some(value) = panic_threshold {
            cluster
                .common_lb_config
                .get_or_insert_with(Default::default)
                .healthy_panic_threshold = Some(Percent { value });
        }

        Ok(())
    }
}

fn configure_connection_limits(limits: &ConnectionLimits, cluster: &mut Cluster) {
    let thresholds = cluster.default_thresholds_mut();
    assign(&mut thresholds.max_connections, limits.max_connections);
    assign(&mut thresholds.max_connection_pools, limits.max_connection_pools);
    assign(&mut thresholds.max_pending_requests, limits.max_pending_requests);
    assign(&mut thresholds.max_requests, limits.max_requests);
    assign(&mut thresholds.max_retries, limits.max_retries);
}

fn configure_outlier_detection(
    conf: &OutlierDetection,
    od: &mut xds::OutlierDetection,
) -> Result<(), InvalidConf> {
    if let Some(interval) = conf.interval {
        od.interval = Some(proto_duration("interval", interval)?);
    }
    if let Some(base) = conf.base_ejection_time {
        od.base_ejection_time = Some(proto_duration("baseEjectionTime", base)?);
    }
    if let Some(max) = conf.max_ejection_percent {
        od.max_ejection_percent = Some(percent("maxEjectionPercent", max)?);
    }
    if let Some(split) = conf.split_external_and_local_errors {
        od.split_external_local_origin_errors = split;
    }
    if let Some(detectors) = conf.detectors.as_ref() {
        configure_detectors(detectors, od)?;
    }
    Ok(())
}

fn configure_detectors(
    detectors: &Detectors,
    od: &mut xds::OutlierDetection,
) -> Result<(), InvalidConf> {
    if let Some(total) = detectors.total_failures.as_ref() {
        assign(&mut od.consecutive_5xx, total.consecutive);
        od.enforcing_consecutive_5xx = Some(ENFORCING_ALWAYS);
    }
    if let Some(gateway) = detectors.gateway_failures.as_ref() {
        assign(&mut od.consecutive_gateway_failure, gateway.consecutive);
        od.enforcing_consecutive_gateway_failure = Some(ENFORCING_ALWAYS);
    }
    if let Some(local) = detectors.local_origin_failures.as_ref() {
        assign(&mut od.consecutive_local_origin_failure, local.consecutive);
        od.enforcing_consecutive_local_origin_failure = Some(ENFORCING_ALWAYS);
    }

    if let Some(sr) = detectors.success_rate.as_ref() {
        let factor = sr
            .standard_deviation_factor
            .as_ref()
            .map(stdev_factor)
            .transpose()?;
        assign(&mut od.success_rate_minimum_hosts, sr.minimum_hosts);
        assign(&mut od.success_rate_request_volume, sr.request_volume);
        assign(&mut od.success_rate_stdev_factor, factor);
        od.enforcing_success_rate = Some(ENFORCING_ALWAYS);
    }

    if let Some(fp) = detectors.failure_percentage.as_ref() {
        let threshold = fp
            .threshold
            .map(|t| percent("failurePercentage.threshold", t))
            .transpose()?;
        assign(&mut od.failure_percentage_minimum_hosts, fp.minimum_hosts);
        assign(&mut od.failure_percentage_request_volume, fp.request_volume);
        assign(&mut od.failure_percentage_threshold, threshold);
        od.enforcing_failure_percentage = Some(ENFORCING_ALWAYS);
    }

    Ok(())
}

fn healthy_panic_threshold(od: &OutlierDetection) -> Result<Option<f64>, InvalidConf> {
    const FIELD: &str = "healthyPanicThreshold";
    let Some(threshold) = od.healthy_panic_threshold.as_ref() else {
        return Ok(None);
    };
    let value = decimal(FIELD, threshold)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(InvalidConf::new(FIELD, threshold, "must be between 0 and 100"));
    }
    Ok(Some(value))
}

fn stdev_factor(factor: &IntOrString) -> Result<u32, InvalidConf> {
    const FIELD: &str = "successRate.standardDeviationFactor";
    let value = decimal(FIELD, factor)?;
    let scaled = (value * STDEV_FACTOR_SCALE).round();
    if scaled < 0.0 || scaled > f64::from(u32::MAX) {
        return Err(InvalidConf::new(FIELD, factor, "out of range"));
    }
    Ok(scaled as u32)
}

fn decimal(field: &'static str, value: &IntOrString) -> Result<f64, InvalidConf> {
    match value.to_decimal() {
        Ok(d) if d.is_finite() => Ok(d),
        _ => Err(InvalidConf::new(field, value, "not a decimal number")),
    }
}

fn percent(field: &'static str, value: u32) -> Result<u32, InvalidConf> {
    if value > 100 {
        return Err(InvalidConf::new(field, value, "must not exceed 100"));
    }
    Ok(value)
}

fn proto_duration(field: &'static str, d: Duration) -> Result<ProtoDuration, InvalidConf> {
    d.to_std()
        .map(ProtoDuration::from)
        .ok_or_else(|| InvalidConf::new(field, d, "must not be negative"))
}

fn assign<T>(field: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *field = value;
    }
}
