//! Cluster naming.
//!
//! Resource generators and policy plugins must agree on the name of every generated cluster, so
//! all names are derived here.

use mesh_policy_controller_core::{Element, ResourceId};
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NameError {
    #[error("destination has no \"mesh.io/service\" tag")]
    MissingServiceTag,

    #[error("destination has an empty \"mesh.io/service\" tag")]
    EmptyServiceTag,
}

const SPLIT_MARKER: &str = "-_";

/// Names the cluster that forwards inbound traffic to the workload listening on `port`.
pub fn local_cluster_name(port: u16) -> String {
    format!("localhost:{port}")
}

/// Names the `n`th cluster of a traffic split to `service`.
pub fn split_cluster_name(service: &str, n: usize) -> String {
    format!("{service}{SPLIT_MARKER}{n}_")
}

/// Recovers the service name from a traffic-split cluster name, if `name` is one.
pub fn service_from_split_cluster_name(name: &str) -> Option<&str> {
    let (service, n) = name.strip_suffix('_')?.rsplit_once(SPLIT_MARKER)?;
    if service.is_empty() || n.is_empty() || !n.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(service)
}

/// Names the cluster generated for a referenced resource.
pub fn resource_cluster_name(id: &ResourceId) -> String {
    id.to_string()
}

/// Names the cluster for a destination subset reached through a host carrying `host_tags`.
///
/// Destination tags take precedence over host tags. A destination that selects nothing beyond
/// its service is named after the service; otherwise the name carries a hash of the full tag
/// set so that each distinct subset gets its own cluster.
pub fn destination_cluster_name(
    destination: &Element,
    host_tags: &Element,
) -> Result<String, NameError> {
    let service = match destination.service_name() {
        None => return Err(NameError::MissingServiceTag),
        Some("") => return Err(NameError::EmptyServiceTag),
        Some(service) => service,
    };

    let tags = destination.merged_over(host_tags);
    if tags.len() == 1 {
        return Ok(service.to_string());
    }

    let digest = Sha256::digest(tags.to_string().as_bytes());
    let suffix = hex::encode(&digest[..8]);
    Ok(format!("{service}-{suffix}"))
}
