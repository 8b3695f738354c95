use mesh_policy_controller_xds::Cluster;

/// Writes a resolved configuration onto generated resources.
///
/// Implementations must only assign settings, so that configuring a resource twice leaves it
/// as configuring it once does.
pub trait Configure {
    /// The policy kind, used in logs and metrics.
    const KIND: &'static str;

    fn configure_cluster(&self, cluster: &mut Cluster) -> Result<(), InvalidConf>;
}

/// A configuration value that cannot be expressed on a resource.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} {value:?}: {reason}")]
pub struct InvalidConf {
    pub field: &'static str,
    pub value: String,
    pub reason: &'static str,
}

// === impl InvalidConf ===

impl InvalidConf {
    pub fn new(field: &'static str, value: impl ToString, reason: &'static str) -> Self {
        Self {
            field,
            value: value.to_string(),
            reason,
        }
    }
}
