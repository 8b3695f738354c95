use crate::InvalidConf;
use mesh_policy_controller_xds::ResourceKind;

/// Aborts a pass.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to apply {policy} policy to {kind} {name}")]
    Apply {
        policy: &'static str,
        kind: ResourceKind,
        name: String,
        #[source]
        source: InvalidConf,
    },

    #[error("{kind} {name} has an unexpected {found} payload")]
    IndexInconsistency {
        kind: ResourceKind,
        name: String,
        found: &'static str,
    },
}
