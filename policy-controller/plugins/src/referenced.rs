use crate::{
    apply::apply_all,
    metrics::{PluginMetrics, Skip, Target},
    Configure, Error,
};
use mesh_policy_controller_core::Resolver;
use mesh_policy_controller_xds::{non_mesh_external_service, ResourceSet};
use tracing::{debug, trace};

/// Configures the resources generated for each referenced resource.
///
/// Resources generated for mesh external services are configured by the egress instead.
pub(crate) fn apply<C, R>(
    rules: &R,
    resources: &mut ResourceSet,
    metrics: &PluginMetrics,
) -> Result<(), Error>
where
    C: Configure,
    R: Resolver<C>,
{
    let index = resources.index_by_origin_filtered(non_mesh_external_service);
    for (id, by_kind) in index.iter() {
        let Some(computed) = rules.compute_resource(id) else {
            trace!(%id, "No rules");
            metrics.skipped(C::KIND, Target::Resource, Skip::NoMatch);
            continue;
        };

        apply_all(computed.conf, by_kind, resources)?;
        debug!(%id, policies = ?computed.origin, "Configured");
        metrics.configured(C::KIND, Target::Resource);
    }

    Ok(())
}
