use crate::{
    apply::apply_named,
    metrics::{PluginMetrics, Skip, Target},
    Configure, Error,
};
use mesh_policy_controller_core::{Element, Resolver};
use mesh_policy_controller_xds::{
    gather_targeted_clusters, Clusters, Outbound, ResourceKind, ResourceSet,
};
use tracing::{debug, trace};

/// Configures the clusters of outbounds that target a service by tag.
///
/// Every cluster of a traffic split resolves the same service element, so all of a split's
/// clusters receive the same configuration.
pub(crate) fn apply<C, R>(
    rules: &R,
    outbounds: &[Outbound],
    clusters: &Clusters,
    resources: &mut ResourceSet,
    metrics: &PluginMetrics,
) -> Result<(), Error>
where
    C: Configure,
    R: Resolver<C>,
{
    for (cluster, service) in gather_targeted_clusters(outbounds, clusters) {
        let element = Element::service(&service);
        let Some(computed) = rules.compute_to(&element) else {
            trace!(%cluster, %service, "No rules");
            metrics.skipped(C::KIND, Target::Outbound, Skip::NoMatch);
            continue;
        };

        apply_named(computed.conf, resources, ResourceKind::Cluster, &cluster)?;
        debug!(%cluster, %service, policies = ?computed.origin, "Configured");
        metrics.configured(C::KIND, Target::Outbound);
    }

    Ok(())
}
