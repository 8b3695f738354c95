use crate::{
    apply::apply_named,
    metrics::{PluginMetrics, Skip, Target},
    Configure, Error,
};
use mesh_policy_controller_core::{ListenerKey, Resolver};
use mesh_policy_controller_xds::{names, Clusters, Dataplane, ResourceKind, ResourceSet};
use tracing::{debug, trace};

/// Configures the cluster behind each of the dataplane's inbound listeners.
///
/// Cluster settings cannot vary by client, so a listener is only configured by a rule that
/// matches all of its incoming traffic.
pub(crate) fn apply<C, R>(
    rules: &R,
    dataplane: &Dataplane,
    clusters: &Clusters,
    resources: &mut ResourceSet,
    metrics: &PluginMetrics,
) -> Result<(), Error>
where
    C: Configure,
    R: Resolver<C>,
{
    for iface in dataplane.inbound_interfaces() {
        let listener = ListenerKey::new(iface.dataplane_ip, iface.dataplane_port);
        let cluster = names::local_cluster_name(iface.dataplane_port);
        if !clusters.inbound.contains(&cluster) {
            debug!(%listener, %cluster, "Inbound has no cluster");
            metrics.skipped(C::KIND, Target::Inbound, Skip::NoCluster);
            continue;
        }

        let Some(computed) = rules.compute_from(&listener) else {
            trace!(%listener, "No rules match all incoming traffic");
            metrics.skipped(C::KIND, Target::Inbound, Skip::NoMatch);
            continue;
        };

        apply_named(computed.conf, resources, ResourceKind::Cluster, &cluster)?;
        debug!(%listener, %cluster, policies = ?computed.origin, "Configured");
        metrics.configured(C::KIND, Target::Inbound);
    }

    Ok(())
}
