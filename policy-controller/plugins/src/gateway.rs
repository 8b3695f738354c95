use crate::{
    apply::{apply_all, apply_named},
    metrics::{PluginMetrics, Skip, Target},
    Configure, Error,
};
use mesh_policy_controller_core::{Element, GatewayKey, ListenerKey, Resolver};
use mesh_policy_controller_xds::{
    gateway::route_destinations, non_mesh_external_service, Clusters, Proxy, ResourceKind,
    ResourceSet,
};
use tracing::{debug, trace};

/// Configures the clusters that a gateway's routes send traffic to.
///
/// When a route's backend is a concrete resource, the resources generated for it are also
/// configured with the host's resource rules.
pub(crate) fn apply<C, R>(
    rules: &R,
    proxy: &Proxy,
    clusters: &Clusters,
    resources: &mut ResourceSet,
    metrics: &PluginMetrics,
) -> Result<(), Error>
where
    C: Configure,
    R: Resolver<C>,
{
    if proxy.gateway_listeners.is_empty() {
        return Ok(());
    }

    let by_origin = resources.index_by_origin_filtered(non_mesh_external_service);

    for info in &proxy.gateway_listeners {
        let listener = ListenerKey::new(proxy.dataplane.address, info.listener.port);
        for host_info in info.hostnames.iter().flat_map(|h| h.host_infos.iter()) {
            let key = GatewayKey::new(listener, &host_info.host.hostname);
            let Some(host_rules) = rules.gateway_rules(&key) else {
                trace!(gateway = %key, "No rules");
                metrics.skipped(C::KIND, Target::Gateway, Skip::NoRules);
                continue;
            };

            for dst in route_destinations(&host_info.entries) {
                let cluster = match dst.cluster_name(&host_info.host.tags) {
                    Ok(name) => name,
                    Err(error) => {
                        debug!(gateway = %key, destination = %dst.destination, %error, "Skipping destination");
                        metrics.skipped(C::KIND, Target::Gateway, Skip::UnresolvedName);
                        continue;
                    }
                };
                if !clusters.gateway.contains(&cluster) {
                    debug!(gateway = %key, %cluster, "Destination has no cluster");
                    metrics.skipped(C::KIND, Target::Gateway, Skip::NoCluster);
                    continue;
                }

                let element =
                    Element::service(dst.destination.service_name().unwrap_or_default());
                match rules.compute_gateway(&key, &element) {
                    Some(computed) => {
                        apply_named(computed.conf, resources, ResourceKind::Cluster, &cluster)?;
                        debug!(gateway = %key, %cluster, policies = ?computed.origin, "Configured");
                        metrics.configured(C::KIND, Target::Gateway);
                    }
                    None => {
                        trace!(gateway = %key, %cluster, "No rules match destination");
                        metrics.skipped(C::KIND, Target::Gateway, Skip::NoMatch);
                    }
                }

                let Some(id) = dst.real_resource() else {
                    continue;
                };
                if let Some(computed) = host_rules.resource_rules.compute(id) {
                    apply_all(computed.conf, by_origin.get(id), resources)?;
                    debug!(gateway = %key, %id, policies = ?computed.origin, "Configured backend");
                    metrics.configured(C::KIND, Target::Resource);
                }
            }
        }
    }

    Ok(())
}
