use crate::{
    apply::apply_all,
    metrics::{PluginMetrics, Skip, Target},
    Configure, Error,
};
use mesh_policy_controller_core::Resolver;
use mesh_policy_controller_xds::{egress::ZoneEgressProxy, ResourceSet};
use tracing::{debug, trace};

/// Configures a zone egress from the policies bound to each external service it serves.
///
/// A binding's resource rules are keyed by identifiers of its own mesh, so they only ever
/// configure that mesh's resources.
pub(crate) fn apply<C>(
    egress: &ZoneEgressProxy,
    resources: &mut ResourceSet,
    metrics: &PluginMetrics,
) -> Result<(), Error>
where
    C: Configure + Send + Sync + 'static,
{
    let index = resources.index_by_origin();

    for mesh in &egress.mesh_resources {
        for svc in &mesh.external_services {
            let Some(rules) = mesh.policies_for(svc).and_then(|p| p.get::<C>()) else {
                trace!(mesh = %mesh.mesh, destination = %svc.destination_name(), "No policies");
                metrics.skipped(C::KIND, Target::Egress, Skip::NoRules);
                continue;
            };

            for (id, by_kind) in index.iter() {
                let Some(computed) = rules.compute_resource(id) else {
                    continue;
                };
                apply_all(computed.conf, by_kind, resources)?;
                debug!(mesh = %mesh.mesh, %id, policies = ?computed.origin, "Configured");
                metrics.configured(C::KIND, Target::Egress);
            }
        }
    }

    Ok(())
}
