use crate::{names, Origin, Outbound, ResourceKind, ResourceSet};
use std::collections::{BTreeMap, BTreeSet};

/// The names of a proxy's generated clusters, grouped by the role that generated them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Clusters {
    pub inbound: BTreeSet<String>,
    pub outbound: BTreeSet<String>,

    /// Clusters of traffic splits, by the service being split.
    pub outbound_split: BTreeMap<String, Vec<String>>,

    pub gateway: BTreeSet<String>,
}

/// Groups the cluster resources in `resources` by the role that generated them.
///
/// Clusters generated for other roles are not gathered.
pub fn gather_clusters(resources: &ResourceSet) -> Clusters {
    let mut clusters = Clusters::default();
    for resource in resources.resources(ResourceKind::Cluster) {
        let name = resource.name.clone();
        match resource.origin {
            Origin::Inbound => {
                clusters.inbound.insert(name);
            }
            Origin::Outbound => match names::service_from_split_cluster_name(&name) {
                Some(service) => clusters
                    .outbound_split
                    .entry(service.to_string())
                    .or_default()
                    .push(name),
                None => {
                    clusters.outbound.insert(name);
                }
            },
            Origin::Gateway => {
                clusters.gateway.insert(name);
            }
            Origin::Egress | Origin::Other(_) => {}
        }
    }
    clusters
}

/// Returns the outbound clusters that are targeted by service tag, mapped to that service.
///
/// Outbounds that target a concrete resource are excluded; their clusters are configured
/// through the resource they were generated for.
pub fn gather_targeted_clusters(
    outbounds: &[Outbound],
    clusters: &Clusters,
) -> BTreeMap<String, String> {
    let mut targeted = BTreeMap::new();
    for service in outbounds.iter().filter_map(Outbound::service) {
        for split in clusters.outbound_split.get(service).into_iter().flatten() {
            targeted.insert(split.clone(), service.to_string());
        }
        if clusters.outbound.contains(service) {
            targeted.insert(service.to_string(), service.to_string());
        }
    }
    targeted
}
