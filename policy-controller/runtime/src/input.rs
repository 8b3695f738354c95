//! The JSON description of a single pass.
//!
//! ```json
//! {
//!   "proxy": { "id": "...", "dataplane": { ... }, "outbounds": [...], "gatewayListeners": [...] },
//!   "policies": { "CircuitBreaker": { "fromRules": ..., "toRules": ..., "gatewayRules": ... } },
//!   "resources": [{ "name": "...", "kind": "Cluster", "origin": "outbound", "payload": ... }]
//! }
//! ```
//!
//! Egress proxies list the meshes they serve under `proxy.zoneEgress`, each with the policies
//! bound to its external destinations.

use crate::{
    api::policy::{circuit_breaker, CircuitBreakerConf},
    core::{DynamicPolicies, RuleSet},
    xds::{
        egress::{MeshExternalService, MeshResources, ZoneEgressProxy},
        gateway::GatewayListenerInfo,
        Dataplane, Outbound, Proxy, Resource, ResourceSet,
    },
};
use ahash::AHashMap as HashMap;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassDescription {
    pub proxy: ProxyDescription,
    #[serde(default)]
    pub policies: Policies,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyDescription {
    pub id: String,
    pub dataplane: Dataplane,
    #[serde(default)]
    pub outbounds: Vec<Outbound>,
    #[serde(default)]
    pub gateway_listeners: Vec<GatewayListenerInfo>,
    #[serde(default)]
    pub zone_egress: Option<Vec<MeshDescription>>,
}

/// The resources of one mesh served by an egress.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshDescription {
    pub mesh: String,
    #[serde(default)]
    pub external_services: Vec<MeshExternalService>,

    /// Policies by destination name (`<name>:<port>`).
    #[serde(default)]
    pub policies: HashMap<String, Policies>,
}

/// Rule sets by policy kind.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Policies {
    #[serde(default, rename = "CircuitBreaker")]
    pub circuit_breaker: Option<RuleSet<CircuitBreakerConf>>,
}

// === impl PassDescription ===

impl PassDescription {
    pub fn into_parts(self) -> (Proxy, ResourceSet) {
        let Self {
            proxy,
            policies,
            resources,
        } = self;
        let proxy = Proxy {
            id: proxy.id,
            dataplane: proxy.dataplane,
            outbounds: proxy.outbounds,
            gateway_listeners: proxy.gateway_listeners,
            zone_egress: proxy.zone_egress.map(|meshes| ZoneEgressProxy {
                mesh_resources: meshes.into_iter().map(Into::into).collect(),
            }),
            policies: policies.into(),
        };
        (proxy, resources.into_iter().collect())
    }
}

// === impl MeshDescription ===

impl From<MeshDescription> for MeshResources {
    fn from(desc: MeshDescription) -> Self {
        Self {
            mesh: desc.mesh,
            external_services: desc.external_services,
            dynamic: desc
                .policies
                .into_iter()
                .map(|(destination, policies)| (destination, policies.into()))
                .collect(),
        }
    }
}

// === impl Policies ===

impl From<Policies> for DynamicPolicies {
    fn from(policies: Policies) -> Self {
        let mut dynamic = DynamicPolicies::default();
        if let Some(rules) = policies.circuit_breaker {
            tracing::trace!(kind = circuit_breaker::KIND, "Loaded rules");
            dynamic.insert(rules);
        }
        dynamic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        apply_policies,
        plugins::PluginMetrics,
        xds::{Payload, ResourceKind},
    };

    #[test]
    fn configures_a_described_pass() {
        let pass = serde_json::from_value::<PassDescription>(serde_json::json!({
            "proxy": {
                "id": "default.web-1",
                "dataplane": {
                    "mesh": "default",
                    "name": "web-1",
                    "address": "10.0.0.1",
                    "inbounds": [{ "port": 9000 }],
                },
                "outbounds": [{
                    "address": "240.0.0.1",
                    "port": 80,
                    "tags": { "mesh.io/service": "payments" },
                }],
            },
            "policies": {
                "CircuitBreaker": {
                    "fromRules": {
                        "inboundRules": {
                            "10.0.0.1:9000": [{ "conf": { "connectionLimits": { "maxConnections": 5 } } }],
                        },
                    },
                    "toRules": {
                        "rules": [{
                            "subset": [{ "key": "mesh.io/service", "value": "payments" }],
                            "conf": { "connectionLimits": { "maxConnections": 7 } },
                            "origin": [{ "mesh": "default", "name": "payments-cb" }],
                        }],
                    },
                },
            },
            "resources": [
                {
                    "name": "localhost:9000",
                    "kind": "Cluster",
                    "origin": "inbound",
                    "payload": { "cluster": { "name": "localhost:9000" } },
                },
                {
                    "name": "payments-_0_",
                    "kind": "Cluster",
                    "origin": "outbound",
                    "payload": { "cluster": { "name": "payments-_0_" } },
                },
                {
                    "name": "outbound:240.0.0.1:80",
                    "kind": "Listener",
                    "origin": "outbound",
                    "payload": { "opaque": { "filters": [] } },
                },
            ],
        }))
        .expect("pass description must parse");

        let (proxy, mut resources) = pass.into_parts();
        assert!(proxy.policies.get::<CircuitBreakerConf>().is_some());
        assert_eq!(resources.len(), 3);

        apply_policies(&proxy, &mut resources, &PluginMetrics::default()).unwrap();

        let max_connections = |name: &str| match &resources.get(ResourceKind::Cluster, name)?.payload
        {
            Payload::Cluster(c) => c.circuit_breakers.as_ref()?.thresholds[0].max_connections,
            Payload::Opaque(_) => None,
        };
        assert_eq!(max_connections("localhost:9000"), Some(5));
        assert_eq!(max_connections("payments-_0_"), Some(7));
    }

    #[test]
    fn egress_policies_are_bound_by_destination() {
        let pass = serde_json::from_value::<PassDescription>(serde_json::json!({
            "proxy": {
                "id": "zone-egress",
                "dataplane": { "mesh": "", "name": "zone-egress", "address": "10.0.0.9" },
                "zoneEgress": [{
                    "mesh": "default",
                    "externalServices": [{ "id": "kri_extsvc_default___httpbin_", "port": 443 }],
                    "policies": {
                        "httpbin:443": {
                            "CircuitBreaker": {
                                "toRules": {
                                    "resourceRules": {
                                        "kri_extsvc_default___httpbin_": {
                                            "conf": { "connectionLimits": { "maxConnections": 3 } },
                                        },
                                    },
                                },
                            },
                        },
                    },
                }],
            },
        }))
        .expect("pass description must parse");

        let (proxy, resources) = pass.into_parts();
        assert!(resources.is_empty());
        let egress = proxy.zone_egress.expect("proxy must be an egress");
        let mesh = &egress.mesh_resources[0];
        let svc = &mesh.external_services[0];
        assert_eq!(svc.destination_name(), "httpbin:443");
        assert!(mesh
            .policies_for(svc)
            .and_then(|p| p.get::<CircuitBreakerConf>())
            .is_some());
    }
}
