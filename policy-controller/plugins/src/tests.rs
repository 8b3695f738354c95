mod passes;

use crate::{Plugin, PluginMetrics};
use mesh_policy_controller_api::policy::{circuit_breaker::ConnectionLimits, CircuitBreakerConf};
use mesh_policy_controller_core::{ResourceId, ResourceType, RuleSet};
use mesh_policy_controller_xds::{
    Cluster, Dataplane, Payload, Proxy, Resource, ResourceKind, ResourceSet,
};
use prometheus_client::registry::Registry;
use std::net::{IpAddr, Ipv4Addr};

type Conf = CircuitBreakerConf;

const DATAPLANE_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

struct Test {
    plugin: Plugin<Conf>,
    registry: Registry,
    _tracing: tracing::subscriber::DefaultGuard,
}

// === impl Test ===

impl Default for Test {
    fn default() -> Self {
        let _tracing = init_tracing();
        let mut registry = Registry::default();
        let metrics = PluginMetrics::register(&mut registry);
        Self {
            plugin: Plugin::new(metrics),
            registry,
            _tracing,
        }
    }
}

impl Test {
    fn metrics(&self) -> String {
        let mut buf = String::new();
        prometheus_client::encoding::text::encode(&mut buf, &self.registry)
            .expect("metrics must encode");
        buf
    }
}

fn init_tracing() -> tracing::subscriber::DefaultGuard {
    tracing::subscriber::set_default(
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .finish(),
    )
}

/// A configuration that limits clusters to `max` connections.
fn max_connections(max: u32) -> Conf {
    Conf {
        connection_limits: Some(ConnectionLimits {
            max_connections: Some(max),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn sidecar(rules: RuleSet<Conf>) -> Proxy {
    Proxy {
        id: "default.web-1".to_string(),
        dataplane: Dataplane {
            mesh: "default".to_string(),
            name: "web-1".to_string(),
            address: DATAPLANE_IP,
            inbounds: vec![],
        },
        policies: rules.into(),
        ..Default::default()
    }
}

fn msvc(name: &str) -> ResourceId {
    ResourceId::new(ResourceType::MeshService, "default", name).with_namespace("apps")
}

fn cluster(origin: mesh_policy_controller_xds::Origin, name: impl ToString) -> Resource {
    Resource::cluster(origin, Cluster::new(name))
}

/// Returns the connection limit configured on a cluster, if any.
fn configured_max_connections(resources: &ResourceSet, name: &str) -> Option<u32> {
    let resource = resources.get(ResourceKind::Cluster, name)?;
    let Payload::Cluster(cluster) = &resource.payload else {
        return None;
    };
    cluster.circuit_breakers.as_ref()?.thresholds.first()?.max_connections
}

/// Serializes every resource, for byte-level comparisons.
fn snapshot(resources: &ResourceSet) -> String {
    serde_json::to_string(&resources.iter().collect::<Vec<_>>()).expect("resources must serialize")
}
