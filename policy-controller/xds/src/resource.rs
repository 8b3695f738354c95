use crate::{Cluster, ResourceIndex};
use mesh_policy_controller_core::ResourceId;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// The kinds of resources that are generated for a proxy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum ResourceKind {
    Listener,
    Cluster,
    Route,
    Endpoints,
    Secret,
}

/// The role of the generator that produced a resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Origin {
    Inbound,
    Outbound,
    Gateway,
    Egress,
    Other(String),
}

/// The settings of a generated resource.
///
/// Only clusters are modeled; every other kind is carried opaquely.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Payload {
    Cluster(Cluster),
    Opaque(serde_json::Value),
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub name: String,
    pub kind: ResourceKind,
    pub origin: Origin,

    /// The referenced resource this resource was generated for, if any.
    #[serde(default)]
    pub resource_origin: Option<ResourceId>,

    pub payload: Payload,
}

/// All resources generated for a proxy, by kind and name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceSet {
    by_kind: BTreeMap<ResourceKind, BTreeMap<String, Resource>>,
}

// === impl ResourceKind ===

impl ResourceKind {
    pub fn type_url(&self) -> &'static str {
        match self {
            Self::Listener => "type.googleapis.com/envoy.config.listener.v3.Listener",
            Self::Cluster => "type.googleapis.com/envoy.config.cluster.v3.Cluster",
            Self::Route => "type.googleapis.com/envoy.config.route.v3.RouteConfiguration",
            Self::Endpoints => "type.googleapis.com/envoy.config.endpoint.v3.ClusterLoadAssignment",
            Self::Secret => "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.Secret",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// === impl Payload ===

impl Payload {
    /// Describes the payload's shape, for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Cluster(_) => "cluster",
            Self::Opaque(_) => "opaque",
        }
    }
}

// === impl Resource ===

impl Resource {
    pub fn cluster(origin: Origin, cluster: Cluster) -> Self {
        Self {
            name: cluster.name.clone(),
            kind: ResourceKind::Cluster,
            origin,
            resource_origin: None,
            payload: Payload::Cluster(cluster),
        }
    }

    pub fn opaque(name: impl ToString, kind: ResourceKind, origin: Origin) -> Self {
        Self {
            name: name.to_string(),
            kind,
            origin,
            resource_origin: None,
            payload: Payload::Opaque(serde_json::Value::Null),
        }
    }

    pub fn with_resource_origin(mut self, id: ResourceId) -> Self {
        self.resource_origin = Some(id);
        self
    }
}

// === impl ResourceSet ===

impl ResourceSet {
    /// Adds a resource, replacing any resource of the same kind and name.
    pub fn add(&mut self, resource: Resource) -> Option<Resource> {
        self.by_kind
            .entry(resource.kind)
            .or_default()
            .insert(resource.name.clone(), resource)
    }

    pub fn get(&self, kind: ResourceKind, name: &str) -> Option<&Resource> {
        self.by_kind.get(&kind)?.get(name)
    }

    pub fn get_mut(&mut self, kind: ResourceKind, name: &str) -> Option<&mut Resource> {
        self.by_kind.get_mut(&kind)?.get_mut(name)
    }

    /// Iterates over the resources of a single kind, ordered by name.
    pub fn resources(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.by_kind.get(&kind).into_iter().flat_map(|r| r.values())
    }

    /// Iterates over all resources, ordered by kind and then name.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.by_kind.values().flat_map(|r| r.values())
    }

    pub fn len(&self) -> usize {
        self.by_kind.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indexes every resource that was generated for a referenced resource.
    pub fn index_by_origin(&self) -> ResourceIndex {
        self.index_by_origin_filtered(|_| true)
    }

    /// Indexes the resources, generated for a referenced resource, that satisfy `filter`.
    pub fn index_by_origin_filtered(&self, filter: impl Fn(&Resource) -> bool) -> ResourceIndex {
        let mut index = ResourceIndex::default();
        for resource in self.iter().filter(|r| filter(r)) {
            if let Some(origin) = resource.resource_origin.as_ref() {
                index.insert(origin.clone(), resource.kind, resource.name.clone());
            }
        }
        index
    }
}

impl FromIterator<Resource> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        let mut rs = Self::default();
        for resource in iter {
            rs.add(resource);
        }
        rs
    }
}
