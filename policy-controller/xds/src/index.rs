use crate::{Resource, ResourceKind};
use mesh_policy_controller_core::ResourceId;
use std::collections::BTreeMap;

/// The names of the resources generated for one referenced resource, by kind.
pub type ResourcesByKind = BTreeMap<ResourceKind, Vec<String>>;

/// A read-only view of a [`ResourceSet`](crate::ResourceSet) keyed by the referenced resource
/// each entry was generated for.
///
/// Origins are kept ordered so that every pass over the index visits them in the same order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceIndex {
    by_origin: BTreeMap<ResourceId, ResourcesByKind>,
    empty: ResourcesByKind,
}

/// Excludes resources generated for mesh external services.
pub fn non_mesh_external_service(resource: &Resource) -> bool {
    resource
        .resource_origin
        .as_ref()
        .map_or(true, |id| !id.is_mesh_external_service())
}

/// Selects resources of a single kind.
pub fn of_kind(kind: ResourceKind) -> impl Fn(&Resource) -> bool {
    move |resource| resource.kind == kind
}

// === impl ResourceIndex ===

impl ResourceIndex {
    pub(crate) fn insert(&mut self, origin: ResourceId, kind: ResourceKind, name: String) {
        self.by_origin
            .entry(origin)
            .or_default()
            .entry(kind)
            .or_default()
            .push(name);
    }

    /// Returns the resources generated for `origin`. Unknown origins have no resources.
    pub fn get(&self, origin: &ResourceId) -> &ResourcesByKind {
        self.by_origin.get(origin).unwrap_or(&self.empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, &ResourcesByKind)> {
        self.by_origin.iter()
    }

    pub fn contains(&self, origin: &ResourceId) -> bool {
        self.by_origin.contains_key(origin)
    }

    pub fn len(&self) -> usize {
        self.by_origin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_origin.is_empty()
    }
}
