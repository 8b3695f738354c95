//! Zone egress topology.
//!
//! An egress proxy serves several meshes at once. Policies are not matched against its
//! listeners; instead each mesh's resources arrive with the policies already bound to each
//! external destination.

use ahash::AHashMap as HashMap;
use mesh_policy_controller_core::{DynamicPolicies, ResourceId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default)]
pub struct ZoneEgressProxy {
    pub mesh_resources: Vec<MeshResources>,
}

/// The resources of one mesh that an egress proxy serves.
#[derive(Clone, Debug, Default)]
pub struct MeshResources {
    pub mesh: String,
    pub external_services: Vec<MeshExternalService>,

    /// Policies bound to each external destination, keyed by destination name.
    pub dynamic: HashMap<String, DynamicPolicies>,
}

/// A service outside the mesh that mesh workloads reach through the egress.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshExternalService {
    pub id: ResourceId,
    pub port: u16,
}

// === impl MeshResources ===

impl MeshResources {
    pub fn new(mesh: impl ToString) -> Self {
        Self {
            mesh: mesh.to_string(),
            ..Default::default()
        }
    }

    /// Returns the policies bound to an external service's destination.
    pub fn policies_for(&self, svc: &MeshExternalService) -> Option<&DynamicPolicies> {
        self.dynamic.get(&svc.destination_name())
    }
}

// === impl MeshExternalService ===

impl MeshExternalService {
    pub fn destination_name(&self) -> String {
        format!("{}:{}", self.id.name, self.port)
    }
}
