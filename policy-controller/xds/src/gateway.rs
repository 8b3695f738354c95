//! Gateway topology: listeners, their virtual hosts, and the routes on each host.

use crate::names::{self, NameError};
use mesh_policy_controller_core::{Element, ResourceId};
use serde::{Deserialize, Serialize};

/// A gateway listener and every virtual host it serves.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayListenerInfo {
    pub listener: GatewayListener,
    #[serde(default)]
    pub hostnames: Vec<ListenerHostnames>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayListener {
    pub port: u16,
    pub protocol: Protocol,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Http,
    Https,
    Tcp,
    Tls,
}

/// The virtual hosts a listener serves for a single hostname.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerHostnames {
    pub hostname: String,
    #[serde(default)]
    pub host_infos: Vec<GatewayHostInfo>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayHostInfo {
    pub host: GatewayHost,
    #[serde(default)]
    pub entries: Vec<RouteEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayHost {
    pub hostname: String,

    /// Tags that every destination reached through this host inherits.
    #[serde(default)]
    pub tags: Element,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    pub route: String,
    pub action: RouteAction,
    #[serde(default)]
    pub mirror: Option<Mirror>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteAction {
    Forward(Vec<RouteDestination>),
    Redirect {
        #[serde(default)]
        hostname: Option<String>,
        #[serde(default)]
        status: Option<u16>,
    },
}

/// Copies a share of a route's requests to another backend.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mirror {
    pub backend: RouteDestination,
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDestination {
    pub destination: Element,
    #[serde(default)]
    pub weight: u32,

    /// Set for routes attached through the route API; legacy gateway routes have none.
    #[serde(default)]
    pub backend_ref: Option<BackendRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendRef {
    /// The concrete resource the backend refers to, if it is not a virtual mesh service.
    #[serde(default)]
    pub resource: Option<ResourceId>,
    #[serde(default)]
    pub port: Option<u16>,
}

/// Lists every destination that the entries may send traffic to, including mirrors.
pub fn route_destinations(entries: &[RouteEntry]) -> Vec<&RouteDestination> {
    let mut destinations = Vec::new();
    for entry in entries {
        if let RouteAction::Forward(forward) = &entry.action {
            destinations.extend(forward.iter());
        }
        if let Some(mirror) = entry.mirror.as_ref() {
            destinations.push(&mirror.backend);
        }
    }
    destinations
}

// === impl RouteDestination ===

impl RouteDestination {
    pub fn new(destination: Element) -> Self {
        Self {
            destination,
            weight: 1,
            backend_ref: None,
        }
    }

    pub fn with_backend_ref(mut self, resource: Option<ResourceId>) -> Self {
        self.backend_ref = Some(BackendRef {
            resource,
            port: None,
        });
        self
    }

    /// Returns the concrete resource this destination refers to, if any.
    pub fn real_resource(&self) -> Option<&ResourceId> {
        self.backend_ref.as_ref()?.resource.as_ref()
    }

    /// Names the cluster that serves this destination.
    pub fn cluster_name(&self, host_tags: &Element) -> Result<String, NameError> {
        // A service tag is required even for concrete resources.
        match self.destination.service_name() {
            None => return Err(NameError::MissingServiceTag),
            Some("") => return Err(NameError::EmptyServiceTag),
            Some(_) => {}
        }
        if let Some(id) = self.real_resource() {
            return Ok(names::resource_cluster_name(id));
        }
        names::destination_cluster_name(&self.destination, host_tags)
    }
}
