use crate::{egress::ZoneEgressProxy, gateway::GatewayListenerInfo};
use mesh_policy_controller_core::{DynamicPolicies, Element, ResourceId};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Everything known about a proxy while its resources are configured.
#[derive(Clone, Debug, Default)]
pub struct Proxy {
    pub id: String,
    pub dataplane: Dataplane,
    pub outbounds: Vec<Outbound>,
    pub gateway_listeners: Vec<GatewayListenerInfo>,

    /// Set only for zone egress proxies.
    pub zone_egress: Option<ZoneEgressProxy>,

    /// The rule sets of every policy type matched to this proxy.
    pub policies: DynamicPolicies,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataplane {
    pub mesh: String,
    pub name: String,
    pub address: IpAddr,
    #[serde(default)]
    pub inbounds: Vec<Inbound>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inbound {
    /// The address the proxy listens on. Defaults to the dataplane's address.
    #[serde(default)]
    pub address: Option<IpAddr>,
    pub port: u16,

    /// The workload's address. Defaults to the loopback address.
    #[serde(default)]
    pub service_address: Option<IpAddr>,

    /// The workload's port. Defaults to the listener port.
    #[serde(default)]
    pub service_port: Option<u16>,

    #[serde(default)]
    pub tags: Element,
}

/// The resolved addresses of an inbound.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InboundInterface {
    pub dataplane_ip: IpAddr,
    pub dataplane_port: u16,
    pub workload_ip: IpAddr,
    pub workload_port: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outbound {
    pub address: IpAddr,
    pub port: u16,
    #[serde(default)]
    pub tags: Element,

    /// Set when the outbound targets a concrete resource rather than a service tag.
    #[serde(default)]
    pub backend_ref: Option<ResourceId>,
}

// === impl Dataplane ===

impl Default for Dataplane {
    fn default() -> Self {
        Self {
            mesh: String::new(),
            name: String::new(),
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            inbounds: Vec::new(),
        }
    }
}

impl Dataplane {
    pub fn inbound_interface(&self, inbound: &Inbound) -> InboundInterface {
        InboundInterface {
            dataplane_ip: inbound.address.unwrap_or(self.address),
            dataplane_port: inbound.port,
            workload_ip: inbound
                .service_address
                .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            workload_port: inbound.service_port.unwrap_or(inbound.port),
        }
    }

    pub fn inbound_interfaces(&self) -> impl Iterator<Item = InboundInterface> + '_ {
        self.inbounds.iter().map(|i| self.inbound_interface(i))
    }
}

// === impl Inbound ===

impl Inbound {
    pub fn new(port: u16) -> Self {
        Self {
            address: None,
            port,
            service_address: None,
            service_port: None,
            tags: Element::default(),
        }
    }
}

// === impl Outbound ===

impl Outbound {
    /// Returns the service this outbound targets by tag, or `None` if it targets a concrete
    /// resource.
    pub fn service(&self) -> Option<&str> {
        if self.backend_ref.is_some() {
            return None;
        }
        self.tags.service_name()
    }
}
