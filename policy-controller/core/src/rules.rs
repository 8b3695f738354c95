//! The resolved policy hierarchy for a single proxy and policy type.
//!
//! A [`RuleSet`] is produced by matching every policy of one type against a proxy. It holds one
//! sub-index per addressing scheme:
//!
//! ```text
//! from_rules:    ListenerKey                 -> [InboundRule]
//! to_rules:      Element                     -> Rule          (most specific subset wins)
//!                ResourceId                  -> ResourceRule
//! gateway_rules: ListenerKey -> hostname     -> ToRules
//! ```
//!
//! Resolution never fails: a key that nothing applies to resolves to `None`.

mod gateway;
mod inbound;
mod outbound;
mod resource;

pub use self::{
    gateway::{GatewayListenerRules, GatewayRules},
    inbound::{FromRules, InboundRule},
    outbound::{Rule, Rules, ToRules},
    resource::{ResourceRule, ResourceRules},
};
use crate::{Element, GatewayKey, ListenerKey, ResourceId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names a policy that contributed to a resolved configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PolicyRef {
    pub mesh: String,
    pub name: String,
}

/// A configuration resolved for a single addressing key.
///
/// This borrows from the rule set it was resolved from and is never modified.
#[derive(Debug, PartialEq)]
pub struct Computed<'r, C> {
    pub conf: &'r C,
    pub origin: &'r [PolicyRef],
}

/// All rules of one policy type that apply to a proxy.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet<C> {
    #[serde(default)]
    pub from_rules: FromRules<C>,
    #[serde(default)]
    pub to_rules: ToRules<C>,
    #[serde(default)]
    pub gateway_rules: GatewayRules<C>,
}

/// Resolves configurations by addressing key.
///
/// Returning `None` means that no policy applies to the key; it is never an error.
pub trait Resolver<C> {
    /// Resolves the configuration for traffic received on an inbound listener.
    fn compute_from(&self, listener: &ListenerKey) -> Option<Computed<'_, C>>;

    /// Resolves the configuration for outbound traffic to a subset.
    fn compute_to(&self, element: &Element) -> Option<Computed<'_, C>>;

    /// Returns the rules that apply to a gateway listener's virtual host, if the listener has
    /// any rules at all.
    fn gateway_rules(&self, key: &GatewayKey) -> Option<&ToRules<C>>;

    /// Resolves the configuration for traffic sent to a subset through a gateway virtual host.
    fn compute_gateway(&self, key: &GatewayKey, element: &Element) -> Option<Computed<'_, C>> {
        self.gateway_rules(key)?.rules.compute(element)
    }

    /// Resolves the configuration for a referenced resource.
    fn compute_resource(&self, id: &ResourceId) -> Option<Computed<'_, C>>;
}

// === impl PolicyRef ===

impl PolicyRef {
    pub fn new(mesh: impl ToString, name: impl ToString) -> Self {
        Self {
            mesh: mesh.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for PolicyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.mesh, self.name)
    }
}

// === impl Computed ===

// Derived impls would require `C: Copy`.
impl<C> Clone for Computed<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Computed<'_, C> {}

// === impl RuleSet ===

impl<C> Default for RuleSet<C> {
    fn default() -> Self {
        Self {
            from_rules: FromRules::default(),
            to_rules: ToRules::default(),
            gateway_rules: GatewayRules::default(),
        }
    }
}

impl<C> Resolver<C> for RuleSet<C> {
    fn compute_from(&self, listener: &ListenerKey) -> Option<Computed<'_, C>> {
        self.from_rules.matches_all_incoming_traffic(listener)
    }

    fn compute_to(&self, element: &Element) -> Option<Computed<'_, C>> {
        self.to_rules.rules.compute(element)
    }

    fn gateway_rules(&self, key: &GatewayKey) -> Option<&ToRules<C>> {
        self.gateway_rules.for_host(key)
    }

    fn compute_resource(&self, id: &ResourceId) -> Option<Computed<'_, C>> {
        self.to_rules.resource_rules.compute(id)
    }
}
