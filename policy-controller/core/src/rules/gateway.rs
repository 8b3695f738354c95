use super::ToRules;
use crate::{GatewayKey, ListenerKey};
use ahash::AHashMap as HashMap;
use serde::{Deserialize, Serialize};

/// Rules for traffic routed by a gateway, by listener.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRules<C> {
    #[serde(default)]
    pub by_listener: HashMap<ListenerKey, GatewayListenerRules<C>>,
}

/// Rules for a single gateway listener.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayListenerRules<C> {
    /// Rules for every virtual host on the listener.
    #[serde(default)]
    pub rules: ToRules<C>,

    /// Rules that replace `rules` for a specific virtual host.
    #[serde(default)]
    pub by_hostname: HashMap<String, ToRules<C>>,
}

// === impl GatewayRules ===

impl<C> GatewayRules<C> {
    /// Returns the rules for a listener's virtual host, falling back to the listener-wide rules
    /// when none target the host specifically.
    pub fn for_host(&self, key: &GatewayKey) -> Option<&ToRules<C>> {
        let listener = self.by_listener.get(&key.listener)?;
        Some(
            listener
                .by_hostname
                .get(&key.hostname)
                .unwrap_or(&listener.rules),
        )
    }
}

impl<C> Default for GatewayRules<C> {
    fn default() -> Self {
        Self {
            by_listener: HashMap::default(),
        }
    }
}

// === impl GatewayListenerRules ===

impl<C> Default for GatewayListenerRules<C> {
    fn default() -> Self {
        Self {
            rules: ToRules::default(),
            by_hostname: HashMap::default(),
        }
    }
}
