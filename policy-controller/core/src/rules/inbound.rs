use super::{Computed, PolicyRef};
use crate::{ListenerKey, Subset};
use ahash::AHashMap as HashMap;
use serde::{Deserialize, Serialize};

/// A configuration for clients matched by `matches` on an inbound listener.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct InboundRule<C> {
    /// Selects clients by their tags. An empty subset matches all incoming traffic.
    #[serde(default)]
    pub matches: Subset,
    pub conf: C,
    #[serde(default)]
    pub origin: Vec<PolicyRef>,
}

/// Rules for inbound traffic, by listener.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FromRules<C> {
    #[serde(default)]
    pub inbound_rules: HashMap<ListenerKey, Vec<InboundRule<C>>>,
}

// === impl InboundRule ===

impl<C> InboundRule<C> {
    pub fn all(conf: C) -> Self {
        Self {
            matches: Subset::all(),
            conf,
            origin: vec![],
        }
    }
}

// === impl FromRules ===

impl<C> FromRules<C> {
    /// Returns the configuration that applies to all clients of `listener`.
    ///
    /// Cluster-level settings cannot differ per client, so only a rule that matches every client
    /// is meaningful here.
    pub fn matches_all_incoming_traffic(&self, listener: &ListenerKey) -> Option<Computed<'_, C>> {
        self.inbound_rules
            .get(listener)?
            .iter()
            .find(|rule| rule.matches.is_all())
            .map(|rule| Computed {
                conf: &rule.conf,
                origin: &rule.origin,
            })
    }

    pub fn insert(&mut self, listener: ListenerKey, rule: InboundRule<C>) {
        self.inbound_rules.entry(listener).or_default().push(rule);
    }
}

impl<C> Default for FromRules<C> {
    fn default() -> Self {
        Self {
            inbound_rules: HashMap::default(),
        }
    }
}
