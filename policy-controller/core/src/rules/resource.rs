use super::{Computed, PolicyRef};
use crate::ResourceId;
use ahash::AHashMap as HashMap;
use serde::{Deserialize, Serialize};

/// A configuration targeting a referenced resource.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ResourceRule<C> {
    pub conf: C,
    #[serde(default)]
    pub origin: Vec<PolicyRef>,
}

/// Rules addressed by resource identifier.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ResourceRules<C>(HashMap<ResourceId, ResourceRule<C>>);

// === impl ResourceRule ===

impl<C> ResourceRule<C> {
    pub fn new(conf: C) -> Self {
        Self {
            conf,
            origin: vec![],
        }
    }
}

// === impl ResourceRules ===

impl<C> ResourceRules<C> {
    /// Returns the rule for `id`.
    ///
    /// A section-scoped identifier (e.g. a single port of a service) that has no rule of its own
    /// inherits the rule of the whole resource.
    pub fn compute(&self, id: &ResourceId) -> Option<Computed<'_, C>> {
        let rule = match self.0.get(id) {
            Some(rule) => rule,
            None if id.has_section() => self.0.get(&id.without_section())?,
            None => return None,
        };
        Some(Computed {
            conf: &rule.conf,
            origin: &rule.origin,
        })
    }

    pub fn insert(&mut self, id: ResourceId, rule: ResourceRule<C>) -> Option<ResourceRule<C>> {
        self.0.insert(id, rule)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<C> Default for ResourceRules<C> {
    fn default() -> Self {
        Self(HashMap::default())
    }
}

impl<C> FromIterator<(ResourceId, ResourceRule<C>)> for ResourceRules<C> {
    fn from_iter<I: IntoIterator<Item = (ResourceId, ResourceRule<C>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
