use super::{Computed, PolicyRef, ResourceRules};
use crate::{Element, Subset};
use serde::{Deserialize, Serialize};

/// A configuration that applies to every element matched by `subset`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Rule<C> {
    #[serde(default)]
    pub subset: Subset,
    pub conf: C,
    #[serde(default)]
    pub origin: Vec<PolicyRef>,
}

/// Subset-addressed rules.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Rules<C>(Vec<Rule<C>>);

/// Rules for outbound traffic, addressed either by subset or by a referenced resource.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToRules<C> {
    #[serde(default)]
    pub rules: Rules<C>,
    #[serde(default)]
    pub resource_rules: ResourceRules<C>,
}

// === impl Rule ===

impl<C> Rule<C> {
    pub fn new(subset: Subset, conf: C) -> Self {
        Self {
            subset,
            conf,
            origin: vec![],
        }
    }

    pub fn with_origin(mut self, origin: PolicyRef) -> Self {
        self.origin.push(origin);
        self
    }

    fn computed(&self) -> Computed<'_, C> {
        Computed {
            conf: &self.conf,
            origin: &self.origin,
        }
    }
}

// === impl Rules ===

impl<C> Rules<C> {
    /// Returns the most specific rule whose subset matches `element`.
    ///
    /// When several matching rules are equally specific, the one listed first wins, so the result
    /// is deterministic for a given rule list.
    pub fn compute(&self, element: &Element) -> Option<Computed<'_, C>> {
        let mut best: Option<&Rule<C>> = None;
        for rule in self.0.iter().filter(|r| r.subset.matches(element)) {
            match best {
                Some(b) if b.subset.specificity() >= rule.subset.specificity() => {}
                _ => best = Some(rule),
            }
        }
        best.map(Rule::computed)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule<C>> {
        self.0.iter()
    }
}

impl<C> Default for Rules<C> {
    fn default() -> Self {
        Self(vec![])
    }
}

impl<C> FromIterator<Rule<C>> for Rules<C> {
    fn from_iter<I: IntoIterator<Item = Rule<C>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// === impl ToRules ===

impl<C> Default for ToRules<C> {
    fn default() -> Self {
        Self {
            rules: Rules::default(),
            resource_rules: ResourceRules::default(),
        }
    }
}
