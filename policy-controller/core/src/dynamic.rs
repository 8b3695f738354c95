use crate::RuleSet;

/// Holds the rule sets of every policy type that applies to a proxy (or, for egress proxies, to
/// a single destination), keyed by the policy type's configuration type.
///
/// Lookups are keyed by type, so a rule set is always returned with the configuration type it was
/// stored with.
#[derive(Clone, Debug, Default)]
pub struct DynamicPolicies(http::Extensions);

// === impl DynamicPolicies ===

impl DynamicPolicies {
    /// Stores the rule set for configurations of type `C`, returning the one it replaces.
    pub fn insert<C>(&mut self, rules: RuleSet<C>) -> Option<RuleSet<C>>
    where
        C: Clone + Send + Sync + 'static,
    {
        self.0.insert(rules)
    }

    pub fn get<C>(&self) -> Option<&RuleSet<C>>
    where
        C: Send + Sync + 'static,
    {
        self.0.get::<RuleSet<C>>()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<C> From<RuleSet<C>> for DynamicPolicies
where
    C: Clone + Send + Sync + 'static,
{
    fn from(rules: RuleSet<C>) -> Self {
        let mut policies = Self::default();
        policies.insert(rules);
        policies
    }
}
