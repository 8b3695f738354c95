use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

#[derive(Clone, Debug, Default)]
pub struct PluginMetrics {
    configured: Family<TargetLabels, Counter>,
    skipped: Family<SkipLabels, Counter>,
}

/// The role of a target in a proxy's topology.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Target {
    Inbound,
    Outbound,
    Gateway,
    Resource,
    Egress,
}

/// Why a target was left unconfigured.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Skip {
    NoCluster,
    NoRules,
    NoMatch,
    UnresolvedName,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct TargetLabels {
    policy: &'static str,
    target: &'static str,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct SkipLabels {
    policy: &'static str,
    target: &'static str,
    reason: &'static str,
}

// === impl PluginMetrics ===

impl PluginMetrics {
    pub fn register(reg: &mut Registry) -> Self {
        let configured = Family::default();
        reg.register(
            "configured",
            "Total number of policy targets configured",
            configured.clone(),
        );

        let skipped = Family::default();
        reg.register(
            "skipped",
            "Total number of policy targets left unconfigured",
            skipped.clone(),
        );

        Self {
            configured,
            skipped,
        }
    }

    pub(crate) fn configured(&self, policy: &'static str, target: Target) {
        self.configured
            .get_or_create(&TargetLabels {
                policy,
                target: target.as_str(),
            })
            .inc();
    }

    pub(crate) fn skipped(&self, policy: &'static str, target: Target, reason: Skip) {
        self.skipped
            .get_or_create(&SkipLabels {
                policy,
                target: target.as_str(),
                reason: reason.as_str(),
            })
            .inc();
    }
}

// === impl Target ===

impl Target {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
            Self::Gateway => "gateway",
            Self::Resource => "resource",
            Self::Egress => "egress",
        }
    }
}

// === impl Skip ===

impl Skip {
    fn as_str(&self) -> &'static str {
        match self {
            Self::NoCluster => "no_cluster",
            Self::NoRules => "no_rules",
            Self::NoMatch => "no_match",
            Self::UnresolvedName => "unresolved_name",
        }
    }
}
