//! Applies traffic policies to the resources generated for a proxy.
//!
//! A [`Plugin`] runs once per proxy, after the proxy's resources have been generated. It walks
//! the proxy's topology one role at a time, resolves the configuration that applies to each
//! target, and writes it onto the target's resources:
//!
//! ```text
//! inbound  : listener address/port -> from rules     -> inbound cluster
//! outbound : service element       -> to rules       -> outbound (and split) clusters
//! gateway  : listener/host/element -> gateway rules  -> gateway clusters
//!                                  -> resource rules -> resources of the backend
//! resource : resource identifier   -> resource rules -> resources of the identifier
//! ```
//!
//! Zone egress proxies are configured from the policies bound to each mesh they serve instead.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod apply;
pub mod circuit_breaker;
mod configure;
mod egress;
mod error;
mod gateway;
mod inbound;
mod metrics;
mod outbound;
mod referenced;

#[cfg(test)]
mod tests;

pub use self::{
    apply::apply,
    configure::{Configure, InvalidConf},
    error::Error,
    metrics::PluginMetrics,
};
use mesh_policy_controller_core::Resolver;
use mesh_policy_controller_xds::{gather_clusters, Proxy, ResourceSet};
use std::marker::PhantomData;
use tracing::{debug, debug_span};

/// Applies policies with configurations of type `C`.
#[derive(Clone, Debug)]
pub struct Plugin<C> {
    metrics: PluginMetrics,
    _conf: PhantomData<fn(C)>,
}

// === impl Plugin ===

impl<C> Plugin<C>
where
    C: Configure + Send + Sync + 'static,
{
    pub fn new(metrics: PluginMetrics) -> Self {
        Self {
            metrics,
            _conf: PhantomData,
        }
    }

    /// Configures `resources` with the policies matched to `proxy`.
    ///
    /// The first error aborts the pass. Resources configured before the error are left modified,
    /// so callers must discard the whole set on error.
    pub fn apply(&self, resources: &mut ResourceSet, proxy: &Proxy) -> Result<(), Error> {
        let _span = debug_span!("apply", policy = C::KIND, proxy = %proxy.id).entered();

        if let Some(egress) = proxy.zone_egress.as_ref() {
            return egress::apply::<C>(egress, resources, &self.metrics);
        }

        match proxy.policies.get::<C>() {
            Some(rules) => self.apply_rules(rules, resources, proxy),
            None => {
                debug!("No policies");
                Ok(())
            }
        }
    }

    /// Configures `resources` with the configurations `rules` resolves for `proxy`'s targets.
    pub fn apply_rules<R>(
        &self,
        rules: &R,
        resources: &mut ResourceSet,
        proxy: &Proxy,
    ) -> Result<(), Error>
    where
        R: Resolver<C>,
    {
        let clusters = gather_clusters(resources);

        inbound::apply(rules, &proxy.dataplane, &clusters, resources, &self.metrics)?;
        outbound::apply(rules, &proxy.outbounds, &clusters, resources, &self.metrics)?;
        gateway::apply(rules, proxy, &clusters, resources, &self.metrics)?;
        referenced::apply(rules, resources, &self.metrics)?;

        Ok(())
    }
}

impl<C> Default for Plugin<C>
where
    C: Configure + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(PluginMetrics::default())
    }
}
