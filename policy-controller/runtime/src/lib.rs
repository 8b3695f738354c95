#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use mesh_policy_controller_api as api;
pub use mesh_policy_controller_core as core;
pub use mesh_policy_controller_plugins as plugins;
pub use mesh_policy_controller_xds as xds;

mod args;
pub mod input;

pub use self::args::Args;

use self::{
    api::policy::CircuitBreakerConf,
    plugins::{Plugin, PluginMetrics},
    xds::{Proxy, ResourceSet},
};

/// Applies every supported policy type to a proxy's resources.
pub fn apply_policies(
    proxy: &Proxy,
    resources: &mut ResourceSet,
    metrics: &PluginMetrics,
) -> Result<(), plugins::Error> {
    Plugin::<CircuitBreakerConf>::new(metrics.clone()).apply(resources, proxy)?;
    Ok(())
}
