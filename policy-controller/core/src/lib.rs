#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod dynamic;
mod identifier;
mod listener;
pub mod rules;
mod subset;


pub use self::{
    dynamic::DynamicPolicies,
    identifier::{ParseResourceIdError, ResourceId, ResourceType},
    listener::{GatewayKey, ListenerKey, ParseListenerKeyError},
    rules::{Computed, PolicyRef, Resolver, RuleSet},
    subset::{Element, Subset, Tag},
};

/// The tag that names the service a workload or destination belongs to.
pub const SERVICE_TAG: &str = "mesh.io/service";
