//! Models the data-plane resources generated for a proxy and the topology they were generated
//! from.
//!
//! Resources are generated before any traffic policy is applied. Each resource records the role
//! that produced it (its [`Origin`]) and, when it was produced for a referenced resource such as
//! a mesh service, that resource's identifier. Policy plugins use the [`ResourceIndex`] built
//! from these identifiers to find every resource that belongs to a policy target.
//!
//! ```text
//! [ Proxy topology ] -> generator -> [ ResourceSet ] -> index_by_origin -> [ ResourceIndex ]
//! ```

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod cluster;
mod clusters;
pub mod egress;
pub mod gateway;
mod index;
pub mod names;
mod proxy;
mod resource;

#[cfg(test)]
mod tests;

pub use self::{
    cluster::Cluster,
    clusters::{gather_clusters, gather_targeted_clusters, Clusters},
    index::{non_mesh_external_service, of_kind, ResourceIndex, ResourcesByKind},
    proxy::{Dataplane, Inbound, InboundInterface, Outbound, Proxy},
    resource::{Origin, Payload, Resource, ResourceKind, ResourceSet},
};
