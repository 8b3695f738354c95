use crate::{Configure, Error};
use mesh_policy_controller_xds::{Payload, Resource, ResourceKind, ResourceSet, ResourcesByKind};
use tracing::trace;

/// Writes `conf` onto a resource.
///
/// Only clusters carry policy settings; resources of any other kind are left untouched.
pub fn apply<C: Configure>(conf: &C, resource: &mut Resource) -> Result<(), Error> {
    match resource.kind {
        ResourceKind::Cluster => configure_cluster(conf, resource),
        ResourceKind::Listener
        | ResourceKind::Route
        | ResourceKind::Endpoints
        | ResourceKind::Secret => {
            trace!(kind = %resource.kind, name = %resource.name, "Not configurable");
            Ok(())
        }
    }
}

fn configure_cluster<C: Configure>(conf: &C, resource: &mut Resource) -> Result<(), Error> {
    match &mut resource.payload {
        Payload::Cluster(cluster) => {
            conf.configure_cluster(cluster)
                .map_err(|source| Error::Apply {
                    policy: C::KIND,
                    kind: resource.kind,
                    name: resource.name.clone(),
                    source,
                })
        }
        payload => Err(Error::IndexInconsistency {
            kind: resource.kind,
            name: resource.name.clone(),
            found: payload.shape(),
        }),
    }
}

/// Configures the named resource. Returns false if there is no such resource.
pub(crate) fn apply_named<C: Configure>(
    conf: &C,
    resources: &mut ResourceSet,
    kind: ResourceKind,
    name: &str,
) -> Result<bool, Error> {
    match resources.get_mut(kind, name) {
        Some(resource) => apply(conf, resource).map(|()| true),
        None => Ok(false),
    }
}

/// Configures every resource listed in `by_kind`.
pub(crate) fn apply_all<C: Configure>(
    conf: &C,
    by_kind: &ResourcesByKind,
    resources: &mut ResourceSet,
) -> Result<(), Error> {
    for (kind, names) in by_kind {
        for name in names {
            apply_named(conf, resources, *kind, name)?;
        }
    }
    Ok(())
}
