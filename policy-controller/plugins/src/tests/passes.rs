use super::*;
use crate::Error;
use mesh_policy_controller_api::policy::circuit_breaker::OutlierDetection;
use mesh_policy_controller_core::{
    rules::{FromRules, InboundRule, ResourceRule, Rule, ToRules},
    Computed, Element, GatewayKey, ListenerKey, Resolver, Subset,
};
use mesh_policy_controller_xds::{Inbound, Origin, Outbound};
use std::cell::RefCell;

fn full_rules() -> RuleSet<Conf> {
    let mut from_rules = FromRules::default();
    from_rules.insert(
        ListenerKey::new(DATAPLANE_IP, 9000),
        InboundRule::all(Conf {
            outlier_detection: Some(OutlierDetection {
                interval: Some("5s".parse().unwrap()),
                healthy_panic_threshold: Some("30".into()),
                ..Default::default()
            }),
            ..max_connections(1)
        }),
    );
    RuleSet {
        from_rules,
        to_rules: ToRules {
            rules: [Rule::new(Subset::all(), max_connections(2))]
                .into_iter()
                .collect(),
            resource_rules: [(msvc("web"), ResourceRule::new(max_connections(3)))]
                .into_iter()
                .collect(),
        },
        ..Default::default()
    }
}

fn outbound(service: &str) -> Outbound {
    Outbound {
        address: IpAddr::V4(Ipv4Addr::new(240, 0, 0, 1)),
        port: 80,
        tags: Element::service(service),
        backend_ref: None,
    }
}

fn full_pass() -> (Proxy, ResourceSet) {
    let mut proxy = sidecar(full_rules());
    proxy.dataplane.inbounds = vec![Inbound::new(9000)];
    proxy.outbounds = vec![outbound("api")];
    let resources = vec![
        cluster(Origin::Inbound, "localhost:9000"),
        cluster(Origin::Outbound, "api"),
        cluster(Origin::Outbound, "kri_msvc_default__apps_web_").with_resource_origin(msvc("web")),
    ]
    .into_iter()
    .collect::<ResourceSet>();
    (proxy, resources)
}

#[test]
fn applying_twice_is_applying_once() {
    let test = Test::default();
    let (proxy, mut resources) = full_pass();

    test.plugin.apply(&mut resources, &proxy).unwrap();
    let once = snapshot(&resources);
    test.plugin.apply(&mut resources, &proxy).unwrap();
    assert_eq!(snapshot(&resources), once);

    assert_eq!(configured_max_connections(&resources, "localhost:9000"), Some(1));
    assert_eq!(configured_max_connections(&resources, "api"), Some(2));
    assert_eq!(
        configured_max_connections(&resources, "kri_msvc_default__apps_web_"),
        Some(3)
    );
}

#[test]
fn unmatched_targets_are_unchanged() {
    let test = Test::default();
    let (mut proxy, mut resources) = full_pass();
    proxy.policies = RuleSet::<Conf>::default().into();
    let before = snapshot(&resources);

    test.plugin.apply(&mut resources, &proxy).unwrap();
    assert_eq!(snapshot(&resources), before);

    // A proxy without any policies of the type is also left alone.
    proxy.policies = Default::default();
    test.plugin.apply(&mut resources, &proxy).unwrap();
    assert_eq!(snapshot(&resources), before);
}

#[test]
fn rejected_configurations_abort_the_pass() {
    let test = Test::default();
    let invalid = Conf {
        outlier_detection: Some(OutlierDetection {
            max_ejection_percent: Some(150),
            ..Default::default()
        }),
        ..Default::default()
    };
    let mut from_rules = FromRules::default();
    from_rules.insert(
        ListenerKey::new(DATAPLANE_IP, 9000),
        InboundRule::all(invalid),
    );
    from_rules.insert(
        ListenerKey::new(DATAPLANE_IP, 9001),
        InboundRule::all(max_connections(1)),
    );
    let mut proxy = sidecar(RuleSet {
        from_rules,
        to_rules: ToRules {
            rules: [Rule::new(Subset::all(), max_connections(2))]
                .into_iter()
                .collect(),
            ..Default::default()
        },
        ..Default::default()
    });
    proxy.dataplane.inbounds = vec![Inbound::new(9000), Inbound::new(9001)];
    proxy.outbounds = vec![outbound("api")];

    let mut resources = vec![
        cluster(Origin::Inbound, "localhost:9000"),
        cluster(Origin::Inbound, "localhost:9001"),
        cluster(Origin::Outbound, "api"),
    ]
    .into_iter()
    .collect::<ResourceSet>();

    let err = test
        .plugin
        .apply(&mut resources, &proxy)
        .expect_err("invalid configuration must fail the pass");
    match err {
        Error::Apply {
            policy,
            kind,
            name,
            source,
        } => {
            assert_eq!(policy, "CircuitBreaker");
            assert_eq!(kind, ResourceKind::Cluster);
            assert_eq!(name, "localhost:9000");
            assert_eq!(source.field, "maxEjectionPercent");
        }
        err => panic!("unexpected error: {err}"),
    }

    // Nothing after the failing listener was configured.
    assert_eq!(configured_max_connections(&resources, "localhost:9001"), None);
    assert_eq!(configured_max_connections(&resources, "api"), None);
}

#[test]
fn cluster_resources_must_carry_clusters() {
    let test = Test::default();
    let mut proxy = sidecar(full_rules());
    proxy.dataplane.inbounds = vec![Inbound::new(9000)];

    let mut resources = ResourceSet::default();
    resources.add(Resource::opaque(
        "localhost:9000",
        ResourceKind::Cluster,
        Origin::Inbound,
    ));

    let err = test
        .plugin
        .apply(&mut resources, &proxy)
        .expect_err("a cluster without a cluster payload must fail the pass");
    assert!(
        matches!(err, Error::IndexInconsistency { found: "opaque", .. }),
        "{err}"
    );
}

#[test]
fn other_kinds_are_not_configured() {
    let mut listener = Resource::opaque("inbound:9000", ResourceKind::Listener, Origin::Inbound);
    let before = listener.clone();
    crate::apply(&max_connections(1), &mut listener).unwrap();
    assert_eq!(listener, before);
}

/// Answers every query with the same configuration and records what was asked.
#[derive(Default)]
struct RecordingResolver {
    conf: Conf,
    queries: RefCell<Vec<String>>,
}

impl Resolver<Conf> for RecordingResolver {
    fn compute_from(&self, listener: &ListenerKey) -> Option<Computed<'_, Conf>> {
        self.queries.borrow_mut().push(format!("from {listener}"));
        None
    }

    fn compute_to(&self, element: &Element) -> Option<Computed<'_, Conf>> {
        self.queries.borrow_mut().push(format!("to {element}"));
        Some(Computed {
            conf: &self.conf,
            origin: &[],
        })
    }

    fn gateway_rules(&self, _: &GatewayKey) -> Option<&ToRules<Conf>> {
        None
    }

    fn compute_resource(&self, id: &ResourceId) -> Option<Computed<'_, Conf>> {
        self.queries.borrow_mut().push(format!("resource {id}"));
        None
    }
}

#[test]
fn applies_exactly_what_the_resolver_returns() {
    let test = Test::default();
    let resolver = RecordingResolver {
        conf: max_connections(42),
        ..Default::default()
    };
    let (proxy, mut resources) = full_pass();

    test.plugin
        .apply_rules(&resolver, &mut resources, &proxy)
        .unwrap();

    assert_eq!(
        resolver.queries.into_inner(),
        vec![
            "from 10.0.0.1:9000".to_string(),
            "to mesh.io/service=api".to_string(),
            "resource kri_msvc_default__apps_web_".to_string(),
        ]
    );
    assert_eq!(configured_max_connections(&resources, "localhost:9000"), None);
    assert_eq!(configured_max_connections(&resources, "api"), Some(42));
    assert_eq!(
        configured_max_connections(&resources, "kri_msvc_default__apps_web_"),
        None
    );
}
