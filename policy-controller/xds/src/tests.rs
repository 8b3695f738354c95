use crate::*;
use mesh_policy_controller_core::{Element, ResourceId, ResourceType};
use std::{
    collections::BTreeMap,
    net::{IpAddr, Ipv4Addr},
};

fn msvc(name: &str) -> ResourceId {
    ResourceId::new(ResourceType::MeshService, "default", name).with_namespace("apps")
}

fn extsvc(name: &str) -> ResourceId {
    ResourceId::new(ResourceType::MeshExternalService, "default", name)
}

fn cluster_resource(origin: Origin, name: &str) -> Resource {
    Resource::cluster(origin, Cluster::new(name))
}

#[test]
fn indexes_resources_by_origin() {
    let web = msvc("web");
    let rs = vec![
        cluster_resource(Origin::Outbound, "web").with_resource_origin(web.clone()),
        Resource::opaque("web", ResourceKind::Endpoints, Origin::Outbound)
            .with_resource_origin(web.clone()),
        cluster_resource(Origin::Outbound, "httpbin").with_resource_origin(extsvc("httpbin")),
        cluster_resource(Origin::Inbound, "localhost:8080"),
    ]
    .into_iter()
    .collect::<ResourceSet>();
    assert_eq!(rs.len(), 4);

    let index = rs.index_by_origin();
    assert_eq!(index.len(), 2);
    assert_eq!(
        index.get(&web),
        &maplit::btreemap! {
            ResourceKind::Cluster => vec!["web".to_string()],
            ResourceKind::Endpoints => vec!["web".to_string()],
        }
    );

    // Unknown origins are empty rather than absent.
    assert!(index.get(&msvc("unknown")).is_empty());

    let index = rs.index_by_origin_filtered(non_mesh_external_service);
    assert!(index.contains(&web));
    assert!(!index.contains(&extsvc("httpbin")));

    let index = rs.index_by_origin_filtered(of_kind(ResourceKind::Endpoints));
    assert_eq!(
        index.iter().collect::<Vec<_>>(),
        vec![(
            &web,
            &maplit::btreemap! { ResourceKind::Endpoints => vec!["web".to_string()] }
        )]
    );
}

#[test]
fn adding_a_resource_replaces_it() {
    let mut rs = ResourceSet::default();
    assert!(rs.add(cluster_resource(Origin::Outbound, "web")).is_none());
    let old = rs.add(cluster_resource(Origin::Gateway, "web")).expect("must replace");
    assert_eq!(old.origin, Origin::Outbound);
    assert_eq!(rs.len(), 1);
    assert_eq!(
        rs.get(ResourceKind::Cluster, "web").map(|r| &r.origin),
        Some(&Origin::Gateway)
    );
}

#[test]
fn gathers_clusters_by_role() {
    let rs = vec![
        cluster_resource(Origin::Inbound, "localhost:8080"),
        cluster_resource(Origin::Outbound, "web"),
        cluster_resource(Origin::Outbound, "payments-_0_"),
        cluster_resource(Origin::Outbound, "payments-_1_"),
        cluster_resource(Origin::Gateway, "api"),
        cluster_resource(Origin::Egress, "httpbin"),
        Resource::opaque("outbound:web", ResourceKind::Listener, Origin::Outbound),
    ]
    .into_iter()
    .collect::<ResourceSet>();

    let clusters = gather_clusters(&rs);
    assert_eq!(
        clusters,
        Clusters {
            inbound: maplit::btreeset! { "localhost:8080".to_string() },
            outbound: maplit::btreeset! { "web".to_string() },
            outbound_split: maplit::btreemap! {
                "payments".to_string() => vec!["payments-_0_".to_string(), "payments-_1_".to_string()],
            },
            gateway: maplit::btreeset! { "api".to_string() },
        }
    );
}

#[test]
fn targets_only_tagged_outbounds() {
    let clusters = Clusters {
        outbound: maplit::btreeset! { "web".to_string(), "orphan".to_string() },
        outbound_split: maplit::btreemap! {
            "payments".to_string() => vec!["payments-_0_".to_string(), "payments-_1_".to_string()],
        },
        ..Default::default()
    };
    let outbound = |service: &str, port: u16| Outbound {
        address: IpAddr::V4(Ipv4Addr::new(240, 0, 0, 1)),
        port,
        tags: Element::service(service),
        backend_ref: None,
    };
    let outbounds = vec![
        outbound("web", 80),
        outbound("payments", 8080),
        Outbound {
            backend_ref: Some(msvc("web")),
            ..outbound("web", 81)
        },
    ];

    let targeted = gather_targeted_clusters(&outbounds, &clusters);
    let expected: BTreeMap<String, String> = maplit::btreemap! {
        "web".to_string() => "web".to_string(),
        "payments-_0_".to_string() => "payments".to_string(),
        "payments-_1_".to_string() => "payments".to_string(),
    };
    assert_eq!(targeted, expected);
}

#[test]
fn inbound_interfaces_default_to_the_dataplane() {
    let dataplane = Dataplane {
        mesh: "default".to_string(),
        name: "web-1".to_string(),
        address: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
        inbounds: vec![
            Inbound::new(9000),
            Inbound {
                address: Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))),
                service_address: Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))),
                service_port: Some(8080),
                ..Inbound::new(9001)
            },
        ],
    };

    let ifaces = dataplane.inbound_interfaces().collect::<Vec<_>>();
    assert_eq!(
        ifaces,
        vec![
            InboundInterface {
                dataplane_ip: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
                dataplane_port: 9000,
                workload_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
                workload_port: 9000,
            },
            InboundInterface {
                dataplane_ip: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
                dataplane_port: 9001,
                workload_ip: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
                workload_port: 8080,
            },
        ]
    );
}

#[test]
fn resources_deserialize_from_pass_descriptions() {
    let resource = serde_json::from_value::<Resource>(serde_json::json!({
        "name": "kri_msvc_default__apps_web_",
        "kind": "Cluster",
        "origin": "outbound",
        "resourceOrigin": "kri_msvc_default__apps_web_",
        "payload": {
            "cluster": {
                "name": "kri_msvc_default__apps_web_",
                "circuitBreakers": {
                    "thresholds": [{ "maxConnections": 10 }],
                },
            },
        },
    }))
    .unwrap();

    assert_eq!(resource.resource_origin, Some(msvc("web")));
    let Payload::Cluster(cluster) = resource.payload else {
        panic!("expected a cluster payload");
    };
    let thresholds = cluster.circuit_breakers.unwrap().thresholds;
    assert_eq!(thresholds[0].max_connections, Some(10));
    assert_eq!(thresholds[0].priority, crate::cluster::RoutingPriority::Default);
}

#[test]
fn external_service_destinations() {
    let svc = egress::MeshExternalService {
        id: extsvc("httpbin"),
        port: 443,
    };
    assert_eq!(svc.destination_name(), "httpbin:443");

    let mut resources = egress::MeshResources::new("default");
    assert!(resources.policies_for(&svc).is_none());
    resources
        .dynamic
        .insert("httpbin:443".to_string(), Default::default());
    assert!(resources.policies_for(&svc).is_some());
}

#[test]
fn cluster_type_urls() {
    assert_eq!(
        ResourceKind::Cluster.type_url(),
        "type.googleapis.com/envoy.config.cluster.v3.Cluster"
    );
    assert_eq!(ResourceKind::Endpoints.to_string(), "Endpoints");
}
