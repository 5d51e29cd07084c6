// ABOUTME: Integration tests for descriptor resolution.
// ABOUTME: Image candidate selection, port mapping and network attachments.

mod support;

use kether::descriptor::{ResourceDescriptor, WorkloadDescriptor};
use kether::host::{ALLOCATION_RANGE, HostPorts};
use kether::resolve::{
    RuntimeConfig, build_network_attachments, image_candidates, resolve_image,
    resolve_port_mapping,
};
use proptest::prelude::*;
use std::collections::BTreeSet;
use support::{BusyPorts, Call, FakeRuntime, FreePorts};

fn resource(repository: &str, tag: &str) -> ResourceDescriptor {
    ResourceDescriptor {
        repository: repository.to_string(),
        tag: tag.to_string(),
    }
}

fn entries(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn allocated(port: &str) -> bool {
    port.parse::<u16>()
        .map(|p| ALLOCATION_RANGE.contains(&p))
        .unwrap_or(false)
}

// =============================================================================
// Image Resolver
// =============================================================================

#[test]
fn candidates_try_priority_before_predicate() {
    let candidates = image_candidates(&resource("nginx", "1.24"), &resource("nginx", "1.25"));
    let rendered: Vec<String> = candidates.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, ["nginx:1.25", "nginx:1.24", "nginx"]);
}

#[test]
fn candidates_cover_every_repository_and_tag() {
    let candidates = image_candidates(&resource("nginx", "stable"), &resource("mirror/nginx", "1.25"));
    let rendered: Vec<String> = candidates.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        [
            "mirror/nginx:1.25",
            "mirror/nginx:stable",
            "mirror/nginx",
            "nginx:1.25",
            "nginx:stable",
            "nginx",
        ]
    );
}

#[test]
fn no_repositories_means_no_candidates() {
    let candidates = image_candidates(&resource("", "1.25"), &resource("", ""));
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn priority_image_wins_when_available() {
    support::init_tracing();
    let runtime = FakeRuntime::new()
        .with_registry("nginx:1.25")
        .with_registry("nginx:1.24");

    let image = resolve_image(&runtime, &resource("nginx", "1.24"), &resource("nginx", "1.25"), false).await;

    assert_eq!(image.map(|i| i.to_string()).as_deref(), Some("nginx:1.25"));
}

#[tokio::test]
async fn falls_back_to_predicate_image() {
    let runtime = FakeRuntime::new().with_local("nginx:1.24");

    let image = resolve_image(&runtime, &resource("nginx", "1.24"), &resource("nginx", "1.25"), false).await;

    assert_eq!(image.map(|i| i.to_string()).as_deref(), Some("nginx:1.24"));
}

#[tokio::test]
async fn nothing_available_resolves_to_none() {
    let runtime = FakeRuntime::new();
    let image = resolve_image(&runtime, &resource("nginx", "1.24"), &resource("", ""), false).await;
    assert!(image.is_none());
}

#[tokio::test]
async fn local_only_never_asks_the_registry() {
    let runtime = FakeRuntime::new().with_registry("nginx:1.25");

    let image = resolve_image(&runtime, &resource("nginx", "1.25"), &resource("", ""), true).await;

    assert!(image.is_none());
    assert!(
        !runtime
            .calls()
            .iter()
            .any(|c| matches!(c, Call::RegistryHasImage(_)))
    );
}

#[tokio::test]
async fn resolution_never_mutates_the_runtime() {
    let runtime = FakeRuntime::new().with_registry("nginx:1.25");
    let _ = resolve_image(&runtime, &resource("nginx", "1.25"), &resource("", ""), false).await;
    assert!(runtime.mutating_calls().is_empty());
}

// =============================================================================
// Port Mapping Resolver
// =============================================================================

#[test]
fn free_host_port_is_kept() {
    let mapping = resolve_port_mapping(&entries(&["8080:80"]), &HostPorts::with_probe(FreePorts));
    assert!(mapping.exposed_ports().contains("80"));
    assert_eq!(mapping.host_ports("80"), Some(&["8080".to_string()][..]));
}

#[test]
fn conflicting_host_port_keeps_first_mapping() {
    support::init_tracing();
    let mapping = resolve_port_mapping(
        &entries(&["8080:80", "8080:81"]),
        &HostPorts::with_probe(FreePorts),
    );

    assert_eq!(mapping.exposed_ports().len(), 1);
    assert!(mapping.exposed_ports().contains("80"));
    assert_eq!(mapping.host_ports("81"), None);
}

#[test]
fn host_ports_conflict_by_number_not_spelling() {
    let mapping = resolve_port_mapping(
        &entries(&["8080:80", "+8080:81", "08080:82"]),
        &HostPorts::with_probe(FreePorts),
    );

    assert_eq!(mapping.host_ports("80"), Some(&["8080".to_string()][..]));
    assert_eq!(mapping.host_ports("82"), None);

    let bound_to_8080: Vec<&String> = mapping
        .port_bindings()
        .iter()
        .filter(|(_, hosts)| hosts.iter().any(|h| h == "8080"))
        .map(|(container, _)| container)
        .collect();
    assert_eq!(bound_to_8080, ["80"]);

    let substitute = &mapping.host_ports("81").unwrap()[0];
    assert!(allocated(substitute), "{substitute}");
}

#[test]
fn leading_zeros_are_sent_canonical() {
    let mapping = resolve_port_mapping(&entries(&["03000:3000"]), &HostPorts::with_probe(FreePorts));
    assert_eq!(mapping.host_ports("3000"), Some(&["3000".to_string()][..]));
}

#[test]
fn malformed_entries_are_dropped() {
    let mapping = resolve_port_mapping(
        &entries(&["80", "1:2:3", "8080:http", "8081:81"]),
        &HostPorts::with_probe(FreePorts),
    );

    assert_eq!(
        mapping.exposed_ports().iter().collect::<Vec<_>>(),
        ["81"],
        "only the well-formed entry survives"
    );
}

#[test]
fn zero_host_port_is_replaced_by_an_allocated_one() {
    let mapping = resolve_port_mapping(&entries(&["0:80"]), &HostPorts::with_probe(FreePorts));

    let hosts = mapping.host_ports("80").unwrap();
    assert_eq!(hosts.len(), 1);
    assert!(allocated(&hosts[0]), "{hosts:?}");
}

#[test]
fn busy_host_port_is_replaced_by_an_allocated_one() {
    let probe = BusyPorts(BTreeSet::from([3000]));
    let mapping = resolve_port_mapping(&entries(&["3000:3000"]), &HostPorts::with_probe(probe));

    let hosts = mapping.host_ports("3000").unwrap();
    assert_ne!(hosts[0], "3000");
    assert!(allocated(&hosts[0]), "{hosts:?}");
}

#[test]
fn empty_host_side_gets_an_allocated_port() {
    let mapping = resolve_port_mapping(&entries(&[":443/tcp"]), &HostPorts::with_probe(FreePorts));
    let hosts = mapping.host_ports("443/tcp").unwrap();
    assert!(allocated(&hosts[0]), "{hosts:?}");
}

#[test]
fn allocated_ports_are_distinct_within_one_resolution() {
    let mapping = resolve_port_mapping(
        &entries(&["0:80", "1:81", "2:82", "3:83"]),
        &HostPorts::with_probe(FreePorts),
    );

    let hosts: BTreeSet<&String> = mapping.port_bindings().values().flatten().collect();
    assert_eq!(hosts.len(), 4);
}

#[test]
fn container_port_without_any_binding_is_excluded() {
    let busy: BTreeSet<u16> = ALLOCATION_RANGE.chain([5000]).collect();
    let mapping = resolve_port_mapping(&entries(&["5000:80"]), &HostPorts::with_probe(BusyPorts(busy)));
    assert!(mapping.is_empty());
    assert!(mapping.port_bindings().is_empty());
}

#[test]
fn empty_publish_list_yields_empty_mapping() {
    let mapping = resolve_port_mapping(&[], &HostPorts::with_probe(FreePorts));
    assert!(mapping.is_empty());
}

proptest! {
    #[test]
    fn port_mapping_is_consistent_for_any_input(items in proptest::collection::vec(".{0,12}", 0..8)) {
        let mapping = resolve_port_mapping(&items, &HostPorts::with_probe(FreePorts));

        let keys: BTreeSet<&String> = mapping.port_bindings().keys().collect();
        let exposed: BTreeSet<&String> = mapping.exposed_ports().iter().collect();
        prop_assert_eq!(keys, exposed);
        prop_assert!(mapping.port_bindings().values().all(|hosts| !hosts.is_empty()));
    }
}

// =============================================================================
// Network Attachment Builder
// =============================================================================

#[test]
fn network_entries_map_name_to_gateway() {
    let networks = build_network_attachments(&entries(&["backend:10.0.0.1"])).unwrap();
    assert_eq!(networks.get("backend").map(String::as_str), Some("10.0.0.1"));
}

#[test]
fn no_network_entries_means_default_networking() {
    assert_eq!(build_network_attachments(&[]), None);
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[tokio::test]
async fn resolves_full_descriptor() {
    let descriptor = WorkloadDescriptor::from_yaml(
        r#"
name: web
predicate:
  repository: nginx
  tag: "1.25"
requirement:
  publish_list: ["0:80"]
  volume_list: ["/srv/www:/usr/share/nginx/html:ro"]
  network_list: ["frontend:"]
"#,
    )
    .unwrap();
    let runtime = FakeRuntime::new().with_registry("nginx:1.25");

    let config = RuntimeConfig::resolve(&descriptor, &runtime, &HostPorts::with_probe(FreePorts)).await;

    assert_eq!(config.container_name().as_str(), "web");
    assert_eq!(config.image().map(|i| i.to_string()).as_deref(), Some("nginx:1.25"));
    assert!(allocated(&config.port_bindings()["80"][0]));
    assert_eq!(config.volume_binds(), ["/srv/www:/usr/share/nginx/html:ro"]);
    assert_eq!(
        config.networks().and_then(|n| n.get("frontend")).map(String::as_str),
        Some("")
    );
}
