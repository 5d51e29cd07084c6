// ABOUTME: Port Mapping Resolver: turns "host:container" entries into a binding table.
// ABOUTME: Malformed and conflicting entries are dropped; missing or busy host ports are allocated.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::host::{HostPorts, PortProbe};

/// Exposed container ports and the host ports bound to each of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortMapping {
    exposed_ports: BTreeSet<String>,
    port_bindings: BTreeMap<String, Vec<String>>,
}

impl PortMapping {
    pub fn exposed_ports(&self) -> &BTreeSet<String> {
        &self.exposed_ports
    }

    /// Container port to host ports, in the order they were requested.
    pub fn port_bindings(&self) -> &BTreeMap<String, Vec<String>> {
        &self.port_bindings
    }

    pub fn host_ports(&self, container_port: &str) -> Option<&[String]> {
        self.port_bindings.get(container_port).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.exposed_ports.is_empty()
    }
}

/// A host port as requested by one publish entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostRequest {
    /// Canonical port number from an all-digit token.
    Port(u16),
    /// Token that cannot name a port; always gets a substitute.
    Unusable,
}

/// Resolve publish entries against the host.
///
/// A host port already claimed by an earlier entry keeps its first container
/// port; the later entry is dropped. Host ports are compared by number, so
/// `8080` and `08080` are the same port. An empty host side (`:80`) asks for
/// an allocated port.
pub fn resolve_port_mapping<P: PortProbe>(
    published: &[String],
    host_ports: &HostPorts<P>,
) -> PortMapping {
    let requested = collect_requests(published);

    // Explicit host ports are off limits for allocation even when busy, so an
    // allocated port never collides with one the descriptor names.
    let mut claimed: BTreeSet<u16> = requested
        .values()
        .flatten()
        .filter_map(|h| match h {
            HostRequest::Port(port) => Some(*port),
            HostRequest::Unusable => None,
        })
        .collect();

    let mut mapping = PortMapping::default();

    for (container_port, hosts) in requested {
        let mut bound = Vec::with_capacity(hosts.len().max(1));

        if hosts.is_empty() {
            match host_ports.allocate_excluding(&claimed) {
                Some(port) => {
                    claimed.insert(port);
                    tracing::info!(container_port = %container_port, host_port = port, "allocated host port");
                    bound.push(port.to_string());
                }
                None => {
                    tracing::warn!(container_port = %container_port, "no host port available, container port dropped");
                    continue;
                }
            }
        }

        for host in hosts {
            match host {
                HostRequest::Port(port) if host_ports.is_port_available(port) => {
                    bound.push(port.to_string());
                    continue;
                }
                _ => {}
            }

            match host_ports.allocate_excluding(&claimed) {
                Some(port) => {
                    claimed.insert(port);
                    tracing::info!(
                        container_port = %container_port,
                        requested = ?host,
                        host_port = port,
                        "requested host port unavailable, using allocated port"
                    );
                    bound.push(port.to_string());
                }
                None => {
                    tracing::warn!(
                        container_port = %container_port,
                        requested = ?host,
                        "requested host port unavailable and no alternative found"
                    );
                }
            }
        }

        if bound.is_empty() {
            tracing::warn!(container_port = %container_port, "no host port bound, container port dropped");
            continue;
        }

        mapping.exposed_ports.insert(container_port.clone());
        mapping.port_bindings.insert(container_port, bound);
    }

    mapping
}

/// Parse entries into container port -> requested host ports, applying the
/// first-seen rule for host ports.
fn collect_requests(published: &[String]) -> BTreeMap<String, Vec<HostRequest>> {
    let mut host_to_container: BTreeMap<u16, &str> = BTreeMap::new();
    let mut requested: BTreeMap<String, Vec<HostRequest>> = BTreeMap::new();

    for entry in published {
        let Some((host, container)) = split_pair(entry) else {
            tracing::warn!(entry = %entry, "invalid port mapping, expected host:container");
            continue;
        };

        if !is_container_port(container) {
            tracing::warn!(entry = %entry, "invalid container port in port mapping");
            continue;
        }

        if host.is_empty() {
            requested.entry(container.to_string()).or_default();
            continue;
        }

        let Some(port) = parse_host_port(host) else {
            tracing::warn!(entry = %entry, "host port is not a port number, a substitute will be allocated");
            requested
                .entry(container.to_string())
                .or_default()
                .push(HostRequest::Unusable);
            continue;
        };

        match host_to_container.get(&port) {
            Some(existing) if *existing == container => {}
            Some(existing) => {
                tracing::warn!(
                    host_port = port,
                    kept = existing,
                    ignored = container,
                    "host port conflict, later container port ignored"
                );
            }
            None => {
                host_to_container.insert(port, container);
                requested
                    .entry(container.to_string())
                    .or_default()
                    .push(HostRequest::Port(port));
            }
        }
    }

    requested
}

/// Digits only, no sign; leading zeros name the same port.
fn parse_host_port(host: &str) -> Option<u16> {
    if host.bytes().all(|b| b.is_ascii_digit()) {
        host.parse().ok()
    } else {
        None
    }
}

/// Split on `:` into exactly two tokens.
pub(crate) fn split_pair(entry: &str) -> Option<(&str, &str)> {
    let mut parts = entry.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(first), Some(second), None) => Some((first, second)),
        _ => None,
    }
}

/// `80`, `80/tcp`, `53/udp`, `9/sctp`.
fn is_container_port(port: &str) -> bool {
    let (number, protocol) = match port.split_once('/') {
        Some((number, protocol)) => (number, Some(protocol)),
        None => (port, None),
    };

    let valid_number = number.bytes().all(|b| b.is_ascii_digit())
        && matches!(number.parse::<u16>(), Ok(p) if p > 0);
    let valid_protocol = matches!(protocol, None | Some("tcp") | Some("udp") | Some("sctp"));

    valid_number && valid_protocol
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_requires_exactly_two_tokens() {
        assert_eq!(split_pair("8080:80"), Some(("8080", "80")));
        assert_eq!(split_pair(":80"), Some(("", "80")));
        assert_eq!(split_pair("80"), None);
        assert_eq!(split_pair("0.0.0.0:8080:80"), None);
    }

    #[test]
    fn container_port_syntax() {
        assert!(is_container_port("80"));
        assert!(is_container_port("80/tcp"));
        assert!(is_container_port("53/udp"));
        assert!(!is_container_port(""));
        assert!(!is_container_port("0"));
        assert!(!is_container_port("http"));
        assert!(!is_container_port("80/icmp"));
        assert!(!is_container_port("+80"));
        assert!(!is_container_port("70000"));
    }

    #[test]
    fn first_seen_host_port_wins() {
        let requests = collect_requests(&["8080:80".to_string(), "8080:81".to_string()]);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests["80"], [HostRequest::Port(8080)]);
    }

    #[test]
    fn repeated_identical_entries_collapse() {
        let requests = collect_requests(&["8080:80".to_string(), "8080:80".to_string()]);
        assert_eq!(requests["80"], [HostRequest::Port(8080)]);
    }

    #[test]
    fn empty_host_side_requests_allocation() {
        let requests = collect_requests(&[":80".to_string()]);
        assert!(requests["80"].is_empty());
    }

    #[test]
    fn host_ports_keep_request_order() {
        let requests = collect_requests(&["9001:80".to_string(), "9000:80".to_string()]);
        assert_eq!(
            requests["80"],
            [HostRequest::Port(9001), HostRequest::Port(9000)]
        );
    }

    #[test]
    fn host_ports_compare_by_number() {
        let requests = collect_requests(&["8080:80".to_string(), "08080:82".to_string()]);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests["80"], [HostRequest::Port(8080)]);
    }

    #[test]
    fn signed_host_port_is_unusable() {
        assert_eq!(parse_host_port("+8080"), None);
        assert_eq!(parse_host_port("-1"), None);
        assert_eq!(parse_host_port("99999"), None);
        assert_eq!(parse_host_port("00080"), Some(80));

        let requests = collect_requests(&["+8080:81".to_string()]);
        assert_eq!(requests["81"], [HostRequest::Unusable]);
    }
}
