// ABOUTME: Network Attachment Builder: "network:gateway" entries to an endpoint map.
// ABOUTME: Networks and gateways are not checked against the runtime here.

use std::collections::BTreeMap;

use super::ports::split_pair;

/// Build network name -> gateway attachments, or `None` when no networks are
/// requested.
///
/// Only one attachment is meaningful to the runtime at creation time. A
/// repeated network name overwrites the earlier gateway.
pub fn build_network_attachments(networks: &[String]) -> Option<BTreeMap<String, String>> {
    if networks.is_empty() {
        tracing::debug!("no networks requested");
        return None;
    }

    let mut attachments = BTreeMap::new();
    for (network, gateway) in valid_entries(networks) {
        if let Some(previous) = attachments.insert(network.to_string(), gateway.to_string()) {
            tracing::debug!(network, previous = %previous, gateway, "network listed twice, gateway overwritten");
        }
    }

    if attachments.len() > 1 {
        tracing::warn!(
            count = attachments.len(),
            "more than one network requested; only one attachment is supported"
        );
    }

    Some(attachments)
}

/// The first well-formed network in list order; the container starts in it.
pub fn primary_network(networks: &[String]) -> Option<String> {
    networks
        .iter()
        .filter_map(|entry| parse_entry(entry))
        .map(|(network, _)| network.to_string())
        .next()
}

fn valid_entries(networks: &[String]) -> impl Iterator<Item = (&str, &str)> {
    networks.iter().filter_map(|entry| {
        let parsed = parse_entry(entry);
        if parsed.is_none() {
            tracing::warn!(entry = %entry, "invalid network attachment, expected network:gateway");
        }
        parsed
    })
}

fn parse_entry(entry: &str) -> Option<(&str, &str)> {
    split_pair(entry).filter(|(network, _)| !network.is_empty())
}
