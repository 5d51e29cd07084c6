// ABOUTME: Host port availability checks and random allocation.
// ABOUTME: Draws from [8000, 9000) and keeps no state between calls.

use rand::Rng;
use std::collections::BTreeSet;
use std::ops::Range;

use super::probe::{PortProbe, REGISTERED_PORTS, TcpBindProbe};

/// Ports handed out when a workload does not name a usable one.
pub const ALLOCATION_RANGE: Range<u16> = 8000..9000;

/// Random draws before allocation gives up.
pub const ALLOCATION_ATTEMPTS: usize = 1000;

/// Port Availability Prober and Host Port Allocator over a [`PortProbe`].
#[derive(Debug, Clone, Default)]
pub struct HostPorts<P = TcpBindProbe> {
    probe: P,
}

impl HostPorts<TcpBindProbe> {
    /// Probe the real host network stack.
    pub fn system() -> Self {
        Self {
            probe: TcpBindProbe,
        }
    }
}

impl<P: PortProbe> HostPorts<P> {
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    /// Only ports in the registered range are candidates; anything else is
    /// unavailable without touching the network.
    pub fn is_port_available(&self, port: u16) -> bool {
        REGISTERED_PORTS.contains(&port) && self.probe.can_bind(port)
    }

    /// Find a free port in [`ALLOCATION_RANGE`].
    pub fn allocate(&self) -> Option<u16> {
        self.allocate_excluding(&BTreeSet::new())
    }

    /// Find a free port that is not already in `claimed`.
    ///
    /// `claimed` lets one resolution avoid handing the same port to two
    /// bindings; it is not retained.
    pub fn allocate_excluding(&self, claimed: &BTreeSet<u16>) -> Option<u16> {
        let mut rng = rand::thread_rng();
        for _ in 0..ALLOCATION_ATTEMPTS {
            let port = rng.gen_range(ALLOCATION_RANGE);
            if claimed.contains(&port) {
                continue;
            }
            if self.is_port_available(port) {
                return Some(port);
            }
        }

        tracing::warn!(
            start = ALLOCATION_RANGE.start,
            end = ALLOCATION_RANGE.end,
            "failed to find an available host port"
        );
        None
    }
}
