// ABOUTME: Port availability probe backed by a bind-then-release TCP listener.
// ABOUTME: The PortProbe trait lets tests substitute a deterministic fake.

use std::net::{Ipv4Addr, TcpListener};
use std::ops::RangeInclusive;

/// Only registered ports are ever handed to a container. Privileged and
/// ephemeral ports are refused regardless of whether they could be bound.
pub const REGISTERED_PORTS: RangeInclusive<u16> = 1024..=49151;

/// Answers whether a host port can be bound right now.
pub trait PortProbe: Send + Sync {
    fn can_bind(&self, port: u16) -> bool;
}

/// Binds a listener on all interfaces and drops it immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpBindProbe;

impl PortProbe for TcpBindProbe {
    fn can_bind(&self, port: u16) -> bool {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)) {
            Ok(listener) => {
                drop(listener);
                true
            }
            Err(e) => {
                tracing::debug!(port, error = %e, "host port cannot be bound");
                false
            }
        }
    }
}

impl<P: PortProbe + ?Sized> PortProbe for &P {
    fn can_bind(&self, port: u16) -> bool {
        (**self).can_bind(port)
    }
}
