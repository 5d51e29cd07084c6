// ABOUTME: Host port probing and allocation.
// ABOUTME: Best-effort checks; a free port may be taken before the container binds it.

mod allocator;
mod probe;

pub use allocator::{ALLOCATION_ATTEMPTS, ALLOCATION_RANGE, HostPorts};
pub use probe::{PortProbe, REGISTERED_PORTS, TcpBindProbe};
