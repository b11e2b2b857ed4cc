use tracing::trace;

use crate::link::NetworkInterface;
use crate::wire::ipv4::Ipv4Datagram;

struct Route {
    prefix: u32,
    prefix_length: u8,
    next_hop: Option<u32>,
    interface_index: usize,
}

/// Longest-prefix-match IPv4 forwarding across a fixed set of owned
/// interfaces.
pub struct Router {
    routes: Vec<Route>,
    interfaces: Vec<NetworkInterface>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            interfaces: Vec::new(),
        }
    }

    pub fn add_interface(&mut self, interface: NetworkInterface) -> usize {
        self.interfaces.push(interface);
        self.interfaces.len() - 1
    }

    pub fn interface_mut(&mut self, index: usize) -> &mut NetworkInterface {
        &mut self.interfaces[index]
    }

    pub fn add_route(&mut self, prefix: u32, prefix_length: u8, next_hop: Option<u32>, interface_index: usize) {
        debug_assert!(prefix_length <= 32);
        self.routes.push(Route {
            prefix,
            prefix_length,
            next_hop,
            interface_index,
        });
    }

    /// Forwards a single datagram, dropping it silently on TTL exhaustion or
    /// no matching route (no ICMP is generated).
    pub fn route_one_datagram(&mut self, mut dgram: Ipv4Datagram) {
        if dgram.ttl <= 1 {
            trace!(dst = dgram.dst, "dropping datagram: TTL exhausted");
            return;
        }

        // Manual scan, not `Iterator::max_by_key`: ties must keep the
        // earliest-inserted route, and `max_by_key` keeps the last.
        let mut best: Option<&Route> = None;
        for route in &self.routes {
            if !matches(route, dgram.dst) {
                continue;
            }
            if best.map(|b| route.prefix_length > b.prefix_length).unwrap_or(true) {
                best = Some(route);
            }
        }

        let Some(route) = best else {
            trace!(dst = dgram.dst, "dropping datagram: no matching route");
            return;
        };

        dgram.ttl -= 1;
        let next_hop = route.next_hop.unwrap_or(dgram.dst);
        self.interfaces[route.interface_index].send_datagram(dgram, next_hop);
    }

    /// Drains every interface's inbound datagram queue through
    /// `route_one_datagram`.
    pub fn route(&mut self) {
        let mut drained = Vec::new();
        for iface in &mut self.interfaces {
            while let Some(dgram) = iface.inbound_datagrams().pop_front() {
                drained.push(dgram);
            }
        }
        for dgram in drained {
            self.route_one_datagram(dgram);
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(route: &Route, dst: u32) -> bool {
    let mask: u32 = if route.prefix_length == 0 {
        0
    } else {
        !0u32 << (32 - route.prefix_length)
    };
    (dst & mask) == (route.prefix & mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InterfaceConfig;

    fn datagram(dst: u32, ttl: u8) -> Ipv4Datagram {
        Ipv4Datagram {
            id: 0,
            ttl,
            protocol: 6,
            src: 0,
            dst,
            payload: Vec::new(),
        }
    }

    #[test]
    fn longest_prefix_wins() {
        let mut router = Router::new();
        let a = router.add_interface(NetworkInterface::new(InterfaceConfig::new([1; 6], 0x0a000001)));
        let b = router.add_interface(NetworkInterface::new(InterfaceConfig::new([2; 6], 0x0a000002)));
        router.add_route(0x0a000000, 8, None, a);
        router.add_route(0x0a000100, 24, Some(0xc0a80001), b);

        router.route_one_datagram(datagram(0x0a000105, 64));
        assert!(router.interface_mut(a).outbound_frames().is_empty());
        assert_eq!(router.interface_mut(b).outbound_frames().len(), 1);
    }

    #[test]
    fn ttl_of_one_is_dropped_without_forwarding() {
        let mut router = Router::new();
        let a = router.add_interface(NetworkInterface::new(InterfaceConfig::new([1; 6], 0x0a000001)));
        router.add_route(0, 0, None, a);
        router.route_one_datagram(datagram(0x08080808, 1));
        assert!(router.interface_mut(a).outbound_frames().is_empty());
    }

    #[test]
    fn no_matching_route_is_dropped() {
        let mut router = Router::new();
        let a = router.add_interface(NetworkInterface::new(InterfaceConfig::new([1; 6], 0x0a000001)));
        router.add_route(0x0a000000, 24, None, a);
        router.route_one_datagram(datagram(0xac100001, 64));
        assert!(router.interface_mut(a).outbound_frames().is_empty());
    }

    #[test]
    fn default_route_decrements_ttl_and_forwards() {
        let mut router = Router::new();
        let a = router.add_interface(NetworkInterface::new(InterfaceConfig::new([1; 6], 0x0a000001)));
        router.add_route(0, 0, Some(0x0a0000fe), a);
        router.route_one_datagram(datagram(0x08080808, 10));
        assert_eq!(router.interface_mut(a).outbound_frames().len(), 1);
    }
}
