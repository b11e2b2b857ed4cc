use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace, warn};

use crate::config::InterfaceConfig;
use crate::wire::arp::{ArpMessage, ARP_OPCODE_REPLY, ARP_OPCODE_REQUEST};
use crate::wire::ethernet::{EthernetFrame, BROADCAST_MAC, ETHERTYPE_ARP, ETHERTYPE_IPV4};
use crate::wire::ipv4::Ipv4Datagram;

struct LearnedMapping {
    mac: [u8; 6],
    expires_at: u64,
}

/// IPv4-over-Ethernet via ARP: resolves next-hop IPs to MAC addresses,
/// caching learned mappings and pacing outstanding requests.
///
/// Expiry is driven by a monotonic clock (`now_ms`, advanced only by `tick`)
/// rather than a per-entry decrement: the ARP cache is a map alongside a FIFO
/// of `(ip, expires_at)` entries in insertion order, which — since every
/// mapping shares the same TTL — is also expiry order. A queue entry is
/// popped once `now_ms` passes its `expires_at`; if a later `learn` refreshed
/// the same IP in the meantime, the map's `expires_at` will have moved past
/// what the stale queue entry recorded, so that entry is just discarded
/// instead of touching the map.
pub struct NetworkInterface {
    ethernet_address: [u8; 6],
    ip_address: u32,
    arp_cache_ttl_ms: u64,
    arp_request_cooldown_ms: u64,
    now_ms: u64,

    arp_cache: HashMap<u32, LearnedMapping>,
    arp_cache_queue: VecDeque<(u32, u64)>,
    pending_requests: HashMap<u32, u64>,
    pending_datagrams: HashMap<u32, VecDeque<Ipv4Datagram>>,

    outbound_frames: VecDeque<EthernetFrame>,
    inbound_datagrams: VecDeque<Ipv4Datagram>,
}

impl NetworkInterface {
    pub fn new(config: InterfaceConfig) -> Self {
        Self {
            ethernet_address: config.ethernet_address,
            ip_address: config.ip_address,
            arp_cache_ttl_ms: config.arp_cache_ttl_ms as u64,
            arp_request_cooldown_ms: config.arp_request_cooldown_ms as u64,
            now_ms: 0,
            arp_cache: HashMap::new(),
            arp_cache_queue: VecDeque::new(),
            pending_requests: HashMap::new(),
            pending_datagrams: HashMap::new(),
            outbound_frames: VecDeque::new(),
            inbound_datagrams: VecDeque::new(),
        }
    }

    pub fn ip_address(&self) -> u32 {
        self.ip_address
    }

    pub fn outbound_frames(&mut self) -> &mut VecDeque<EthernetFrame> {
        &mut self.outbound_frames
    }

    pub fn inbound_datagrams(&mut self) -> &mut VecDeque<Ipv4Datagram> {
        &mut self.inbound_datagrams
    }

    pub fn send_datagram(&mut self, dgram: Ipv4Datagram, next_hop_ip: u32) {
        if let Some(mapping) = self.arp_cache.get(&next_hop_ip) {
            self.emit_ipv4_frame(mapping.mac, &dgram);
            return;
        }

        if self.pending_requests.contains_key(&next_hop_ip) {
            trace!(ip = next_hop_ip, "ARP request already in flight; dropping");
            return;
        }

        debug!(ip = next_hop_ip, "broadcasting ARP request");
        let request = ArpMessage {
            opcode: ARP_OPCODE_REQUEST,
            sender_mac: self.ethernet_address,
            sender_ip: self.ip_address,
            target_mac: [0; 6],
            target_ip: next_hop_ip,
        };
        self.emit_arp_frame(BROADCAST_MAC, &request);
        self.pending_requests
            .insert(next_hop_ip, self.now_ms + self.arp_request_cooldown_ms);
        self.pending_datagrams.entry(next_hop_ip).or_default().push_back(dgram);
    }

    pub fn recv_frame(&mut self, frame: &EthernetFrame) -> Option<Ipv4Datagram> {
        if frame.dst != BROADCAST_MAC && frame.dst != self.ethernet_address {
            return None;
        }

        match frame.ethertype {
            ETHERTYPE_IPV4 => match Ipv4Datagram::decode(&frame.payload) {
                Ok(dgram) => {
                    self.inbound_datagrams.push_back(dgram.clone());
                    Some(dgram)
                }
                Err(err) => {
                    warn!(?err, "dropping malformed IPv4 datagram");
                    None
                }
            },
            ETHERTYPE_ARP => {
                self.handle_arp(&frame.payload, frame.dst == BROADCAST_MAC);
                None
            }
            other => {
                trace!(ethertype = other, "dropping frame of unhandled ethertype");
                None
            }
        }
    }

    fn handle_arp(&mut self, payload: &[u8], was_broadcast: bool) {
        let msg = match ArpMessage::decode(payload) {
            Ok(msg) => msg,
            Err(err) => {
                warn!(?err, "dropping malformed ARP message");
                return;
            }
        };

        if was_broadcast && msg.target_ip != self.ip_address {
            return;
        }

        debug!(ip = msg.sender_ip, mac = ?msg.sender_mac, "learned ARP mapping");
        self.learn(msg.sender_ip, msg.sender_mac);

        if msg.opcode == ARP_OPCODE_REQUEST {
            let reply = ArpMessage {
                opcode: ARP_OPCODE_REPLY,
                sender_mac: self.ethernet_address,
                sender_ip: self.ip_address,
                target_mac: msg.sender_mac,
                target_ip: msg.sender_ip,
            };
            self.emit_arp_frame(msg.sender_mac, &reply);
        }

        self.flush_pending(msg.sender_ip);
    }

    fn learn(&mut self, ip: u32, mac: [u8; 6]) {
        let expires_at = self.now_ms + self.arp_cache_ttl_ms;
        self.arp_cache.insert(ip, LearnedMapping { mac, expires_at });
        self.arp_cache_queue.push_back((ip, expires_at));
        self.pending_requests.remove(&ip);
    }

    fn flush_pending(&mut self, ip: u32) {
        if let Some(queue) = self.pending_datagrams.remove(&ip) {
            for dgram in queue {
                self.send_datagram(dgram, ip);
            }
        }
    }

    pub fn tick(&mut self, ms_elapsed: u64) {
        self.now_ms += ms_elapsed;

        while let Some(&(ip, expires_at)) = self.arp_cache_queue.front() {
            let still_current = self.arp_cache.get(&ip).map(|m| m.expires_at == expires_at).unwrap_or(false);
            if !still_current {
                self.arp_cache_queue.pop_front();
                continue;
            }
            if expires_at > self.now_ms {
                break;
            }
            self.arp_cache.remove(&ip);
            self.arp_cache_queue.pop_front();
        }

        let now = self.now_ms;
        self.pending_requests.retain(|_, expires_at| *expires_at > now);
    }

    fn emit_ipv4_frame(&mut self, dst_mac: [u8; 6], dgram: &Ipv4Datagram) {
        self.outbound_frames.push_back(EthernetFrame {
            dst: dst_mac,
            src: self.ethernet_address,
            ethertype: ETHERTYPE_IPV4,
            payload: dgram.encode(),
        });
    }

    fn emit_arp_frame(&mut self, dst_mac: [u8; 6], msg: &ArpMessage) {
        self.outbound_frames.push_back(EthernetFrame {
            dst: dst_mac,
            src: self.ethernet_address,
            ethertype: ETHERTYPE_ARP,
            payload: msg.encode(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(ip: u32, mac: [u8; 6]) -> NetworkInterface {
        NetworkInterface::new(InterfaceConfig::new(mac, ip))
    }

    fn datagram() -> Ipv4Datagram {
        Ipv4Datagram {
            id: 1,
            ttl: 64,
            protocol: 6,
            src: 0x0a000001,
            dst: 0x0a000002,
            payload: vec![1, 2, 3],
        }
    }

    #[test]
    fn unresolved_send_broadcasts_arp_and_queues_datagram() {
        let mut a = iface(0x0a000001, [1; 6]);
        a.send_datagram(datagram(), 0x0a000002);
        assert_eq!(a.outbound_frames().len(), 1);
        let frame = a.outbound_frames().pop_front().unwrap();
        assert_eq!(frame.ethertype, ETHERTYPE_ARP);
        assert_eq!(frame.dst, BROADCAST_MAC);
    }

    #[test]
    fn second_send_while_request_in_flight_does_not_requeue() {
        let mut a = iface(0x0a000001, [1; 6]);
        a.send_datagram(datagram(), 0x0a000002);
        a.outbound_frames().clear();
        a.send_datagram(datagram(), 0x0a000002);
        assert!(a.outbound_frames().is_empty());
    }

    #[test]
    fn arp_reply_learns_mapping_and_flushes_pending() {
        let mut a = iface(0x0a000001, [1; 6]);
        a.send_datagram(datagram(), 0x0a000002);
        a.outbound_frames().clear();

        let reply = ArpMessage {
            opcode: ARP_OPCODE_REPLY,
            sender_mac: [2; 6],
            sender_ip: 0x0a000002,
            target_mac: [1; 6],
            target_ip: 0x0a000001,
        };
        let frame = EthernetFrame {
            dst: [1; 6],
            src: [2; 6],
            ethertype: ETHERTYPE_ARP,
            payload: reply.encode(),
        };
        a.recv_frame(&frame);
        assert_eq!(a.outbound_frames().len(), 1);
        let flushed = a.outbound_frames().pop_front().unwrap();
        assert_eq!(flushed.ethertype, ETHERTYPE_IPV4);
        assert_eq!(flushed.dst, [2; 6]);
    }

    #[test]
    fn arp_cache_entry_expires_after_ttl() {
        let mut a = iface(0x0a000001, [1; 6]);
        let reply = ArpMessage {
            opcode: ARP_OPCODE_REPLY,
            sender_mac: [2; 6],
            sender_ip: 0x0a000002,
            target_mac: [1; 6],
            target_ip: 0x0a000001,
        };
        a.learn(reply.sender_ip, reply.sender_mac);
        a.tick(29_999);
        a.send_datagram(datagram(), 0x0a000002);
        assert_eq!(a.outbound_frames().pop_front().unwrap().ethertype, ETHERTYPE_IPV4);
        a.tick(2);
        a.send_datagram(datagram(), 0x0a000002);
        let frame = a.outbound_frames().pop_front().unwrap();
        assert_eq!(frame.ethertype, ETHERTYPE_ARP, "mapping should have expired");
    }
}
