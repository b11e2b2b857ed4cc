/// Tunables for a `NetworkInterface`: identity plus ARP cache timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterfaceConfig {
    pub ethernet_address: [u8; 6],
    pub ip_address: u32,
    /// How long a learned IP->Ethernet mapping is trusted before it expires.
    pub arp_cache_ttl_ms: usize,
    /// How long to wait before re-broadcasting an ARP request for the same IP.
    pub arp_request_cooldown_ms: usize,
}

pub const DEFAULT_ARP_CACHE_TTL_MS: usize = 30_000;
pub const DEFAULT_ARP_REQUEST_COOLDOWN_MS: usize = 5_000;

impl InterfaceConfig {
    pub fn new(ethernet_address: [u8; 6], ip_address: u32) -> Self {
        Self {
            ethernet_address,
            ip_address,
            arp_cache_ttl_ms: DEFAULT_ARP_CACHE_TTL_MS,
            arp_request_cooldown_ms: DEFAULT_ARP_REQUEST_COOLDOWN_MS,
        }
    }
}
