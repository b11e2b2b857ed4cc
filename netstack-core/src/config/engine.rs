/// Tunables for a single direction's `ByteStream`/sender/receiver triple.
///
/// There is no file-based loader for this config: the engine has no CLI or
/// daemon surface of its own (a host embedding it wires these fields in
/// directly), so a `Default` impl plus struct-update syntax is all callers
/// need.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Capacity, in bytes, of each direction's `ByteStream`.
    pub capacity: usize,
    /// Initial retransmission timeout, in milliseconds.
    pub rt_timeout: u16,
    /// Consecutive retransmissions allowed before the connection gives up.
    pub max_retx_attempts: u32,
    /// Largest payload, in bytes, a single outgoing segment may carry.
    pub max_payload_size: usize,
}

pub const DEFAULT_CAPACITY: usize = 64 * 1024;
pub const DEFAULT_RT_TIMEOUT_MS: u16 = 1000;
pub const DEFAULT_MAX_RETX_ATTEMPTS: u32 = 8;
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 1000;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            rt_timeout: DEFAULT_RT_TIMEOUT_MS,
            max_retx_attempts: DEFAULT_MAX_RETX_ATTEMPTS,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.capacity, 64 * 1024);
        assert_eq!(cfg.rt_timeout, 1000);
        assert_eq!(cfg.max_retx_attempts, 8);
    }
}
