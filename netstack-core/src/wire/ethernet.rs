use crate::error::EngineError;

pub const MAC_ADDR_LEN: usize = 6;
pub const BROADCAST_MAC: [u8; MAC_ADDR_LEN] = [0xff; MAC_ADDR_LEN];

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;

const HEADER_LEN: usize = 14;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EthernetFrame {
    pub dst: [u8; MAC_ADDR_LEN],
    pub src: [u8; MAC_ADDR_LEN],
    pub ethertype: u16,
    pub payload: Vec<u8>,
}

impl EthernetFrame {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.payload.len());
        buf.extend_from_slice(&self.dst);
        buf.extend_from_slice(&self.src);
        buf.extend_from_slice(&self.ethertype.to_be_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, EngineError> {
        if bytes.len() < HEADER_LEN {
            return Err(EngineError::TooShort {
                need: HEADER_LEN,
                got: bytes.len(),
            });
        }
        let mut dst = [0u8; MAC_ADDR_LEN];
        let mut src = [0u8; MAC_ADDR_LEN];
        dst.copy_from_slice(&bytes[0..6]);
        src.copy_from_slice(&bytes[6..12]);
        let ethertype = u16::from_be_bytes([bytes[12], bytes[13]]);
        Ok(Self {
            dst,
            src,
            ethertype,
            payload: bytes[HEADER_LEN..].to_vec(),
        })
    }
}
