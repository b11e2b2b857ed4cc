use crate::error::EngineError;
use crate::wire::ethernet::MAC_ADDR_LEN;

const HTYPE_ETHERNET: u16 = 1;
const PTYPE_IPV4: u16 = 0x0800;

pub const ARP_OPCODE_REQUEST: u16 = 1;
pub const ARP_OPCODE_REPLY: u16 = 2;

const MESSAGE_LEN: usize = 28;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArpMessage {
    pub opcode: u16,
    pub sender_mac: [u8; MAC_ADDR_LEN],
    pub sender_ip: u32,
    pub target_mac: [u8; MAC_ADDR_LEN],
    pub target_ip: u32,
}

impl ArpMessage {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; MESSAGE_LEN];
        buf[0..2].copy_from_slice(&HTYPE_ETHERNET.to_be_bytes());
        buf[2..4].copy_from_slice(&PTYPE_IPV4.to_be_bytes());
        buf[4] = MAC_ADDR_LEN as u8;
        buf[5] = 4;
        buf[6..8].copy_from_slice(&self.opcode.to_be_bytes());
        buf[8..14].copy_from_slice(&self.sender_mac);
        buf[14..18].copy_from_slice(&self.sender_ip.to_be_bytes());
        buf[18..24].copy_from_slice(&self.target_mac);
        buf[24..28].copy_from_slice(&self.target_ip.to_be_bytes());
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, EngineError> {
        if bytes.len() < MESSAGE_LEN {
            return Err(EngineError::TooShort {
                need: MESSAGE_LEN,
                got: bytes.len(),
            });
        }
        let opcode = u16::from_be_bytes([bytes[6], bytes[7]]);
        if opcode != ARP_OPCODE_REQUEST && opcode != ARP_OPCODE_REPLY {
            return Err(EngineError::UnknownArpOpcode(opcode));
        }
        let mut sender_mac = [0u8; MAC_ADDR_LEN];
        let mut target_mac = [0u8; MAC_ADDR_LEN];
        sender_mac.copy_from_slice(&bytes[8..14]);
        target_mac.copy_from_slice(&bytes[18..24]);
        Ok(Self {
            opcode,
            sender_mac,
            sender_ip: u32::from_be_bytes(bytes[14..18].try_into().unwrap()),
            target_mac,
            target_ip: u32::from_be_bytes(bytes[24..28].try_into().unwrap()),
        })
    }
}
