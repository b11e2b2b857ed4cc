use crate::error::EngineError;
use crate::wire::seqno::WrappingInt32;

const HEADER_LEN: usize = 20;

/// The on-the-wire TCP header. Port numbers are carried but unused by the
/// engine (connections are addressed by the caller, not looked up by port);
/// they round-trip so a decoded-then-reencoded header is byte-identical.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TcpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub seqno: WrappingInt32,
    pub ackno: WrappingInt32,
    pub syn: bool,
    pub ack: bool,
    pub fin: bool,
    pub rst: bool,
    pub win: u16,
}

impl Default for TcpHeader {
    fn default() -> Self {
        Self {
            src_port: 0,
            dst_port: 0,
            seqno: WrappingInt32::default(),
            ackno: WrappingInt32::default(),
            syn: false,
            ack: false,
            fin: false,
            rst: false,
            win: 0,
        }
    }
}

impl TcpHeader {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_LEN];
        buf[0..2].copy_from_slice(&self.src_port.to_be_bytes());
        buf[2..4].copy_from_slice(&self.dst_port.to_be_bytes());
        buf[4..8].copy_from_slice(&self.seqno.raw_value().to_be_bytes());
        buf[8..12].copy_from_slice(&self.ackno.raw_value().to_be_bytes());
        buf[12] = 5 << 4; // data offset: 5 words, no options
        let mut flags = 0u8;
        if self.fin {
            flags |= 0x01;
        }
        if self.syn {
            flags |= 0x02;
        }
        if self.rst {
            flags |= 0x04;
        }
        if self.ack {
            flags |= 0x10;
        }
        buf[13] = flags;
        buf[14..16].copy_from_slice(&self.win.to_be_bytes());
        // checksum (16..18) and urgent pointer (18..20) left at zero: no
        // pseudo-header context is available at this layer, and nothing in
        // this engine validates the TCP checksum.
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, EngineError> {
        if bytes.len() < HEADER_LEN {
            return Err(EngineError::TooShort {
                need: HEADER_LEN,
                got: bytes.len(),
            });
        }
        let flags = bytes[13];
        Ok(Self {
            src_port: u16::from_be_bytes([bytes[0], bytes[1]]),
            dst_port: u16::from_be_bytes([bytes[2], bytes[3]]),
            seqno: WrappingInt32::new(u32::from_be_bytes(bytes[4..8].try_into().unwrap())),
            ackno: WrappingInt32::new(u32::from_be_bytes(bytes[8..12].try_into().unwrap())),
            fin: flags & 0x01 != 0,
            syn: flags & 0x02 != 0,
            rst: flags & 0x04 != 0,
            ack: flags & 0x10 != 0,
            win: u16::from_be_bytes([bytes[14], bytes[15]]),
        })
    }

    pub fn header_len() -> usize {
        HEADER_LEN
    }
}

/// A full TCP segment: header plus payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TcpSegment {
    pub header: TcpHeader,
    pub payload: Vec<u8>,
}

impl TcpSegment {
    pub fn length_in_sequence_space(&self) -> usize {
        self.payload.len() + self.header.syn as usize + self.header.fin as usize
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = self.header.encode();
        buf.extend_from_slice(&self.payload);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, EngineError> {
        let header = TcpHeader::decode(bytes)?;
        Ok(Self {
            header,
            payload: bytes[TcpHeader::header_len()..].to_vec(),
        })
    }
}
