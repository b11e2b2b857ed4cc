use std::collections::VecDeque;

use rand::Rng;
use tracing::{debug, trace};

use crate::stream::ByteStream;
use crate::tcp::timer::Timer;
use crate::wire::seqno::{unwrap, wrap, WrappingInt32};
use crate::wire::tcp::{TcpHeader, TcpSegment};

/// Segments the outbound byte stream, tracks what is in flight, and owns the
/// retransmission timer. Nothing here reads a clock: every time-dependent
/// decision is driven by `tick(ms)`.
#[derive(Debug)]
pub struct TcpSender {
    isn: WrappingInt32,
    stream: ByteStream,
    max_payload_size: usize,
    initial_rto: u64,
    next_seqno: u64,
    segments_out: VecDeque<TcpSegment>,
    outstanding: VecDeque<(TcpSegment, u64)>,
    bytes_in_flight: u64,
    peer_window: u16,
    consecutive_retransmissions: u32,
    timer: Timer,
}

impl TcpSender {
    pub fn new(capacity: usize, rt_timeout: u16, max_payload_size: usize, fixed_isn: Option<WrappingInt32>) -> Self {
        let isn = fixed_isn.unwrap_or_else(|| WrappingInt32::new(rand::rng().random()));
        Self {
            isn,
            stream: ByteStream::new(capacity),
            max_payload_size,
            initial_rto: rt_timeout as u64,
            next_seqno: 0,
            segments_out: VecDeque::new(),
            outstanding: VecDeque::new(),
            bytes_in_flight: 0,
            peer_window: 1,
            consecutive_retransmissions: 0,
            timer: Timer::new(rt_timeout as u64),
        }
    }

    pub fn stream_mut(&mut self) -> &mut ByteStream {
        &mut self.stream
    }

    pub fn stream(&self) -> &ByteStream {
        &self.stream
    }

    pub fn next_seqno(&self) -> WrappingInt32 {
        wrap(self.next_seqno, self.isn)
    }

    pub fn next_seqno_absolute(&self) -> u64 {
        self.next_seqno
    }

    pub fn bytes_in_flight(&self) -> u64 {
        self.bytes_in_flight
    }

    pub fn consecutive_retransmissions(&self) -> u32 {
        self.consecutive_retransmissions
    }

    pub fn segments_out(&mut self) -> &mut VecDeque<TcpSegment> {
        &mut self.segments_out
    }

    fn push_segment(&mut self, header: TcpHeader, payload: Vec<u8>, track: bool) {
        let len = payload.len() + header.syn as usize + header.fin as usize;
        let abs_seqno = self.next_seqno;
        let seg = TcpSegment { header, payload };
        self.next_seqno += len as u64;
        self.bytes_in_flight += len as u64;
        if track {
            self.outstanding.push_back((seg.clone(), abs_seqno));
            if self.timer.is_closed() {
                self.timer.start();
            }
        }
        self.segments_out.push_back(seg);
    }

    pub fn fill_window(&mut self) {
        if self.next_seqno == 0 {
            let header = TcpHeader {
                seqno: self.next_seqno(),
                syn: true,
                ..TcpHeader::default()
            };
            trace!("sending SYN");
            self.push_segment(header, Vec::new(), true);
            return;
        }

        let fin_already_sent = self.stream.eof() && self.next_seqno == self.stream.bytes_written() + 2;
        if fin_already_sent {
            return;
        }

        loop {
            let effective_window = self.peer_window.max(1) as u64;
            let oldest_unacked = self.outstanding.front().map(|(_, s)| *s).unwrap_or(self.next_seqno);
            let window_left = (oldest_unacked + effective_window).saturating_sub(self.next_seqno);
            if window_left == 0 {
                break;
            }

            let payload_len = (self.max_payload_size as u64)
                .min(window_left)
                .min(self.stream.buffer_size() as u64) as usize;
            let payload = self.stream.read(payload_len);

            let fin = self.stream.eof() && (payload.len() as u64 + 1 <= window_left);
            let header = TcpHeader {
                seqno: self.next_seqno(),
                syn: false,
                fin,
                ..TcpHeader::default()
            };
            let len = payload.len() + fin as usize;
            if len == 0 {
                break;
            }
            debug!(len, fin, "segmenting outbound stream");
            self.push_segment(header, payload, true);
            if fin {
                // Nothing more to send in this call; the top-of-function
                // check on the next call keeps a FIN from ever being sent
                // twice.
                break;
            }
        }
    }

    pub fn ack_received(&mut self, ackno: WrappingInt32, window: u16) {
        let abs_ack = unwrap(ackno, self.isn, self.next_seqno);
        if abs_ack > self.next_seqno {
            return;
        }

        let mut any_acked = false;
        while let Some((seg, seqno)) = self.outstanding.front() {
            let len = seg.length_in_sequence_space() as u64;
            if *seqno + len <= abs_ack {
                let (seg, _) = self.outstanding.pop_front().unwrap();
                self.bytes_in_flight -= seg.length_in_sequence_space() as u64;
                any_acked = true;
            } else {
                break;
            }
        }

        self.peer_window = window;

        if any_acked {
            self.timer.set_rto(self.initial_rto);
            self.consecutive_retransmissions = 0;
            if self.outstanding.is_empty() {
                self.timer.close();
            } else {
                self.timer.start();
            }
        }
    }

    pub fn tick(&mut self, ms_elapsed: u64) {
        if self.timer.is_expired(ms_elapsed) {
            if let Some((seg, _)) = self.outstanding.front().cloned() {
                trace!("retransmitting oldest outstanding segment");
                self.segments_out.push_back(seg);
            }
            if self.peer_window != 0 {
                self.consecutive_retransmissions += 1;
                self.timer.double_rto();
            }
            self.timer.start();
        }
    }

    /// Drops the most recently queued outbound segment without sending it.
    /// Used when the connection gives up on a retransmission and needs to
    /// replace it with a RST instead.
    pub fn discard_last_segment(&mut self) {
        self.segments_out.pop_back();
    }

    pub fn send_empty_segment(&mut self) {
        let header = TcpHeader {
            seqno: self.next_seqno(),
            ..TcpHeader::default()
        };
        self.segments_out.push_back(TcpSegment {
            header,
            payload: Vec::new(),
        });
    }
}
