use std::collections::VecDeque;

use tracing::warn;

use crate::config::EngineConfig;
use crate::stream::ByteStream;
use crate::tcp::receiver::TcpReceiver;
use crate::tcp::sender::TcpSender;
use crate::wire::tcp::TcpSegment;

/// Couples a `TcpSender` and `TcpReceiver` into the full duplex connection
/// lifecycle: handshake, data transfer, RST handling, and the TIME-WAIT-like
/// linger before a clean close.
#[derive(Debug)]
pub struct TcpConnection {
    sender: TcpSender,
    receiver: TcpReceiver,
    initial_rto: u64,
    max_retx_attempts: u32,
    segments_out: VecDeque<TcpSegment>,
    active: bool,
    linger: bool,
    time_since_last_segment_received: u64,
}

impl TcpConnection {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            sender: TcpSender::new(config.capacity, config.rt_timeout, config.max_payload_size, None),
            receiver: TcpReceiver::new(config.capacity),
            initial_rto: config.rt_timeout as u64,
            max_retx_attempts: config.max_retx_attempts,
            segments_out: VecDeque::new(),
            active: true,
            linger: true,
            time_since_last_segment_received: 0,
        }
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn bytes_in_flight(&self) -> u64 {
        self.sender.bytes_in_flight()
    }

    pub fn unassembled_bytes(&self) -> usize {
        self.receiver.reassembler().unassembled_bytes()
    }

    pub fn remaining_outbound_capacity(&self) -> usize {
        self.sender.stream().remaining_capacity()
    }

    pub fn time_since_last_segment_received(&self) -> u64 {
        self.time_since_last_segment_received
    }

    pub fn inbound(&mut self) -> &mut ByteStream {
        self.receiver.reassembler_mut().output_mut()
    }

    pub fn segments_out(&mut self) -> &mut VecDeque<TcpSegment> {
        &mut self.segments_out
    }

    pub fn connect(&mut self) {
        self.sender.fill_window();
        self.drain_sender();
    }

    pub fn write(&mut self, data: &[u8]) -> usize {
        let n = self.sender.stream_mut().write(data);
        self.sender.fill_window();
        self.drain_sender();
        n
    }

    pub fn end_input_stream(&mut self) {
        self.sender.stream_mut().end_input();
        self.sender.fill_window();
        self.drain_sender();
    }

    pub fn segment_received(&mut self, seg: &TcpSegment) {
        if !self.active {
            return;
        }
        self.time_since_last_segment_received = 0;

        if seg.header.rst {
            self.unclean_shutdown_streams();
            self.active = false;
            return;
        }

        self.receiver.segment_received(seg);

        if seg.header.ack {
            self.sender.ack_received(seg.header.ackno, seg.header.win);
        }

        if seg.length_in_sequence_space() > 0 {
            self.sender.fill_window();
            if self.sender.segments_out().is_empty() {
                self.sender.send_empty_segment();
            }
        }

        if let Some(ackno) = self.receiver.ackno() {
            let is_keep_alive = seg.length_in_sequence_space() == 0 && seg.header.seqno == ackno + u32::MAX;
            if is_keep_alive {
                self.sender.send_empty_segment();
            }
        }

        if self.receiver.reassembler().output().input_ended() && !self.sender.stream().eof() {
            self.linger = false;
        }

        self.drain_sender();
    }

    pub fn tick(&mut self, ms_elapsed: u64) {
        if self.sender.stream().bytes_written() > 0 {
            self.sender.fill_window();
        }
        self.sender.tick(ms_elapsed);

        if self.sender.consecutive_retransmissions() > self.max_retx_attempts {
            self.sender.discard_last_segment();
            warn!("giving up after too many retransmissions; sending RST");
            self.unclean_shutdown_streams();
            self.sender.send_empty_segment();
            if let Some(rst) = self.sender.segments_out().back_mut() {
                rst.header.rst = true;
            }
            self.active = false;
            self.drain_sender();
            return;
        }

        self.drain_sender();
        self.time_since_last_segment_received += ms_elapsed;

        let clean_shutdown_ready = self.receiver.reassembler().output().input_ended()
            && self.sender.stream().eof()
            && self.sender.bytes_in_flight() == 0;
        if clean_shutdown_ready {
            if !self.linger {
                self.active = false;
            } else if self.time_since_last_segment_received >= 10 * self.initial_rto {
                self.active = false;
            }
        }
    }

    fn unclean_shutdown_streams(&mut self) {
        self.sender.stream_mut().set_error();
        self.receiver.reassembler_mut().output_mut().set_error();
    }

    fn drain_sender(&mut self) {
        while let Some(mut seg) = self.sender.segments_out().pop_front() {
            match self.receiver.ackno() {
                Some(ackno) => {
                    seg.header.ack = true;
                    seg.header.ackno = ackno;
                }
                None => seg.header.ack = false,
            }
            seg.header.win = self.receiver.window_size();
            self.segments_out.push_back(seg);
        }
    }
}

impl Drop for TcpConnection {
    fn drop(&mut self) {
        if self.active {
            warn!("dropping active TCP connection without a clean shutdown; sending RST");
            self.unclean_shutdown_streams();
            self.sender.send_empty_segment();
            if let Some(rst) = self.sender.segments_out().back_mut() {
                rst.header.rst = true;
            }
            self.drain_sender();
        }
    }
}
