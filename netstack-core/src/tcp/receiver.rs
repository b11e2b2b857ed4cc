use tracing::trace;

use crate::stream::StreamReassembler;
use crate::wire::seqno::{unwrap, wrap, WrappingInt32};
use crate::wire::tcp::TcpSegment;

/// Unwraps inbound sequence numbers against the stream reassembler and
/// computes the acknowledgement number and receive window to advertise back.
#[derive(Debug)]
pub struct TcpReceiver {
    reassembler: StreamReassembler,
    isn: Option<WrappingInt32>,
}

impl TcpReceiver {
    pub fn new(capacity: usize) -> Self {
        Self {
            reassembler: StreamReassembler::new(capacity),
            isn: None,
        }
    }

    pub fn reassembler(&self) -> &StreamReassembler {
        &self.reassembler
    }

    pub fn reassembler_mut(&mut self) -> &mut StreamReassembler {
        &mut self.reassembler
    }

    pub fn segment_received(&mut self, seg: &TcpSegment) {
        let isn = match self.isn {
            Some(isn) => isn,
            None => {
                if !seg.header.syn {
                    trace!("dropping segment received before SYN");
                    return;
                }
                self.isn = Some(seg.header.seqno);
                seg.header.seqno
            }
        };

        let checkpoint = self.reassembler.output().bytes_written();
        let seqno_plus_syn = seg.header.seqno + seg.header.syn as u32;
        let abs_seqno = unwrap(seqno_plus_syn, isn, checkpoint);
        let stream_index = abs_seqno.saturating_sub(1);

        self.reassembler
            .push_substring(&seg.payload, stream_index as usize, seg.header.fin);
    }

    pub fn ackno(&self) -> Option<WrappingInt32> {
        let isn = self.isn?;
        let bytes_written = self.reassembler.output().bytes_written() as u64;
        let fin_offset = if self.reassembler.output().input_ended() { 1 } else { 0 };
        Some(wrap(bytes_written + 1 + fin_offset, isn))
    }

    pub fn window_size(&self) -> u16 {
        self.reassembler.output().remaining_capacity().min(u16::MAX as usize) as u16
    }
}
