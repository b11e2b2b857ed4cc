use crate::stream::byte_stream::ByteStream;

#[derive(Debug, Clone)]
struct Fragment {
    start: usize,
    data: Vec<u8>,
}

impl Fragment {
    fn end_inclusive(&self) -> usize {
        self.start + self.data.len() - 1
    }
}

/// Accepts out-of-order, possibly overlapping byte ranges and writes the
/// longest assembled prefix into an owned `ByteStream`.
///
/// Fragments whose start lies beyond `bytes_read() + capacity` (the
/// acceptance window) are discarded outright; fragments that straddle the
/// window boundary are truncated. The buffered fragment list is always kept
/// sorted and non-overlapping.
#[derive(Debug)]
pub struct StreamReassembler {
    output: ByteStream,
    capacity: usize,
    fragments: Vec<Fragment>,
    unassembled_bytes: usize,
    eof_pending: bool,
    // Absolute index of the last byte of the stream, once known. Signed so an
    // empty zero-length stream (eof at index 0) can still be represented as
    // -1, one before the first valid byte.
    eof_index: i64,
}

impl StreamReassembler {
    pub fn new(capacity: usize) -> Self {
        Self {
            output: ByteStream::new(capacity),
            capacity,
            fragments: Vec::new(),
            unassembled_bytes: 0,
            eof_pending: false,
            eof_index: i64::MAX,
        }
    }

    pub fn output(&self) -> &ByteStream {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut ByteStream {
        &mut self.output
    }

    pub fn unassembled_bytes(&self) -> usize {
        self.unassembled_bytes
    }

    pub fn empty(&self) -> bool {
        self.unassembled_bytes == 0
    }

    pub fn push_substring(&mut self, data: &[u8], index: usize, eof: bool) {
        let window_end = self.output.bytes_read() + self.capacity;
        if index >= window_end {
            return;
        }

        if eof {
            self.eof_index = if data.is_empty() {
                index as i64 - 1
            } else {
                (index + data.len() - 1) as i64
            };
            self.eof_pending = true;
        }

        if data.is_empty() {
            self.maybe_finish();
            return;
        }

        let mut data = data.to_vec();
        if index + data.len() > window_end {
            data.truncate(window_end - index);
        }

        let first_unassembled = self.output.bytes_written();
        if index <= first_unassembled && index + data.len() - 1 >= first_unassembled {
            self.write_and_drain(&data, index, first_unassembled);
        } else if index > first_unassembled {
            self.buffer_gap(data, index);
        }
        // else: the fragment lies entirely behind first_unassembled (a
        // duplicate/retransmit of already-written bytes); nothing to do.

        self.maybe_finish();
    }

    fn write_and_drain(&mut self, data: &[u8], index: usize, first_unassembled: usize) {
        self.output.write(&data[first_unassembled - index..]);
        let mut first_unassembled = self.output.bytes_written();

        while let Some(front) = self.fragments.first() {
            if front.start > first_unassembled {
                break;
            }
            let front = self.fragments.remove(0);
            self.unassembled_bytes -= front.data.len();
            if front.end_inclusive() >= first_unassembled {
                self.output.write(&front.data[first_unassembled - front.start..]);
                first_unassembled = self.output.bytes_written();
            }
        }
    }

    fn buffer_gap(&mut self, data: Vec<u8>, index: usize) {
        let data_end = index + data.len() - 1;
        let mut new_bytes = data.len();
        for frag in &self.fragments {
            let (el, er) = (frag.start, frag.end_inclusive());
            if el > data_end || index > er {
                continue;
            }
            if index >= el && data_end <= er {
                new_bytes = 0;
                break;
            }
            new_bytes -= data_end.min(er) - index.max(el) + 1;
        }
        self.unassembled_bytes += new_bytes;

        let pos = self.fragments.partition_point(|f| f.start < index);
        self.fragments.insert(pos, Fragment { start: index, data });
        self.merge_fragments();
    }

    fn merge_fragments(&mut self) {
        if self.fragments.len() <= 1 {
            return;
        }
        let mut merged = Vec::with_capacity(self.fragments.len());
        let mut iter = self.fragments.drain(..);
        let mut cur = iter.next().expect("len > 1");
        for next in iter {
            let next_byte_index = cur.start + cur.data.len();
            if next.start <= next_byte_index && next.end_inclusive() >= next_byte_index {
                cur.data.extend_from_slice(&next.data[next_byte_index - next.start..]);
            } else if next.start > next_byte_index {
                merged.push(cur);
                cur = next;
            }
            // else: next lies entirely within cur already; nothing to add.
        }
        merged.push(cur);
        self.fragments = merged;
    }

    fn maybe_finish(&mut self) {
        if self.eof_pending && self.output.bytes_written() as i64 > self.eof_index {
            self.output.end_input();
        }
    }
}
