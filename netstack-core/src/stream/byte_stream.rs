use std::collections::VecDeque;

/// A bounded, single-producer/single-consumer FIFO of bytes.
///
/// `write` never blocks and never fails: it simply accepts as many bytes as
/// `remaining_capacity()` allows and silently drops the rest, matching the
/// flow-controlled semantics the sender relies on (it never writes more than
/// it's told it can).
#[derive(Debug, Default)]
pub struct ByteStream {
    capacity: usize,
    buffer: VecDeque<u8>,
    bytes_written: usize,
    bytes_read: usize,
    input_ended: bool,
    error: bool,
}

impl ByteStream {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Copies as much of `data` as fits into the tail of the stream.
    /// Returns the number of bytes actually accepted.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let n = data.len().min(self.remaining_capacity());
        self.buffer.extend(&data[..n]);
        self.bytes_written += n;
        n
    }

    /// Copies up to `len` bytes from the head without consuming them.
    pub fn peek_output(&self, len: usize) -> Vec<u8> {
        let n = len.min(self.buffer.len());
        self.buffer.iter().take(n).copied().collect()
    }

    /// Drops up to `len` bytes from the head.
    pub fn pop_output(&mut self, len: usize) {
        let n = len.min(self.buffer.len());
        self.buffer.drain(..n);
        self.bytes_read += n;
    }

    pub fn read(&mut self, len: usize) -> Vec<u8> {
        let out = self.peek_output(len);
        self.pop_output(out.len());
        out
    }

    pub fn end_input(&mut self) {
        self.input_ended = true;
    }

    pub fn input_ended(&self) -> bool {
        self.input_ended
    }

    pub fn eof(&self) -> bool {
        self.input_ended && self.buffer_empty()
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    pub fn remaining_capacity(&self) -> usize {
        self.capacity - self.buffer.len()
    }

    pub fn set_error(&mut self) {
        self.error = true;
    }

    pub fn error(&self) -> bool {
        self.error
    }
}
