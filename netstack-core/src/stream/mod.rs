mod byte_stream;
mod reassembler;

pub use byte_stream::ByteStream;
pub use reassembler::StreamReassembler;
