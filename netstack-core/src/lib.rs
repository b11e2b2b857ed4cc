#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod link;
pub mod router;
pub mod stream;
pub mod tcp;
pub mod wire;

pub use config::{EngineConfig, InterfaceConfig};
pub use error::{EngineError, Result};
pub use link::NetworkInterface;
pub use router::Router;
pub use stream::{ByteStream, StreamReassembler};
pub use tcp::{TcpConnection, TcpReceiver, TcpSender, Timer};
