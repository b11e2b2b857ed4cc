mod interface;

pub use interface::NetworkInterface;
