mod engine;
mod interface;

pub use engine::EngineConfig;
pub use interface::InterfaceConfig;
