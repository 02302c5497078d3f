pub mod app_config;
pub mod memory_repo;
pub mod telemetry;

pub use app_config::{Config, EngineConfig, TelemetryConfig};
pub use memory_repo::InMemoryRepository;
