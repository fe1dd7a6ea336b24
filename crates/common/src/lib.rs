pub mod config;
pub mod logging;
mod macros;
pub mod telemetry;

pub use config::{Environment, env_flag, env_parse};
pub use logging::setup_logging;
pub use telemetry::{TelemetryConfig, TelemetryGuard};
