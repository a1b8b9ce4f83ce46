//! CLI command implementations.

mod clear;
mod config;
mod devices;
mod log;
mod tail;

pub use clear::run_clear;
pub use config::run_config;
pub use devices::run_devices;
pub use log::run_log;
pub use tail::run_tail;
