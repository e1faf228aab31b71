//! Process-wide `tracing` setup for the execution agent.
//!
//! ```no_run
//! use psx_observe::{LogConfig, LogFormat, init_logging};
//!
//! let cfg = LogConfig::new("info,psx_platform=debug", LogFormat::Json);
//! init_logging(&cfg).expect("logging");
//! ```
mod config;
pub use config::{LogConfig, LogFormat};

mod error;
pub use error::ObserveError;

mod install;
pub use install::init_logging;
